use crate::entities::transaction::{NewWalletTransaction, TransactionKind, WalletTransaction};
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Wallet balance in đồng. Never negative; the debit path guards it in SQL.
    pub balance: i64,
    pub total_orders: i32,
    pub total_spent: i64,
    pub status: UserStatus,
    pub created_at: time::PrimitiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, serde::Serialize)]
#[sqlx(type_name = "user_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Suspended,
    Banned,
}

/// Look a user up by id.
pub struct GetUserById {
    pub user_id: Uuid,
}

impl Processor<GetUserById> for DatabaseProcessor {
    type Output = Option<User>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetUserById")]
    async fn process(&self, query: GetUserById) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, balance, total_orders, total_spent, status, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(query.user_id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Result of a guarded purchase debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    Applied,
    /// The balance guard failed; nothing was written.
    InsufficientFunds,
}

/// Debit a wallet for a purchase.
///
/// The balance guard (`balance >= amount`) runs inside the UPDATE itself so
/// concurrent purchases by the same user cannot drive the balance negative.
/// The paired `purchase` journal row is written in the same database
/// transaction, with the amount negated.
pub struct DebitForPurchase {
    pub user_id: Uuid,
    pub order_id: Uuid,
    pub amount: i64,
    pub description: String,
}

impl Processor<DebitForPurchase> for DatabaseProcessor {
    type Output = DebitOutcome;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:DebitForPurchase")]
    async fn process(&self, command: DebitForPurchase) -> Result<DebitOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE users
            SET balance = balance - $2,
                total_spent = total_spent + $2,
                total_orders = total_orders + 1
            WHERE id = $1 AND balance >= $2
            "#,
        )
        .bind(command.user_id)
        .bind(command.amount)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(DebitOutcome::InsufficientFunds);
        }

        WalletTransaction::insert(
            &mut *tx,
            NewWalletTransaction {
                user_id: command.user_id,
                kind: TransactionKind::Purchase,
                amount: -command.amount,
                description: command.description,
                order_id: Some(command.order_id),
            },
        )
        .await?;

        tx.commit().await?;
        Ok(DebitOutcome::Applied)
    }
}

/// Return a debited amount to a wallet after a failed fulfillment, writing
/// the paired `refund` journal row in the same database transaction.
pub struct CreditRefund {
    pub user_id: Uuid,
    pub order_id: Uuid,
    pub amount: i64,
    pub description: String,
}

impl Processor<CreditRefund> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CreditRefund")]
    async fn process(&self, command: CreditRefund) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE users SET balance = balance + $2 WHERE id = $1")
            .bind(command.user_id)
            .bind(command.amount)
            .execute(&mut *tx)
            .await?;

        WalletTransaction::insert(
            &mut *tx,
            NewWalletTransaction {
                user_id: command.user_id,
                kind: TransactionKind::Refund,
                amount: command.amount,
                description: command.description,
                order_id: Some(command.order_id),
            },
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
