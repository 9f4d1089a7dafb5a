use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

/// One append-only entry in a user's wallet journal.
///
/// Every balance mutation writes exactly one of these in the same database
/// transaction as the balance update; rows are never edited or deleted.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: TransactionKind,
    /// Signed from the wallet's perspective: purchases and debits are
    /// negative, credits and refunds positive.
    pub amount: i64,
    pub description: String,
    pub order_id: Option<Uuid>,
    pub created_at: time::PrimitiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, serde::Serialize)]
#[sqlx(type_name = "transaction_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Purchase,
    /// Admin top-up approval (external collaborator, same ledger contract).
    Credit,
    /// Admin manual deduction.
    Debit,
    Refund,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWalletTransaction {
    pub user_id: Uuid,
    pub kind: TransactionKind,
    pub amount: i64,
    pub description: String,
    pub order_id: Option<Uuid>,
}

impl WalletTransaction {
    /// Append a journal row. Takes any executor so callers can run it inside
    /// the transaction that mutates the balance.
    pub async fn insert<'e, E>(executor: E, new: NewWalletTransaction) -> Result<(), sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query(
            r#"
            INSERT INTO wallet_transactions (user_id, kind, amount, description, order_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(new.user_id)
        .bind(new.kind)
        .bind(new.amount)
        .bind(new.description)
        .bind(new.order_id)
        .execute(executor)
        .await?;
        Ok(())
    }
}

/// List the journal rows linked to an order, oldest first.
pub struct GetTransactionsForOrder {
    pub order_id: Uuid,
}

impl Processor<GetTransactionsForOrder> for DatabaseProcessor {
    type Output = Vec<WalletTransaction>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetTransactionsForOrder")]
    async fn process(
        &self,
        query: GetTransactionsForOrder,
    ) -> Result<Vec<WalletTransaction>, sqlx::Error> {
        sqlx::query_as::<_, WalletTransaction>(
            r#"
            SELECT id, user_id, kind, amount, description, order_id, created_at
            FROM wallet_transactions
            WHERE order_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(query.order_id)
        .fetch_all(&self.pool)
        .await
    }
}
