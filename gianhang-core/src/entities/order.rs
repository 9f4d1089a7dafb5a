use crate::framework::DatabaseProcessor;
use crate::supplier::credential::Credential;
use kanau::processor::Processor;
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub selected_option_id: Option<Uuid>,
    pub quantity: i32,
    /// Price locked in at creation; never recomputed afterwards.
    pub unit_price: i64,
    /// `unit_price * quantity`, locked in at creation.
    pub total_amount: i64,
    pub status: OrderStatus,
    /// Parsed credentials delivered by the supplier, present once completed.
    pub delivery_info: Option<Json<Vec<Credential>>>,
    pub admin_notes: Option<String>,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
    pub completed_at: Option<time::PrimitiveDateTime>,
}

/// Purchase-side order states. `Pending` is initial; the workflow writes a
/// terminal state at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, serde::Serialize)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub selected_option_id: Option<Uuid>,
    pub quantity: i32,
    pub unit_price: i64,
    pub total_amount: i64,
}

/// Persist a new order in `pending` state.
pub struct InsertOrder {
    pub order: NewOrder,
}

impl Processor<InsertOrder> for DatabaseProcessor {
    type Output = Order;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertOrder")]
    async fn process(&self, command: InsertOrder) -> Result<Order, sqlx::Error> {
        let new = command.order;
        sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders
                (id, user_id, product_id, selected_option_id, quantity, unit_price, total_amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, product_id, selected_option_id, quantity,
                      unit_price, total_amount, status, delivery_info, admin_notes,
                      created_at, updated_at, completed_at
            "#,
        )
        .bind(new.id)
        .bind(new.user_id)
        .bind(new.product_id)
        .bind(new.selected_option_id)
        .bind(new.quantity)
        .bind(new.unit_price)
        .bind(new.total_amount)
        .fetch_one(&self.pool)
        .await
    }
}

/// Look an order up by id.
pub struct GetOrderById {
    pub order_id: Uuid,
}

impl Processor<GetOrderById> for DatabaseProcessor {
    type Output = Option<Order>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetOrderById")]
    async fn process(&self, query: GetOrderById) -> Result<Option<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, product_id, selected_option_id, quantity,
                   unit_price, total_amount, status, delivery_info, admin_notes,
                   created_at, updated_at, completed_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(query.order_id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Transition a pending order to `completed`, storing the delivered
/// credentials. Returns whether the row was still pending.
pub struct MarkOrderCompleted {
    pub order_id: Uuid,
    pub delivery_info: Vec<Credential>,
}

impl Processor<MarkOrderCompleted> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:MarkOrderCompleted")]
    async fn process(&self, command: MarkOrderCompleted) -> Result<bool, sqlx::Error> {
        let updated = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'completed',
                delivery_info = $2,
                completed_at = now(),
                updated_at = now()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(command.order_id)
        .bind(Json(command.delivery_info))
        .execute(&self.pool)
        .await?;
        Ok(updated.rows_affected() > 0)
    }
}

/// Transition a pending order to `cancelled`. Returns whether the row was
/// still pending.
pub struct MarkOrderCancelled {
    pub order_id: Uuid,
    pub admin_notes: Option<String>,
}

impl Processor<MarkOrderCancelled> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:MarkOrderCancelled")]
    async fn process(&self, command: MarkOrderCancelled) -> Result<bool, sqlx::Error> {
        let updated = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'cancelled',
                admin_notes = COALESCE($2, admin_notes),
                updated_at = now()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(command.order_id)
        .bind(command.admin_notes)
        .execute(&self.pool)
        .await?;
        Ok(updated.rows_affected() > 0)
    }
}
