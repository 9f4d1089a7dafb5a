use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// `None` when the product is priced through its options.
    pub price: Option<i64>,
    pub currency: String,
    /// `None` means stock is not tracked for this product.
    pub stock: Option<i32>,
    pub sold: i32,
    /// Upstream kiosk token used when the product has no options.
    pub kiosk_token: Option<String>,
    pub is_active: bool,
    pub options: Json<Vec<ProductOption>>,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
}

/// A priced, stocked variant of a product (e.g. an account tier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    pub id: Uuid,
    pub label: String,
    pub price: i64,
    /// `None` means stock is not tracked for this option.
    pub stock: Option<i32>,
    /// Upstream kiosk token for this specific option.
    pub kiosk_token: Option<String>,
}

impl Product {
    /// Whether purchases must go through an option.
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    pub fn find_option(&self, option_id: Uuid) -> Option<&ProductOption> {
        self.options.iter().find(|option| option.id == option_id)
    }
}

/// Look a product up by id.
pub struct GetProductById {
    pub product_id: Uuid,
}

impl Processor<GetProductById> for DatabaseProcessor {
    type Output = Option<Product>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetProductById")]
    async fn process(&self, query: GetProductById) -> Result<Option<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, title, description, price, currency, stock, sold,
                   kiosk_token, is_active, options, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(query.product_id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// List products visible in the public catalog.
pub struct ListActiveProducts;

impl Processor<ListActiveProducts> for DatabaseProcessor {
    type Output = Vec<Product>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListActiveProducts")]
    async fn process(&self, _query: ListActiveProducts) -> Result<Vec<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, title, description, price, currency, stock, sold,
                   kiosk_token, is_active, options, created_at, updated_at
            FROM products
            WHERE is_active
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}

/// Record a successful fulfillment: decrement the effective stock and bump
/// the sold counter.
///
/// Stock arithmetic runs under the row lock so concurrent fulfillments of
/// the same product cannot lose updates; untracked stock is left `NULL` and
/// tracked stock clamps at zero.
pub struct RecordFulfillment {
    pub product_id: Uuid,
    pub selected_option_id: Option<Uuid>,
    pub quantity: i32,
}

impl Processor<RecordFulfillment> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:RecordFulfillment")]
    async fn process(&self, command: RecordFulfillment) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        match command.selected_option_id {
            None => {
                sqlx::query(
                    r#"
                    UPDATE products
                    SET stock = CASE
                            WHEN stock IS NULL THEN NULL
                            ELSE GREATEST(stock - $2, 0)
                        END,
                        sold = sold + $2,
                        updated_at = now()
                    WHERE id = $1
                    "#,
                )
                .bind(command.product_id)
                .bind(command.quantity)
                .execute(&mut *tx)
                .await?;
            }
            Some(option_id) => {
                let options = sqlx::query_scalar::<_, Json<Vec<ProductOption>>>(
                    "SELECT options FROM products WHERE id = $1 FOR UPDATE",
                )
                .bind(command.product_id)
                .fetch_optional(&mut *tx)
                .await?;

                if let Some(Json(mut options)) = options {
                    for option in &mut options {
                        if option.id == option_id {
                            if let Some(stock) = option.stock.as_mut() {
                                *stock = (*stock - command.quantity).max(0);
                            }
                        }
                    }
                    sqlx::query(
                        r#"
                        UPDATE products
                        SET options = $2, sold = sold + $3, updated_at = now()
                        WHERE id = $1
                        "#,
                    )
                    .bind(command.product_id)
                    .bind(Json(options))
                    .bind(command.quantity)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
