//! Postgres-backed store.
//!
//! Thin dispatch layer: each trait method forwards to the matching query
//! message in [`crate::entities`] through a [`DatabaseProcessor`].

use super::{AccountLedger, CatalogStore, OrderStore, StoreError};
use crate::entities::order::{
    GetOrderById, InsertOrder, MarkOrderCancelled, MarkOrderCompleted, NewOrder, Order,
};
use crate::entities::product::{GetProductById, ListActiveProducts, Product, RecordFulfillment};
use crate::entities::transaction::{GetTransactionsForOrder, WalletTransaction};
use crate::entities::user::{CreditRefund, DebitForPurchase, DebitOutcome, GetUserById, User};
use crate::framework::DatabaseProcessor;
use crate::supplier::credential::Credential;
use async_trait::async_trait;
use kanau::processor::Processor;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgStore {
    processor: DatabaseProcessor,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            processor: DatabaseProcessor { pool },
        }
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn product(&self, product_id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self.processor.process(GetProductById { product_id }).await?)
    }

    async fn list_active(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.processor.process(ListActiveProducts).await?)
    }

    async fn record_fulfillment(
        &self,
        product_id: Uuid,
        selected_option_id: Option<Uuid>,
        quantity: u32,
    ) -> Result<(), StoreError> {
        Ok(self
            .processor
            .process(RecordFulfillment {
                product_id,
                selected_option_id,
                quantity: quantity as i32,
            })
            .await?)
    }
}

#[async_trait]
impl AccountLedger for PgStore {
    async fn user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.processor.process(GetUserById { user_id }).await?)
    }

    async fn debit_for_purchase(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        amount: i64,
        description: &str,
    ) -> Result<DebitOutcome, StoreError> {
        Ok(self
            .processor
            .process(DebitForPurchase {
                user_id,
                order_id,
                amount,
                description: description.to_owned(),
            })
            .await?)
    }

    async fn credit_refund(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        amount: i64,
        description: &str,
    ) -> Result<(), StoreError> {
        Ok(self
            .processor
            .process(CreditRefund {
                user_id,
                order_id,
                amount,
                description: description.to_owned(),
            })
            .await?)
    }

    async fn transactions_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<WalletTransaction>, StoreError> {
        Ok(self
            .processor
            .process(GetTransactionsForOrder { order_id })
            .await?)
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn insert(&self, order: NewOrder) -> Result<Order, StoreError> {
        Ok(self.processor.process(InsertOrder { order }).await?)
    }

    async fn order(&self, order_id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.processor.process(GetOrderById { order_id }).await?)
    }

    async fn mark_completed(
        &self,
        order_id: Uuid,
        delivery_info: Vec<Credential>,
    ) -> Result<bool, StoreError> {
        Ok(self
            .processor
            .process(MarkOrderCompleted {
                order_id,
                delivery_info,
            })
            .await?)
    }

    async fn mark_cancelled(
        &self,
        order_id: Uuid,
        admin_notes: Option<String>,
    ) -> Result<bool, StoreError> {
        Ok(self
            .processor
            .process(MarkOrderCancelled {
                order_id,
                admin_notes,
            })
            .await?)
    }
}
