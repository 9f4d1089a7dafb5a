//! Repository contracts for the purchase workflow.
//!
//! The workflow depends only on these traits; [`postgres::PgStore`] backs
//! them with the relational schema and [`memory::MemoryStore`] with
//! in-process maps for tests and demo runs. Both uphold the same
//! invariants: the debit balance guard is atomic, every balance mutation is
//! paired with exactly one journal row, and terminal order states are
//! written at most once.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::entities::order::{NewOrder, Order};
use crate::entities::product::Product;
use crate::entities::transaction::WalletTransaction;
use crate::entities::user::{DebitOutcome, User};
use crate::supplier::credential::Credential;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Product lookup and the post-fulfillment stock/sold write-back.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn product(&self, product_id: Uuid) -> Result<Option<Product>, StoreError>;

    async fn list_active(&self) -> Result<Vec<Product>, StoreError>;

    /// Decrement the effective stock (option or product) and bump `sold`
    /// after a completed fulfillment.
    async fn record_fulfillment(
        &self,
        product_id: Uuid,
        selected_option_id: Option<Uuid>,
        quantity: u32,
    ) -> Result<(), StoreError>;
}

/// User balances and the paired wallet journal.
#[async_trait]
pub trait AccountLedger: Send + Sync {
    async fn user(&self, user_id: Uuid) -> Result<Option<User>, StoreError>;

    /// Guarded debit: applies the balance/total updates and the `purchase`
    /// journal row atomically, or reports `InsufficientFunds` without any
    /// write.
    async fn debit_for_purchase(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        amount: i64,
        description: &str,
    ) -> Result<DebitOutcome, StoreError>;

    /// Compensating credit with its paired `refund` journal row.
    async fn credit_refund(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        amount: i64,
        description: &str,
    ) -> Result<(), StoreError>;

    /// Journal rows linked to an order, oldest first.
    async fn transactions_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<WalletTransaction>, StoreError>;
}

/// Order persistence with exactly-once terminal transitions.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: NewOrder) -> Result<Order, StoreError>;

    async fn order(&self, order_id: Uuid) -> Result<Option<Order>, StoreError>;

    /// `pending → completed`; returns false if the order already left
    /// `pending`.
    async fn mark_completed(
        &self,
        order_id: Uuid,
        delivery_info: Vec<Credential>,
    ) -> Result<bool, StoreError>;

    /// `pending → cancelled`; returns false if the order already left
    /// `pending`.
    async fn mark_cancelled(
        &self,
        order_id: Uuid,
        admin_notes: Option<String>,
    ) -> Result<bool, StoreError>;
}
