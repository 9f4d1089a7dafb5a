//! In-memory store.
//!
//! Backs the repository contracts with maps behind one mutex so the
//! debit guard and its journal write stay atomic, mirroring the Postgres
//! transactions. Used by workflow and handler tests, and by the server's
//! demo mode.

use super::{AccountLedger, CatalogStore, OrderStore, StoreError};
use crate::entities::now_utc;
use crate::entities::order::{NewOrder, Order, OrderStatus};
use crate::entities::product::Product;
use crate::entities::transaction::{TransactionKind, WalletTransaction};
use crate::entities::user::{DebitOutcome, User};
use crate::supplier::credential::Credential;
use async_trait::async_trait;
use sqlx::types::Json;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    products: HashMap<Uuid, Product>,
    users: HashMap<Uuid, User>,
    orders: HashMap<Uuid, Order>,
    transactions: Vec<WalletTransaction>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_product(&self, product: Product) {
        self.inner.lock().await.products.insert(product.id, product);
    }

    pub async fn insert_user(&self, user: User) {
        self.inner.lock().await.users.insert(user.id, user);
    }

    /// Orders placed by a user, newest first.
    pub async fn orders_for_user(&self, user_id: Uuid) -> Vec<Order> {
        let tables = self.inner.lock().await;
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn product(&self, product_id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self.inner.lock().await.products.get(&product_id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<Product>, StoreError> {
        let tables = self.inner.lock().await;
        let mut products: Vec<Product> = tables
            .products
            .values()
            .filter(|product| product.is_active)
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn record_fulfillment(
        &self,
        product_id: Uuid,
        selected_option_id: Option<Uuid>,
        quantity: u32,
    ) -> Result<(), StoreError> {
        let mut tables = self.inner.lock().await;
        let Some(product) = tables.products.get_mut(&product_id) else {
            return Ok(());
        };
        let quantity = quantity as i32;
        match selected_option_id {
            None => {
                if let Some(stock) = product.stock.as_mut() {
                    *stock = (*stock - quantity).max(0);
                }
            }
            Some(option_id) => {
                for option in product.options.0.iter_mut() {
                    if option.id == option_id {
                        if let Some(stock) = option.stock.as_mut() {
                            *stock = (*stock - quantity).max(0);
                        }
                    }
                }
            }
        }
        product.sold += quantity;
        product.updated_at = now_utc();
        Ok(())
    }
}

#[async_trait]
impl AccountLedger for MemoryStore {
    async fn user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.inner.lock().await.users.get(&user_id).cloned())
    }

    async fn debit_for_purchase(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        amount: i64,
        description: &str,
    ) -> Result<DebitOutcome, StoreError> {
        let mut tables = self.inner.lock().await;
        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(DebitOutcome::InsufficientFunds);
        };
        if user.balance < amount {
            return Ok(DebitOutcome::InsufficientFunds);
        }
        user.balance -= amount;
        user.total_spent += amount;
        user.total_orders += 1;
        tables.transactions.push(WalletTransaction {
            id: Uuid::new_v4(),
            user_id,
            kind: TransactionKind::Purchase,
            amount: -amount,
            description: description.to_owned(),
            order_id: Some(order_id),
            created_at: now_utc(),
        });
        Ok(DebitOutcome::Applied)
    }

    async fn credit_refund(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        amount: i64,
        description: &str,
    ) -> Result<(), StoreError> {
        let mut tables = self.inner.lock().await;
        if let Some(user) = tables.users.get_mut(&user_id) {
            user.balance += amount;
        }
        tables.transactions.push(WalletTransaction {
            id: Uuid::new_v4(),
            user_id,
            kind: TransactionKind::Refund,
            amount,
            description: description.to_owned(),
            order_id: Some(order_id),
            created_at: now_utc(),
        });
        Ok(())
    }

    async fn transactions_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<WalletTransaction>, StoreError> {
        Ok(self
            .inner
            .lock()
            .await
            .transactions
            .iter()
            .filter(|transaction| transaction.order_id == Some(order_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, order: NewOrder) -> Result<Order, StoreError> {
        let now = now_utc();
        let row = Order {
            id: order.id,
            user_id: order.user_id,
            product_id: order.product_id,
            selected_option_id: order.selected_option_id,
            quantity: order.quantity,
            unit_price: order.unit_price,
            total_amount: order.total_amount,
            status: OrderStatus::Pending,
            delivery_info: None,
            admin_notes: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        self.inner.lock().await.orders.insert(row.id, row.clone());
        Ok(row)
    }

    async fn order(&self, order_id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.inner.lock().await.orders.get(&order_id).cloned())
    }

    async fn mark_completed(
        &self,
        order_id: Uuid,
        delivery_info: Vec<Credential>,
    ) -> Result<bool, StoreError> {
        let mut tables = self.inner.lock().await;
        let Some(order) = tables.orders.get_mut(&order_id) else {
            return Ok(false);
        };
        if order.status != OrderStatus::Pending {
            return Ok(false);
        }
        let now = now_utc();
        order.status = OrderStatus::Completed;
        order.delivery_info = Some(Json(delivery_info));
        order.completed_at = Some(now);
        order.updated_at = now;
        Ok(true)
    }

    async fn mark_cancelled(
        &self,
        order_id: Uuid,
        admin_notes: Option<String>,
    ) -> Result<bool, StoreError> {
        let mut tables = self.inner.lock().await;
        let Some(order) = tables.orders.get_mut(&order_id) else {
            return Ok(false);
        };
        if order.status != OrderStatus::Pending {
            return Ok(false);
        }
        order.status = OrderStatus::Cancelled;
        if admin_notes.is_some() {
            order.admin_notes = admin_notes;
        }
        order.updated_at = now_utc();
        Ok(true)
    }
}
