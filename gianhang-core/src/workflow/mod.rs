//! Purchase workflow.
//!
//! Drives one purchase request end to end:
//!
//! 1. validate the request against the catalog (product, option, stock,
//!    price) and the wallet balance,
//! 2. persist a `pending` order and debit the wallet,
//! 3. place the upstream order and poll for delivery,
//! 4. finalize: deliver + record fulfillment, or cancel + refund.
//!
//! Every failure between the debit and the delivery runs exactly one
//! compensation (cancel + refund). An exhausted or terminally failed poll
//! is not a failure: the order stays `pending` for later reconciliation
//! and the caller is told to check back.

pub mod poll;

pub use poll::PollPolicy;

use crate::entities::order::NewOrder;
use crate::entities::product::{Product, ProductOption};
use crate::entities::user::DebitOutcome;
use crate::store::{AccountLedger, CatalogStore, OrderStore, StoreError};
use crate::supplier::credential::{Credential, parse_credential};
use crate::supplier::{FetchOutcome, SupplierGateway};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRequest {
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: u32,
    pub selected_option_id: Option<Uuid>,
    pub promotion_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// Credentials arrived within the poll budget; the order is completed.
    Delivered {
        order_id: Uuid,
        credentials: Vec<Credential>,
    },
    /// The upstream is still fulfilling; the order stays `pending` and the
    /// buyer keeps their debit until delivery or a later reconciliation.
    Processing { order_id: Uuid, attempts: u32 },
}

#[derive(Debug, Error)]
pub enum PurchaseError {
    #[error("invalid purchase request: {0}")]
    InvalidRequest(&'static str),

    #[error("product is out of stock")]
    OutOfStock,

    #[error("insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: u32, requested: u32 },

    #[error("product has no purchasable price")]
    InvalidPrice,

    #[error("insufficient balance: {required} required, {available} available")]
    InsufficientBalance { required: i64, available: i64 },

    #[error("product has no supplier kiosk token")]
    MissingSupplierToken,

    #[error("supplier failure: {0}")]
    Supplier(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PurchaseError {
    /// Short buyer-facing message, in Vietnamese like the rest of the shop.
    pub fn user_message(&self) -> &'static str {
        match self {
            PurchaseError::InvalidRequest(_) => "Yêu cầu mua hàng không hợp lệ",
            PurchaseError::OutOfStock => "Sản phẩm đã hết hàng",
            PurchaseError::InsufficientStock { .. } => "Kho không đủ số lượng yêu cầu",
            PurchaseError::InvalidPrice => "Giá sản phẩm không hợp lệ",
            PurchaseError::InsufficientBalance { .. } => "Số dư không đủ, vui lòng nạp thêm tiền",
            PurchaseError::MissingSupplierToken => {
                "Sản phẩm tạm thời không thể giao, tiền đã được hoàn lại"
            }
            PurchaseError::Supplier(_) => "Nhà cung cấp từ chối đơn hàng, tiền đã được hoàn lại",
            PurchaseError::Store(_) => "Đã xảy ra lỗi hệ thống, vui lòng thử lại sau",
        }
    }
}

/// What the buyer is actually purchasing once the product and option are
/// resolved: unit price, tracked stock, and the upstream kiosk token.
struct ResolvedItem {
    unit_price: Option<i64>,
    stock: Option<i32>,
    kiosk_token: Option<String>,
}

enum Fulfillment {
    Delivered(Vec<String>),
    StillProcessing { attempts: u32 },
}

pub struct PurchaseWorkflow {
    catalog: Arc<dyn CatalogStore>,
    ledger: Arc<dyn AccountLedger>,
    orders: Arc<dyn OrderStore>,
    supplier: Arc<dyn SupplierGateway>,
    poll: PollPolicy,
}

impl PurchaseWorkflow {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        ledger: Arc<dyn AccountLedger>,
        orders: Arc<dyn OrderStore>,
        supplier: Arc<dyn SupplierGateway>,
    ) -> Self {
        Self {
            catalog,
            ledger,
            orders,
            supplier,
            poll: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    #[tracing::instrument(
        skip_all,
        fields(
            user_id = %request.user_id,
            product_id = %request.product_id,
            quantity = request.quantity,
        )
    )]
    pub async fn execute(
        &self,
        request: PurchaseRequest,
    ) -> Result<PurchaseOutcome, PurchaseError> {
        // Validation: everything up to the debit is side-effect free.
        let quantity = i32::try_from(request.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(PurchaseError::InvalidRequest("quantity must be positive"))?;

        let product = self
            .catalog
            .product(request.product_id)
            .await?
            .filter(|product| product.is_active)
            .ok_or(PurchaseError::InvalidRequest(
                "product not found or inactive",
            ))?;

        let item = resolve_item(&product, request.selected_option_id)?;
        check_stock(item.stock, request.quantity)?;

        let unit_price = item
            .unit_price
            .filter(|price| *price > 0)
            .ok_or(PurchaseError::InvalidPrice)?;
        let total_amount = unit_price
            .checked_mul(i64::from(request.quantity))
            .ok_or(PurchaseError::InvalidRequest("order amount overflows"))?;

        let user = self
            .ledger
            .user(request.user_id)
            .await?
            .ok_or(PurchaseError::InvalidRequest("user not found"))?;
        if user.balance < total_amount {
            return Err(PurchaseError::InsufficientBalance {
                required: total_amount,
                available: user.balance,
            });
        }

        // The order row exists before any money moves so every debit has a
        // linked order.
        let order_id = Uuid::new_v4();
        self.orders
            .insert(NewOrder {
                id: order_id,
                user_id: user.id,
                product_id: product.id,
                selected_option_id: request.selected_option_id,
                quantity,
                unit_price,
                total_amount,
            })
            .await?;

        let debited = self
            .ledger
            .debit_for_purchase(
                user.id,
                order_id,
                total_amount,
                &format!("Thanh toán đơn hàng {order_id}"),
            )
            .await?;
        if debited == DebitOutcome::InsufficientFunds {
            // Lost the race between the pre-check and the guarded debit.
            self.orders
                .mark_cancelled(order_id, Some("Số dư không đủ khi trừ tiền".to_owned()))
                .await?;
            return Err(PurchaseError::InsufficientBalance {
                required: total_amount,
                available: user.balance,
            });
        }
        debug!(order_id = %order_id, total_amount, "wallet debited");

        // From here until delivery the debit is live: any error must be
        // compensated exactly once.
        match self.fulfill(order_id, item.kiosk_token, &request).await {
            Ok(Fulfillment::Delivered(raw_lines)) => {
                let credentials: Vec<Credential> = raw_lines
                    .iter()
                    .map(|line| parse_credential(line))
                    .collect();
                self.orders
                    .mark_completed(order_id, credentials.clone())
                    .await?;
                self.catalog
                    .record_fulfillment(product.id, request.selected_option_id, request.quantity)
                    .await?;
                info!(order_id = %order_id, units = credentials.len(), "purchase completed");
                Ok(PurchaseOutcome::Delivered {
                    order_id,
                    credentials,
                })
            }
            Ok(Fulfillment::StillProcessing { attempts }) => {
                info!(order_id = %order_id, attempts, "purchase still processing upstream");
                Ok(PurchaseOutcome::Processing { order_id, attempts })
            }
            Err(error) => {
                self.compensate(order_id, user.id, total_amount).await;
                Err(error)
            }
        }
    }

    /// Place the upstream order and poll for delivery. Runs after the
    /// debit; every `Err` out of here is compensated by the caller.
    async fn fulfill(
        &self,
        order_id: Uuid,
        kiosk_token: Option<String>,
        request: &PurchaseRequest,
    ) -> Result<Fulfillment, PurchaseError> {
        let kiosk_token = kiosk_token.ok_or(PurchaseError::MissingSupplierToken)?;

        let placed = self
            .supplier
            .place_order(
                &kiosk_token,
                request.quantity,
                request.promotion_code.as_deref(),
            )
            .await
            .map_err(|error| {
                warn!(order_id = %order_id, error = %error, "supplier did not accept the order");
                PurchaseError::Supplier(error.to_string())
            })?;
        debug!(
            order_id = %order_id,
            upstream_order_id = %placed.upstream_order_id,
            "upstream order placed"
        );

        for attempt in 1..=self.poll.max_attempts {
            tokio::time::sleep(self.poll.delay_before(attempt)).await;

            match self.supplier.fetch_order(&placed.upstream_order_id).await {
                Ok(FetchOutcome::Delivered(lines)) => {
                    return Ok(Fulfillment::Delivered(lines));
                }
                Ok(FetchOutcome::Processing) => {
                    debug!(order_id = %order_id, attempt, "upstream still processing");
                }
                Err(error) => {
                    // The upstream order exists and may still be fulfilled,
                    // so no refund: leave the order pending and reconcile
                    // out of band.
                    warn!(
                        order_id = %order_id,
                        upstream_order_id = %placed.upstream_order_id,
                        attempt,
                        error = %error,
                        "fulfillment poll failed, leaving order pending"
                    );
                    return Ok(Fulfillment::StillProcessing { attempts: attempt });
                }
            }
        }

        Ok(Fulfillment::StillProcessing {
            attempts: self.poll.max_attempts,
        })
    }

    /// Cancel the order and return the debited amount. Errors here are
    /// logged rather than surfaced so they never mask the original failure.
    async fn compensate(&self, order_id: Uuid, user_id: Uuid, amount: i64) {
        if let Err(error) = self
            .orders
            .mark_cancelled(order_id, Some("Giao hàng thất bại, đã hoàn tiền".to_owned()))
            .await
        {
            error!(order_id = %order_id, error = %error, "failed to cancel order during compensation");
        }
        if let Err(error) = self
            .ledger
            .credit_refund(
                user_id,
                order_id,
                amount,
                &format!("Hoàn tiền đơn hàng {order_id}"),
            )
            .await
        {
            error!(order_id = %order_id, error = %error, "failed to refund during compensation");
        } else {
            info!(order_id = %order_id, amount, "refund issued");
        }
    }
}

fn resolve_item(
    product: &Product,
    selected_option_id: Option<Uuid>,
) -> Result<ResolvedItem, PurchaseError> {
    if !product.has_options() {
        return Ok(ResolvedItem {
            unit_price: product.price,
            stock: product.stock,
            kiosk_token: product.kiosk_token.clone(),
        });
    }
    let option_id = selected_option_id.ok_or(PurchaseError::InvalidRequest(
        "an option must be selected for this product",
    ))?;
    let option: &ProductOption = product
        .find_option(option_id)
        .ok_or(PurchaseError::InvalidRequest(
            "selected option does not belong to this product",
        ))?;
    Ok(ResolvedItem {
        unit_price: Some(option.price),
        stock: option.stock,
        kiosk_token: option.kiosk_token.clone(),
    })
}

fn check_stock(stock: Option<i32>, requested: u32) -> Result<(), PurchaseError> {
    // Untracked stock is unlimited.
    let Some(stock) = stock else { return Ok(()) };
    if stock <= 0 {
        return Err(PurchaseError::OutOfStock);
    }
    if (stock as u32) < requested {
        return Err(PurchaseError::InsufficientStock {
            available: stock as u32,
            requested,
        });
    }
    Ok(())
}
