use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::order_status::derive_order_status;
use super::OrderEngine;
use crate::entities::{order, order_detail};
use crate::errors::ServiceError;
use crate::models::OrderStatus;
use crate::repositories::OrderWrite;

/// The derived columns of an order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderTotals {
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub num_of_menus: i32,
    pub qty_of_menus: i32,
}

/// Order state after a recompute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderAggregate {
    pub order_id: i64,
    pub status: OrderStatus,
    #[serde(flatten)]
    pub totals: OrderTotals,
    /// True when this recompute cancelled the order.
    pub cascade_cancelled: bool,
}

/// Sums the non-cancelled line items. Pure: the same items always give the
/// same totals.
pub fn compute_totals(details: &[order_detail::Model]) -> Result<OrderTotals, ServiceError> {
    let mut amount = Decimal::ZERO;
    let mut qty: i64 = 0;
    let mut count: i64 = 0;

    for detail in details.iter().filter(|d| !d.status.is_cancelled()) {
        let line = detail
            .price
            .checked_mul(Decimal::from(detail.qty))
            .ok_or_else(|| overflow("line total", detail.id))?;
        amount = amount
            .checked_add(line)
            .ok_or_else(|| overflow("order amount", detail.order_id))?;
        qty += i64::from(detail.qty);
        count += 1;
    }

    Ok(OrderTotals {
        amount,
        num_of_menus: i32::try_from(count).map_err(|_| overflow("num_of_menus", 0))?,
        qty_of_menus: i32::try_from(qty).map_err(|_| overflow("qty_of_menus", 0))?,
    })
}

fn overflow(what: &str, id: i64) -> ServiceError {
    ServiceError::InternalError(format!("{} overflowed while aggregating ({})", what, id))
}

/// Rewrites the order's totals and status from its line items.
///
/// The status follows [`derive_order_status`], so the forwarding state and
/// the cascade cancellation hold after every mutation, not only after a
/// vendor forwarding.
pub fn reconcile_order(
    order: &mut order::Model,
    details: &[order_detail::Model],
) -> Result<OrderAggregate, ServiceError> {
    let totals = compute_totals(details)?;
    let status = derive_order_status(order.status, details);
    let cascade_cancelled = status == OrderStatus::Cancelled && order.status != OrderStatus::Cancelled;

    order.amount = totals.amount;
    order.num_of_menus = totals.num_of_menus;
    order.qty_of_menus = totals.qty_of_menus;
    order.status = status;

    Ok(OrderAggregate {
        order_id: order.id,
        status,
        totals,
        cascade_cancelled,
    })
}

/// `details` with every row of `changed` swapped in by ID.
fn overlay(
    mut details: Vec<order_detail::Model>,
    changed: &[order_detail::Model],
) -> Vec<order_detail::Model> {
    for detail in details.iter_mut() {
        if let Some(next) = changed.iter().find(|c| c.id == detail.id) {
            *detail = next.clone();
        }
    }
    details
}

impl OrderEngine {
    /// Rescans every line item of the order and rewrites its totals and
    /// status.
    ///
    /// When no live line item is left the order is cancelled and the staff
    /// channel is told about it.
    #[instrument(skip(self))]
    pub async fn recompute(&self, order_id: i64, actor: &str) -> Result<OrderAggregate, ServiceError> {
        let guard = self.locks.acquire(order_id).await;
        let order = self.load_order(order_id).await?;
        let aggregate = self
            .write_line_items(order, Vec::new(), OrderWrite::default(), actor)
            .await?;
        drop(guard);
        self.release_idle_locks();
        Ok(aggregate)
    }

    /// Commits `changed` line items together with the order they reconcile
    /// to, plus whatever `write` already carries, in one store write.
    ///
    /// Callers hold the order lock.
    pub(crate) async fn write_line_items(
        &self,
        mut order: order::Model,
        changed: Vec<order_detail::Model>,
        mut write: OrderWrite,
        actor: &str,
    ) -> Result<OrderAggregate, ServiceError> {
        let details = overlay(self.store.find_order_details(order.id).await?, &changed);
        let aggregate = reconcile_order(&mut order, &details)?;
        order.updated_at = Utc::now();
        order.updated_by = Some(actor.to_string());

        write.details = changed;
        write.order = Some(order);
        self.store.commit_order_write(write).await?;

        if aggregate.cascade_cancelled {
            info!(order_id = aggregate.order_id, "all line items cancelled, order cancelled");
            self.notifications.dispatch(format!(
                "Order #{} dibatalkan secara otomatis karena semua menu di dalamnya telah dibatalkan (oleh {}).",
                aggregate.order_id, actor
            ));
        }

        Ok(aggregate)
    }
}
