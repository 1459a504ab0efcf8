use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use super::aggregator::OrderAggregate;
use super::OrderEngine;
use crate::entities::order_detail;
use crate::errors::ServiceError;
use crate::models::OrderDetailStatus;
use crate::repositories::OrderWrite;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ChangeMenuRequest {
    #[validate(range(min = 1, message = "menu_id must be a positive ID"))]
    pub menu_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ChangeQtyRequest {
    #[validate(range(min = 1, message = "qty must be at least 1"))]
    pub qty: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ChangeNoteRequest {
    #[validate(length(max = 1000, message = "note must be at most 1000 characters"))]
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ChangeStatusRequest {
    pub status: OrderDetailStatus,
    /// Required when `status` is `Cancelled`, ignored otherwise.
    #[validate(length(max = 500, message = "reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

/// A line item as returned by the mutation endpoints, together with the
/// order totals it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LineItemUpdate {
    pub id: i64,
    pub order_id: i64,
    pub menu_id: i64,
    pub qty: i32,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = String)]
    pub cogs: Decimal,
    pub note: String,
    pub status: OrderDetailStatus,
    pub reason_for_cancellation: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
    /// `None` for note changes, which leave the totals alone.
    pub order: Option<OrderAggregate>,
}

impl LineItemUpdate {
    fn new(detail: order_detail::Model, order: Option<OrderAggregate>) -> Self {
        Self {
            id: detail.id,
            order_id: detail.order_id,
            menu_id: detail.menu_id,
            qty: detail.qty,
            price: detail.price,
            cogs: detail.cogs,
            note: detail.note,
            status: detail.status,
            reason_for_cancellation: detail.reason_for_cancellation,
            updated_at: detail.updated_at,
            updated_by: detail.updated_by,
            order,
        }
    }
}

fn touch(detail: &mut order_detail::Model, actor: &str) {
    detail.updated_at = Utc::now();
    detail.updated_by = Some(actor.to_string());
}

impl OrderEngine {
    /// Points a line item at another menu and snapshots that menu's price
    /// and COGS.
    #[instrument(skip(self, request), fields(menu_id = request.menu_id))]
    pub async fn change_menu(
        &self,
        detail_id: i64,
        request: ChangeMenuRequest,
        actor: &str,
    ) -> Result<LineItemUpdate, ServiceError> {
        request.validate()?;

        let order_id = self.load_order_detail(detail_id).await?.order_id;
        let guard = self.locks.acquire(order_id).await;
        let mut detail = self.load_order_detail(detail_id).await?;
        let order = self.load_order(order_id).await?;

        let new_menu = self
            .store
            .find_menu(request.menu_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("menu {} not found", request.menu_id)))?;
        let old_menu_name = self.menu_name(detail.menu_id).await?;

        detail.menu_id = new_menu.id;
        detail.price = new_menu.retail_price;
        detail.cogs = new_menu.cogs;
        touch(&mut detail, actor);

        let aggregate = self
            .write_line_items(order, vec![detail.clone()], OrderWrite::default(), actor)
            .await?;

        info!(detail_id, order_id, "menu changed");
        self.notifications.dispatch(format!(
            "{} mengganti menu pada order #{} dari \"{}\" menjadi \"{}\".",
            actor, order_id, old_menu_name, new_menu.name
        ));

        drop(guard);
        self.release_idle_locks();
        Ok(LineItemUpdate::new(detail, Some(aggregate)))
    }

    #[instrument(skip(self, request), fields(qty = request.qty))]
    pub async fn change_qty(
        &self,
        detail_id: i64,
        request: ChangeQtyRequest,
        actor: &str,
    ) -> Result<LineItemUpdate, ServiceError> {
        request.validate()?;

        let order_id = self.load_order_detail(detail_id).await?.order_id;
        let guard = self.locks.acquire(order_id).await;
        let mut detail = self.load_order_detail(detail_id).await?;
        let order = self.load_order(order_id).await?;

        let old_qty = detail.qty;
        detail.qty = request.qty;
        touch(&mut detail, actor);

        let aggregate = self
            .write_line_items(order, vec![detail.clone()], OrderWrite::default(), actor)
            .await?;
        let menu_name = self.menu_name(detail.menu_id).await?;

        info!(detail_id, order_id, old_qty, new_qty = request.qty, "quantity changed");
        self.notifications.dispatch(format!(
            "{} mengubah jumlah \"{}\" pada order #{} dari {} menjadi {}.",
            actor, menu_name, order_id, old_qty, request.qty
        ));

        drop(guard);
        self.release_idle_locks();
        Ok(LineItemUpdate::new(detail, Some(aggregate)))
    }

    /// Replaces the free-text note. Totals are not touched.
    #[instrument(skip(self, request))]
    pub async fn change_note(
        &self,
        detail_id: i64,
        request: ChangeNoteRequest,
        actor: &str,
    ) -> Result<LineItemUpdate, ServiceError> {
        request.validate()?;

        let order_id = self.load_order_detail(detail_id).await?.order_id;
        let guard = self.locks.acquire(order_id).await;
        let mut detail = self.load_order_detail(detail_id).await?;

        detail.note = request.note;
        touch(&mut detail, actor);
        self.store
            .commit_order_write(OrderWrite {
                details: vec![detail.clone()],
                ..OrderWrite::default()
            })
            .await?;
        let menu_name = self.menu_name(detail.menu_id).await?;

        info!(detail_id, order_id, "note changed");
        self.notifications.dispatch(format!(
            "{} mengubah catatan \"{}\" pada order #{} menjadi: {}",
            actor, menu_name, order_id, detail.note
        ));

        drop(guard);
        self.release_idle_locks();
        Ok(LineItemUpdate::new(detail, None))
    }

    /// Moves a line item to another status and recomputes the order, which
    /// may cancel the whole order when this was its last live item or move
    /// its forwarding status when items are marked or unmarked `Sent`.
    #[instrument(skip(self, request), fields(status = %request.status))]
    pub async fn change_status(
        &self,
        detail_id: i64,
        request: ChangeStatusRequest,
        actor: &str,
    ) -> Result<LineItemUpdate, ServiceError> {
        request.validate()?;

        let reason = request
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        if request.status == OrderDetailStatus::Cancelled && reason.is_none() {
            return Err(ServiceError::ValidationError(
                "reason is required when cancelling a line item".into(),
            ));
        }

        let order_id = self.load_order_detail(detail_id).await?.order_id;
        let guard = self.locks.acquire(order_id).await;
        let mut detail = self.load_order_detail(detail_id).await?;
        let order = self.load_order(order_id).await?;

        let old_status = detail.status;
        if !old_status.can_transition_to(request.status) {
            return Err(ServiceError::Conflict(format!(
                "order detail {} cannot move from {} to {}",
                detail_id, old_status, request.status
            )));
        }

        detail.status = request.status;
        detail.reason_for_cancellation = match request.status {
            OrderDetailStatus::Cancelled => reason,
            _ => None,
        };
        touch(&mut detail, actor);

        let aggregate = self
            .write_line_items(order, vec![detail.clone()], OrderWrite::default(), actor)
            .await?;
        let menu_name = self.menu_name(detail.menu_id).await?;

        info!(detail_id, order_id, from = %old_status, to = %detail.status, "status changed");
        let mut message = format!(
            "{} mengubah status \"{}\" pada order #{} dari {} menjadi {}.",
            actor, menu_name, order_id, old_status, detail.status
        );
        if let Some(reason) = &detail.reason_for_cancellation {
            message.push_str(&format!(" Alasan pembatalan: {}", reason));
        }
        self.notifications.dispatch(message);

        drop(guard);
        self.release_idle_locks();
        Ok(LineItemUpdate::new(detail, Some(aggregate)))
    }
}
