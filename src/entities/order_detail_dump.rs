use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::OrderDetailStatus;

/// Point-in-time copy of an `order_details` row taken before a forwarding
/// marks it `Sent`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_detail_dumps")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub source_id: i64,
    pub order_id: i64,
    pub menu_id: i64,
    pub qty: i32,
    pub price: Decimal,
    pub cogs: Decimal,
    pub note: String,
    pub status: OrderDetailStatus,
    pub reason_for_cancellation: Option<String>,
    pub paid_to_vendor_at: Option<DateTime<Utc>>,
    pub source_created_at: DateTime<Utc>,
    pub source_updated_at: DateTime<Utc>,
    pub created_by: String,
    pub dumped_at: DateTime<Utc>,
    pub dumped_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Copies `source` into a snapshot row. `id` is assigned by the store.
    pub fn snapshot_of(
        source: &super::order_detail::Model,
        id: i64,
        dumped_by: &str,
        dumped_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            source_id: source.id,
            order_id: source.order_id,
            menu_id: source.menu_id,
            qty: source.qty,
            price: source.price,
            cogs: source.cogs,
            note: source.note.clone(),
            status: source.status,
            reason_for_cancellation: source.reason_for_cancellation.clone(),
            paid_to_vendor_at: source.paid_to_vendor_at,
            source_created_at: source.created_at,
            source_updated_at: source.updated_at,
            created_by: source.created_by.clone(),
            dumped_at,
            dumped_by: dumped_by.to_string(),
        }
    }
}
