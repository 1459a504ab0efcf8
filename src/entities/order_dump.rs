use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::OrderStatus;

/// Point-in-time copy of an `orders` row, written just before the row is
/// overwritten by a vendor forwarding. Never read back by the engine.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_dumps")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the `orders` row this snapshot was taken from.
    pub source_id: i64,
    pub ordered_by: i64,
    pub ordered_for: DateTime<Utc>,
    pub ordered_to: String,
    pub num_of_menus: i32,
    pub qty_of_menus: i32,
    pub amount: Decimal,
    pub purpose: String,
    pub activity: String,
    pub source_of_fund: String,
    pub payment_option: String,
    pub info: String,
    pub status: OrderStatus,
    pub paid_by_customer_at: Option<DateTime<Utc>>,
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
        source: &super::order::Model,
        id: i64,
        dumped_by: &str,
        dumped_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            source_id: source.id,
            ordered_by: source.ordered_by,
            ordered_for: source.ordered_for,
            ordered_to: source.ordered_to.clone(),
            num_of_menus: source.num_of_menus,
            qty_of_menus: source.qty_of_menus,
            amount: source.amount,
            purpose: source.purpose.clone(),
            activity: source.activity.clone(),
            source_of_fund: source.source_of_fund.clone(),
            payment_option: source.payment_option.clone(),
            info: source.info.clone(),
            status: source.status,
            paid_by_customer_at: source.paid_by_customer_at,
            source_created_at: source.created_at,
            source_updated_at: source.updated_at,
            created_by: source.created_by.clone(),
            dumped_at,
            dumped_by: dumped_by.to_string(),
        }
    }
}
