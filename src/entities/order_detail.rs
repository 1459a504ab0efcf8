use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::OrderDetailStatus;

/// One menu assignment within an order.
///
/// `price` and `cogs` are snapshots of the referenced menu taken when the
/// menu was assigned.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_details")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_id: i64,
    pub menu_id: i64,
    pub qty: i32,
    pub price: Decimal,
    pub cogs: Decimal,
    pub note: String,
    pub status: OrderDetailStatus,
    /// Present iff `status` is `Cancelled`.
    pub reason_for_cancellation: Option<String>,
    pub paid_to_vendor_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_by: Option<String>,
}

impl Model {
    /// `price * qty`, the line's contribution to the order amount.
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.qty)
    }

    /// `cogs * qty`, the line's purchase cost before ledger adjustments.
    pub fn line_cogs(&self) -> Decimal {
        self.cogs * Decimal::from(self.qty)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::menu::Entity",
        from = "Column::MenuId",
        to = "super::menu::Column::Id"
    )]
    Menu,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Menu.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
