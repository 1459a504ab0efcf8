use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::OrderStatus;

/// The `orders` table.
///
/// `num_of_menus`, `qty_of_menus` and `amount` are derived columns: they are
/// rewritten from the non-cancelled line items after every line-item
/// mutation and are never edited on their own.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Customer who placed the order.
    pub ordered_by: i64,
    /// Requested delivery time.
    pub ordered_for: DateTime<Utc>,
    /// Delivery destination.
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_detail::Entity")]
    OrderDetail,
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::OrderedBy",
        to = "super::customer::Column::Id"
    )]
    Customer,
}

impl Related<super::order_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderDetail.def()
    }
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
