//! Store seam between the order engine and persistence.
//!
//! Services only talk to [`OrderStore`]; [`SeaOrmStore`] backs it with the
//! relational database and [`InMemoryStore`] keeps everything in process for
//! tests and local demos.

use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{
    admin, cost, discount, menu, order, order_detail, order_detail_dump, order_dump, unit, user,
};
use crate::errors::ServiceError;
use crate::models::{LedgerIssuer, OrderStatus};

pub mod in_memory;
pub mod sea_orm_store;

pub use in_memory::InMemoryStore;
pub use sea_orm_store::SeaOrmStore;

/// A vendor joined with the user account that carries its name and phone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VendorContact {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// A customer joined with its user account and unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CustomerProfile {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(rename = "type")]
    pub customer_type: String,
    pub unit_id: i64,
    pub unit_name: String,
    pub status: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An admin row together with its user account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminAccount {
    pub admin: admin::Model,
    pub user: user::Model,
}

/// Input for a new cost or discount entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewLedgerEntry {
    pub order_detail_id: i64,
    pub amount: Decimal,
    pub reason: String,
    pub issuer: LedgerIssuer,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Rows written by one engine action.
///
/// Stores apply a write as a unit: every row lands or none does. Dump rows
/// carry `id == 0`; the store assigns their IDs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderWrite {
    pub order_dumps: Vec<order_dump::Model>,
    pub order_detail_dumps: Vec<order_detail_dump::Model>,
    /// Line items overwritten in full.
    pub details: Vec<order_detail::Model>,
    /// Order overwritten in full.
    pub order: Option<order::Model>,
}

impl OrderWrite {
    pub fn is_empty(&self) -> bool {
        self.order_dumps.is_empty()
            && self.order_detail_dumps.is_empty()
            && self.details.is_empty()
            && self.order.is_none()
    }
}

/// Limit/offset window derived from the `length`/`page` parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

impl PageRequest {
    /// Applies the window to an already filtered, ordered sequence.
    pub fn slice<T>(page: Option<Self>, rows: Vec<T>) -> Vec<T> {
        match page {
            Some(p) => rows
                .into_iter()
                .skip(p.offset as usize)
                .take(p.limit as usize)
                .collect(),
            None => rows,
        }
    }
}

/// One page of rows plus the number of rows matching before paging.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total_rows: u64,
}

/// Inclusive calendar-day range on a timestamp column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        let day = ts.date_naive();
        self.start.map_or(true, |s| day >= s) && self.end.map_or(true, |e| day <= e)
    }

    /// Lower bound, inclusive.
    pub fn lower_bound(&self) -> Option<DateTime<Utc>> {
        self.start.map(|d| d.and_time(NaiveTime::MIN).and_utc())
    }

    /// Upper bound, exclusive (midnight after `end`).
    pub fn upper_bound(&self) -> Option<DateTime<Utc>> {
        self.end
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .map(|d| d.and_time(NaiveTime::MIN).and_utc())
    }
}

/// `payment_from_customer` filter values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum CustomerPayment {
    Paid,
    Unpaid,
}

impl CustomerPayment {
    pub fn matches(self, paid_by_customer: bool) -> bool {
        match self {
            Self::Paid => paid_by_customer,
            Self::Unpaid => !paid_by_customer,
        }
    }
}

/// `payment_to_vendor` filter values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum VendorPayment {
    Unpaid,
    PartiallyPaid,
    Paid,
}

/// Paid-to-vendor count over an order's non-cancelled line items.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VendorPaymentTally {
    pub paid: u64,
    pub total: u64,
}

impl VendorPayment {
    /// Orders without any live line item never match a vendor payment filter.
    pub fn matches(self, tally: VendorPaymentTally) -> bool {
        if tally.total == 0 {
            return false;
        }
        match self {
            Self::Unpaid => tally.paid == 0,
            Self::PartiallyPaid => tally.paid > 0 && tally.paid < tally.total,
            Self::Paid => tally.paid == tally.total,
        }
    }
}

/// Filters accepted by the order listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderListFilter {
    pub ids: Vec<i64>,
    pub statuses: Vec<OrderStatus>,
    /// Range on the order's creation date.
    pub order_date: DateRange,
    /// Range on the requested delivery date.
    pub delivery_date: DateRange,
    pub purpose: Option<String>,
    pub customer_id: Option<i64>,
    pub unit_id: Option<i64>,
    pub payment_from_customer: Option<CustomerPayment>,
    pub payment_to_vendor: Option<VendorPayment>,
    pub page: Option<PageRequest>,
}

/// Free-text search plus paging for the directory listings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectoryQuery {
    pub search: Option<String>,
    pub page: Option<PageRequest>,
}

/// One row of the order listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderSummary {
    pub id: i64,
    pub ordered_for: DateTime<Utc>,
    pub ordered_to: String,
    pub purpose: String,
    pub status: OrderStatus,
    pub num_of_menus: i32,
    pub qty_of_menus: i32,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub customer_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_unit: String,
    pub created_at: DateTime<Utc>,
    pub total_menu_paid_to_vendor: u64,
    pub total_menu: u64,
}

impl OrderSummary {
    pub fn new(
        order: &order::Model,
        customer: Option<&CustomerProfile>,
        tally: VendorPaymentTally,
    ) -> Self {
        Self {
            id: order.id,
            ordered_for: order.ordered_for,
            ordered_to: order.ordered_to.clone(),
            purpose: order.purpose.clone(),
            status: order.status,
            num_of_menus: order.num_of_menus,
            qty_of_menus: order.qty_of_menus,
            amount: order.amount,
            customer_id: order.ordered_by,
            customer_name: customer.map(|c| c.name.clone()).unwrap_or_default(),
            customer_phone: customer.map(|c| c.phone.clone()).unwrap_or_default(),
            customer_unit: customer.map(|c| c.unit_name.clone()).unwrap_or_default(),
            created_at: order.created_at,
            total_menu_paid_to_vendor: tally.paid,
            total_menu: tally.total,
        }
    }
}

/// Persistence operations the order engine depends on.
///
/// Lookups return `Ok(None)` when the row does not exist; every other
/// failure is a [`ServiceError::DatabaseError`].
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_order(&self, id: i64) -> Result<Option<order::Model>, ServiceError>;

    async fn find_order_detail(&self, id: i64)
        -> Result<Option<order_detail::Model>, ServiceError>;

    /// All line items of an order, cancelled ones included, ordered by ID.
    async fn find_order_details(
        &self,
        order_id: i64,
    ) -> Result<Vec<order_detail::Model>, ServiceError>;

    async fn find_menu(&self, id: i64) -> Result<Option<menu::Model>, ServiceError>;

    async fn find_menus(&self, ids: &[i64]) -> Result<Vec<menu::Model>, ServiceError>;

    async fn find_vendor(&self, id: i64) -> Result<Option<VendorContact>, ServiceError>;

    async fn find_vendors(&self, ids: &[i64]) -> Result<Vec<VendorContact>, ServiceError>;

    async fn find_customer_profile(
        &self,
        customer_id: i64,
    ) -> Result<Option<CustomerProfile>, ServiceError>;

    async fn find_costs(&self, detail_ids: &[i64]) -> Result<Vec<cost::Model>, ServiceError>;

    async fn find_discounts(
        &self,
        detail_ids: &[i64],
    ) -> Result<Vec<discount::Model>, ServiceError>;

    /// Applies every row of `write` atomically. Fails without writing
    /// anything when one of the overwritten rows does not exist.
    async fn commit_order_write(&self, write: OrderWrite) -> Result<(), ServiceError>;

    async fn create_cost(&self, entry: NewLedgerEntry) -> Result<cost::Model, ServiceError>;

    async fn create_discount(&self, entry: NewLedgerEntry)
        -> Result<discount::Model, ServiceError>;

    async fn find_admin_by_user_id(
        &self,
        user_id: i64,
    ) -> Result<Option<AdminAccount>, ServiceError>;

    /// Most recent orders first.
    async fn list_orders(&self, filter: &OrderListFilter)
        -> Result<Page<OrderSummary>, ServiceError>;

    async fn list_customers(
        &self,
        query: &DirectoryQuery,
    ) -> Result<Page<CustomerProfile>, ServiceError>;

    async fn list_units(&self, query: &DirectoryQuery) -> Result<Page<unit::Model>, ServiceError>;

    /// Cheap liveness check for the health endpoint.
    async fn ping(&self) -> Result<(), ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case(VendorPayment::Unpaid, 0, 3, true)]
    #[case(VendorPayment::Unpaid, 1, 3, false)]
    #[case(VendorPayment::PartiallyPaid, 1, 3, true)]
    #[case(VendorPayment::PartiallyPaid, 3, 3, false)]
    #[case(VendorPayment::Paid, 3, 3, true)]
    #[case(VendorPayment::Paid, 0, 0, false)]
    fn vendor_payment_classification(
        #[case] filter: VendorPayment,
        #[case] paid: u64,
        #[case] total: u64,
        #[case] expected: bool,
    ) {
        assert_eq!(filter.matches(VendorPaymentTally { paid, total }), expected);
    }

    #[test]
    fn payment_filters_parse_from_query_values() {
        assert_eq!(
            VendorPayment::from_str("partially-paid").unwrap(),
            VendorPayment::PartiallyPaid
        );
        assert_eq!(CustomerPayment::from_str("unpaid").unwrap(), CustomerPayment::Unpaid);
        assert!(VendorPayment::from_str("half").is_err());
    }

    #[test]
    fn date_range_is_inclusive_on_both_days() {
        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2024, 3, 1),
            end: NaiveDate::from_ymd_opt(2024, 3, 2),
        };
        let late_on_end = NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap()
            .and_utc();
        assert!(range.contains(late_on_end));
        assert!(late_on_end < range.upper_bound().unwrap());
    }

    #[test]
    fn page_request_slices_rows() {
        let rows: Vec<i32> = (1..=10).collect();
        let page = PageRequest { limit: 3, offset: 3 };
        assert_eq!(PageRequest::slice(Some(page), rows.clone()), vec![4, 5, 6]);
        assert_eq!(PageRequest::slice(None, rows).len(), 10);
    }
}
