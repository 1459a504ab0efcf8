use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};
use utoipa::{IntoParams, ToSchema};

use super::ledger::settle_line;
use super::OrderEngine;
use crate::common::{parse_date_range, parse_enum, parse_id, parse_list, parse_paging};
use crate::entities::{cost, discount};
use crate::errors::ServiceError;
use crate::models::{LedgerIssuer, OrderDetailStatus, OrderStatus};
use crate::repositories::{OrderListFilter, OrderSummary};

/// Rows of a listing plus the paging counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Listing<T> {
    pub data: Vec<T>,
    /// Rows in this page.
    pub rows_count: usize,
    /// Rows matching the filters before paging.
    pub total_rows: u64,
}

impl<T> Listing<T> {
    pub fn new(data: Vec<T>, total_rows: u64) -> Self {
        Self {
            rows_count: data.len(),
            data,
            total_rows,
        }
    }
}

/// Query parameters of `GET /orders`. Everything arrives as text so that
/// a malformed `length` can be reported instead of rejected.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListParams {
    /// Comma separated order IDs
    pub ids: Option<String>,
    pub length: Option<String>,
    pub page: Option<String>,
    /// Comma separated order statuses
    pub status: Option<String>,
    #[serde(rename = "order_date[start]")]
    pub order_date_start: Option<String>,
    #[serde(rename = "order_date[end]")]
    pub order_date_end: Option<String>,
    #[serde(rename = "delivery_date[start]")]
    pub delivery_date_start: Option<String>,
    #[serde(rename = "delivery_date[end]")]
    pub delivery_date_end: Option<String>,
    pub purpose: Option<String>,
    /// Customer ID
    pub customer: Option<String>,
    /// Unit ID
    pub unit: Option<String>,
    /// `paid` or `unpaid`
    pub payment_from_customer: Option<String>,
    /// `unpaid`, `partially-paid` or `paid`
    pub payment_to_vendor: Option<String>,
}

impl OrderListParams {
    /// Parses the parameters into a store filter and the paging advisories.
    pub fn into_filter(self) -> Result<(OrderListFilter, Vec<String>), ServiceError> {
        let paging = parse_paging(self.length.as_deref(), self.page.as_deref());

        let filter = OrderListFilter {
            ids: self
                .ids
                .as_deref()
                .map(|raw| parse_list(raw, "ids"))
                .transpose()?
                .unwrap_or_default(),
            statuses: self
                .status
                .as_deref()
                .map(|raw| parse_list(raw, "status"))
                .transpose()?
                .unwrap_or_default(),
            order_date: parse_date_range(
                self.order_date_start.as_deref(),
                self.order_date_end.as_deref(),
                "order_date",
            )?,
            delivery_date: parse_date_range(
                self.delivery_date_start.as_deref(),
                self.delivery_date_end.as_deref(),
                "delivery_date",
            )?,
            purpose: self.purpose.filter(|p| !p.trim().is_empty()),
            customer_id: self
                .customer
                .as_deref()
                .map(|raw| parse_id(raw, "customer"))
                .transpose()?,
            unit_id: self
                .unit
                .as_deref()
                .map(|raw| parse_id(raw, "unit"))
                .transpose()?,
            payment_from_customer: self
                .payment_from_customer
                .as_deref()
                .map(|raw| parse_enum(raw, "payment_from_customer"))
                .transpose()?,
            payment_to_vendor: self
                .payment_to_vendor
                .as_deref()
                .map(|raw| parse_enum(raw, "payment_to_vendor"))
                .transpose()?,
            page: paging.page,
        };

        Ok((filter, paging.advisories))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LedgerLine {
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub reason: String,
    pub issuer: LedgerIssuer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderDetailInformation {
    pub id: i64,
    pub qty: i32,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = String)]
    pub cogs: Decimal,
    pub note: String,
    pub status: OrderDetailStatus,
    pub reason_for_cancellation: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    pub menu_id: i64,
    pub menu_name: String,
    pub vendor_id: Option<i64>,
    pub vendor_name: String,
    pub extra_costs: Vec<LedgerLine>,
    pub discounts: Vec<LedgerLine>,
}

/// Full view of one order with its settlement amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderInformation {
    pub id: i64,
    pub ordered_for: DateTime<Utc>,
    pub ordered_to: String,
    pub purpose: String,
    pub activity: String,
    pub source_of_fund: String,
    pub payment_option: String,
    pub info: String,
    pub status: OrderStatus,
    pub num_of_menus: i32,
    pub qty_of_menus: i32,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    /// What the vendors are owed for the live line items.
    #[schema(value_type = String)]
    pub purchase_amount: Decimal,
    /// What the customer is charged for the live line items.
    #[schema(value_type = String)]
    pub sales_amount: Decimal,
    pub customer_id: i64,
    pub customer_name: String,
    pub customer_unit: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub order_details: Vec<OrderDetailInformation>,
}

fn group_by_detail<T, F>(rows: Vec<T>, key: F) -> HashMap<i64, Vec<T>>
where
    F: Fn(&T) -> i64,
{
    let mut grouped: HashMap<i64, Vec<T>> = HashMap::new();
    for row in rows {
        grouped.entry(key(&row)).or_default().push(row);
    }
    grouped
}

impl OrderEngine {
    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: i64) -> Result<OrderInformation, ServiceError> {
        let order = self.load_order(order_id).await?;
        let customer = self.store.find_customer_profile(order.ordered_by).await?;
        let details = self.store.find_order_details(order_id).await?;

        let detail_ids: Vec<i64> = details.iter().map(|d| d.id).collect();
        let menu_ids: Vec<i64> = details.iter().map(|d| d.menu_id).collect();

        let menus: HashMap<i64, _> = self
            .store
            .find_menus(&menu_ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        let vendor_ids: Vec<i64> = menus.values().map(|m| m.vendor_id).collect();
        let vendors: HashMap<i64, _> = self
            .store
            .find_vendors(&vendor_ids)
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect();

        let mut costs = group_by_detail(self.store.find_costs(&detail_ids).await?, |c: &cost::Model| {
            c.order_detail_id
        });
        let mut discounts = group_by_detail(
            self.store.find_discounts(&detail_ids).await?,
            |d: &discount::Model| d.order_detail_id,
        );

        let mut purchase_amount = Decimal::ZERO;
        let mut sales_amount = Decimal::ZERO;
        let mut order_details = Vec::with_capacity(details.len());

        for detail in details {
            let detail_costs = costs.remove(&detail.id).unwrap_or_default();
            let detail_discounts = discounts.remove(&detail.id).unwrap_or_default();

            if !detail.status.is_cancelled() {
                let settlement = settle_line(&detail, &detail_costs, &detail_discounts);
                purchase_amount += settlement.purchase;
                sales_amount += settlement.sales;
            }

            let menu = menus.get(&detail.menu_id);
            let vendor = menu.and_then(|m| vendors.get(&m.vendor_id));

            order_details.push(OrderDetailInformation {
                id: detail.id,
                qty: detail.qty,
                price: detail.price,
                cogs: detail.cogs,
                note: detail.note,
                status: detail.status,
                reason_for_cancellation: detail.reason_for_cancellation,
                created_at: detail.created_at,
                updated_at: detail.updated_at,
                created_by: detail.created_by,
                menu_id: detail.menu_id,
                menu_name: menu.map(|m| m.name.clone()).unwrap_or_default(),
                vendor_id: menu.map(|m| m.vendor_id),
                vendor_name: vendor.map(|v| v.name.clone()).unwrap_or_default(),
                extra_costs: detail_costs
                    .into_iter()
                    .map(|c| LedgerLine {
                        amount: c.amount,
                        reason: c.reason,
                        issuer: c.issuer,
                    })
                    .collect(),
                discounts: detail_discounts
                    .into_iter()
                    .map(|d| LedgerLine {
                        amount: d.amount,
                        reason: d.reason,
                        issuer: d.issuer,
                    })
                    .collect(),
            });
        }

        Ok(OrderInformation {
            id: order.id,
            ordered_for: order.ordered_for,
            ordered_to: order.ordered_to,
            purpose: order.purpose,
            activity: order.activity,
            source_of_fund: order.source_of_fund,
            payment_option: order.payment_option,
            info: order.info,
            status: order.status,
            num_of_menus: order.num_of_menus,
            qty_of_menus: order.qty_of_menus,
            amount: order.amount,
            created_at: order.created_at,
            updated_at: order.updated_at,
            created_by: order.created_by,
            purchase_amount,
            sales_amount,
            customer_id: order.ordered_by,
            customer_name: customer.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
            customer_unit: customer.as_ref().map(|c| c.unit_name.clone()).unwrap_or_default(),
            customer_phone: customer.as_ref().map(|c| c.phone.clone()).unwrap_or_default(),
            customer_email: customer.map(|c| c.email).unwrap_or_default(),
            order_details,
        })
    }

    /// Lists orders matching the filters, newest first. Returns the page and
    /// the advisories produced while reading the paging parameters.
    #[instrument(skip(self, params))]
    pub async fn list_orders(
        &self,
        params: OrderListParams,
    ) -> Result<(Listing<OrderSummary>, Vec<String>), ServiceError> {
        let (filter, advisories) = params.into_filter()?;
        debug!(?filter, "listing orders");
        let page = self.store.list_orders(&filter).await?;
        Ok((Listing::new(page.rows, page.total_rows), advisories))
    }
}
