use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::OrderEngine;
use crate::entities::{cost, discount, order_detail};
use crate::errors::ServiceError;
use crate::models::{LedgerIssuer, LedgerStatus};
use crate::repositories::NewLedgerEntry;

/// Body of both the add-cost and the add-discount calls.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LedgerEntryRequest {
    #[validate(custom = "validate_positive_amount")]
    #[schema(value_type = String, example = "5000")]
    pub amount: Decimal,
    #[validate(length(min = 1, max = 255, message = "reason must be 1-255 characters"))]
    pub reason: String,
    pub issuer: LedgerIssuer,
}

fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_positive() && !amount.is_zero() {
        Ok(())
    } else {
        let mut err = ValidationError::new("positive_amount");
        err.message = Some("amount must be greater than zero".into());
        Err(err)
    }
}

/// A stored cost or discount as returned to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LedgerEntry {
    pub id: i64,
    pub order_detail_id: i64,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub reason: String,
    pub issuer: LedgerIssuer,
    pub status: LedgerStatus,
    pub created_by: String,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<cost::Model> for LedgerEntry {
    fn from(m: cost::Model) -> Self {
        Self {
            id: m.id,
            order_detail_id: m.order_detail_id,
            amount: m.amount,
            reason: m.reason,
            issuer: m.issuer,
            status: m.status,
            created_by: m.created_by,
            created_at: m.created_at,
        }
    }
}

impl From<discount::Model> for LedgerEntry {
    fn from(m: discount::Model) -> Self {
        Self {
            id: m.id,
            order_detail_id: m.order_detail_id,
            amount: m.amount,
            reason: m.reason,
            issuer: m.issuer,
            status: m.status,
            created_by: m.created_by,
            created_at: m.created_at,
        }
    }
}

/// Purchase and sales amounts of one line item after ledger adjustments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settlement {
    pub purchase: Decimal,
    pub sales: Decimal,
}

/// Settles one line item against its ledger entries.
///
/// Only `Vendor` entries move the purchase side; every entry moves the
/// sales side. Entries of other line items are ignored.
pub fn settle_line(
    detail: &order_detail::Model,
    costs: &[cost::Model],
    discounts: &[discount::Model],
) -> Settlement {
    let mut purchase = detail.line_cogs();
    let mut sales = detail.line_total();

    for c in costs.iter().filter(|c| c.order_detail_id == detail.id) {
        sales += c.amount;
        if c.issuer == LedgerIssuer::Vendor {
            purchase += c.amount;
        }
    }
    for d in discounts.iter().filter(|d| d.order_detail_id == detail.id) {
        sales -= d.amount;
        if d.issuer == LedgerIssuer::Vendor {
            purchase -= d.amount;
        }
    }

    Settlement { purchase, sales }
}

impl OrderEngine {
    #[instrument(skip(self, request), fields(amount = %request.amount, issuer = %request.issuer))]
    pub async fn add_cost(
        &self,
        detail_id: i64,
        request: LedgerEntryRequest,
        actor: &str,
    ) -> Result<LedgerEntry, ServiceError> {
        request.validate()?;
        let detail = self.load_order_detail(detail_id).await?;

        let entry = self
            .store
            .create_cost(new_entry(detail_id, &request, actor))
            .await?;
        let menu_name = self.menu_name(detail.menu_id).await?;

        info!(detail_id, cost_id = entry.id, "cost added");
        self.notifications.dispatch(format!(
            "{} menambahkan biaya tambahan Rp{} ({}, oleh {}) untuk \"{}\" pada order #{}.",
            actor, entry.amount, entry.reason, entry.issuer, menu_name, detail.order_id
        ));

        Ok(entry.into())
    }

    #[instrument(skip(self, request), fields(amount = %request.amount, issuer = %request.issuer))]
    pub async fn add_discount(
        &self,
        detail_id: i64,
        request: LedgerEntryRequest,
        actor: &str,
    ) -> Result<LedgerEntry, ServiceError> {
        request.validate()?;
        let detail = self.load_order_detail(detail_id).await?;

        let entry = self
            .store
            .create_discount(new_entry(detail_id, &request, actor))
            .await?;
        let menu_name = self.menu_name(detail.menu_id).await?;

        info!(detail_id, discount_id = entry.id, "discount added");
        self.notifications.dispatch(format!(
            "{} menambahkan diskon Rp{} ({}, oleh {}) untuk \"{}\" pada order #{}.",
            actor, entry.amount, entry.reason, entry.issuer, menu_name, detail.order_id
        ));

        Ok(entry.into())
    }
}

fn new_entry(detail_id: i64, request: &LedgerEntryRequest, actor: &str) -> NewLedgerEntry {
    NewLedgerEntry {
        order_detail_id: detail_id,
        amount: request.amount,
        reason: request.reason.trim().to_string(),
        issuer: request.issuer,
        created_by: actor.to_string(),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderDetailStatus;
    use rust_decimal_macros::dec;

    fn detail() -> order_detail::Model {
        let now = Utc::now();
        order_detail::Model {
            id: 10,
            order_id: 1,
            menu_id: 1,
            qty: 4,
            price: dec!(25000),
            cogs: dec!(20000),
            note: String::new(),
            status: OrderDetailStatus::Pending,
            reason_for_cancellation: None,
            paid_to_vendor_at: None,
            created_at: now,
            updated_at: now,
            created_by: "seed".into(),
            updated_by: None,
        }
    }

    fn cost(detail_id: i64, amount: Decimal, issuer: LedgerIssuer) -> cost::Model {
        let now = Utc::now();
        cost::Model {
            id: 0,
            order_detail_id: detail_id,
            amount,
            reason: "ongkir".into(),
            issuer,
            status: LedgerStatus::Unpaid,
            created_at: now,
            updated_at: now,
            created_by: "seed".into(),
        }
    }

    fn discount(detail_id: i64, amount: Decimal, issuer: LedgerIssuer) -> discount::Model {
        let now = Utc::now();
        discount::Model {
            id: 0,
            order_detail_id: detail_id,
            amount,
            reason: "promo".into(),
            issuer,
            status: LedgerStatus::Unpaid,
            created_at: now,
            updated_at: now,
            created_by: "seed".into(),
        }
    }

    #[test]
    fn vendor_entries_move_both_sides() {
        let s = settle_line(
            &detail(),
            &[
                cost(10, dec!(10000), LedgerIssuer::Vendor),
                cost(10, dec!(3000), LedgerIssuer::Internal),
            ],
            &[
                discount(10, dec!(5000), LedgerIssuer::Vendor),
                discount(10, dec!(2000), LedgerIssuer::Customer),
            ],
        );
        assert_eq!(s.purchase, dec!(80000) + dec!(10000) - dec!(5000));
        assert_eq!(s.sales, dec!(100000) + dec!(13000) - dec!(7000));
    }

    #[test]
    fn entries_of_other_items_are_ignored() {
        let s = settle_line(&detail(), &[cost(11, dec!(9999), LedgerIssuer::Vendor)], &[]);
        assert_eq!(s.purchase, dec!(80000));
        assert_eq!(s.sales, dec!(100000));
    }

    #[test]
    fn non_positive_amounts_fail_validation() {
        let req = |amount| LedgerEntryRequest {
            amount,
            reason: "ongkir".into(),
            issuer: LedgerIssuer::Vendor,
        };
        assert!(req(dec!(0)).validate().is_err());
        assert!(req(dec!(-1)).validate().is_err());
        assert!(req(dec!(0.01)).validate().is_ok());
    }
}
