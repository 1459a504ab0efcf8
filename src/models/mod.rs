//! Status vocabularies shared by the entities, the services and the HTTP layer.
//!
//! Every enum is persisted as its string value, so the database rows stay
//! readable by the reporting tools that consume the same tables.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Overall status of an order.
///
/// `Created`/`Pending` are set by the customer ordering flow. The forwarding
/// states are derived from the line items after every line item mutation,
/// and `Cancelled` is only ever reached by cascade from the line items.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum OrderStatus {
    #[sea_orm(string_value = "Created")]
    Created,
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "ForwardedPartially")]
    ForwardedPartially,
    #[sea_orm(string_value = "ForwardedEntirely")]
    ForwardedEntirely,
    #[sea_orm(string_value = "Completed")]
    Completed,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

/// Status of a single line item (order detail).
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum OrderDetailStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Sent")]
    Sent,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

impl OrderDetailStatus {
    /// Cancelled items contribute nothing to the order aggregates.
    pub fn is_cancelled(self) -> bool {
        self == Self::Cancelled
    }

    /// Whether a line item may move from `self` to `next`.
    ///
    /// Re-applying the current status is accepted so that a retried request
    /// converges. Nothing leaves `Cancelled`.
    pub fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (from, to) if from == to => true,
            (Self::Pending, Self::Sent) => true,
            (Self::Pending, Self::Cancelled) => true,
            (Self::Sent, Self::Cancelled) => true,
            (Self::Sent, Self::Pending) => true,
            _ => false,
        }
    }
}

/// Who raised a cost or a discount. Only `Vendor` entries touch the
/// purchase side of the settlement.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum LedgerIssuer {
    #[sea_orm(string_value = "Vendor")]
    Vendor,
    #[sea_orm(string_value = "Customer")]
    Customer,
    #[sea_orm(string_value = "Internal")]
    Internal,
}

/// Payment marker on a ledger entry. The engine only ever writes `Unpaid`.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum LedgerStatus {
    #[sea_orm(string_value = "Unpaid")]
    Unpaid,
    #[sea_orm(string_value = "Paid")]
    Paid,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AdminStatus {
    #[sea_orm(string_value = "Active")]
    Active,
    #[sea_orm(string_value = "Inactive")]
    Inactive,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum UserStatus {
    #[sea_orm(string_value = "Registered")]
    Registered,
    #[sea_orm(string_value = "Activated")]
    Activated,
    #[sea_orm(string_value = "Deactivated")]
    Deactivated,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn cancelled_is_terminal() {
        for next in [OrderDetailStatus::Pending, OrderDetailStatus::Sent] {
            assert!(!OrderDetailStatus::Cancelled.can_transition_to(next));
        }
        assert!(OrderDetailStatus::Cancelled.can_transition_to(OrderDetailStatus::Cancelled));
    }

    #[test]
    fn sent_can_be_reset_or_cancelled() {
        assert!(OrderDetailStatus::Sent.can_transition_to(OrderDetailStatus::Pending));
        assert!(OrderDetailStatus::Sent.can_transition_to(OrderDetailStatus::Cancelled));
        assert!(OrderDetailStatus::Pending.can_transition_to(OrderDetailStatus::Sent));
    }

    #[test]
    fn statuses_render_as_stored_strings() {
        assert_eq!(OrderStatus::ForwardedPartially.to_string(), "ForwardedPartially");
        assert_eq!(OrderDetailStatus::from_str("Sent").unwrap(), OrderDetailStatus::Sent);
        assert_eq!(LedgerIssuer::Vendor.to_string(), "Vendor");
    }
}
