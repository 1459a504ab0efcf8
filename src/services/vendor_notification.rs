use chrono::{DateTime, Duration, FixedOffset, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;
use tracing::{info, instrument, warn};
use url::Url;
use utoipa::ToSchema;

use super::OrderEngine;
use crate::entities::{menu, order, order_detail};
use crate::errors::ServiceError;
use crate::models::{OrderDetailStatus, OrderStatus};
use crate::repositories::{CustomerProfile, OrderWrite, VendorContact};

/// Longest number accepted as typed.
const MAX_PHONE_DIGITS: usize = 13;
/// A local mobile number gains one digit when rewritten to `628…`, so
/// normalised numbers never exceed this many digits.
const MAX_NORMALISED_DIGITS: usize = MAX_PHONE_DIGITS + 1;
const COUNTRY_PREFIX: &str = "62";
const MOBILE_COUNTRY_PREFIX: &str = "628";
const LOCAL_PREFIX: &str = "08";

static NON_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\D+").expect("valid regex"));

/// Western Indonesia Time, the zone every timestamp in a vendor message is
/// rendered in.
static WIB: Lazy<FixedOffset> =
    Lazy::new(|| FixedOffset::east_opt(7 * 3600).expect("valid offset"));

/// Strips everything but digits and rewrites a local mobile number into its
/// `62…` form. Already normalised numbers come back unchanged.
pub fn sanitize_phone_number(raw: &str) -> Result<String, ServiceError> {
    let digits = NON_DIGITS.replace_all(raw, "");

    let limit = if digits.starts_with(MOBILE_COUNTRY_PREFIX) {
        MAX_NORMALISED_DIGITS
    } else {
        MAX_PHONE_DIGITS
    };
    if digits.len() > limit {
        return Err(ServiceError::ValidationError(format!(
            "nomor telepon terlalu panjang ({} digit): {}",
            digits.len(),
            raw
        )));
    }

    if digits.starts_with(COUNTRY_PREFIX) && digits.len() > COUNTRY_PREFIX.len() {
        Ok(digits.into_owned())
    } else if let Some(rest) = digits.strip_prefix(LOCAL_PREFIX) {
        Ok(format!("{}8{}", COUNTRY_PREFIX, rest))
    } else {
        Err(ServiceError::ValidationError(format!(
            "nomor telepon tidak valid: {}",
            raw
        )))
    }
}

/// "3 jam yang lalu", "dalam 2 hari" or "baru saja", relative to `now`.
pub fn relative_phrase(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = at.signed_duration_since(now);
    let future = delta > Duration::zero();
    let secs = delta.num_seconds().unsigned_abs();

    if secs < 60 {
        return if future { "sebentar lagi" } else { "baru saja" }.to_string();
    }

    let (amount, unit) = match secs {
        s if s < 3_600 => (s / 60, "menit"),
        s if s < 86_400 => (s / 3_600, "jam"),
        s if s < 30 * 86_400 => (s / 86_400, "hari"),
        s if s < 365 * 86_400 => (s / (30 * 86_400), "bulan"),
        s => (s / (365 * 86_400), "tahun"),
    };

    if future {
        format!("dalam {} {}", amount, unit)
    } else {
        format!("{} {} yang lalu", amount, unit)
    }
}

/// Relative phrase followed by the absolute WIB time.
pub fn human_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format!(
        "{} ({} WIB)",
        relative_phrase(at, now),
        at.with_timezone(&*WIB).format("%d/%m/%Y %H:%M")
    )
}

/// One forwarded line as it appears in the message.
struct MessageLine<'a> {
    menu_name: &'a str,
    qty: i32,
    note: &'a str,
}

fn compose_message(
    order: &order::Model,
    vendor: &VendorContact,
    customer: Option<&CustomerProfile>,
    lines: &[MessageLine<'_>],
    now: DateTime<Utc>,
) -> String {
    let mut text = String::new();
    let customer_name = customer.map_or("-", |c| c.name.as_str());
    let customer_unit = customer.map_or("-", |c| c.unit_name.as_str());

    let _ = writeln!(text, "Halo {}, ada pesanan baru.", vendor.name);
    let _ = writeln!(text);
    let _ = writeln!(text, "Pemesan: {} ({})", customer_name, customer_unit);
    let _ = writeln!(text, "Order ID: #{}", order.id);
    let _ = writeln!(text, "Dipesan: {}", human_time(order.created_at, now));
    let _ = writeln!(text, "Diantar: {}", human_time(order.ordered_for, now));
    let _ = writeln!(text, "Tujuan: {}", order.ordered_to);
    let _ = writeln!(text);
    let _ = writeln!(text, "Daftar menu:");
    for (i, line) in lines.iter().enumerate() {
        let _ = write!(text, "{}. {} x{}", i + 1, line.menu_name, line.qty);
        if !line.note.trim().is_empty() {
            let _ = write!(text, " (catatan: {})", line.note.trim());
        }
        let _ = writeln!(text);
    }

    text.trim_end().to_string()
}

/// `{base}/{phone}?text=<message>` for the vendor's messaging app.
pub fn messaging_link(base: &str, phone: &str, message: &str) -> Result<String, ServiceError> {
    let mut link = Url::parse(&format!("{}/{}", base.trim_end_matches('/'), phone))
        .map_err(|e| ServiceError::InternalError(format!("invalid messaging link base: {}", e)))?;
    link.query_pairs_mut().append_pair("text", message);
    Ok(link.into())
}

/// Everything the caller needs to hand the order to the vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VendorDispatch {
    pub order_id: i64,
    pub vendor_id: i64,
    pub vendor_name: String,
    /// Normalised vendor number.
    pub phone: String,
    pub message: String,
    pub link: String,
    pub order_status: OrderStatus,
    pub forwarded_detail_ids: Vec<i64>,
}

impl OrderEngine {
    /// Forwards a vendor's share of an order: composes the message, marks
    /// the vendor's line items `Sent` and derives the order's forwarding
    /// status from all of its line items.
    ///
    /// Refuses with `Conflict` when any of those items was already sent.
    #[instrument(skip(self))]
    pub async fn notify_vendor(
        &self,
        order_id: i64,
        vendor_id: i64,
        actor: &str,
    ) -> Result<VendorDispatch, ServiceError> {
        let guard = self.locks.acquire(order_id).await;

        let order = self.load_order(order_id).await?;
        let vendor = self
            .store
            .find_vendor(vendor_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("vendor {} not found", vendor_id)))?;

        let details = self.store.find_order_details(order_id).await?;
        let menu_ids: Vec<i64> = details.iter().map(|d| d.menu_id).collect();
        let menus: HashMap<i64, menu::Model> = self
            .store
            .find_menus(&menu_ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let targets: Vec<&order_detail::Model> = details
            .iter()
            .filter(|d| !d.status.is_cancelled())
            .filter(|d| menus.get(&d.menu_id).map(|m| m.vendor_id) == Some(vendor_id))
            .collect();

        if targets.is_empty() {
            return Err(ServiceError::NotFound(format!(
                "order {} has no line items for vendor {}",
                order_id, vendor_id
            )));
        }
        if let Some(sent) = targets.iter().find(|d| d.status == OrderDetailStatus::Sent) {
            warn!(order_id, vendor_id, detail_id = sent.id, "vendor already notified");
            return Err(ServiceError::Conflict(format!(
                "order detail {} was already sent to vendor {}",
                sent.id, vendor_id
            )));
        }

        let phone = sanitize_phone_number(&vendor.phone)?;
        let customer = self.store.find_customer_profile(order.ordered_by).await?;

        let now = Utc::now();
        let lines: Vec<MessageLine<'_>> = targets
            .iter()
            .map(|d| MessageLine {
                menu_name: menus.get(&d.menu_id).map_or("-", |m| m.name.as_str()),
                qty: d.qty,
                note: &d.note,
            })
            .collect();
        let message = compose_message(&order, &vendor, customer.as_ref(), &lines, now);
        let link = messaging_link(&self.settings.messaging_link_base, &phone, &message)?;

        let forwarded_detail_ids: Vec<i64> = targets.iter().map(|d| d.id).collect();
        let mut write = OrderWrite::default();
        let mut sent_items = Vec::with_capacity(targets.len());
        for target in &targets {
            self.audit.snapshot_order_detail(&mut write, target, actor);
            let mut sent = (*target).clone();
            sent.status = OrderDetailStatus::Sent;
            sent.updated_at = now;
            sent.updated_by = Some(actor.to_string());
            sent_items.push(sent);
        }
        self.audit.snapshot_order(&mut write, &order, actor);

        // Snapshots, sent items and the order land together or not at all
        let aggregate = self
            .write_line_items(order, sent_items, write, actor)
            .await?;

        info!(
            order_id,
            vendor_id,
            items = forwarded_detail_ids.len(),
            status = %aggregate.status,
            "order forwarded to vendor"
        );
        self.notifications.dispatch(format!(
            "{} meneruskan order #{} ke vendor {} ({} menu). Status order: {}.",
            actor,
            order_id,
            vendor.name,
            forwarded_detail_ids.len(),
            aggregate.status
        ));

        drop(guard);
        self.release_idle_locks();

        Ok(VendorDispatch {
            order_id,
            vendor_id,
            vendor_name: vendor.name,
            phone,
            message,
            link,
            order_status: aggregate.status,
            forwarded_detail_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("081234567890", "6281234567890")]
    #[case("6281234567890", "6281234567890")]
    #[case("+62 812-3456-7890", "6281234567890")]
    #[case("0812 3456 789", "628123456789")]
    fn normalises_mobile_numbers(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(sanitize_phone_number(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("0812-1111-2222")]
    #[case("0812345678901")]
    #[case("+62 21 555 1234")]
    fn normalising_twice_changes_nothing(#[case] raw: &str) {
        let once = sanitize_phone_number(raw).unwrap();
        assert!(once.len() <= MAX_NORMALISED_DIGITS);
        assert_eq!(sanitize_phone_number(&once).unwrap(), once);
    }

    #[test]
    fn full_length_local_number_gains_one_digit() {
        assert_eq!(
            sanitize_phone_number("0812345678901").unwrap(),
            "62812345678901"
        );
    }

    #[rstest]
    #[case("12345678901234567890")]
    #[case("08123456789012")]
    #[case("628123456789012")]
    #[case("62212345678901")]
    fn overlong_numbers_are_rejected_before_prefix_checks(#[case] raw: &str) {
        let err = sanitize_phone_number(raw).unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(msg) if msg.contains("terlalu panjang"));
    }

    #[rstest]
    #[case("021555123")]
    #[case("62")]
    #[case("")]
    #[case("abc")]
    fn unknown_prefixes_are_invalid(#[case] raw: &str) {
        let err = sanitize_phone_number(raw).unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(msg) if msg.contains("tidak valid"));
    }

    #[rstest]
    #[case(-30, "baru saja")]
    #[case(-3 * 3600, "3 jam yang lalu")]
    #[case(2 * 86_400, "dalam 2 hari")]
    #[case(-45 * 60, "45 menit yang lalu")]
    #[case(-400 * 86_400, "1 tahun yang lalu")]
    fn relative_phrases(#[case] offset_secs: i64, #[case] expected: &str) {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let at = now + Duration::seconds(offset_secs);
        assert_eq!(relative_phrase(at, now), expected);
    }

    #[test]
    fn absolute_time_is_rendered_in_wib() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 20, 30, 0).unwrap();
        assert_eq!(human_time(at, now), "dalam 8 jam (02/03/2024 03:30 WIB)");
    }

    #[test]
    fn link_escapes_the_message() {
        let link = messaging_link("https://wa.me/", "6281234567890", "Order #1\nNasi x2").unwrap();
        assert!(link.starts_with("https://wa.me/6281234567890?text="));
        assert!(!link.contains('\n'));
        assert!(link.contains("%231"));
    }
}
