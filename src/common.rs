/// Query-string parsing shared by the listing endpoints
use chrono::NaiveDate;
use std::str::FromStr;

use crate::errors::ServiceError;
use crate::repositories::{DateRange, PageRequest};

pub const LENGTH_NOT_AN_INTEGER: &str = "Parameter Length tidak dapat dikonversi ke integer";
pub const PAGE_WITHOUT_LENGTH: &str =
    "Tidak ada parameter Length, maka parameter Page diabaikan.";

/// Result of reading `length` and `page`.
///
/// Bad paging input never fails a request; it only adds an advisory that
/// ends up in the envelope's `errors` list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paging {
    pub page: Option<PageRequest>,
    pub advisories: Vec<String>,
}

/// Turns the raw `length`/`page` parameters into a limit/offset window.
///
/// A `page` below 1 or not a number is read as the first page.
pub fn parse_paging(length: Option<&str>, page: Option<&str>) -> Paging {
    let mut advisories = Vec::new();

    let limit = match length {
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(limit) => Some(limit),
            Err(_) => {
                advisories.push(LENGTH_NOT_AN_INTEGER.to_string());
                None
            }
        },
        None => None,
    };

    if page.is_some() && length.is_none() {
        advisories.push(PAGE_WITHOUT_LENGTH.to_string());
    }

    let page_number = page
        .and_then(|p| p.trim().parse::<u64>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);

    Paging {
        page: limit.map(|limit| PageRequest {
            limit,
            offset: (page_number - 1).saturating_mul(limit),
        }),
        advisories,
    }
}

pub fn parse_id(raw: &str, field: &str) -> Result<i64, ServiceError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ServiceError::ValidationError(format!("{} must be a numeric ID", field)))
}

/// Splits a comma list, skipping empty segments.
pub fn parse_list<T: FromStr>(raw: &str, field: &str) -> Result<Vec<T>, ServiceError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<T>().map_err(|_| {
                ServiceError::ValidationError(format!("invalid value '{}' for {}", s, field))
            })
        })
        .collect()
}

pub fn parse_enum<T: FromStr>(raw: &str, field: &str) -> Result<T, ServiceError> {
    raw.trim().parse::<T>().map_err(|_| {
        ServiceError::ValidationError(format!("invalid value '{}' for {}", raw, field))
    })
}

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
        ServiceError::ValidationError(format!("Invalid {} date format: {}", field, e))
    })
}

/// Builds an inclusive day range from `[start]`/`[end]` parameters.
pub fn parse_date_range(
    start: Option<&str>,
    end: Option<&str>,
    field: &str,
) -> Result<DateRange, ServiceError> {
    Ok(DateRange {
        start: start.map(|s| parse_date(s, field)).transpose()?,
        end: end.map(|s| parse_date(s, field)).transpose()?,
    })
}
