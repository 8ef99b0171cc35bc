//! Shelf-life and expiry date math.

use chrono::{DateTime, Duration, Utc};

/// Default shelf life for processed products (2 years).
pub const DEFAULT_EXPIRY_DAYS: i64 = 730;

/// Shelf life for fresh raw material.
pub const RAW_MATERIAL_EXPIRY_DAYS: i64 = 14;

/// Freezing method marking fresh (unfrozen) raw material.
pub const FREEZING_METHOD_FRESH: &str = "Fresh";

/// Catalog-recorded shelf life, as interpreted for expiry computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShelfLife {
    /// Blank or absent.
    Missing,
    Days(u32),
    /// Present but not a non-negative integer day count.
    Malformed(String),
}

impl ShelfLife {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
            return ShelfLife::Missing;
        };

        match raw.parse::<u32>() {
            Ok(days) => ShelfLife::Days(days),
            Err(_) => ShelfLife::Malformed(raw.to_string()),
        }
    }
}

/// Fallback shelf life in days, chosen from the freezing method.
pub fn default_shelf_life_days(freezing_method: Option<&str>) -> i64 {
    match freezing_method.map(str::trim) {
        Some(FREEZING_METHOD_FRESH) => RAW_MATERIAL_EXPIRY_DAYS,
        _ => DEFAULT_EXPIRY_DAYS,
    }
}

/// Expiry date from a reference time and the recorded shelf life.
///
/// `None` when the resulting date is outside the representable calendar.
pub fn checked_expiry_date(
    reference: DateTime<Utc>,
    shelf_life: &ShelfLife,
    freezing_method: Option<&str>,
) -> Option<DateTime<Utc>> {
    let days = match shelf_life {
        ShelfLife::Days(days) => i64::from(*days),
        ShelfLife::Missing | ShelfLife::Malformed(_) => default_shelf_life_days(freezing_method),
    };
    reference.checked_add_signed(Duration::days(days))
}

/// Like [`checked_expiry_date`], but a recorded shelf life that overflows the
/// calendar falls back to the freezing-method default. Never panics.
pub fn expiry_date(
    reference: DateTime<Utc>,
    shelf_life: &ShelfLife,
    freezing_method: Option<&str>,
) -> DateTime<Utc> {
    checked_expiry_date(reference, shelf_life, freezing_method)
        .or_else(|| checked_expiry_date(reference, &ShelfLife::Missing, freezing_method))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
