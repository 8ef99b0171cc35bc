//! Attribute normalization rules.
//!
//! Raw caller input is turned into canonical catalog values here. Blank or
//! missing values collapse to the [`NOT_APPLICABLE`] sentinel; `treatment` is
//! rendered as a bracketed, quoted list; everything else is trimmed.

use crate::attributes::{AttributeName, AttributeSet};

/// Sentinel for an absent/unset attribute.
pub const NOT_APPLICABLE: &str = "NA";

/// Canonical value for one attribute.
pub fn sanitize(name: AttributeName, raw: Option<&str>) -> String {
    let Some(value) = raw.filter(|v| is_set(v)) else {
        return NOT_APPLICABLE.to_string();
    };

    match name {
        AttributeName::Treatment => sanitize_treatment(value),
        _ => value.trim().to_string(),
    }
}

/// True unless the value is blank or the sentinel.
pub fn is_set(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed != NOT_APPLICABLE
}

fn sanitize_treatment(raw: &str) -> String {
    let tokens: Vec<String> = raw
        .split(',')
        .map(|token| token.replace(['[', ']', '"'], ""))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .map(|token| format!("\"{token}\""))
        .collect();

    if tokens.is_empty() {
        return NOT_APPLICABLE.to_string();
    }

    format!("[{}]", tokens.join(","))
}

/// Packaging is described either by carton x unit or by a single unit weight.
///
/// Carton + quantity wins when both are present; otherwise a set unit weight
/// is kept; otherwise all three collapse to the sentinel.
pub fn enrich_quantity(attrs: &mut AttributeSet) {
    let carton = attrs.get(AttributeName::UnitPerCarton).map(str::to_string);
    let quantity = attrs.get(AttributeName::QuantityPerUnit).map(str::to_string);
    let weight = attrs.get(AttributeName::UnitWeight).map(str::to_string);

    let na = || Some(NOT_APPLICABLE.to_string());
    attrs.set(AttributeName::UnitPerCarton, na());
    attrs.set(AttributeName::QuantityPerUnit, na());
    attrs.set(AttributeName::UnitWeight, na());

    let set = |v: &Option<String>| v.as_deref().is_some_and(is_set);
    if set(&carton) && set(&quantity) {
        attrs.set(AttributeName::UnitPerCarton, carton);
        attrs.set(AttributeName::QuantityPerUnit, quantity);
    } else if set(&weight) {
        attrs.set(AttributeName::UnitWeight, weight);
    }
}
