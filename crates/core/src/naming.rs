//! Human-readable SKU names.

use std::collections::HashMap;

use crate::sanitize::is_set;

/// Placeholder template for SKU names. `unitData` is derived, not an attribute.
pub const SKU_NAME_TEMPLATE: &str = "${species} ${catch_type} ${product_type} ${spec} ${grade} ${quality} ${freezing_method} ${treatment} ${glazing_percentage} ${packing} ${unitData} ${unit_weight} ${certification}";

/// Render a SKU name from `(attribute, value)` pairs.
///
/// Sentinel values render empty, glazing renders as `"<v>% Glazing"` and the
/// carton/quantity pair renders as `unitData`. Whitespace left behind by empty
/// placeholders is collapsed.
pub fn compose_name<'a, I>(attributes: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut values: HashMap<&str, String> = attributes
        .into_iter()
        .map(|(name, value)| {
            let rendered = if is_set(value) { value.trim().to_string() } else { String::new() };
            (name, rendered)
        })
        .collect();

    let carton = values.get("unit_per_carton").cloned().unwrap_or_default();
    let quantity = values.get("quantity_per_unit").cloned().unwrap_or_default();
    let unit_data = if carton.is_empty() || quantity.is_empty() {
        String::new()
    } else {
        format!("{carton}x{quantity}")
    };
    values.insert("unitData", unit_data);

    if let Some(glazing) = values.get_mut("glazing_percentage") {
        if !glazing.is_empty() {
            *glazing = format!("{glazing}% Glazing");
        }
    }

    render(SKU_NAME_TEMPLATE, &values)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn render(template: &str, values: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                if let Some(value) = values.get(key) {
                    out.push_str(value);
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{AttributeName, AttributeSet};
    use crate::query::SearchQuery;

    fn name_for(attrs: &AttributeSet) -> String {
        let pairs = SearchQuery::strict_all(attrs).attribute_pairs();
        compose_name(pairs.iter().map(|(n, v)| (n.as_str(), v.as_str())))
    }

    #[test]
    fn full_name_follows_template_order() {
        let attrs = AttributeSet::new()
            .with(AttributeName::Species, "Vannamei")
            .with(AttributeName::CatchType, "Farmed")
            .with(AttributeName::ProductType, "HLSO")
            .with(AttributeName::Spec, "16/20")
            .with(AttributeName::FreezingMethod, "IQF")
            .with(AttributeName::GlazingPercentage, "10")
            .with(AttributeName::Packing, "Bag")
            .with(AttributeName::UnitPerCarton, "10")
            .with(AttributeName::QuantityPerUnit, "2");

        assert_eq!(
            name_for(&attrs),
            "Vannamei Farmed HLSO 16/20 IQF 10% Glazing Bag 10x2"
        );
    }

    #[test]
    fn unit_weight_shown_when_packaging_absent() {
        let attrs = AttributeSet::new()
            .with(AttributeName::Species, "Tuna")
            .with(AttributeName::UnitWeight, "1kg")
            .with(AttributeName::Certification, "MSC");
        assert_eq!(name_for(&attrs), "Tuna 1kg MSC");
    }

    #[test]
    fn all_sentinel_renders_empty() {
        assert_eq!(name_for(&AttributeSet::new()), "");
    }

    #[test]
    fn sentinel_never_leaks_into_name() {
        let name = compose_name([("species", "NA"), ("grade", "A"), ("glazing_percentage", "NA")]);
        assert_eq!(name, "A");
    }

    #[test]
    fn unknown_placeholders_render_empty() {
        assert_eq!(render("${a}-${b}", &HashMap::from([("a", "x".to_string())])), "x-");
    }
}
