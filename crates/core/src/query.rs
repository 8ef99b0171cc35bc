//! Catalog search query construction.
//!
//! Two policies exist over the attribute tuple:
//! - **strict-all**: one `EQ` predicate per dimension, sentinel included
//!   (exact search and creation);
//! - **skip-unset**: `EQ` predicates only for set dimensions (alike search).
//!
//! Code lookups use a single `IN` predicate. Predicate order follows
//! [`AttributeName::ALL`] so the wire payload is deterministic.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};

use crate::attributes::{AttributeName, AttributeSet};

/// Filter operator understood by the catalog.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    Eq,
    In,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    One(String),
    Many(Vec<String>),
}

/// One search predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPredicate {
    pub name: String,
    pub value: FilterValue,
    pub operator: Operator,
    pub is_attribute: bool,
}

impl FilterPredicate {
    pub fn attribute_eq(name: AttributeName, value: impl Into<String>) -> Self {
        Self {
            name: name.as_str().to_string(),
            value: FilterValue::One(value.into()),
            operator: Operator::Eq,
            is_attribute: true,
        }
    }

    pub fn codes_in(codes: Vec<String>) -> Self {
        Self {
            name: "code".to_string(),
            value: FilterValue::Many(codes),
            operator: Operator::In,
            is_attribute: false,
        }
    }

    /// Scalar value, if this is a single-valued predicate.
    pub fn value_str(&self) -> Option<&str> {
        match &self.value {
            FilterValue::One(v) => Some(v),
            FilterValue::Many(_) => None,
        }
    }
}

/// Ordered predicate list sent to the catalog search operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub filters: Vec<FilterPredicate>,
}

impl SearchQuery {
    /// Strict-all policy: exactly one predicate per dimension.
    pub fn strict_all(attributes: &AttributeSet) -> Self {
        let canonical = attributes.sanitized();
        let filters = canonical
            .iter()
            .map(|(name, value)| FilterPredicate::attribute_eq(name, value.unwrap_or_default()))
            .collect();
        Self { filters }
    }

    /// Skip-unset policy: predicates only for dimensions that are set.
    pub fn skip_unset(attributes: &AttributeSet) -> Self {
        let canonical = attributes.sanitized();
        let filters = AttributeName::ALL
            .into_iter()
            .filter(|name| canonical.is_set(*name))
            .filter_map(|name| {
                canonical
                    .get(name)
                    .map(|value| FilterPredicate::attribute_eq(name, value))
            })
            .collect();
        Self { filters }
    }

    /// Single `IN` predicate over de-duplicated codes.
    pub fn by_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            filters: vec![FilterPredicate::codes_in(dedup_codes(codes))],
        }
    }

    pub fn filters(&self) -> &[FilterPredicate] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// `(name, value)` pairs of the scalar predicates, in order.
    pub fn attribute_pairs(&self) -> Vec<(String, String)> {
        self.filters
            .iter()
            .filter_map(|f| f.value_str().map(|v| (f.name.clone(), v.to_string())))
            .collect()
    }

    /// GraphQL variables for the search operations.
    pub fn to_variables(&self) -> JsonValue {
        json!({ "searchQuery": self })
    }
}

/// De-duplicate codes, keeping first-seen order.
pub fn dedup_codes<I, S>(codes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    codes
        .into_iter()
        .map(Into::into)
        .filter(|code| seen.insert(code.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strict_all_emits_every_dimension_in_order() {
        let attrs = AttributeSet::new().with(AttributeName::Species, "Tuna");
        let query = SearchQuery::strict_all(&attrs);

        assert_eq!(query.len(), 14);
        let names: Vec<&str> = query.filters().iter().map(|f| f.name.as_str()).collect();
        let expected: Vec<&str> = AttributeName::ALL.iter().map(|n| n.as_str()).collect();
        assert_eq!(names, expected);
        assert_eq!(query.filters()[0].value_str(), Some("Tuna"));
        assert_eq!(query.filters()[1].value_str(), Some("NA"));
        assert!(query.filters().iter().all(|f| f.operator == Operator::Eq && f.is_attribute));
    }

    #[test]
    fn skip_unset_only_constrains_set_dimensions() {
        let attrs = AttributeSet::new()
            .with(AttributeName::Species, "Tuna")
            .with(AttributeName::Grade, "NA")
            .with(AttributeName::Treatment, "Smoked");
        let query = SearchQuery::skip_unset(&attrs);

        assert_eq!(
            query.attribute_pairs(),
            vec![
                ("species".to_string(), "Tuna".to_string()),
                ("treatment".to_string(), r#"["Smoked"]"#.to_string()),
            ]
        );
    }

    #[test]
    fn code_lookup_is_a_single_deduplicated_in_predicate() {
        let query = SearchQuery::by_codes(["B", "A", "B"]);
        assert_eq!(query.len(), 1);

        let filter = &query.filters()[0];
        assert_eq!(filter.name, "code");
        assert_eq!(filter.operator, Operator::In);
        assert!(!filter.is_attribute);
        assert_eq!(
            filter.value,
            FilterValue::Many(vec!["B".to_string(), "A".to_string()])
        );
    }

    #[test]
    fn variables_match_catalog_wire_shape() {
        let query = SearchQuery::by_codes(["SKU-1"]);
        assert_eq!(
            query.to_variables(),
            json!({
                "searchQuery": {
                    "filters": [{
                        "name": "code",
                        "value": ["SKU-1"],
                        "operator": "IN",
                        "isAttribute": false
                    }]
                }
            })
        );
    }

    proptest! {
        #[test]
        fn policies_respect_dimension_bounds(
            values in proptest::collection::vec(proptest::option::of("[ A-Za-z]{0,8}"), 14)
        ) {
            let mut attrs = AttributeSet::new();
            for (name, value) in AttributeName::ALL.into_iter().zip(values) {
                attrs.set(name, value);
            }
            let canonical = attrs.sanitized();

            prop_assert_eq!(SearchQuery::strict_all(&attrs).len(), 14);

            let loose = SearchQuery::skip_unset(&attrs);
            prop_assert!(loose.len() <= 14);
            for filter in loose.filters() {
                let name: AttributeName = filter.name.parse().unwrap();
                prop_assert!(canonical.is_set(name));
            }
        }
    }
}
