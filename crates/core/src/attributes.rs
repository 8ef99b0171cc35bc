//! The 14-dimension attribute tuple that identifies a SKU.

use core::str::FromStr;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};
use crate::sanitize::{self, is_set};

/// Closed set of attribute dimensions, in catalog query order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeName {
    Species,
    ProductType,
    Spec,
    CatchType,
    FreezingMethod,
    Packing,
    GlazingPercentage,
    UnitWeight,
    QuantityPerUnit,
    UnitPerCarton,
    Treatment,
    Grade,
    Quality,
    Certification,
}

impl AttributeName {
    /// Every dimension, in the fixed order used for query construction.
    pub const ALL: [AttributeName; 14] = [
        AttributeName::Species,
        AttributeName::ProductType,
        AttributeName::Spec,
        AttributeName::CatchType,
        AttributeName::FreezingMethod,
        AttributeName::Packing,
        AttributeName::GlazingPercentage,
        AttributeName::UnitWeight,
        AttributeName::QuantityPerUnit,
        AttributeName::UnitPerCarton,
        AttributeName::Treatment,
        AttributeName::Grade,
        AttributeName::Quality,
        AttributeName::Certification,
    ];

    /// Wire name used by the catalog.
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeName::Species => "species",
            AttributeName::ProductType => "product_type",
            AttributeName::Spec => "spec",
            AttributeName::CatchType => "catch_type",
            AttributeName::FreezingMethod => "freezing_method",
            AttributeName::Packing => "packing",
            AttributeName::GlazingPercentage => "glazing_percentage",
            AttributeName::UnitWeight => "unit_weight",
            AttributeName::QuantityPerUnit => "quantity_per_unit",
            AttributeName::UnitPerCarton => "unit_per_carton",
            AttributeName::Treatment => "treatment",
            AttributeName::Grade => "grade",
            AttributeName::Quality => "quality",
            AttributeName::Certification => "certification",
        }
    }
}

impl core::fmt::Display for AttributeName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeName {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AttributeName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| CatalogError::invalid_argument(format!("unknown attribute: {s}")))
    }
}

/// Descriptive attributes of a SKU.
///
/// Every dimension is optional on input. After [`AttributeSet::sanitized`]
/// every dimension holds a canonical value, with `"NA"` standing in for
/// "absent"; downstream logic treats the two identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeSet {
    pub species: Option<String>,
    pub product_type: Option<String>,
    pub spec: Option<String>,
    pub catch_type: Option<String>,
    pub freezing_method: Option<String>,
    pub packing: Option<String>,
    pub glazing_percentage: Option<String>,
    pub unit_weight: Option<String>,
    pub quantity_per_unit: Option<String>,
    pub unit_per_carton: Option<String>,
    pub treatment: Option<String>,
    pub grade: Option<String>,
    pub quality: Option<String>,
    pub certification: Option<String>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, name: AttributeName, value: impl Into<String>) -> Self {
        self.set(name, Some(value.into()));
        self
    }

    pub fn get(&self, name: AttributeName) -> Option<&str> {
        match name {
            AttributeName::Species => self.species.as_deref(),
            AttributeName::ProductType => self.product_type.as_deref(),
            AttributeName::Spec => self.spec.as_deref(),
            AttributeName::CatchType => self.catch_type.as_deref(),
            AttributeName::FreezingMethod => self.freezing_method.as_deref(),
            AttributeName::Packing => self.packing.as_deref(),
            AttributeName::GlazingPercentage => self.glazing_percentage.as_deref(),
            AttributeName::UnitWeight => self.unit_weight.as_deref(),
            AttributeName::QuantityPerUnit => self.quantity_per_unit.as_deref(),
            AttributeName::UnitPerCarton => self.unit_per_carton.as_deref(),
            AttributeName::Treatment => self.treatment.as_deref(),
            AttributeName::Grade => self.grade.as_deref(),
            AttributeName::Quality => self.quality.as_deref(),
            AttributeName::Certification => self.certification.as_deref(),
        }
    }

    pub fn set(&mut self, name: AttributeName, value: Option<String>) {
        let slot = match name {
            AttributeName::Species => &mut self.species,
            AttributeName::ProductType => &mut self.product_type,
            AttributeName::Spec => &mut self.spec,
            AttributeName::CatchType => &mut self.catch_type,
            AttributeName::FreezingMethod => &mut self.freezing_method,
            AttributeName::Packing => &mut self.packing,
            AttributeName::GlazingPercentage => &mut self.glazing_percentage,
            AttributeName::UnitWeight => &mut self.unit_weight,
            AttributeName::QuantityPerUnit => &mut self.quantity_per_unit,
            AttributeName::UnitPerCarton => &mut self.unit_per_carton,
            AttributeName::Treatment => &mut self.treatment,
            AttributeName::Grade => &mut self.grade,
            AttributeName::Quality => &mut self.quality,
            AttributeName::Certification => &mut self.certification,
        };
        *slot = value;
    }

    /// Build from a loose string map (unknown keys are ignored).
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        let mut attributes = Self::new();
        for name in AttributeName::ALL {
            attributes.set(name, map.get(name.as_str()).cloned());
        }
        attributes
    }

    /// Iterate dimensions in query order.
    pub fn iter(&self) -> impl Iterator<Item = (AttributeName, Option<&str>)> + '_ {
        AttributeName::ALL.into_iter().map(|name| (name, self.get(name)))
    }

    /// Whether the dimension carries a real (non-sentinel) value.
    pub fn is_set(&self, name: AttributeName) -> bool {
        self.get(name).is_some_and(is_set)
    }

    /// Canonical copy: quantity enrichment first, then per-dimension sanitization.
    pub fn sanitized(&self) -> AttributeSet {
        let mut out = self.clone();
        sanitize::enrich_quantity(&mut out);
        for name in AttributeName::ALL {
            let value = sanitize::sanitize(name, out.get(name));
            out.set(name, Some(value));
        }
        out
    }

    /// Stable key for the canonical attribute tuple.
    pub fn fingerprint(&self) -> String {
        self.sanitized()
            .iter()
            .map(|(name, value)| format!("{}={}", name, value.unwrap_or(sanitize::NOT_APPLICABLE)))
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Required-field rules applied before a SKU is created.
    pub fn validate_for_creation(&self) -> CatalogResult<()> {
        let attrs = self.sanitized();

        let missing: Vec<&str> = [AttributeName::Species, AttributeName::ProductType]
            .into_iter()
            .filter(|name| !attrs.is_set(*name))
            .map(AttributeName::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(CatalogError::validation(format!(
                "required attributes missing: {}",
                missing.join(", ")
            )));
        }

        if let Some(glazing) = attrs.get(AttributeName::GlazingPercentage).filter(|v| is_set(v)) {
            match glazing.parse::<f64>() {
                Ok(pct) if (0.0..=100.0).contains(&pct) => {}
                _ => {
                    return Err(CatalogError::validation(format!(
                        "glazing_percentage must be a number between 0 and 100, got {glazing:?}"
                    )));
                }
            }
        }

        for name in [AttributeName::UnitPerCarton, AttributeName::QuantityPerUnit] {
            if let Some(value) = attrs.get(name).filter(|v| is_set(v)) {
                if !matches!(value.parse::<u32>(), Ok(n) if n > 0) {
                    return Err(CatalogError::validation(format!(
                        "{name} must be a positive integer, got {value:?}"
                    )));
                }
            }
        }

        Ok(())
    }
}
