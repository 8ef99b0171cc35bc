//! Catalog item model and creation payload.

use serde::{Deserialize, Serialize};

use crate::attributes::{AttributeName, AttributeSet};
use crate::naming::compose_name;
use crate::query::SearchQuery;

/// Product type every SKU created here is filed under.
pub const PRODUCT_TYPE: &str = "FAAS";

/// Attribute schema version stamped on created SKUs.
pub const ATTRIBUTE_VERSION: &str = "v2";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuAttribute {
    pub name: String,
    pub value: String,
}

/// A catalog-resolved SKU. Owned by the catalog; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sku {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shelf_life: Option<String>,
    #[serde(default)]
    pub attributes: Vec<SkuAttribute>,
}

impl Sku {
    pub fn attribute(&self, name: AttributeName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name.as_str())
            .map(|a| a.value.as_str())
    }

    /// The attribute tuple recorded on the item.
    pub fn attribute_set(&self) -> AttributeSet {
        let mut attrs = AttributeSet::new();
        for name in AttributeName::ALL {
            attrs.set(name, self.attribute(name).map(str::to_string));
        }
        attrs
    }
}

/// Payload for the catalog's create operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuDraft {
    pub name: String,
    pub product_type: String,
    pub attributes: Vec<SkuAttribute>,
}

impl SkuDraft {
    /// Derive the creation payload from the strict-all query of `attributes`.
    pub fn from_attributes(attributes: &AttributeSet) -> Self {
        let mut pairs: Vec<SkuAttribute> = SearchQuery::strict_all(attributes)
            .attribute_pairs()
            .into_iter()
            .map(|(name, value)| SkuAttribute { name, value })
            .collect();
        pairs.push(SkuAttribute {
            name: "version".to_string(),
            value: ATTRIBUTE_VERSION.to_string(),
        });

        let name = compose_name(pairs.iter().map(|a| (a.name.as_str(), a.value.as_str())));

        Self {
            name,
            product_type: PRODUCT_TYPE.to_string(),
            attributes: pairs,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}
