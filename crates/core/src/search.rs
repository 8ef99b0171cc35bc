//! Search request parsing (discriminated by `search_type`).

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::attributes::AttributeSet;
use crate::error::CatalogError;

/// Search discriminator values accepted on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SearchType {
    ByCodes,
    ByAttributes,
    Alike,
}

impl SearchType {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::ByCodes => "SEARCH_BY_CODES",
            SearchType::ByAttributes => "SEARCH_BY_ATTRIBUTES",
            SearchType::Alike => "SEARCH_ALIKE_SKUS",
        }
    }
}

impl FromStr for SearchType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "SEARCH_BY_CODES" => Ok(SearchType::ByCodes),
            "SEARCH_BY_ATTRIBUTES" => Ok(SearchType::ByAttributes),
            "SEARCH_ALIKE_SKUS" => Ok(SearchType::Alike),
            other => Err(CatalogError::invalid_argument(format!("invalid search type: {other}"))),
        }
    }
}

/// Codes may arrive as a JSON list or a comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CodeList {
    List(Vec<String>),
    Csv(String),
}

impl CodeList {
    /// Trimmed, non-empty codes.
    pub fn into_codes(self) -> Vec<String> {
        let raw = match self {
            CodeList::List(codes) => codes,
            CodeList::Csv(csv) => csv.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .collect()
    }
}

/// Raw search request as received from callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub search_type: Option<String>,
    #[serde(default)]
    pub codes: Option<CodeList>,
    #[serde(default)]
    pub attributes: Option<AttributeSet>,
    #[serde(default)]
    pub get_lite_response: Option<bool>,
}

/// Validated search, one variant per request kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkuSearch {
    ByCodes(Vec<String>),
    ByAttributes(AttributeSet),
    Alike { attributes: AttributeSet, lite: bool },
}

impl TryFrom<SearchRequest> for SkuSearch {
    type Error = CatalogError;

    fn try_from(request: SearchRequest) -> Result<Self, Self::Error> {
        let search_type: SearchType = request
            .search_type
            .as_deref()
            .ok_or_else(|| CatalogError::invalid_argument("search_type is required for search"))?
            .parse()?;

        match search_type {
            SearchType::ByCodes => {
                let codes = request.codes.map(CodeList::into_codes).unwrap_or_default();
                if codes.is_empty() {
                    return Err(CatalogError::invalid_argument("codes are required for search"));
                }
                Ok(SkuSearch::ByCodes(codes))
            }
            SearchType::ByAttributes => request
                .attributes
                .map(SkuSearch::ByAttributes)
                .ok_or_else(|| CatalogError::invalid_argument("attributes are required for search")),
            SearchType::Alike => {
                let attributes = request.attributes.ok_or_else(|| {
                    CatalogError::invalid_argument("attributes are required for search")
                })?;
                Ok(SkuSearch::Alike {
                    attributes,
                    lite: request.get_lite_response.unwrap_or(false),
                })
            }
        }
    }
}
