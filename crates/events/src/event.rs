use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A domain-agnostic event.
///
/// Events are immutable facts with a stable type name and schema version.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "catalog.sku.created").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// Event: a new SKU was accepted by the catalog.
///
/// Keyed by the SKU code; published once per successful creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuCreated {
    pub code: String,
    #[serde(default = "chrono::Utc::now")]
    pub occurred_at: DateTime<Utc>,
}

impl SkuCreated {
    pub fn new(code: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            code: code.into(),
            occurred_at,
        }
    }
}

impl Event for SkuCreated {
    fn event_type(&self) -> &'static str {
        "catalog.sku.created"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_message_is_keyed_by_code() {
        let event = SkuCreated::new("SKU-42", Utc::now());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["code"], "SKU-42");
        assert_eq!(event.event_type(), "catalog.sku.created");
    }

    #[test]
    fn bare_code_message_deserializes() {
        let event: SkuCreated = serde_json::from_str(r#"{"code":"SKU-7"}"#).unwrap();
        assert_eq!(event.code, "SKU-7");
    }
}
