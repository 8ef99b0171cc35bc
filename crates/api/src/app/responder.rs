//! Success body shapes.
//!
//! Handlers are generic over [`SkuResponder`], so a deployment can swap the
//! envelope without touching routing or resolution.

use serde::Serialize;

use skucatalog_core::Sku;

pub const STATUS_TYPE_SUCCESS: &str = "SUCCESS";

/// Turns resolved SKUs into a response body.
pub trait SkuResponder: Send + Sync + 'static {
    type Body: Serialize + Send;

    fn respond(&self, skus: Vec<Sku>) -> Self::Body;
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseStatus {
    pub status_code: u16,
    pub status_type: &'static str,
    pub total_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmsEnvelope {
    pub data: Vec<Sku>,
    pub status: ResponseStatus,
}

/// The default `{data, status}` envelope.
#[derive(Debug, Copy, Clone, Default)]
pub struct CmsResponder;

impl SkuResponder for CmsResponder {
    type Body = CmsEnvelope;

    fn respond(&self, skus: Vec<Sku>) -> CmsEnvelope {
        CmsEnvelope {
            status: ResponseStatus {
                status_code: 200,
                status_type: STATUS_TYPE_SUCCESS,
                total_count: skus.len(),
            },
            data: skus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_counts_items() {
        let sku = Sku {
            code: "SKU-1".to_string(),
            name: "Tuna Loin".to_string(),
            product_type: None,
            shelf_life: None,
            attributes: Vec::new(),
        };

        let body = serde_json::to_value(CmsResponder.respond(vec![sku])).unwrap();
        assert_eq!(body["status"]["total_count"], 1);
        assert_eq!(body["status"]["status_type"], "SUCCESS");
        assert_eq!(body["data"][0]["code"], "SKU-1");
    }
}
