use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::warn;

use skucatalog_core::CatalogError;

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    let code = err.code();
    match err {
        CatalogError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, code, msg),
        CatalogError::Conflict(msg) => json_error(StatusCode::CONFLICT, code, msg),
        CatalogError::Validation(msg) | CatalogError::InvalidArgument(msg) => {
            json_error(StatusCode::BAD_REQUEST, code, msg)
        }
        CatalogError::Transport(msg) => {
            warn!(error = %msg, "catalog call failed");
            json_error(StatusCode::BAD_GATEWAY, code, msg)
        }
    }
}

/// Unreadable or mistyped request bodies, in the same envelope as other failures.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_argument", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_each_kind_to_its_status() {
        let cases = [
            (CatalogError::not_found("x"), StatusCode::NOT_FOUND),
            (CatalogError::conflict("x"), StatusCode::CONFLICT),
            (CatalogError::validation("x"), StatusCode::BAD_REQUEST),
            (CatalogError::invalid_argument("x"), StatusCode::BAD_REQUEST),
            (CatalogError::transport("x"), StatusCode::BAD_GATEWAY),
        ];
        for (err, status) in cases {
            assert_eq!(catalog_error_to_response(err).status(), status);
        }
    }
}
