use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

/// Uniform response envelope for every JSON endpoint. `meta` is reserved
/// for pagination cursors and is omitted from the payload when absent.
#[derive(Serialize)]
pub struct Envelope {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Value>,
}

pub struct ApiResponse {
    status: StatusCode,
    envelope: Envelope,
}

impl ApiResponse {
    pub fn ok<T: Serialize>(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Envelope {
                code: "ok",
                message: "ok".to_string(),
                data: serde_json::to_value(data).ok(),
                meta: None,
            },
        }
    }

    pub fn created<T: Serialize>(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            envelope: Envelope {
                code: "created",
                message: "created".to_string(),
                data: serde_json::to_value(data).ok(),
                meta: None,
            },
        }
    }

    pub fn ok_with_meta<T: Serialize, M: Serialize>(data: T, meta: M) -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Envelope {
                code: "ok",
                message: "ok".to_string(),
                data: serde_json::to_value(data).ok(),
                meta: serde_json::to_value(meta).ok(),
            },
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(error = %self, code = self.code(), "request failed");

        let envelope = Envelope {
            code: self.code(),
            message: self.client_message(),
            data: None,
            meta: None,
        };

        (status, Json(envelope)).into_response()
    }
}
