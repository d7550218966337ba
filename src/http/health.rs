use serde_json::json;

use super::response::ApiResponse;

pub async fn health() -> ApiResponse {
    ApiResponse::ok(json!({ "status": "healthy" }))
}
