//! Public product catalog passthrough.

use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error, instrument};

use seengroup_common::envelope::{error_or, is_success};
use seengroup_common::models::ProductFilters;

use crate::backend::BackendClient;
use crate::state::SharedState;

fn failure(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "success": false, "data": [], "error": message }))).into_response()
}

/// `GET /api/products`: filters only, the whole catalog comes back in one
/// response and is paged in the browser.
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<SharedState>,
    Query(filters): Query<ProductFilters>,
) -> Response {
    let sent = BackendClient::send(
        state
            .backend
            .request(Method::GET, "/api/products")
            .query(&filters.query_pairs()),
    )
    .await;

    let reply = match sent {
        Ok(r) => r,
        Err(e) => {
            error!("Error fetching products from backend: {}", e);
            return failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch products".into());
        }
    };
    if !reply.is_ok() {
        error!(status = reply.status, "backend products call failed");
        return failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Backend API error: {}", reply.status),
        );
    }

    match reply.body.get("data").filter(|d| !d.is_null()) {
        Some(data) if is_success(&reply.body) => {
            debug!(count = ?data.as_array().map(Vec::len), "products fetched");
            Json(json!({ "success": true, "data": data })).into_response()
        }
        _ => failure(StatusCode::OK, error_or(&reply.body, "Failed to fetch products")),
    }
}
