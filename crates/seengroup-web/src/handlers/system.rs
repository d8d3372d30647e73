//! Liveness and health checks.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::state::SharedState;

/// `GET /livez`
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// `GET /healthz`: reports which backend this instance talks to. The
/// backend itself is not contacted.
pub async fn healthz(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({ "status": "ok", "backend": state.backend.base_url() }))
}
