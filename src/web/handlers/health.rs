//! Health check handler.

use axum::Json;

use crate::datetime;
use crate::web::dto::HealthResponse;

/// GET /api/health - Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        status: "up",
        time: datetime::now_iso(),
    })
}
