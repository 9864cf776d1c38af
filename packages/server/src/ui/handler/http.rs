//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};
use kairo_shared::time::timestamp_to_jst_rfc3339;

use crate::{
    infrastructure::dto::http::{ConnectionSummaryDto, HealthDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
    })
}

/// List the clients currently registered, sorted by display name then id
pub async fn list_connections(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<ConnectionSummaryDto>> {
    let mut connections = state.registry.snapshot().await;
    connections.sort_by(|a, b| {
        a.display_name
            .as_str()
            .cmp(b.display_name.as_str())
            .then_with(|| a.id.cmp(&b.id))
    });

    Json(
        connections
            .into_iter()
            .map(|c| ConnectionSummaryDto {
                id: c.id.into_string(),
                display_name: c.display_name.into_string(),
                connected_at: timestamp_to_jst_rfc3339(c.connected_at.value()),
            })
            .collect(),
    )
}
