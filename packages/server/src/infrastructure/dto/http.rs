//! HTTP API response DTOs for the chat server.

use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
}

/// One registered connection for the connections endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSummaryDto {
    pub id: String,
    pub display_name: String,
    pub connected_at: String, // ISO 8601
}
