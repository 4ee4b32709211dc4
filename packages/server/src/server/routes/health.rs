use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::kernel::ServerDeps;

const DB_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    database: DatabaseHealth,
    connection_pool: ConnectionPoolHealth,
    live: LiveHealth,
}

#[derive(Serialize)]
pub struct DatabaseHealth {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
pub struct ConnectionPoolHealth {
    size: u32,
    idle_connections: usize,
    max_connections: u32,
}

/// In-process state: open sessions and engagement stream topics.
#[derive(Serialize)]
pub struct LiveHealth {
    sessions: usize,
    stream_topics: usize,
}

impl DatabaseHealth {
    fn error(message: String) -> Self {
        Self {
            status: "error",
            error: Some(message),
        }
    }
}

/// Health check endpoint
///
/// 200 when the database answers within five seconds, 503 otherwise. Session
/// and stream counts are informational and never fail the check.
pub async fn health_handler(
    Extension(deps): Extension<Arc<ServerDeps>>,
) -> (StatusCode, Json<HealthResponse>) {
    let database = match tokio::time::timeout(
        DB_CHECK_TIMEOUT,
        sqlx::query("SELECT 1").execute(&deps.db_pool),
    )
    .await
    {
        Ok(Ok(_)) => DatabaseHealth {
            status: "ok",
            error: None,
        },
        Ok(Err(e)) => DatabaseHealth::error(format!("Query failed: {}", e)),
        Err(_) => DatabaseHealth::error("Query timeout (>5s)".to_string()),
    };

    let connection_pool = ConnectionPoolHealth {
        size: deps.db_pool.size(),
        idle_connections: deps.db_pool.num_idle(),
        max_connections: deps.db_pool.options().get_max_connections(),
    };

    let live = LiveHealth {
        sessions: deps.sessions.open_count().await,
        stream_topics: deps.stream_hub.topic_count().await,
    };

    let (status_code, status) = if database.error.is_none() {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            database,
            connection_pool,
            live,
        }),
    )
}
