/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// Always answers 200 so load balancers can tell a live process from a dead
/// one. Database trouble shows up as `"status": "degraded"`.
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "pool": { "active_connections": 1, "idle_connections": 4, "total_connections": 5 },
///   "migrations": { "applied_migrations": 1, "latest_version": 20250101000000 }
/// }
/// ```

use crate::app::AppState;
use axum::{extract::State, Json};
use kanban_shared::db::{
    migrations::{get_migration_status, MigrationStatus},
    pool::{get_pool_stats, health_check as ping, PoolStats},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: &'static str,

    pub version: &'static str,

    /// "connected" or "disconnected"
    pub database: &'static str,

    pub pool: PoolStats,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrations: Option<MigrationStatus>,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, database, migrations) = match ping(&state.db).await {
        Ok(()) => {
            let migrations = get_migration_status(&state.db)
                .await
                .map_err(|e| tracing::warn!(error = %e, "Could not read migration status"))
                .ok();
            ("healthy", "connected", migrations)
        }
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            ("degraded", "disconnected", None)
        }
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        database,
        pool: get_pool_stats(&state.db),
        migrations,
    })
}
