use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use opsdash_core::{Dashboard, DashboardRequest, ErrorKind, LogSource, Trigger};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub unit: Option<String>,
    pub channel: Option<String>,
    #[serde(default)]
    pub trigger: Trigger,
}

pub fn router<S: LogSource + 'static>(dashboard: Arc<Dashboard<S>>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/units", get(list_units::<S>))
        .route("/api/dashboard", get(dashboard_view::<S>))
        .with_state(dashboard)
}

pub async fn health_check() -> &'static str {
    "ok"
}

async fn list_units<S: LogSource + 'static>(
    State(dashboard): State<Arc<Dashboard<S>>>,
) -> impl IntoResponse {
    Json(dashboard.units())
}

/// Recomputes the view for one selection. Loading is blocking file I/O, so it runs on the
/// blocking pool.
async fn dashboard_view<S: LogSource + 'static>(
    State(dashboard): State<Arc<Dashboard<S>>>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let unit = query
        .unit
        .or_else(|| dashboard.config().default_unit().map(str::to_string));
    let Some(unit) = unit else {
        return (StatusCode::NOT_FOUND, "no units configured").into_response();
    };

    let request = DashboardRequest {
        unit,
        channel: query.channel,
        trigger: query.trigger,
    };

    let worker = Arc::clone(&dashboard);
    match tokio::task::spawn_blocking(move || worker.respond(&request)).await {
        Ok(response) => {
            let status = match response.error.as_ref().map(|err| err.kind) {
                Some(ErrorKind::UnknownUnit) => StatusCode::NOT_FOUND,
                _ => StatusCode::OK,
            };
            (status, Json(response)).into_response()
        }
        Err(err) => {
            tracing::error!("dashboard task failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
