use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use medquote_db::DbPool;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    Ready,
    Degraded,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub database: ComponentStatus,
    pub detail: Option<String>,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let (database, detail) =
        match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&state.db_pool).await {
            Ok(_) => (ComponentStatus::Ready, None),
            Err(error) => {
                (ComponentStatus::Degraded, Some(format!("database query failed: {error}")))
            }
        };

    let ready = database == ComponentStatus::Ready;
    let payload = HealthResponse {
        status: if ready { ComponentStatus::Ready } else { ComponentStatus::Degraded },
        database,
        detail,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode, Json};

    use medquote_db::connect_with_settings;

    use crate::health::{health, ComponentStatus, HealthState};

    #[tokio::test]
    async fn health_returns_ready_when_database_is_reachable() {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 5)
            .await
            .expect("pool should connect");

        let (status, Json(payload)) = health(State(HealthState { db_pool: pool.clone() })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, ComponentStatus::Ready);
        assert_eq!(payload.database, ComponentStatus::Ready);
        assert!(payload.detail.is_none());

        pool.close().await;
    }

    #[tokio::test]
    async fn health_reports_degraded_database() {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 5)
            .await
            .expect("pool should connect");
        pool.close().await;

        let (status, Json(payload)) = health(State(HealthState { db_pool: pool })).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, ComponentStatus::Degraded);
        assert_eq!(payload.database, ComponentStatus::Degraded);
        assert!(payload.detail.is_some());
    }
}
