// Metrics endpoint

use crate::auth::extract::AuthUser;
use crate::auth::guard::check_user_admin;
use crate::core::error::ApiError;
use crate::core::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

/// Returns JSON with service statistics:
/// - Registration and token issuance counters
/// - Live store sizes (users, titles, genres, categories, reviews, comments)
/// - Uptime
///
/// Admin token required.
///
/// GET /metrics
pub async fn metrics_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Response, ApiError> {
    check_user_admin(&auth.caller())?;

    let snapshot = state
        .metrics
        .get_snapshot(&state.users, &state.catalog, &state.reviews);

    Ok((StatusCode::OK, Json(snapshot)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::tests::valid_config;
    use crate::metrics::collector::MetricsSnapshot;
    use crate::models::user::{Role, User};
    use crate::wal::wal::Wal;
    use tempfile::TempDir;

    // The TempDir guard keeps the WAL file alive for the test's duration.
    fn test_state() -> (TempDir, Arc<AppState>) {
        let temp_dir = TempDir::new().unwrap();
        let wal = Wal::new(temp_dir.path().join("test.wal")).unwrap();
        let state = Arc::new(AppState::new(valid_config(), wal).unwrap());
        (temp_dir, state)
    }

    fn auth_as(state: &AppState, username: &str, role: Role) -> AuthUser {
        let mut user = User::new(username.to_string(), format!("{username}@x.com"));
        user.role = role;
        AuthUser {
            user: state.users.insert(user).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_metrics_requires_admin() {
        let (_dir, state) = test_state();
        let auth = auth_as(&state, "alice", Role::User);

        let err = metrics_handler(State(state), auth).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[tokio::test]
    async fn test_metrics_snapshot_reflects_activity() {
        use axum::body::Body;
        use http_body_util::BodyExt;

        let (_dir, state) = test_state();
        let auth = auth_as(&state, "root", Role::Admin);

        state.metrics.increment_registrations();
        state.metrics.increment_tokens_issued();

        let response = metrics_handler(State(state), auth).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (_, body) = response.into_parts();
        let body = Body::new(body);
        let bytes = body.collect().await.unwrap().to_bytes();
        let snapshot: MetricsSnapshot = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(snapshot.registrations, 1);
        assert_eq!(snapshot.tokens_issued, 1);
        assert_eq!(snapshot.users, 1);
        assert!(snapshot.uptime_seconds >= 0);
    }
}
