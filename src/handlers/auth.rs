use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::models::user::{SignupRequest, SignupResponse, TokenRequest, TokenResponse, User};
use crate::utils::auth::constant_time_eq;
use crate::validation::fields::{validate_email, validate_username};
use crate::wal::wal::WalOperation;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

/// Register a new account and dispatch its confirmation code.
///
/// POST /api/v1/auth/signup
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<Response, ApiError> {
    // The pre-check gives duplicate email precedence over the username
    // checks; the store insert below closes the race for real.
    if state.users.email_taken(&payload.email) {
        return Err(ApiError::DuplicateEmail);
    }
    validate_username(&payload.username)?;
    validate_email(&payload.email)?;

    let user = User::new(payload.username, payload.email);
    let user = state.users.insert(user)?;

    state.record(WalOperation::AddUser {
        user: (*user).clone(),
    });
    state.metrics.increment_registrations();

    state
        .mailer
        .dispatch_confirmation_code(&user.email, &user.confirmation_code);

    info!(username = %user.username, "User registered");

    Ok((
        StatusCode::OK,
        Json(SignupResponse {
            username: user.username.clone(),
            email: user.email.clone(),
        }),
    )
        .into_response())
}

/// Exchange a confirmation code for an access token.
///
/// POST /api/v1/auth/token
pub async fn token_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TokenRequest>,
) -> Result<Response, ApiError> {
    // Unknown username is 404, not 400; clients rely on the distinction.
    let user = state
        .users
        .get(&payload.username)
        .ok_or(ApiError::UserNotFound)?;

    if !constant_time_eq(&payload.confirmation_code, &user.confirmation_code) {
        warn!(username = %user.username, "Confirmation code mismatch");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue(&user.username)?;
    state.metrics.increment_tokens_issued();

    info!(username = %user.username, "Token issued");

    Ok((StatusCode::OK, Json(TokenResponse { token })).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::tests::valid_config;
    use crate::wal::wal::Wal;
    use tempfile::TempDir;

    // The TempDir guard keeps the WAL file alive for the test's duration.
    fn test_state() -> (TempDir, Arc<AppState>) {
        let temp_dir = TempDir::new().unwrap();
        let wal = Wal::new(temp_dir.path().join("test.wal")).unwrap();
        let state = Arc::new(AppState::new(valid_config(), wal).unwrap());
        (temp_dir, state)
    }

    fn signup(username: &str, email: &str) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn test_signup_creates_user_with_default_role() {
        let (_dir, state) = test_state();

        let response = signup_handler(State(state.clone()), Json(signup("alice", "a@x.com")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let user = state.users.get("alice").unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.role, crate::models::user::Role::User);
        assert!(!user.confirmation_code.is_empty());
    }

    #[tokio::test]
    async fn test_signup_duplicate_email_wins_over_invalid_username() {
        let (_dir, state) = test_state();
        signup_handler(State(state.clone()), Json(signup("alice", "a@x.com")))
            .await
            .unwrap();

        // Reserved username AND duplicate email: the email error must win.
        let err = signup_handler(State(state), Json(signup("me", "A@X.COM")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_signup_reserved_username() {
        let (_dir, state) = test_state();
        let err = signup_handler(State(state), Json(signup("ME", "fresh@x.com")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ReservedUsername));
    }

    #[tokio::test]
    async fn test_signup_invalid_email() {
        let (_dir, state) = test_state();
        let err = signup_handler(State(state), Json(signup("alice", "not-an-email")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidFormat("email")));
    }

    #[tokio::test]
    async fn test_signup_logs_to_wal() {
        let (_dir, state) = test_state();
        signup_handler(State(state.clone()), Json(signup("alice", "a@x.com")))
            .await
            .unwrap();

        let ops = state.wal.replay().unwrap();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], WalOperation::AddUser { user } if user.username == "alice"));
    }

    #[tokio::test]
    async fn test_token_unknown_user_is_404() {
        let (_dir, state) = test_state();
        let err = token_handler(
            State(state),
            Json(TokenRequest {
                username: "ghost".to_string(),
                confirmation_code: "whatever".to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::UserNotFound));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_token_wrong_code_is_400() {
        let (_dir, state) = test_state();
        signup_handler(State(state.clone()), Json(signup("alice", "a@x.com")))
            .await
            .unwrap();

        let err = token_handler(
            State(state),
            Json(TokenRequest {
                username: "alice".to_string(),
                confirmation_code: "wrong".to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::InvalidCredentials));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_token_correct_code_yields_verifiable_token() {
        use http_body_util::BodyExt;

        let (_dir, state) = test_state();
        signup_handler(State(state.clone()), Json(signup("alice", "a@x.com")))
            .await
            .unwrap();

        let code = state.users.get("alice").unwrap().confirmation_code.clone();
        let response = token_handler(
            State(state.clone()),
            Json(TokenRequest {
                username: "alice".to_string(),
                confirmation_code: code,
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: TokenResponse = serde_json::from_slice(&bytes).unwrap();
        let claims = state.tokens.verify(&body.token).unwrap();
        assert_eq!(claims.sub, "alice");
    }

    #[tokio::test]
    async fn test_full_registration_flow() {
        use crate::auth::extract::AuthUser;
        use crate::handlers::users::me_patch_handler;
        use crate::models::user::{ProfileUpdate, Role};

        let (_dir, state) = test_state();

        signup_handler(State(state.clone()), Json(signup("alice", "a@x.com")))
            .await
            .unwrap();

        let err = signup_handler(State(state.clone()), Json(signup("bob", "a@x.com")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateEmail));

        let err = token_handler(
            State(state.clone()),
            Json(TokenRequest {
                username: "alice".to_string(),
                confirmation_code: "wrong".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));

        let code = state.users.get("alice").unwrap().confirmation_code.clone();
        let response = token_handler(
            State(state.clone()),
            Json(TokenRequest {
                username: "alice".to_string(),
                confirmation_code: code,
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // A self-granted role upgrade must not stick.
        let auth = AuthUser {
            user: state.users.get("alice").unwrap(),
        };
        me_patch_handler(
            State(state.clone()),
            auth,
            Json(ProfileUpdate {
                role: Some(Role::Admin),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(state.users.get("alice").unwrap().role, Role::User);
    }

    #[tokio::test]
    async fn test_code_survives_token_issuance() {
        let (_dir, state) = test_state();
        signup_handler(State(state.clone()), Json(signup("alice", "a@x.com")))
            .await
            .unwrap();
        let code = state.users.get("alice").unwrap().confirmation_code.clone();

        for _ in 0..2 {
            token_handler(
                State(state.clone()),
                Json(TokenRequest {
                    username: "alice".to_string(),
                    confirmation_code: code.clone(),
                }),
            )
            .await
            .unwrap();
        }
    }
}
