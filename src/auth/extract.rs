// Request extractors and the sliding-expiry refresh layer

use crate::auth::guard::Caller;
use crate::auth::token::TokenSigner;
use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::models::user::User;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

fn authenticate(state: &AppState, auth_header: &str) -> Result<Arc<User>, ApiError> {
    let token = TokenSigner::extract_bearer(auth_header)?;
    let claims = state.tokens.verify(token)?;
    // The account may have been deleted after issuance; a token for a
    // missing user is worthless.
    state
        .users
        .get(&claims.sub)
        .ok_or(ApiError::Unauthenticated)
}

/// Extractor for endpoints that require a valid token.
pub struct AuthUser {
    pub user: Arc<User>,
}

impl AuthUser {
    pub fn caller(&self) -> Caller {
        Caller::Authenticated {
            username: self.user.username.clone(),
            role: self.user.role,
        }
    }
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = bearer_token(&parts.headers).ok_or(ApiError::Unauthenticated)?;
        let user = authenticate(state, header)?;
        Ok(AuthUser { user })
    }
}

/// Extractor for endpoints readable by anyone: absent credentials give an
/// anonymous caller, but a present-yet-invalid token is still rejected.
pub struct MaybeUser(pub Caller);

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(&parts.headers) {
            None => Ok(MaybeUser(Caller::Anonymous)),
            Some(header) => {
                let user = authenticate(state, header)?;
                Ok(MaybeUser(Caller::Authenticated {
                    username: user.username.clone(),
                    role: user.role,
                }))
            }
        }
    }
}

pub const REFRESHED_TOKEN_HEADER: &str = "x-refreshed-token";

/// Sliding-expiry layer: every request carrying a valid token gets a
/// re-issued token with a fresh expiry in the `x-refreshed-token`
/// response header. Invalid or absent tokens pass through untouched; the
/// extractors handle rejection where authentication is required.
pub async fn sliding_refresh(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let subject = bearer_token(request.headers())
        .and_then(|header| TokenSigner::extract_bearer(header).ok())
        .and_then(|token| state.tokens.verify(token).ok())
        .map(|claims| claims.sub);

    let mut response = next.run(request).await;

    if let Some(username) = subject {
        if let Ok(fresh) = state.tokens.issue(&username) {
            if let Ok(value) = HeaderValue::from_str(&fresh) {
                response
                    .headers_mut()
                    .insert(REFRESHED_TOKEN_HEADER, value);
            }
        }
    }

    response
}
