use crate::auth::extract::AuthUser;
use crate::auth::guard::{can_assign_role, check_user_admin};
use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::models::catalog::CatalogListQuery;
use crate::models::page::paginate;
use crate::models::user::{AdminCreateUser, ProfileUpdate, User, UserProfile};
use crate::validation::fields::{validate_email, validate_username};
use crate::wal::wal::WalOperation;
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::info;

/// Own profile.
///
/// GET /api/v1/users/me
pub async fn me_get_handler(auth: AuthUser) -> Json<UserProfile> {
    Json(UserProfile::from(&*auth.user))
}

/// Partial update of the caller's own record. A supplied role is applied
/// only when the caller is an admin; for everyone else it is silently
/// ignored.
///
/// PATCH /api/v1/users/me
pub async fn me_patch_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(patch): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>, ApiError> {
    let caller = auth.caller();
    let updated = apply_patch(&state, &auth.user, patch, can_assign_role(&caller))?;
    Ok(Json(UserProfile::from(&*updated)))
}

/// Admin listing of all users, searchable by username substring.
///
/// GET /api/v1/users
pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<CatalogListQuery>,
) -> Result<Response, ApiError> {
    check_user_admin(&auth.caller())?;

    let needle = query.search.as_deref().map(str::to_lowercase);
    let profiles: Vec<UserProfile> = state
        .users
        .list()
        .iter()
        .filter(|user| match &needle {
            Some(needle) => user.username.to_lowercase().contains(needle),
            None => true,
        })
        .map(|user| UserProfile::from(&**user))
        .collect();

    Ok(Json(paginate(profiles, query.page, query.page_size)).into_response())
}

/// Admin-side user creation. The created account still authenticates
/// through its confirmation code, which is dispatched by mail.
///
/// POST /api/v1/users
pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<AdminCreateUser>,
) -> Result<Response, ApiError> {
    check_user_admin(&auth.caller())?;

    if state.users.email_taken(&payload.email) {
        return Err(ApiError::DuplicateEmail);
    }
    validate_username(&payload.username)?;
    validate_email(&payload.email)?;

    let mut user = User::new(payload.username, payload.email);
    user.first_name = payload.first_name;
    user.last_name = payload.last_name;
    user.bio = payload.bio;
    user.role = payload.role;

    let user = state.users.insert(user)?;
    state.record(WalOperation::AddUser {
        user: (*user).clone(),
    });

    state
        .mailer
        .dispatch_confirmation_code(&user.email, &user.confirmation_code);

    info!(username = %user.username, role = ?user.role, "User created by admin");

    Ok((StatusCode::CREATED, Json(UserProfile::from(&*user))).into_response())
}

/// GET /api/v1/users/{username}
pub async fn get_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    check_user_admin(&auth.caller())?;

    let user = state.users.get(&username).ok_or(ApiError::UserNotFound)?;
    Ok(Json(UserProfile::from(&*user)))
}

/// Admin partial update of any user, role included.
///
/// PATCH /api/v1/users/{username}
pub async fn patch_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(username): Path<String>,
    Json(patch): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>, ApiError> {
    check_user_admin(&auth.caller())?;

    let user = state.users.get(&username).ok_or(ApiError::UserNotFound)?;
    let updated = apply_patch(&state, &user, patch, true)?;
    Ok(Json(UserProfile::from(&*updated)))
}

/// DELETE /api/v1/users/{username}
pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    check_user_admin(&auth.caller())?;

    state.users.remove(&username).ok_or(ApiError::UserNotFound)?;
    state.record(WalOperation::RemoveUser {
        username: username.clone(),
    });

    info!(username = %username, "User removed");

    Ok(StatusCode::NO_CONTENT.into_response())
}

fn apply_patch(
    state: &AppState,
    user: &User,
    patch: ProfileUpdate,
    role_writable: bool,
) -> Result<Arc<User>, ApiError> {
    let mut updated = user.clone();

    if let Some(email) = patch.email {
        validate_email(&email)?;
        updated.email = email;
    }
    if let Some(first_name) = patch.first_name {
        updated.first_name = first_name;
    }
    if let Some(last_name) = patch.last_name {
        updated.last_name = last_name;
    }
    if let Some(bio) = patch.bio {
        updated.bio = Some(bio);
    }
    if let Some(role) = patch.role {
        if role_writable {
            updated.role = role;
        }
    }

    let updated = state.users.replace(updated)?;
    state.record(WalOperation::UpdateUser {
        user: (*updated).clone(),
    });
    Ok(updated)
}
