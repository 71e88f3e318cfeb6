use crate::auth::extract::MaybeUser;
use crate::auth::guard::{check_review, Method};
use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::models::comment::{Comment, CommentCreate, CommentPatch};
use crate::models::page::paginate;
use crate::models::review::ListQuery;
use crate::utils::time::current_timestamp;
use crate::validation::fields::validate_text;
use crate::wal::wal::WalOperation;
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::info;

/// The review must exist under the addressed title; otherwise the whole
/// comment subtree is a 404.
fn require_review(state: &AppState, title_id: u64, review_id: u64) -> Result<(), ApiError> {
    if state.catalog.get_title(title_id).is_none() {
        return Err(ApiError::NotFound("Title not found".to_string()));
    }
    match state.reviews.get_review(review_id) {
        Some(review) if review.title_id == title_id => Ok(()),
        _ => Err(ApiError::NotFound("Review not found".to_string())),
    }
}

fn find_comment(
    state: &AppState,
    title_id: u64,
    review_id: u64,
    comment_id: u64,
) -> Result<Arc<Comment>, ApiError> {
    require_review(state, title_id, review_id)?;
    state
        .reviews
        .get_comment(comment_id)
        .filter(|comment| comment.review_id == review_id)
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    Path((title_id, review_id)): Path<(u64, u64)>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    require_review(&state, title_id, review_id)?;
    let comments: Vec<Comment> = state
        .reviews
        .list_comments(review_id)
        .iter()
        .map(|comment| (**comment).clone())
        .collect();
    Ok(Json(paginate(comments, query.page, query.page_size)).into_response())
}

/// POST /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    MaybeUser(caller): MaybeUser,
    Path((title_id, review_id)): Path<(u64, u64)>,
    Json(payload): Json<CommentCreate>,
) -> Result<Response, ApiError> {
    check_review(&caller, Method::Mutate, None)?;
    require_review(&state, title_id, review_id)?;
    validate_text(&payload.text)?;

    let author = caller
        .username()
        .ok_or(ApiError::Unauthenticated)?
        .to_string();
    let comment = state
        .reviews
        .add_comment(review_id, author, payload.text, current_timestamp());

    state.record(WalOperation::AddComment {
        comment: (*comment).clone(),
    });

    info!(comment_id = comment.id, review_id, author = %comment.author, "Comment created");

    Ok((StatusCode::CREATED, Json((*comment).clone())).into_response())
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path((title_id, review_id, comment_id)): Path<(u64, u64, u64)>,
) -> Result<Json<Comment>, ApiError> {
    let comment = find_comment(&state, title_id, review_id, comment_id)?;
    Ok(Json((*comment).clone()))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn patch_handler(
    State(state): State<Arc<AppState>>,
    MaybeUser(caller): MaybeUser,
    Path((title_id, review_id, comment_id)): Path<(u64, u64, u64)>,
    Json(patch): Json<CommentPatch>,
) -> Result<Json<Comment>, ApiError> {
    let comment = find_comment(&state, title_id, review_id, comment_id)?;
    check_review(&caller, Method::Mutate, Some(&comment.author))?;

    let mut updated = (*comment).clone();
    if let Some(text) = patch.text {
        validate_text(&text)?;
        updated.text = text;
    }

    let updated = state
        .reviews
        .replace_comment(updated)
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;
    state.record(WalOperation::UpdateComment {
        comment: (*updated).clone(),
    });

    Ok(Json((*updated).clone()))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    MaybeUser(caller): MaybeUser,
    Path((title_id, review_id, comment_id)): Path<(u64, u64, u64)>,
) -> Result<Response, ApiError> {
    let comment = find_comment(&state, title_id, review_id, comment_id)?;
    check_review(&caller, Method::Mutate, Some(&comment.author))?;

    state.reviews.remove_comment(comment_id);
    state.record(WalOperation::RemoveComment { id: comment_id });

    info!(comment_id, review_id, "Comment removed");

    Ok(StatusCode::NO_CONTENT.into_response())
}
