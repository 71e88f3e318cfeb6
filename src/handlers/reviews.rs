use crate::auth::extract::MaybeUser;
use crate::auth::guard::{check_review, Caller, Method};
use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::models::page::paginate;
use crate::models::review::{ListQuery, Review, ReviewCreate, ReviewPatch};
use crate::utils::time::current_timestamp;
use crate::validation::fields::{validate_score, validate_text};
use crate::wal::wal::WalOperation;
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::info;

fn require_title(state: &AppState, title_id: u64) -> Result<(), ApiError> {
    if state.catalog.get_title(title_id).is_none() {
        return Err(ApiError::NotFound("Title not found".to_string()));
    }
    Ok(())
}

/// A review addressed through a title it does not belong to is a 404.
fn find_review(state: &AppState, title_id: u64, review_id: u64) -> Result<Arc<Review>, ApiError> {
    require_title(state, title_id)?;
    state
        .reviews
        .get_review(review_id)
        .filter(|review| review.title_id == title_id)
        .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))
}

fn authenticated(caller: &Caller) -> Result<&str, ApiError> {
    caller.username().ok_or(ApiError::Unauthenticated)
}

/// GET /api/v1/titles/{title_id}/reviews
pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    Path(title_id): Path<u64>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    require_title(&state, title_id)?;
    let reviews: Vec<Review> = state
        .reviews
        .list_for_title(title_id)
        .iter()
        .map(|review| (**review).clone())
        .collect();
    Ok(Json(paginate(reviews, query.page, query.page_size)).into_response())
}

/// POST /api/v1/titles/{title_id}/reviews
pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    MaybeUser(caller): MaybeUser,
    Path(title_id): Path<u64>,
    Json(payload): Json<ReviewCreate>,
) -> Result<Response, ApiError> {
    check_review(&caller, Method::Mutate, None)?;
    require_title(&state, title_id)?;
    validate_text(&payload.text)?;
    validate_score(payload.score)?;

    let author = authenticated(&caller)?.to_string();
    let review = state
        .reviews
        .add_review(
            title_id,
            author,
            payload.text,
            payload.score,
            current_timestamp(),
        )
        .ok_or(ApiError::DuplicateReview)?;

    state.record(WalOperation::AddReview {
        review: (*review).clone(),
    });

    info!(review_id = review.id, title_id, author = %review.author, "Review created");

    Ok((StatusCode::CREATED, Json((*review).clone())).into_response())
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path((title_id, review_id)): Path<(u64, u64)>,
) -> Result<Json<Review>, ApiError> {
    let review = find_review(&state, title_id, review_id)?;
    Ok(Json((*review).clone()))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn patch_handler(
    State(state): State<Arc<AppState>>,
    MaybeUser(caller): MaybeUser,
    Path((title_id, review_id)): Path<(u64, u64)>,
    Json(patch): Json<ReviewPatch>,
) -> Result<Json<Review>, ApiError> {
    let review = find_review(&state, title_id, review_id)?;
    check_review(&caller, Method::Mutate, Some(&review.author))?;

    let mut updated = (*review).clone();
    if let Some(text) = patch.text {
        validate_text(&text)?;
        updated.text = text;
    }
    if let Some(score) = patch.score {
        validate_score(score)?;
        updated.score = score;
    }

    let updated = state
        .reviews
        .replace_review(updated)
        .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))?;
    state.record(WalOperation::UpdateReview {
        review: (*updated).clone(),
    });

    Ok(Json((*updated).clone()))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    MaybeUser(caller): MaybeUser,
    Path((title_id, review_id)): Path<(u64, u64)>,
) -> Result<Response, ApiError> {
    let review = find_review(&state, title_id, review_id)?;
    check_review(&caller, Method::Mutate, Some(&review.author))?;

    state.reviews.remove_review(review_id);
    state.record(WalOperation::RemoveReview { id: review_id });

    info!(review_id, title_id, "Review removed");

    Ok(StatusCode::NO_CONTENT.into_response())
}
