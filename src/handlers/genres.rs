use crate::auth::extract::MaybeUser;
use crate::auth::guard::{check_catalog, Method};
use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::models::catalog::{CatalogItemCreate, CatalogListQuery, Genre};
use crate::models::page::paginate;
use crate::validation::fields::{validate_name, validate_slug};
use crate::wal::wal::WalOperation;
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::info;

/// GET /api/v1/genres
pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CatalogListQuery>,
) -> Response {
    let genres = state.catalog.list_genres(query.search.as_deref());
    Json(paginate(genres, query.page, query.page_size)).into_response()
}

/// POST /api/v1/genres
pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    MaybeUser(caller): MaybeUser,
    Json(payload): Json<CatalogItemCreate>,
) -> Result<Response, ApiError> {
    check_catalog(&caller, Method::Mutate)?;
    validate_name(&payload.name)?;
    validate_slug(&payload.slug)?;

    let genre = Genre {
        name: payload.name,
        slug: payload.slug,
    };
    if !state.catalog.insert_genre(genre.clone()) {
        return Err(ApiError::DuplicateSlug);
    }
    state.record(WalOperation::AddGenre {
        genre: genre.clone(),
    });

    info!(slug = %genre.slug, "Genre created");

    Ok((StatusCode::CREATED, Json(genre)).into_response())
}

/// DELETE /api/v1/genres/{slug}
pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    MaybeUser(caller): MaybeUser,
    Path(slug): Path<String>,
) -> Result<Response, ApiError> {
    check_catalog(&caller, Method::Mutate)?;

    state
        .catalog
        .remove_genre(&slug)
        .ok_or_else(|| ApiError::NotFound("Genre not found".to_string()))?;
    state.record(WalOperation::RemoveGenre { slug: slug.clone() });

    info!(slug = %slug, "Genre removed");

    Ok(StatusCode::NO_CONTENT.into_response())
}
