use crate::auth::extract::MaybeUser;
use crate::auth::guard::{check_catalog, Method};
use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::models::page::paginate;
use crate::models::title::{Title, TitleCreate, TitleFilter, TitleListQuery, TitleOut, TitlePatch};
use crate::utils::time::current_year;
use crate::validation::fields::{validate_name, validate_year};
use crate::wal::wal::WalOperation;
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::info;

fn check_references(
    state: &AppState,
    genres: &[String],
    category: Option<&str>,
) -> Result<(), ApiError> {
    for slug in genres {
        if !state.catalog.genre_exists(slug) {
            return Err(ApiError::InvalidFormat("genre"));
        }
    }
    if let Some(slug) = category {
        if !state.catalog.category_exists(slug) {
            return Err(ApiError::InvalidFormat("category"));
        }
    }
    Ok(())
}

fn title_out(state: &AppState, title: &Title) -> TitleOut {
    TitleOut::from_title(title, state.reviews.average_for_title(title.id))
}

/// GET /api/v1/titles
pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TitleListQuery>,
) -> Response {
    let filter = TitleFilter {
        category: query.category,
        genre: query.genre,
        year: query.year,
        name: query.name,
    };
    let titles: Vec<TitleOut> = state
        .catalog
        .list_titles(&filter)
        .iter()
        .map(|title| title_out(&state, title))
        .collect();

    Json(paginate(titles, query.page, query.page_size)).into_response()
}

/// POST /api/v1/titles
pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    MaybeUser(caller): MaybeUser,
    Json(payload): Json<TitleCreate>,
) -> Result<Response, ApiError> {
    check_catalog(&caller, Method::Mutate)?;
    validate_name(&payload.name)?;
    validate_year(payload.year, current_year())?;
    check_references(&state, &payload.genre, payload.category.as_deref())?;

    let title = state.catalog.add_title(Title {
        id: 0,
        name: payload.name,
        year: payload.year,
        description: payload.description,
        genre: payload.genre,
        category: payload.category,
    });
    state.record(WalOperation::AddTitle {
        title: (*title).clone(),
    });

    info!(title_id = title.id, name = %title.name, "Title created");

    Ok((StatusCode::CREATED, Json(title_out(&state, &title))).into_response())
}

/// GET /api/v1/titles/{title_id}
pub async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(title_id): Path<u64>,
) -> Result<Json<TitleOut>, ApiError> {
    let title = state
        .catalog
        .get_title(title_id)
        .ok_or_else(|| ApiError::NotFound("Title not found".to_string()))?;
    Ok(Json(title_out(&state, &title)))
}

/// PATCH /api/v1/titles/{title_id}
pub async fn patch_handler(
    State(state): State<Arc<AppState>>,
    MaybeUser(caller): MaybeUser,
    Path(title_id): Path<u64>,
    Json(patch): Json<TitlePatch>,
) -> Result<Json<TitleOut>, ApiError> {
    check_catalog(&caller, Method::Mutate)?;

    let title = state
        .catalog
        .get_title(title_id)
        .ok_or_else(|| ApiError::NotFound("Title not found".to_string()))?;
    let mut updated = (*title).clone();

    if let Some(name) = patch.name {
        validate_name(&name)?;
        updated.name = name;
    }
    if let Some(year) = patch.year {
        validate_year(year, current_year())?;
        updated.year = year;
    }
    if let Some(description) = patch.description {
        updated.description = Some(description);
    }
    if let Some(genre) = patch.genre {
        check_references(&state, &genre, None)?;
        updated.genre = genre;
    }
    if let Some(category) = patch.category {
        check_references(&state, &[], Some(&category))?;
        updated.category = Some(category);
    }

    let updated = state
        .catalog
        .replace_title(updated)
        .ok_or_else(|| ApiError::NotFound("Title not found".to_string()))?;
    state.record(WalOperation::UpdateTitle {
        title: (*updated).clone(),
    });

    Ok(Json(title_out(&state, &updated)))
}

/// DELETE /api/v1/titles/{title_id}
///
/// Cascades: the title's reviews (and their comments) go with it.
pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    MaybeUser(caller): MaybeUser,
    Path(title_id): Path<u64>,
) -> Result<Response, ApiError> {
    check_catalog(&caller, Method::Mutate)?;

    state
        .catalog
        .remove_title(title_id)
        .ok_or_else(|| ApiError::NotFound("Title not found".to_string()))?;
    let removed_reviews = state.reviews.remove_for_title(title_id);
    state.record(WalOperation::RemoveTitle { id: title_id });

    info!(title_id, removed_reviews, "Title removed");

    Ok(StatusCode::NO_CONTENT.into_response())
}
