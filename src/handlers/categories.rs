use crate::auth::extract::MaybeUser;
use crate::auth::guard::{check_catalog, Method};
use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::models::catalog::{CatalogItemCreate, CatalogListQuery, Category};
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

/// GET /api/v1/categories
pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CatalogListQuery>,
) -> Response {
    let categories = state.catalog.list_categories(query.search.as_deref());
    Json(paginate(categories, query.page, query.page_size)).into_response()
}

/// POST /api/v1/categories
pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    MaybeUser(caller): MaybeUser,
    Json(payload): Json<CatalogItemCreate>,
) -> Result<Response, ApiError> {
    check_catalog(&caller, Method::Mutate)?;
    validate_name(&payload.name)?;
    validate_slug(&payload.slug)?;

    let category = Category {
        name: payload.name,
        slug: payload.slug,
    };
    if !state.catalog.insert_category(category.clone()) {
        return Err(ApiError::DuplicateSlug);
    }
    state.record(WalOperation::AddCategory {
        category: category.clone(),
    });

    info!(slug = %category.slug, "Category created");

    Ok((StatusCode::CREATED, Json(category)).into_response())
}

/// GET /api/v1/categories/{slug}
pub async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Category>, ApiError> {
    state
        .catalog
        .get_category(&slug)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))
}

/// DELETE /api/v1/categories/{slug}
pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    MaybeUser(caller): MaybeUser,
    Path(slug): Path<String>,
) -> Result<Response, ApiError> {
    check_catalog(&caller, Method::Mutate)?;

    state
        .catalog
        .remove_category(&slug)
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;
    state.record(WalOperation::RemoveCategory { slug: slug.clone() });

    info!(slug = %slug, "Category removed");

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::guard::Caller;
    use crate::core::config::tests::valid_config;
    use crate::models::user::Role;
    use crate::wal::wal::Wal;
    use tempfile::TempDir;

    // The TempDir guard keeps the WAL file alive for the test's duration.
    fn test_state() -> (TempDir, Arc<AppState>) {
        let temp_dir = TempDir::new().unwrap();
        let wal = Wal::new(temp_dir.path().join("test.wal")).unwrap();
        let state = Arc::new(AppState::new(valid_config(), wal).unwrap());
        (temp_dir, state)
    }

    fn admin() -> MaybeUser {
        MaybeUser(Caller::Authenticated {
            username: "root".to_string(),
            role: Role::Admin,
        })
    }

    fn create(name: &str, slug: &str) -> Json<CatalogItemCreate> {
        Json(CatalogItemCreate {
            name: name.to_string(),
            slug: slug.to_string(),
        })
    }

    #[tokio::test]
    async fn test_create_then_get_by_slug() {
        let (_dir, state) = test_state();
        create_handler(State(state.clone()), admin(), create("Movies", "movies"))
            .await
            .unwrap();

        let Json(category) = get_handler(State(state), Path("movies".to_string()))
            .await
            .unwrap();
        assert_eq!(category.name, "Movies");
    }

    #[tokio::test]
    async fn test_get_unknown_slug_404() {
        let (_dir, state) = test_state();
        let err = get_handler(State(state), Path("nope".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_moderator_cannot_mutate_catalog() {
        let (_dir, state) = test_state();
        let caller = MaybeUser(Caller::Authenticated {
            username: "mod".to_string(),
            role: Role::Moderator,
        });
        let err = create_handler(State(state), caller, create("Movies", "movies"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let (_dir, state) = test_state();
        create_handler(State(state.clone()), admin(), create("Movies", "movies"))
            .await
            .unwrap();
        let err = create_handler(State(state), admin(), create("Films", "movies"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateSlug));
    }

    #[tokio::test]
    async fn test_delete_removes_category() {
        let (_dir, state) = test_state();
        create_handler(State(state.clone()), admin(), create("Movies", "movies"))
            .await
            .unwrap();

        let response = delete_handler(State(state.clone()), admin(), Path("movies".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(!state.catalog.category_exists("movies"));
    }
}
