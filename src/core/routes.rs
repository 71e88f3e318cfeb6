// HTTP routes configuration

use crate::auth::extract::sliding_refresh;
use crate::core::state::AppState;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Account endpoints
        .route("/api/v1/auth/signup", post(crate::handlers::auth::signup_handler))
        .route("/api/v1/auth/token", post(crate::handlers::auth::token_handler))
        .route(
            "/api/v1/users/me",
            get(crate::handlers::users::me_get_handler).patch(crate::handlers::users::me_patch_handler),
        )
        .route(
            "/api/v1/users",
            get(crate::handlers::users::list_handler).post(crate::handlers::users::create_handler),
        )
        .route(
            "/api/v1/users/{username}",
            get(crate::handlers::users::get_handler)
                .patch(crate::handlers::users::patch_handler)
                .delete(crate::handlers::users::delete_handler),
        )
        // Catalog endpoints
        .route(
            "/api/v1/genres",
            get(crate::handlers::genres::list_handler).post(crate::handlers::genres::create_handler),
        )
        .route("/api/v1/genres/{slug}", delete(crate::handlers::genres::delete_handler))
        .route(
            "/api/v1/categories",
            get(crate::handlers::categories::list_handler)
                .post(crate::handlers::categories::create_handler),
        )
        .route(
            "/api/v1/categories/{slug}",
            get(crate::handlers::categories::get_handler)
                .delete(crate::handlers::categories::delete_handler),
        )
        .route(
            "/api/v1/titles",
            get(crate::handlers::titles::list_handler).post(crate::handlers::titles::create_handler),
        )
        .route(
            "/api/v1/titles/{title_id}",
            get(crate::handlers::titles::get_handler)
                .patch(crate::handlers::titles::patch_handler)
                .delete(crate::handlers::titles::delete_handler),
        )
        // Review and comment endpoints, nested under their title
        .route(
            "/api/v1/titles/{title_id}/reviews",
            get(crate::handlers::reviews::list_handler)
                .post(crate::handlers::reviews::create_handler),
        )
        .route(
            "/api/v1/titles/{title_id}/reviews/{review_id}",
            get(crate::handlers::reviews::get_handler)
                .patch(crate::handlers::reviews::patch_handler)
                .delete(crate::handlers::reviews::delete_handler),
        )
        .route(
            "/api/v1/titles/{title_id}/reviews/{review_id}/comments",
            get(crate::handlers::comments::list_handler)
                .post(crate::handlers::comments::create_handler),
        )
        .route(
            "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
            get(crate::handlers::comments::get_handler)
                .patch(crate::handlers::comments::patch_handler)
                .delete(crate::handlers::comments::delete_handler),
        )
        // Operational endpoints
        .route("/health", get(crate::handlers::health::health_handler))
        .route("/metrics", get(crate::handlers::metrics::metrics_handler))
        // 404 fallback for all unmatched routes
        .fallback(crate::handlers::fallback::fallback_handler)
        .layer(middleware::from_fn_with_state(state.clone(), sliding_refresh))
        .with_state(state)
}
