//! API routes

pub mod health;
pub mod sites;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{middleware::attach_site, state::AppState};

/// Create all API routes
pub fn create_router(state: AppState) -> Router {
    let site_routes = Router::new()
        .route("/site", get(sites::current_site))
        .route("/site/default", get(sites::default_site))
        .route("/sites", get(sites::list_sites))
        .route("/sites", post(sites::create_site))
        .route("/sites/:id", get(sites::get_site))
        .route("/sites/:id", put(sites::update_site))
        .route("/sites/:id", delete(sites::delete_site))
        .route("/admin/cache", get(sites::cache_stats))
        .route("/admin/cache/clear", post(sites::clear_host_cache));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .merge(site_routes)
        .layer(middleware::from_fn_with_state(state.clone(), attach_site))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::MemorySiteStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state(default_site_id: Option<i64>) -> AppState {
        let store = Arc::new(MemorySiteStore::new());
        store.insert_with_id(1, "example.com", "Example").unwrap();
        AppState::new(
            Config {
                bind_address: "127.0.0.1:0".to_string(),
                database_url: "postgres://unused".to_string(),
                database_max_connections: 1,
                default_site_id,
            },
            store,
        )
    }

    #[tokio::test]
    async fn test_current_site_route() {
        let app = create_router(test_state(None));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/site")
                    .header("Host", "example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_current_site_unknown_host_is_ok() {
        // Unknown hosts resolve to a transient site, not an error
        let app = create_router(test_state(None));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/site")
                    .header("Host", "nowhere.test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_default_site_unconfigured_is_500() {
        let app = create_router(test_state(None));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/site/default")
                    .header("Host", "example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_default_site_configured() {
        let app = create_router(test_state(Some(1)));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/site/default")
                    .header("Host", "example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_delete_missing_site_is_404() {
        let app = create_router(test_state(None));

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/sites/99")
                    .header("Host", "example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
