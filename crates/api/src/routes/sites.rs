//! Site management and resolution routes
//!
//! Mutation handlers pair every successful store write with the resolver's
//! matching invalidation hook so the default-site cache never outlives the
//! row it was built from. Host-tier entries are refreshed only by the
//! explicit cache-clear endpoint.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use sitegate_shared::{NewSite, ResolvedSite, Site};

use crate::{
    error::{ApiError, ApiResult},
    middleware::CurrentSite,
    routing::CacheStats,
    state::AppState,
};

// ============================================================================
// Types
// ============================================================================

/// The site serving this request.
#[derive(Debug, Serialize)]
pub struct CurrentSiteResponse {
    /// The host the request arrived on, verbatim.
    pub host: String,
    pub site: ResolvedSite,
    /// True when no unambiguous stored site matched and `site` is a
    /// transient stand-in.
    pub transient: bool,
}

#[derive(Debug, Serialize)]
pub struct ListSitesResponse {
    pub sites: Vec<Site>,
}

// ============================================================================
// Route handlers
// ============================================================================

/// The memoized site for this request's host
pub async fn current_site(
    Extension(current): Extension<CurrentSite>,
) -> ApiResult<Json<CurrentSiteResponse>> {
    let site = current.get().await?;

    Ok(Json(CurrentSiteResponse {
        host: current.host().to_string(),
        site: site.clone(),
        transient: site.is_transient(),
    }))
}

/// The configured default site
pub async fn default_site(State(state): State<AppState>) -> ApiResult<Json<Site>> {
    let site = state.resolver.resolve_default().await?;
    Ok(Json(site))
}

/// List all sites
pub async fn list_sites(State(state): State<AppState>) -> ApiResult<Json<ListSitesResponse>> {
    let sites = state.store.all_sites().await?;
    Ok(Json(ListSitesResponse { sites }))
}

/// Fetch one site by id
pub async fn get_site(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Site>> {
    let site = state.store.get_by_id(id).await?;
    Ok(Json(site))
}

/// Create a site
pub async fn create_site(
    State(state): State<AppState>,
    Json(req): Json<NewSite>,
) -> ApiResult<(StatusCode, Json<Site>)> {
    validate_site(&req)?;

    let site = state.store.create(req).await?;
    state.resolver.on_site_saved(&site);
    tracing::info!(site_id = site.id, domain = %site.domain, "site created");

    Ok((StatusCode::CREATED, Json(site)))
}

/// Update a site
pub async fn update_site(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<NewSite>,
) -> ApiResult<Json<Site>> {
    validate_site(&req)?;

    let site = state.store.update(id, req).await?;
    state.resolver.on_site_saved(&site);
    tracing::info!(site_id = site.id, domain = %site.domain, "site updated");

    Ok(Json(site))
}

/// Delete a site
pub async fn delete_site(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    state.store.delete(id).await?;
    state.resolver.on_site_deleted(id);
    tracing::info!(site_id = id, "site deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Cache statistics
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.resolver.cache().stats())
}

/// Drop all cached host resolutions. For operators after bulk domain
/// mutations, which do not rewrite the host tier.
pub async fn clear_host_cache(State(state): State<AppState>) -> StatusCode {
    state.resolver.clear_host_cache();
    tracing::info!("host cache cleared");
    StatusCode::NO_CONTENT
}

fn validate_site(req: &NewSite) -> ApiResult<()> {
    if req.domain.trim().is_empty() {
        return Err(ApiError::Validation("domain must not be empty".to_string()));
    }
    if req.domain.contains(char::is_whitespace) {
        return Err(ApiError::Validation(
            "domain must not contain whitespace".to_string(),
        ));
    }
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("name must not be empty".to_string()));
    }
    Ok(())
}
