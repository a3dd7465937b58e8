//! Per-request site resolution
//!
//! [`attach_site`] hangs a [`CurrentSite`] on every request's extensions.
//! The capability is lazy: nothing is resolved until a handler first awaits
//! [`CurrentSite::get`], and the outcome is memoized for the rest of that
//! request. A new request always starts with an empty memo; the memo dies
//! with the request's extensions.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tokio::sync::OnceCell;

use sitegate_shared::{ResolvedSite, SiteResult};

use crate::routing::SiteResolver;
use crate::state::AppState;

/// Lazily resolved site for one request.
///
/// Clones share the same memo cell, so every copy handed out within a
/// request observes the same resolution.
#[derive(Clone)]
pub struct CurrentSite {
    resolver: Arc<SiteResolver>,
    host: String,
    memo: Arc<OnceCell<ResolvedSite>>,
}

impl CurrentSite {
    pub fn new(resolver: Arc<SiteResolver>, host: impl Into<String>) -> Self {
        Self {
            resolver,
            host: host.into(),
            memo: Arc::new(OnceCell::new()),
        }
    }

    /// The raw host this request arrived on.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The site for this request's host. The first call resolves and stores;
    /// subsequent calls return the stored value without touching the
    /// resolver. A store failure is returned to the caller and leaves the
    /// memo empty, so a later call may retry.
    pub async fn get(&self) -> SiteResult<&ResolvedSite> {
        self.memo
            .get_or_try_init(|| self.resolver.resolve_host(&self.host, true))
            .await
    }
}

/// Axum middleware that attaches a [`CurrentSite`] to the request.
pub async fn attach_site(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let host = request_host(&req);
    req.extensions_mut()
        .insert(CurrentSite::new(state.resolver.clone(), host));
    next.run(req).await
}

/// Host header value, falling back to the URI authority for HTTP/2 requests
/// that carry it there. Returned verbatim (ports included): matching
/// normalization belongs to the resolver.
fn request_host(req: &Request) -> String {
    req.headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(|h| h.trim().to_string())
        .or_else(|| req.uri().authority().map(|a| a.as_str().to_string()))
        .unwrap_or_default()
}
