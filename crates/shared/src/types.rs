//! Site entity types shared across sitegate

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::error::{SiteError, SiteResult};

// =============================================================================
// Site
// =============================================================================

/// A persistent site (tenant) record.
///
/// `domain` is case-insensitively significant for host matching but is NOT
/// unique at the schema level; two sites may share a domain and the resolver
/// treats that ambiguity as a first-class case rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Site {
    /// Store-assigned identifier; also the cache-invalidation key.
    pub id: i64,
    /// Fully qualified domain name (e.g., "example.com").
    pub domain: String,
    /// Human-readable display name; never consulted during resolution.
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields accepted when creating or updating a site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSite {
    pub domain: String,
    pub name: String,
}

// =============================================================================
// RequestSite
// =============================================================================

/// A transient stand-in that shares the read interface of [`Site`] (it has
/// `domain` and `name`) but is derived from a request's host header rather
/// than from the store.
///
/// A `RequestSite` is synthesized whenever host resolution finds no
/// unambiguous match. It is never persisted and never cached as a positive
/// entry; `save` and `delete` always fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestSite {
    pub domain: String,
    pub name: String,
}

impl RequestSite {
    /// Build a request site for a host; `domain` and `name` are both the
    /// literal host string.
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            domain: host.clone(),
            name: host,
        }
    }

    /// Always fails: request sites cannot be persisted.
    pub fn save(&self) -> SiteResult<()> {
        Err(SiteError::Unsupported("RequestSite cannot be saved"))
    }

    /// Always fails: request sites cannot be deleted.
    pub fn delete(&self) -> SiteResult<()> {
        Err(SiteError::Unsupported("RequestSite cannot be deleted"))
    }
}

// =============================================================================
// ResolvedSite
// =============================================================================

/// The outcome of resolving a host: either a stored [`Site`] or a
/// [`RequestSite`] synthesized for a host with no unambiguous match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResolvedSite {
    Stored(Site),
    Transient(RequestSite),
}

impl ResolvedSite {
    pub fn domain(&self) -> &str {
        match self {
            ResolvedSite::Stored(site) => &site.domain,
            ResolvedSite::Transient(site) => &site.domain,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ResolvedSite::Stored(site) => &site.name,
            ResolvedSite::Transient(site) => &site.name,
        }
    }

    /// The stored site, if resolution found one.
    pub fn as_stored(&self) -> Option<&Site> {
        match self {
            ResolvedSite::Stored(site) => Some(site),
            ResolvedSite::Transient(_) => None,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, ResolvedSite::Transient(_))
    }
}

impl From<Site> for ResolvedSite {
    fn from(site: Site) -> Self {
        ResolvedSite::Stored(site)
    }
}
