//! Site storage
//!
//! The resolver consumes the store through the narrow read-only slice of
//! [`SiteStore`] (`get_by_id`, `find_by_domain`, `all_sites`); the mutation
//! operations exist for the HTTP surface and must be paired with the
//! resolver's invalidation hooks by their callers.

mod memory;
mod postgres;

use async_trait::async_trait;
use sitegate_shared::{NewSite, Site, SiteResult};

pub use memory::MemorySiteStore;
pub use postgres::PgSiteStore;

/// Persistence interface for [`Site`] records.
#[async_trait]
pub trait SiteStore: Send + Sync {
    /// Fetch a site by id. Fails with `SiteError::NotFound` when absent.
    async fn get_by_id(&self, id: i64) -> SiteResult<Site>;

    /// All sites whose domain equals `domain`, compared case-insensitively.
    /// Well-formed data yields 0 or 1 rows but callers must tolerate more.
    async fn find_by_domain(&self, domain: &str) -> SiteResult<Vec<Site>>;

    /// Every stored site, ordered by domain. Used only by the subdomain
    /// fallback scan.
    async fn all_sites(&self) -> SiteResult<Vec<Site>>;

    /// Insert a new site and return it with its assigned id.
    async fn create(&self, site: NewSite) -> SiteResult<Site>;

    /// Update an existing site. Fails with `SiteError::NotFound` when absent.
    async fn update(&self, id: i64, site: NewSite) -> SiteResult<Site>;

    /// Delete a site. Fails with `SiteError::NotFound` when absent.
    async fn delete(&self, id: i64) -> SiteResult<()>;

    /// Check store connectivity.
    async fn health_check(&self) -> SiteResult<()>;
}
