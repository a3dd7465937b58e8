//! In-memory site cache
//!
//! Caches host-to-site resolutions and the default site to keep repeated
//! lookups away from the database. Entries live for the life of the process:
//! no TTL and no capacity bound, which is an accepted tradeoff for the small
//! cardinality of tenant hosts.
//!
//! Two tiers are keyed independently: the host tier by lowercased host
//! string, the id tier by site id. Mutating a site evicts its id-tier entry
//! but leaves host-tier entries in place until `clear_hosts` is called; see
//! [`SiteResolver`](super::SiteResolver) for why that staleness is kept.

use std::collections::HashMap;
use std::sync::RwLock;

use sitegate_shared::Site;

/// Thread-safe in-memory site cache
#[derive(Default)]
pub struct SiteCache {
    /// Maps lowercased host -> resolution outcome. `Some(None)` on lookup
    /// means the host was resolved before and found no unambiguous site; a
    /// `RequestSite` should be synthesized without querying the store.
    hosts: RwLock<HashMap<String, Option<Site>>>,
    /// Maps site id -> site; consulted only by default-site resolution.
    by_id: RwLock<HashMap<i64, Site>>,
    /// The memoized default site.
    default_site: RwLock<Option<Site>>,
}

impl SiteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached resolution for a host.
    /// Returns `Some(Some(site))` for a positive entry, `Some(None)` for the
    /// absent sentinel, and `None` when the host has never been resolved.
    pub fn host(&self, host: &str) -> Option<Option<Site>> {
        let hosts = self.hosts.read().ok()?;
        hosts.get(host).cloned()
    }

    /// Cache a resolution outcome for a host. `None` records the absent
    /// sentinel.
    pub fn set_host(&self, host: &str, site: Option<Site>) {
        if let Ok(mut hosts) = self.hosts.write() {
            hosts.insert(host.to_string(), site);
        }
    }

    /// Drop every host-tier entry. The id tier and default slot survive.
    pub fn clear_hosts(&self) {
        if let Ok(mut hosts) = self.hosts.write() {
            hosts.clear();
        }
    }

    /// Cached site for an id, if present.
    pub fn site_by_id(&self, id: i64) -> Option<Site> {
        let by_id = self.by_id.read().ok()?;
        by_id.get(&id).cloned()
    }

    /// Cache a site under its id.
    pub fn set_site(&self, site: Site) {
        if let Ok(mut by_id) = self.by_id.write() {
            by_id.insert(site.id, site);
        }
    }

    /// Evict the id-tier entry for `id` and, if the default slot holds that
    /// same site, clear it too. No-op when the id was never cached.
    pub fn invalidate_id(&self, id: i64) {
        if let Ok(mut by_id) = self.by_id.write() {
            by_id.remove(&id);
        }
        if let Ok(mut default_site) = self.default_site.write() {
            if default_site.as_ref().map(|s| s.id) == Some(id) {
                *default_site = None;
            }
        }
    }

    /// The memoized default site, if populated.
    pub fn default_site(&self) -> Option<Site> {
        self.default_site.read().ok()?.clone()
    }

    /// Fill the default slot.
    pub fn set_default(&self, site: Site) {
        if let Ok(mut default_site) = self.default_site.write() {
            *default_site = Some(site);
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let host_entries = self.hosts.read().map(|h| h.len()).unwrap_or(0);
        let absent_entries = self
            .hosts
            .read()
            .map(|h| h.values().filter(|v| v.is_none()).count())
            .unwrap_or(0);
        let id_entries = self.by_id.read().map(|m| m.len()).unwrap_or(0);
        let default_populated = self
            .default_site
            .read()
            .map(|d| d.is_some())
            .unwrap_or(false);
        CacheStats {
            host_entries,
            absent_entries,
            id_entries,
            default_populated,
        }
    }
}

/// Cache statistics
#[derive(Default, Debug, serde::Serialize)]
pub struct CacheStats {
    pub host_entries: usize,
    /// Host entries holding the absent sentinel.
    pub absent_entries: usize,
    pub id_entries: usize,
    pub default_populated: bool,
}
