//! In-memory site store
//!
//! Backs tests and local development without a database. Read operations
//! bump a query counter so tests can assert that a cached resolution did
//! not reach the store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use time::OffsetDateTime;

use sitegate_shared::{NewSite, Site, SiteError, SiteResult};

use super::SiteStore;

pub struct MemorySiteStore {
    sites: RwLock<BTreeMap<i64, Site>>,
    next_id: AtomicI64,
    queries: AtomicU64,
}

impl Default for MemorySiteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySiteStore {
    pub fn new() -> Self {
        Self {
            sites: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            queries: AtomicU64::new(0),
        }
    }

    /// Number of read queries served so far.
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }

    /// Insert a site with a fixed id, bypassing the id sequence. Test setup
    /// helper for scenarios that reference ids directly.
    pub fn insert_with_id(&self, id: i64, domain: &str, name: &str) -> SiteResult<Site> {
        let now = OffsetDateTime::now_utc();
        let site = Site {
            id,
            domain: domain.to_string(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.write_map(|sites| {
            sites.insert(id, site.clone());
        })?;
        // Keep the sequence ahead of manually assigned ids
        self.next_id.fetch_max(id + 1, Ordering::SeqCst);
        Ok(site)
    }

    fn read_map<T>(&self, f: impl FnOnce(&BTreeMap<i64, Site>) -> T) -> SiteResult<T> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        match self.sites.read() {
            Ok(sites) => Ok(f(&sites)),
            Err(_) => Err(SiteError::Store("site map lock poisoned".to_string())),
        }
    }

    fn write_map<T>(&self, f: impl FnOnce(&mut BTreeMap<i64, Site>) -> T) -> SiteResult<T> {
        match self.sites.write() {
            Ok(mut sites) => Ok(f(&mut sites)),
            Err(_) => Err(SiteError::Store("site map lock poisoned".to_string())),
        }
    }
}

#[async_trait]
impl SiteStore for MemorySiteStore {
    async fn get_by_id(&self, id: i64) -> SiteResult<Site> {
        self.read_map(|sites| sites.get(&id).cloned())?
            .ok_or_else(|| SiteError::NotFound(format!("site id {}", id)))
    }

    async fn find_by_domain(&self, domain: &str) -> SiteResult<Vec<Site>> {
        let needle = domain.to_lowercase();
        self.read_map(|sites| {
            sites
                .values()
                .filter(|s| s.domain.to_lowercase() == needle)
                .cloned()
                .collect()
        })
    }

    async fn all_sites(&self) -> SiteResult<Vec<Site>> {
        self.read_map(|sites| {
            let mut all: Vec<Site> = sites.values().cloned().collect();
            all.sort_by(|a, b| a.domain.cmp(&b.domain));
            all
        })
    }

    async fn create(&self, site: NewSite) -> SiteResult<Site> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = OffsetDateTime::now_utc();
        let site = Site {
            id,
            domain: site.domain,
            name: site.name,
            created_at: now,
            updated_at: now,
        };
        self.write_map(|sites| {
            sites.insert(id, site.clone());
        })?;
        Ok(site)
    }

    async fn update(&self, id: i64, site: NewSite) -> SiteResult<Site> {
        self.write_map(|sites| match sites.get_mut(&id) {
            Some(existing) => {
                existing.domain = site.domain;
                existing.name = site.name;
                existing.updated_at = OffsetDateTime::now_utc();
                Ok(existing.clone())
            }
            None => Err(SiteError::NotFound(format!("site id {}", id))),
        })?
    }

    async fn delete(&self, id: i64) -> SiteResult<()> {
        self.write_map(|sites| match sites.remove(&id) {
            Some(_) => Ok(()),
            None => Err(SiteError::NotFound(format!("site id {}", id))),
        })?
    }

    async fn health_check(&self) -> SiteResult<()> {
        Ok(())
    }
}
