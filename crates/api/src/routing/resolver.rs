//! Host-to-site resolution

use std::sync::Arc;

use sitegate_shared::{RequestSite, ResolvedSite, Site, SiteError, SiteResult};

use super::SiteCache;
use crate::store::SiteStore;

/// Resolves Host headers to site records, with caching.
///
/// The cache is injected rather than global so each server (or test) owns an
/// isolated instance. Concurrent misses for the same host may each query the
/// store and each write the cache; last write wins, which is harmless because
/// the store is the source of truth and resolution is idempotent per host.
///
/// Each process keeps its own cache with no cross-process invalidation, so a
/// mutation in one instance leaves a staleness window in the others.
#[derive(Clone)]
pub struct SiteResolver {
    store: Arc<dyn SiteStore>,
    cache: Arc<SiteCache>,
    default_site_id: Option<i64>,
}

impl SiteResolver {
    pub fn new(store: Arc<dyn SiteStore>, cache: Arc<SiteCache>, default_site_id: Option<i64>) -> Self {
        Self {
            store,
            cache,
            default_site_id,
        }
    }

    /// Resolve a host header to a site.
    ///
    /// The host is lowercased, then matched in two phases: exact
    /// case-insensitive domain match, and (when `check_subdomain` is set and
    /// the first phase found nothing) a suffix scan over every stored
    /// domain. Exactly one match in either phase wins; anything else — zero
    /// matches overall or two or more in a phase — falls back to a fresh
    /// [`RequestSite`] and caches the absent sentinel for the host.
    /// Ambiguity is never tie-broken.
    ///
    /// The subdomain phase is a plain string-suffix test, not DNS label
    /// matching: a registered "example.com" also matches the host
    /// "evilexample.com". That is long-standing matching policy; operators
    /// who need stricter matching should register exact domains and resolve
    /// with `check_subdomain` off.
    pub async fn resolve_host(&self, host: &str, check_subdomain: bool) -> SiteResult<ResolvedSite> {
        let host = host.to_lowercase();

        if let Some(cached) = self.cache.host(&host) {
            tracing::debug!(host = %host, stored = cached.is_some(), "host cache hit");
            return Ok(match cached {
                Some(site) => ResolvedSite::Stored(site),
                // The sentinel means "no unambiguous site": synthesize a
                // fresh RequestSite, never a cached object.
                None => ResolvedSite::Transient(RequestSite::new(host)),
            });
        }

        let mut matches = self.store.find_by_domain(&host).await?;

        if matches.is_empty() && check_subdomain {
            matches = self
                .store
                .all_sites()
                .await?
                .into_iter()
                .filter(|site| host.ends_with(&site.domain.to_lowercase()))
                .collect();
        }

        if matches.len() == 1 {
            let site = matches.remove(0);
            tracing::debug!(host = %host, site_id = site.id, "host resolved to stored site");
            self.cache.set_host(&host, Some(site.clone()));
            Ok(ResolvedSite::Stored(site))
        } else {
            tracing::debug!(host = %host, matches = matches.len(), "no unambiguous site for host");
            self.cache.set_host(&host, None);
            Ok(ResolvedSite::Transient(RequestSite::new(host)))
        }
    }

    /// Resolve the configured default site.
    ///
    /// Unlike host resolution there is no transient fallback: an unset
    /// `SITE_ID` is a configuration error and a missing row propagates as
    /// `NotFound`. The result is memoized until the site is mutated.
    pub async fn resolve_default(&self) -> SiteResult<Site> {
        if let Some(site) = self.cache.default_site() {
            return Ok(site);
        }

        let id = self.default_site_id.ok_or(SiteError::Configuration(
            "set SITE_ID to the id of a stored site",
        ))?;

        let site = match self.cache.site_by_id(id) {
            Some(site) => site,
            None => {
                let site = self.store.get_by_id(id).await?;
                self.cache.set_site(site.clone());
                site
            }
        };

        self.cache.set_default(site.clone());
        Ok(site)
    }

    /// Invalidation hook for the entity layer: call after every successful
    /// create or update. Evicts the id-tier entry (and the default slot when
    /// it holds this site); the host tier is left alone and refreshes on the
    /// next miss or an explicit [`clear_host_cache`](Self::clear_host_cache).
    pub fn on_site_saved(&self, site: &Site) {
        tracing::debug!(site_id = site.id, domain = %site.domain, "site saved, evicting id cache");
        self.cache.invalidate_id(site.id);
    }

    /// Invalidation hook for deletions. Tolerates ids that were never cached.
    pub fn on_site_deleted(&self, id: i64) {
        tracing::debug!(site_id = id, "site deleted, evicting id cache");
        self.cache.invalidate_id(id);
    }

    /// Drop every cached host resolution. Intended for operators after bulk
    /// domain mutations, since saves do not rewrite the host tier.
    pub fn clear_host_cache(&self) {
        self.cache.clear_hosts();
    }

    /// The cache, for statistics endpoints.
    pub fn cache(&self) -> &SiteCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySiteStore;
    use sitegate_shared::NewSite;

    fn resolver_with(
        sites: &[(i64, &str)],
        default_site_id: Option<i64>,
    ) -> (SiteResolver, Arc<MemorySiteStore>) {
        let store = Arc::new(MemorySiteStore::new());
        for (id, domain) in sites {
            store.insert_with_id(*id, domain, domain).unwrap();
        }
        let resolver = SiteResolver::new(store.clone(), Arc::new(SiteCache::new()), default_site_id);
        (resolver, store)
    }

    #[tokio::test]
    async fn test_exact_match() {
        let (resolver, _) = resolver_with(&[(1, "example.com")], None);

        let resolved = resolver.resolve_host("example.com", true).await.unwrap();
        assert_eq!(resolved.as_stored().map(|s| s.id), Some(1));
    }

    #[tokio::test]
    async fn test_exact_match_case_insensitive() {
        let (resolver, _) = resolver_with(&[(1, "Example.COM")], None);

        let resolved = resolver.resolve_host("EXAMPLE.com", true).await.unwrap();
        assert_eq!(resolved.as_stored().map(|s| s.id), Some(1));
    }

    #[tokio::test]
    async fn test_second_call_served_from_cache() {
        let (resolver, store) = resolver_with(&[(1, "example.com")], None);

        resolver.resolve_host("example.com", true).await.unwrap();
        let queries_after_first = store.query_count();

        let resolved = resolver.resolve_host("example.com", true).await.unwrap();
        assert_eq!(resolved.as_stored().map(|s| s.id), Some(1));
        assert_eq!(store.query_count(), queries_after_first);
    }

    #[tokio::test]
    async fn test_subdomain_suffix_match() {
        let (resolver, _) = resolver_with(&[(1, "example.com")], None);

        let resolved = resolver
            .resolve_host("www.example.com", true)
            .await
            .unwrap();
        assert_eq!(resolved.as_stored().map(|s| s.id), Some(1));
    }

    #[tokio::test]
    async fn test_suffix_match_is_not_label_aware() {
        // Documented policy: plain suffix test, so a host that merely ends
        // with the registered domain string matches too.
        let (resolver, _) = resolver_with(&[(1, "example.com")], None);

        let resolved = resolver
            .resolve_host("evilexample.com", true)
            .await
            .unwrap();
        assert_eq!(resolved.as_stored().map(|s| s.id), Some(1));
    }

    #[tokio::test]
    async fn test_check_subdomain_false_skips_suffix_scan() {
        let (resolver, _) = resolver_with(&[(1, "example.com")], None);

        let resolved = resolver
            .resolve_host("www.example.com", false)
            .await
            .unwrap();
        assert!(resolved.is_transient());
        assert_eq!(resolved.domain(), "www.example.com");
    }

    #[tokio::test]
    async fn test_zero_matches_returns_request_site() {
        let (resolver, _) = resolver_with(&[(1, "example.com")], None);

        let resolved = resolver.resolve_host("other.org", true).await.unwrap();
        assert!(resolved.is_transient());
        assert_eq!(resolved.domain(), "other.org");
    }

    #[tokio::test]
    async fn test_ambiguous_exact_match_returns_request_site() {
        // Domain is not unique; two exact matches must not be tie-broken
        let (resolver, _) = resolver_with(&[(1, "example.com"), (2, "example.com")], None);

        let resolved = resolver.resolve_host("example.com", true).await.unwrap();
        assert!(resolved.is_transient());
        assert_eq!(resolved.domain(), "example.com");
    }

    #[tokio::test]
    async fn test_ambiguous_suffix_match_returns_request_site() {
        // "x.a.com" ends with both "a.com" and "com"
        let (resolver, _) = resolver_with(&[(1, "a.com"), (2, "com")], None);

        let resolved = resolver.resolve_host("x.a.com", true).await.unwrap();
        assert!(resolved.is_transient());
        assert_eq!(resolved.domain(), "x.a.com");
    }

    #[tokio::test]
    async fn test_absent_sentinel_short_circuits_store() {
        let (resolver, store) = resolver_with(&[(1, "example.com")], None);

        let first = resolver.resolve_host("other.org", true).await.unwrap();
        assert!(first.is_transient());
        let queries_after_first = store.query_count();

        // Second resolution synthesizes a fresh RequestSite without querying
        let second = resolver.resolve_host("other.org", true).await.unwrap();
        assert!(second.is_transient());
        assert_eq!(second.domain(), "other.org");
        assert_eq!(store.query_count(), queries_after_first);
    }

    #[tokio::test]
    async fn test_host_is_lowercased_before_caching() {
        let (resolver, store) = resolver_with(&[(1, "example.com")], None);

        resolver.resolve_host("Example.Com", true).await.unwrap();
        let queries_after_first = store.query_count();

        // Different casing, same cache entry
        resolver.resolve_host("EXAMPLE.COM", true).await.unwrap();
        assert_eq!(store.query_count(), queries_after_first);
    }

    #[tokio::test]
    async fn test_resolve_default() {
        let (resolver, store) = resolver_with(&[(1, "example.com")], Some(1));

        let site = resolver.resolve_default().await.unwrap();
        assert_eq!(site.id, 1);
        let queries_after_first = store.query_count();

        // Memoized: no further store traffic
        let again = resolver.resolve_default().await.unwrap();
        assert_eq!(again.id, 1);
        assert_eq!(store.query_count(), queries_after_first);
    }

    #[tokio::test]
    async fn test_resolve_default_unconfigured() {
        let (resolver, _) = resolver_with(&[(1, "example.com")], None);

        assert!(matches!(
            resolver.resolve_default().await,
            Err(SiteError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_default_missing_site_propagates_not_found() {
        // Configured id has no row: no fallback object
        let (resolver, _) = resolver_with(&[(2, "example.com")], Some(1));

        assert!(matches!(
            resolver.resolve_default().await,
            Err(SiteError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_save_invalidates_default() {
        let (resolver, store) = resolver_with(&[(1, "example.com")], Some(1));

        resolver.resolve_default().await.unwrap();

        let updated = store
            .update(
                1,
                NewSite {
                    domain: "example.org".to_string(),
                    name: "Example".to_string(),
                },
            )
            .await
            .unwrap();
        resolver.on_site_saved(&updated);

        // Next call requeries and sees the new domain
        let site = resolver.resolve_default().await.unwrap();
        assert_eq!(site.domain, "example.org");
    }

    #[tokio::test]
    async fn test_delete_invalidates_default() {
        let (resolver, store) = resolver_with(&[(1, "example.com")], Some(1));

        resolver.resolve_default().await.unwrap();

        store.delete(1).await.unwrap();
        resolver.on_site_deleted(1);

        assert!(matches!(
            resolver.resolve_default().await,
            Err(SiteError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_hook_idempotent() {
        let (resolver, _) = resolver_with(&[(1, "example.com")], Some(1));

        // Never resolved, nothing cached; hooks must tolerate both
        resolver.on_site_deleted(1);
        resolver.on_site_deleted(1);
    }

    #[tokio::test]
    async fn test_host_tier_stays_stale_after_save() {
        // Saves evict only the id tier; host entries refresh on clear_hosts.
        let (resolver, store) = resolver_with(&[(1, "example.com")], None);

        resolver.resolve_host("example.com", true).await.unwrap();

        let updated = store
            .update(
                1,
                NewSite {
                    domain: "example.org".to_string(),
                    name: "Example".to_string(),
                },
            )
            .await
            .unwrap();
        resolver.on_site_saved(&updated);

        let stale = resolver.resolve_host("example.com", true).await.unwrap();
        assert_eq!(
            stale.as_stored().map(|s| s.domain.as_str()),
            Some("example.com")
        );

        resolver.clear_host_cache();
        let fresh = resolver.resolve_host("example.com", true).await.unwrap();
        assert!(fresh.is_transient());
        let via_new_domain = resolver.resolve_host("example.org", true).await.unwrap();
        assert_eq!(via_new_domain.as_stored().map(|s| s.id), Some(1));
    }
}
