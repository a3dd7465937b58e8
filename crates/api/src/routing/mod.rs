//! Host-based site resolution
//!
//! This module resolves incoming Host headers to site records:
//! - Exact domain match, case-insensitive (example.com -> site "example.com")
//! - Subdomain fallback: suffix match against every stored domain
//!   (www.example.com -> site "example.com")
//! - No unambiguous match: a transient `RequestSite` built from the host
//!
//! Resolutions are cached per host; the default site is cached per id.

mod cache;
mod resolver;

pub use cache::{CacheStats, SiteCache};
pub use resolver::SiteResolver;
