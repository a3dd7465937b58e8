//! Sitegate API Library
//!
//! This crate contains the host-to-site resolution engine and the API server
//! components for sitegate.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod routing;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use middleware::CurrentSite;
pub use routing::{CacheStats, SiteCache, SiteResolver};
pub use state::AppState;
pub use store::{MemorySiteStore, PgSiteStore, SiteStore};
