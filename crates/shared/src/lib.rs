//! Sitegate Shared Types and Utilities
//!
//! This crate contains the site entity types, errors, and database utilities
//! shared across the sitegate platform.

pub mod db;
pub mod error;
pub mod types;

pub use db::*;
pub use error::*;
pub use types::*;
