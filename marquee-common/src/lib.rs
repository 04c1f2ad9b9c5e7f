//! # Marquee Common Library
//!
//! Shared code for the Marquee catalog crates including:
//! - Error taxonomy (`Error` enum)
//! - Configuration loading (TOML bootstrap)
//! - Logging initialization
//! - Query keys, status signals and the keyed result cache
//! - Event types and the EventBus

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod query;

pub use error::{Error, Result};
pub use query::{LibraryQueryKey, QueryStatus, StatsQueryKey};
