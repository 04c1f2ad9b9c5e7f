//! Shared test helpers for marquee-stats integration tests

#![allow(dead_code)]

pub mod fixtures;
pub mod services;

pub use fixtures::{catalog_track, external_track, feature_vector};
pub use services::{FakeFeatureService, FakeRankingService};
