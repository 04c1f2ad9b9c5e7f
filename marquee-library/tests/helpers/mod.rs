//! Shared test helpers for marquee-library integration tests

#![allow(dead_code)]

pub mod content_source;

pub use content_source::FakeContentSource;
