//! Property-based tests for seeding and caching guarantees

mod cache;
mod determinism;
