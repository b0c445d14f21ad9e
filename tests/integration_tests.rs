//! Integration test runner.
//!
//! Run all integration tests:
//!   cargo test --test integration_tests
//!
//! Run tests that require external services (Firestore, Redis):
//!   cargo test --test integration_tests -- --ignored

mod integration;

pub use integration::*;
