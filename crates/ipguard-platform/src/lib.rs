//! The video platform client trait boundary, and an in-memory fixture for tests.

pub mod client;
pub mod error;
pub mod testing;
pub mod types;

pub use client::PlatformClient;
pub use error::PlatformError;
pub use testing::InMemoryPlatformClient;
pub use types::RawVideo;
