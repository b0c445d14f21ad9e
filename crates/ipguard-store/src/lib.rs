//! Firestore-backed persistence for the discovery and risk-analysis services.

pub mod channel_repo;
pub mod client;
pub mod config;
pub mod error;
pub mod keyword_repo;
pub mod quota_repo;
pub mod token_cache;
pub mod types;
pub mod video_repo;
pub mod view_snapshot_repo;

pub use channel_repo::ChannelRepository;
pub use client::{FirestoreClient, RetryPolicy};
pub use config::StoreConfig;
pub use error::StoreError;
pub use keyword_repo::KeywordRepository;
pub use quota_repo::QuotaRepository;
pub use video_repo::VideoRepository;
pub use view_snapshot_repo::ViewSnapshotRepository;
