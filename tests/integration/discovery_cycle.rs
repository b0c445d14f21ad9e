//! Discovery pipeline integration tests.
//!
//! These exercise `run_cycle` end to end against real Firestore/Redis, mirroring
//! `backend/tests/integration/firestore_tests.rs`'s "connect, drive real repositories,
//! clean up" shape rather than mocking the store/bus transports.

#[tokio::test]
#[ignore = "requires Firestore credentials and Redis"]
async fn test_discovery_cycle_respects_daily_quota() {
    use chrono::Utc;
    use ipguard_discovery::{
        run_cycle, ChannelRegistry, CycleContext, DiscoveryConfig, KeywordRegistry,
    };
    use ipguard_models::{IpTarget, IpTargetId, Priority, ValueTier};
    use ipguard_platform::{InMemoryPlatformClient, RawVideo};
    use ipguard_store::{
        ChannelRepository, FirestoreClient, KeywordRepository, QuotaRepository, StoreConfig,
        VideoRepository,
    };

    dotenvy::dotenv().ok();

    let store_config = StoreConfig::from_env().expect("Failed to load store config");
    let firestore = FirestoreClient::new(store_config.gcp_project_id.clone(), store_config.firestore_database_id.clone())
        .await
        .expect("Failed to create Firestore client");
    let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let bus = ipguard_bus::BusClient::connect(&redis_url).await.expect("Failed to connect to bus");

    let videos = VideoRepository::new(&firestore);
    let channels = ChannelRepository::new(&firestore);
    let keywords = KeywordRepository::new(&firestore);
    let keyword_registry = KeywordRegistry::new(&keywords);
    let channel_registry = ChannelRegistry::new(&channels);

    // A quota with a single unit of budget: only one 100-unit search charge can ever go
    // through, so the cycle should report it spent at most that much and never touch Tier 2/3.
    let quota = QuotaRepository::named(&firestore, "discovery-cycle-test", 1);

    let catalog = vec![IpTarget {
        id: IpTargetId::new(),
        name: "Test Franchise".to_string(),
        owner: "Test Studio".to_string(),
        priority: Priority::High,
        value_tier: ValueTier::A,
        character_names: vec!["Captain Testable".to_string()],
        ai_tool_keywords: vec!["deepfake".to_string()],
    }];

    let platform = InMemoryPlatformClient::new(vec![RawVideo {
        video_id: "integration-test-video".to_string(),
        title: "Captain Testable deepfake compilation".to_string(),
        description: "unofficial fan edit".to_string(),
        channel_id: "integration-test-channel".to_string().into(),
        channel_title: "Fan Channel".to_string(),
        published_at: Utc::now(),
        view_count: 1_000,
        like_count: 10,
        comment_count: 2,
        duration_iso8601: "PT1M30S".to_string(),
        tags: vec![],
        thumbnail_url: None,
    }]);

    let config = DiscoveryConfig::default();

    let ctx = CycleContext {
        catalog: &catalog,
        quota: &quota,
        videos: &videos,
        channels: &channels,
        keyword_registry: &keyword_registry,
        channel_registry: &channel_registry,
        bus: &bus,
        platform: &platform,
        config: &config,
    };

    let report = run_cycle(&ctx).await.expect("cycle should not error");
    assert!(report.total_quota_spent() <= 1, "cycle must never exceed the ledger's remaining budget");
}

#[tokio::test]
#[ignore = "requires Firestore credentials and Redis"]
async fn test_zero_remaining_quota_skips_cycle_entirely() {
    use ipguard_discovery::{run_cycle, ChannelRegistry, CycleContext, DiscoveryConfig, KeywordRegistry};
    use ipguard_platform::InMemoryPlatformClient;
    use ipguard_store::{ChannelRepository, FirestoreClient, KeywordRepository, QuotaRepository, StoreConfig};
    use ipguard_store::VideoRepository;

    dotenvy::dotenv().ok();

    let store_config = StoreConfig::from_env().expect("Failed to load store config");
    let firestore = FirestoreClient::new(store_config.gcp_project_id.clone(), store_config.firestore_database_id.clone())
        .await
        .expect("Failed to create Firestore client");
    let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let bus = ipguard_bus::BusClient::connect(&redis_url).await.expect("Failed to connect to bus");

    let videos = VideoRepository::new(&firestore);
    let channels = ChannelRepository::new(&firestore);
    let keywords = KeywordRepository::new(&firestore);
    let keyword_registry = KeywordRegistry::new(&keywords);
    let channel_registry = ChannelRegistry::new(&channels);
    let quota = QuotaRepository::named(&firestore, "discovery-cycle-exhausted-test", 0);
    let platform = InMemoryPlatformClient::new(vec![]);
    let config = DiscoveryConfig::default();

    let ctx = CycleContext {
        catalog: &[],
        quota: &quota,
        videos: &videos,
        channels: &channels,
        keyword_registry: &keyword_registry,
        channel_registry: &channel_registry,
        bus: &bus,
        platform: &platform,
        config: &config,
    };

    let report = run_cycle(&ctx).await.expect("cycle should not error");
    assert!(report.budget_exhausted);
}
