//! Risk analyzer integration tests: drive the real event handlers and rescore tick against
//! a real Firestore project and Redis instance, the same "connect, seed, assert, clean up"
//! shape as `backend/tests/integration/firestore_tests.rs`.

#[tokio::test]
#[ignore = "requires Firestore credentials and Redis"]
async fn test_vision_feedback_triggers_rescore_and_channel_counters() {
    use chrono::Utc;
    use ipguard_analyzer::handle_vision_feedback;
    use ipguard_bus::{BusClient, VisionFeedbackPayload};
    use ipguard_models::{ChannelId, ProcessingState, RiskTier, Video, VideoId};
    use ipguard_store::{ChannelRepository, FirestoreClient, StoreConfig, VideoRepository, ViewSnapshotRepository};

    dotenvy::dotenv().ok();

    let store_config = StoreConfig::from_env().expect("Failed to load store config");
    let firestore = FirestoreClient::new(store_config.gcp_project_id.clone(), store_config.firestore_database_id.clone())
        .await
        .expect("Failed to create Firestore client");
    let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let bus = BusClient::connect(&redis_url).await.expect("Failed to connect to bus");

    let videos = VideoRepository::new(&firestore);
    let channels = ChannelRepository::new(&firestore);
    let snapshots = ViewSnapshotRepository::new(&firestore);

    let now = Utc::now();
    let video_id = VideoId::from_raw("integration-analyzer-video");
    let channel_id = ChannelId::from_raw("integration-analyzer-channel");

    let video = Video {
        video_id: video_id.clone(),
        title: "Unofficial fan edit".to_string(),
        description: "test fixture".to_string(),
        channel_id: channel_id.clone(),
        channel_title: "Fan Channel".to_string(),
        published_at: now,
        view_count: 10_000,
        like_count: 100,
        comment_count: 5,
        duration_seconds: 90,
        tags: vec![],
        thumbnail_url: None,
        matched_ips: Default::default(),
        initial_risk: 40,
        current_risk: 40,
        risk_tier: RiskTier::from_score(40),
        view_velocity: None,
        last_risk_update: now,
        next_scan_at: now,
        processing_state: ProcessingState::Discovered,
        gemini_result: None,
        risk_history: vec![],
        discovered_at: now,
    };
    videos.create(&video).await.expect("Failed to create fixture video");
    channels
        .get_or_create(channel_id.as_str(), "Fan Channel", now)
        .await
        .expect("Failed to create fixture channel");

    let feedback = VisionFeedbackPayload {
        video_id: video_id.clone(),
        contains_infringement: true,
        confidence: 0.92,
        characters_detected: vec!["Captain Testable".to_string()],
    };

    handle_vision_feedback(&videos, &channels, &snapshots, &bus, 70, &feedback)
        .await
        .expect("feedback handler should succeed");

    let updated_video = videos.get(video_id.as_str()).await.expect("get failed").expect("video missing");
    assert!(updated_video.gemini_result.is_some());
    assert_eq!(updated_video.processing_state, ProcessingState::Analyzed);

    let updated_channel = channels.get(channel_id.as_str()).await.expect("get failed").expect("channel missing");
    assert_eq!(updated_channel.confirmed_infringements, 1);
    assert_eq!(updated_channel.total_videos_scanned, 1);
}

#[tokio::test]
#[ignore = "requires Firestore credentials and Redis"]
async fn test_new_discovery_above_threshold_publishes_high_risk() {
    use chrono::Utc;
    use ipguard_analyzer::handle_new_discovery;
    use ipguard_bus::BusClient;
    use ipguard_models::{ChannelId, ProcessingState, RiskTier, Video, VideoId};
    use ipguard_store::{FirestoreClient, StoreConfig, VideoRepository};

    dotenvy::dotenv().ok();

    let store_config = StoreConfig::from_env().expect("Failed to load store config");
    let firestore = FirestoreClient::new(store_config.gcp_project_id.clone(), store_config.firestore_database_id.clone())
        .await
        .expect("Failed to create Firestore client");
    let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let bus = BusClient::connect(&redis_url).await.expect("Failed to connect to bus");

    let videos = VideoRepository::new(&firestore);
    let now = Utc::now();
    let video_id = VideoId::from_raw("integration-analyzer-high-risk-video");

    let video = Video {
        video_id: video_id.clone(),
        title: "High risk fixture".to_string(),
        description: "test fixture".to_string(),
        channel_id: ChannelId::from_raw("integration-analyzer-high-risk-channel"),
        channel_title: "Fan Channel".to_string(),
        published_at: now,
        view_count: 500_000,
        like_count: 10_000,
        comment_count: 500,
        duration_seconds: 90,
        tags: vec![],
        thumbnail_url: None,
        matched_ips: Default::default(),
        initial_risk: 85,
        current_risk: 85,
        risk_tier: RiskTier::from_score(85),
        view_velocity: None,
        last_risk_update: now,
        next_scan_at: now,
        processing_state: ProcessingState::Discovered,
        gemini_result: None,
        risk_history: vec![],
        discovered_at: now,
    };
    videos.create(&video).await.expect("Failed to create fixture video");

    handle_new_discovery(&videos, &bus, video_id.as_str(), 70)
        .await
        .expect("new-discovery handler should succeed");

    let updated = videos.get(video_id.as_str()).await.expect("get failed").expect("video missing");
    assert_eq!(updated.processing_state, ProcessingState::Queued);
}
