//! Risk Analyzer binary: two message-consumer loops plus a periodic rescore tick.

use std::sync::Arc;
use std::time::Duration;

use ipguard_analyzer::{handle_new_discovery, handle_vision_feedback, run_rescore_tick, AnalyzerConfig};
use ipguard_bus::{BusClient, Envelope, Topic, VideoDiscoveredPayload, VisionFeedbackPayload};
use ipguard_platform::InMemoryPlatformClient;
use ipguard_store::{ChannelRepository, FirestoreClient, QuotaRepository, StoreConfig, VideoRepository, ViewSnapshotRepository};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const CONSUMER_GROUP: &str = "risk-analyzer";
const CONSUMER_NAME: &str = "risk-analyzer-1";
const POLL_BLOCK: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(EnvFilter::from_default_env().add_directive("ipguard=info".parse().unwrap()))
        .init();

    info!("starting risk-analyzer");

    let analyzer_config = match AnalyzerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "invalid analyzer configuration");
            std::process::exit(1);
        }
    };
    let store_config = match StoreConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "invalid store configuration");
            std::process::exit(1);
        }
    };

    let firestore = match FirestoreClient::new(store_config.gcp_project_id.clone(), store_config.firestore_database_id.clone()).await {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "failed to initialize Firestore client");
            std::process::exit(1);
        }
    };
    let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let bus = match BusClient::connect(&redis_url).await {
        Ok(b) => b,
        Err(e) => {
            error!(error = %e, "failed to connect to bus");
            std::process::exit(1);
        }
    };
    if let Err(e) = bus.ensure_consumer_group(Topic::VideoDiscovered, CONSUMER_GROUP).await {
        error!(error = %e, "failed to create video-discovered consumer group");
        std::process::exit(1);
    }
    if let Err(e) = bus.ensure_consumer_group(Topic::VisionFeedback, CONSUMER_GROUP).await {
        error!(error = %e, "failed to create vision-feedback consumer group");
        std::process::exit(1);
    }

    // The concrete video-platform integration is a caller-supplied collaborator (out of
    // scope); a real deployment wires a production `PlatformClient` here.
    let platform = InMemoryPlatformClient::new(vec![]);

    let videos = VideoRepository::new(&firestore);
    let channels = ChannelRepository::new(&firestore);
    let snapshots = ViewSnapshotRepository::new(&firestore);
    let rescan_quota = QuotaRepository::named(&firestore, "rescan", analyzer_config.rescan_quota);

    let shutdown = Arc::new(tokio::sync::Notify::new());
    let ctrl_c_shutdown = shutdown.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal");
        ctrl_c_shutdown.notify_waiters();
    });

    let mut ticker = tokio::time::interval(analyzer_config.rescore_interval);
    let mut poll = tokio::time::interval(POLL_BLOCK);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match run_rescore_tick(
                    &videos,
                    &channels,
                    &snapshots,
                    &rescan_quota,
                    &platform,
                    &bus,
                    analyzer_config.high_risk_threshold,
                    analyzer_config.rescan_batch_size,
                ).await {
                    Ok(report) => info!(
                        considered = report.videos_considered,
                        rescored = report.videos_rescored,
                        errors = report.errors,
                        budget_exhausted = report.budget_exhausted,
                        "rescore tick complete"
                    ),
                    Err(e) => error!(error = %e, "rescore tick failed"),
                }
            }
            _ = poll.tick() => {
                poll_new_discoveries(&bus, &videos, analyzer_config.high_risk_threshold).await;
                poll_vision_feedback(&bus, &videos, &channels, &snapshots, analyzer_config.high_risk_threshold).await;
            }
            _ = shutdown.notified() => {
                info!("shutting down risk-analyzer");
                break;
            }
        }
    }
}

async fn poll_new_discoveries(bus: &BusClient, videos: &VideoRepository<'_>, high_risk_threshold: u8) {
    let messages: Vec<(String, Envelope<VideoDiscoveredPayload>)> =
        match bus.consume(Topic::VideoDiscovered, CONSUMER_GROUP, CONSUMER_NAME, 50, Duration::from_millis(10)).await {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "failed to poll video-discovered");
                return;
            }
        };
    for (entry_id, envelope) in messages {
        match handle_new_discovery(videos, bus, envelope.payload.video_id.as_str(), high_risk_threshold).await {
            Ok(()) => {
                if let Err(e) = bus.ack(Topic::VideoDiscovered, CONSUMER_GROUP, &entry_id).await {
                    warn!(error = %e, "failed to ack video-discovered entry");
                }
            }
            Err(e) => warn!(video_id = %envelope.payload.video_id, error = %e, "new-discovery handler failed, will redeliver"),
        }
    }
}

async fn poll_vision_feedback(
    bus: &BusClient,
    videos: &VideoRepository<'_>,
    channels: &ChannelRepository<'_>,
    snapshots: &ViewSnapshotRepository<'_>,
    high_risk_threshold: u8,
) {
    let messages: Vec<(String, Envelope<VisionFeedbackPayload>)> =
        match bus.consume(Topic::VisionFeedback, CONSUMER_GROUP, CONSUMER_NAME, 50, Duration::from_millis(10)).await {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "failed to poll vision-feedback");
                return;
            }
        };
    for (entry_id, envelope) in messages {
        match handle_vision_feedback(videos, channels, snapshots, bus, high_risk_threshold, &envelope.payload).await {
            Ok(()) => {
                if let Err(e) = bus.ack(Topic::VisionFeedback, CONSUMER_GROUP, &entry_id).await {
                    warn!(error = %e, "failed to ack vision-feedback entry");
                }
            }
            Err(e) => warn!(video_id = %envelope.payload.video_id, error = %e, "feedback handler failed, will redeliver"),
        }
    }
}
