//! Redis Streams transport for the three named topics.

use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::streams::{StreamReadOptions, StreamReadReply};
use redis::{AsyncCommands, RedisResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::BusError;
use crate::types::{Envelope, Topic};

/// Dedup keys live long enough to cover any plausible redelivery window, then expire so the
/// dedup set doesn't grow without bound.
const DEDUP_TTL_SECONDS: i64 = 6 * 3600;

pub struct BusClient {
    conn: ConnectionManager,
}

impl BusClient {
    pub async fn connect(redis_url: &str) -> Result<Self, BusError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_tokio_connection_manager().await?;
        Ok(Self { conn })
    }

    /// Publishes `payload` to `topic`, returning the envelope's message id.
    pub async fn publish<T: Serialize>(&self, topic: Topic, payload: T) -> Result<uuid::Uuid, BusError> {
        let envelope = Envelope::new(payload);
        let json = serde_json::to_string(&envelope)?;
        let mut conn = self.conn.clone();
        let _entry_id: String = conn
            .xadd(topic.stream_key(), "*", &[("payload", json.as_str())])
            .await?;
        debug!(topic = topic.stream_key(), message_id = %envelope.message_id, "published message");
        Ok(envelope.message_id)
    }

    /// Creates `group` on `topic`'s stream starting from the tail, idempotently.
    pub async fn ensure_consumer_group(&self, topic: Topic, group: &str) -> Result<(), BusError> {
        let mut conn = self.conn.clone();
        let result: RedisResult<()> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(topic.stream_key())
            .arg(group)
            .arg("$")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.to_string().contains("BUSYGROUP") => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Reads up to `count` pending entries for `consumer` in `group`, blocking up to
    /// `block` for new ones. Returns the stream entry id (needed for `ack`) alongside
    /// each decoded envelope.
    pub async fn consume<T: for<'de> Deserialize<'de>>(
        &self,
        topic: Topic,
        group: &str,
        consumer: &str,
        count: usize,
        block: Duration,
    ) -> Result<Vec<(String, Envelope<T>)>, BusError> {
        let mut conn = self.conn.clone();
        let opts = StreamReadOptions::default()
            .group(group, consumer)
            .count(count)
            .block(block.as_millis() as usize);

        let reply: StreamReadReply = conn.xread_options(&[topic.stream_key()], &[">"], &opts).await?;
        let mut out = Vec::new();
        for stream_key in reply.keys {
            for entry in stream_key.ids {
                let payload: Option<String> = entry.map.get("payload").and_then(|v| match v {
                    redis::Value::BulkString(bytes) => String::from_utf8(bytes.clone()).ok(),
                    redis::Value::SimpleString(s) => Some(s.clone()),
                    _ => None,
                });
                let Some(payload) = payload else {
                    warn!(stream = topic.stream_key(), id = entry.id, "entry missing payload field");
                    continue;
                };
                let envelope: Envelope<T> = serde_json::from_str(&payload)?;
                out.push((entry.id, envelope));
            }
        }
        Ok(out)
    }

    pub async fn ack(&self, topic: Topic, group: &str, entry_id: &str) -> Result<(), BusError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.xack(topic.stream_key(), group, &[entry_id]).await?;
        Ok(())
    }

    /// Reclaims entries idle longer than `min_idle` so a crashed consumer's in-flight work
    /// is picked up by someone else, mirroring the job queue's crash-recovery sweep.
    pub async fn claim_stale<T: for<'de> Deserialize<'de>>(
        &self,
        topic: Topic,
        group: &str,
        consumer: &str,
        min_idle: Duration,
        count: usize,
    ) -> Result<Vec<(String, Envelope<T>)>, BusError> {
        let mut conn = self.conn.clone();
        let reply: StreamReadReply = redis::cmd("XAUTOCLAIM")
            .arg(topic.stream_key())
            .arg(group)
            .arg(consumer)
            .arg(min_idle.as_millis() as usize)
            .arg("0")
            .arg("COUNT")
            .arg(count)
            .query_async(&mut conn)
            .await?;

        let mut out = Vec::new();
        for stream_key in reply.keys {
            for entry in stream_key.ids {
                let payload: Option<String> = entry.map.get("payload").and_then(|v| match v {
                    redis::Value::BulkString(bytes) => String::from_utf8(bytes.clone()).ok(),
                    redis::Value::SimpleString(s) => Some(s.clone()),
                    _ => None,
                });
                let Some(payload) = payload else { continue };
                let envelope: Envelope<T> = serde_json::from_str(&payload)?;
                out.push((entry.id, envelope));
            }
        }
        Ok(out)
    }

    /// First-seen check for a dedup key (e.g. `"video-high-risk:{video_id}:{seq}"`).
    /// Returns `true` if this is the first time the key has been observed within the TTL
    /// window, i.e. the caller should process the message.
    pub async fn claim_dedup_key(&self, key: &str) -> Result<bool, BusError> {
        let mut conn = self.conn.clone();
        let set: Option<String> = redis::cmd("SET")
            .arg(format!("dedup:{key}"))
            .arg("1")
            .arg("NX")
            .arg("EX")
            .arg(DEDUP_TTL_SECONDS)
            .query_async(&mut conn)
            .await?;
        Ok(set.is_some())
    }
}
