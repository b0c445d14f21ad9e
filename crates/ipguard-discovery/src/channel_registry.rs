//! Channel Registry (C4): a thin domain wrapper around the CAS-guarded store repository.

use chrono::Utc;
use ipguard_models::ChannelProfile;
use ipguard_store::ChannelRepository;

use crate::error::DiscoveryError;

pub struct ChannelRegistry<'a> {
    repo: &'a ChannelRepository<'a>,
}

impl<'a> ChannelRegistry<'a> {
    pub fn new(repo: &'a ChannelRepository<'a>) -> Self {
        Self { repo }
    }

    pub async fn get_or_create(&self, channel_id: &str, channel_title: &str) -> Result<ChannelProfile, DiscoveryError> {
        Ok(self.repo.get_or_create(channel_id, channel_title, Utc::now()).await?)
    }

    /// C4's `MarkScanned`: records a scan outcome, recomputes rate and tier, and advances
    /// `next_scan_at` (§4.4). The tier reclassification itself happens inside the store's
    /// CAS loop so the recomputed rate it reclassifies from is always post-increment.
    pub async fn mark_scanned(&self, channel_id: &str, had_infringement: bool) -> Result<ChannelProfile, DiscoveryError> {
        let profile = self
            .repo
            .update_with_cas(channel_id, |profile| {
                profile.total_videos_scanned += 1;
                if had_infringement {
                    profile.confirmed_infringements += 1;
                } else {
                    profile.videos_cleared += 1;
                }
                profile.last_scanned_at = Some(Utc::now());
            })
            .await?;

        // The store already reclassified `profile.tier` from the post-increment rate;
        // derive next_scan_at from that fresh tier and persist it in a second CAS pass.
        // IGNORE has no `rescan_interval` (never), but `due_for_scan` only filters on
        // `next_scan_at <= now` — leaving the old, already-past value in place would keep
        // resurfacing the channel every cycle. Push it far enough out that it never comes
        // due again instead.
        let next_scan_at = match profile.tier.rescan_interval() {
            Some(interval) => Utc::now() + interval,
            None => Utc::now() + chrono::Duration::days(36500),
        };
        Ok(self
            .repo
            .update_with_cas(channel_id, |p| {
                p.next_scan_at = next_scan_at;
            })
            .await?)
    }

    pub async fn due_for_scan(&self, limit: i32) -> Result<Vec<ChannelProfile>, DiscoveryError> {
        Ok(self.repo.due_for_scan(Utc::now(), limit).await?)
    }
}
