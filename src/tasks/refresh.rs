use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio::select;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::cache::FreshnessCache;
use crate::feed::{FeedClient, FetchError};
use crate::model::Group;

/// Knobs for the per-group refresh loop.
#[derive(Debug, Clone)]
pub struct RefreshPolicy {
    pub refresh_interval: Duration,
    pub retry_delay: Duration,
    pub max_retries: u32,
}

/// Fetch one group once and fold the outcome into the cache. Failures are
/// absorbed, never propagated.
pub async fn refresh_group(client: &FeedClient, cache: &FreshnessCache, group: &Group) {
    match client.fetch(group).await {
        Ok(snapshot) => {
            let open = snapshot.open_samples().count();
            info!(group = %group.slug, open, "wait times refreshed");
            cache.record_success(snapshot);
        }
        Err(err) => {
            let failures = cache.record_failure(&group.slug, Utc::now());
            let kind = match &err {
                FetchError::Timeout { .. } => "timeout",
                FetchError::Unreachable { .. } => "unreachable",
                FetchError::MalformedResponse { .. } => "malformed",
            };
            warn!(group = %group.slug, failures, kind, %err, "fetch failed");
        }
    }
}

/// Background refresh loop for a single group: an immediate fetch, then a
/// regular cadence of `refresh_interval`, tightened to `retry_delay` while the
/// consecutive-failure count is below `max_retries`.
#[instrument(skip(client, cache, cancel), fields(group = %group.slug))]
pub async fn run(
    group: Group,
    policy: RefreshPolicy,
    client: FeedClient,
    cache: Arc<FreshnessCache>,
    cancel: CancellationToken,
) -> Result<()> {
    refresh_group(&client, &cache, &group).await;

    loop {
        let failures = cache.failures(&group.slug);
        let delay = if failures > 0 && failures < policy.max_retries {
            policy.retry_delay
        } else {
            policy.refresh_interval
        };

        select! {
            _ = cancel.cancelled() => {
                info!("cancel received; exiting refresh task");
                break;
            }
            _ = sleep(delay) => {}
        }

        refresh_group(&client, &cache, &group).await;
    }
    Ok(())
}
