use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::model::{Group, Snapshot, StatusSample};

/// Fetch failure taxonomy. Always non-fatal; the cache absorbs these into
/// staleness classification.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out fetching group '{group}'")]
    Timeout { group: String },

    #[error("feed unreachable for group '{group}': {reason}")]
    Unreachable { group: String, reason: String },

    #[error("malformed response for group '{group}': {reason}")]
    MalformedResponse { group: String, reason: String },
}

/// Thin I/O boundary over the wait-times feed. One bounded request per call;
/// retry policy lives with the refresh task, not here.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    base_url: String,
}

impl FeedClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn group_url(&self, group: &Group) -> String {
        format!(
            "{}/parks/{}/queue_times.json",
            self.base_url.trim_end_matches('/'),
            group.feed_id
        )
    }

    pub async fn fetch(&self, group: &Group) -> Result<Snapshot, FetchError> {
        let url = self.group_url(group);
        debug!(group = %group.slug, %url, "fetching wait times");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| classify_transport(&group.slug, err))?
            .error_for_status()
            .map_err(|err| FetchError::Unreachable {
                group: group.slug.clone(),
                reason: err.to_string(),
            })?;

        let body: FeedBody =
            response
                .json()
                .await
                .map_err(|err| FetchError::MalformedResponse {
                    group: group.slug.clone(),
                    reason: err.to_string(),
                })?;

        Ok(snapshot_from_body(&group.slug, body, Utc::now()))
    }
}

fn classify_transport(group: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            group: group.to_string(),
        }
    } else {
        FetchError::Unreachable {
            group: group.to_string(),
            reason: err.to_string(),
        }
    }
}

// Feed schema: rides grouped by land; we flatten across lands.
#[derive(Debug, Deserialize)]
struct FeedBody {
    #[serde(default)]
    lands: Vec<FeedLand>,
}

#[derive(Debug, Deserialize)]
struct FeedLand {
    #[serde(default)]
    rides: Vec<FeedRide>,
}

#[derive(Debug, Deserialize)]
struct FeedRide {
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    wait_time: Option<u32>,
    #[serde(default)]
    is_open: bool,
}

fn snapshot_from_body(group: &str, body: FeedBody, fetched_at: DateTime<Utc>) -> Snapshot {
    let samples = body
        .lands
        .into_iter()
        .flat_map(|land| land.rides)
        .map(|ride| StatusSample {
            unit_id: ride.id,
            name: ride.name,
            operating: ride.is_open,
            wait_minutes: if ride.is_open {
                Some(ride.wait_time.unwrap_or(0))
            } else {
                None
            },
            sampled_at: fetched_at,
        })
        .collect();
    Snapshot {
        group: group.to_string(),
        samples,
        fetched_at,
    }
}
