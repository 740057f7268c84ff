use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::model::{Group, Unit};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Configuration {
    /// Base URL of the wait-times feed; the park id is appended per group.
    #[serde(default = "Configuration::default_feed_base_url")]
    pub feed_base_url: String,

    /// Regular refresh cadence per group.
    #[serde(with = "humantime_serde", default = "Configuration::default_refresh_interval")]
    pub refresh_interval: Duration,

    /// Out-of-band retry delay after a failed fetch.
    #[serde(with = "humantime_serde", default = "Configuration::default_retry_delay")]
    pub retry_delay: Duration,

    /// Consecutive failures tolerated before falling back to the regular interval.
    #[serde(default = "Configuration::default_max_retries")]
    pub max_retries: u32,

    /// Per-request fetch timeout.
    #[serde(with = "humantime_serde", default = "Configuration::default_fetch_timeout")]
    pub fetch_timeout: Duration,

    /// Time each slide is held before transitioning.
    #[serde(with = "humantime_serde", default = "Configuration::default_display_duration")]
    pub display_duration: Duration,

    /// Crossfade length between slides.
    #[serde(with = "humantime_serde", default = "Configuration::default_transition_duration")]
    pub transition_duration: Duration,

    /// Snapshot age at which data counts as stale.
    #[serde(with = "humantime_serde", default = "Configuration::default_stale_after")]
    pub stale_after: Duration,

    /// Group slugs to display; unset means every configured group.
    #[serde(default)]
    pub enabled_groups: Option<Vec<String>>,

    pub groups: Vec<GroupConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GroupConfig {
    pub slug: String,
    pub name: String,
    pub feed_id: u32,
    #[serde(default)]
    pub opens_at: Option<String>,
    #[serde(default = "default_image_count")]
    pub images: usize,
    #[serde(default)]
    pub units: Vec<UnitConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UnitConfig {
    pub id: u32,
    pub name: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_image_count")]
    pub images: usize,
    #[serde(default)]
    pub priority: Option<u32>,
}

const fn default_image_count() -> usize {
    1
}

fn default_theme() -> String {
    "classic".to_string()
}

impl Configuration {
    fn default_feed_base_url() -> String {
        "https://queue-times.com".to_string()
    }

    const fn default_refresh_interval() -> Duration {
        Duration::from_secs(300)
    }

    const fn default_retry_delay() -> Duration {
        Duration::from_secs(30)
    }

    const fn default_max_retries() -> u32 {
        3
    }

    const fn default_fetch_timeout() -> Duration {
        Duration::from_secs(10)
    }

    const fn default_display_duration() -> Duration {
        Duration::from_secs(8)
    }

    const fn default_transition_duration() -> Duration {
        Duration::from_millis(500)
    }

    const fn default_stale_after() -> Duration {
        Duration::from_secs(15 * 60)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.groups.is_empty(), "at least one group must be configured");
        ensure!(
            !self.display_duration.is_zero(),
            "display-duration must be greater than zero"
        );
        ensure!(
            !self.refresh_interval.is_zero(),
            "refresh-interval must be greater than zero"
        );
        ensure!(
            !self.stale_after.is_zero(),
            "stale-after must be greater than zero"
        );

        let mut slugs = HashSet::new();
        for group in &self.groups {
            ensure!(
                slugs.insert(group.slug.as_str()),
                "duplicate group slug '{}'",
                group.slug
            );
            ensure!(group.images >= 1, "group '{}' needs at least one image", group.slug);
            let mut unit_ids = HashSet::new();
            for unit in &group.units {
                ensure!(
                    unit_ids.insert(unit.id),
                    "duplicate unit id {} in group '{}'",
                    unit.id,
                    group.slug
                );
                ensure!(
                    unit.images >= 1,
                    "unit '{}' needs at least one image",
                    unit.name
                );
            }
        }

        if let Some(enabled) = &self.enabled_groups {
            for slug in enabled {
                ensure!(
                    slugs.contains(slug.as_str()),
                    "enabled-groups names unknown group '{}'",
                    slug
                );
            }
        }
        Ok(())
    }

    /// Materialize the enabled groups, in configuration order, with unit
    /// back-references filled in.
    pub fn display_groups(&self) -> Vec<Group> {
        self.groups
            .iter()
            .filter(|g| match &self.enabled_groups {
                Some(enabled) => enabled.iter().any(|slug| slug == &g.slug),
                None => true,
            })
            .map(|g| Group {
                slug: g.slug.clone(),
                name: g.name.clone(),
                feed_id: g.feed_id,
                opens_at: g.opens_at.clone(),
                images: g.images,
                units: g
                    .units
                    .iter()
                    .map(|u| Unit {
                        id: u.id,
                        name: u.name.clone(),
                        group: g.slug.clone(),
                        theme: u.theme.clone(),
                        images: u.images,
                        priority: u.priority,
                    })
                    .collect(),
            })
            .collect()
    }
}

pub fn from_yaml_file(path: &Path) -> Result<Configuration> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let cfg: Configuration =
        serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}
