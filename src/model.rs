use chrono::{DateTime, Utc};

/// A park: a named collection of units sharing one feed endpoint.
/// Built from configuration at startup; immutable afterwards.
#[derive(Debug, Clone)]
pub struct Group {
    pub slug: String,
    pub name: String,
    /// Remote park id interpolated into the feed URL.
    pub feed_id: u32,
    /// Opening-time hint shown on the closed slide, if configured.
    pub opens_at: Option<String>,
    /// Size of the group's own image set (used by the closed slide).
    pub images: usize,
    pub units: Vec<Unit>,
}

/// A ride/attraction within a group.
#[derive(Debug, Clone)]
pub struct Unit {
    pub id: u32,
    pub name: String,
    /// Back-reference to the owning group's slug.
    pub group: String,
    pub theme: String,
    /// Size of this unit's image set; indices wrap modulo this.
    pub images: usize,
    /// Display priority within the group; lower sorts first, unset sorts last.
    pub priority: Option<u32>,
}

/// One unit's status as reported by a single fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSample {
    pub unit_id: u32,
    pub name: String,
    pub operating: bool,
    /// Reported queue wait; `None` when the unit is not operating.
    pub wait_minutes: Option<u32>,
    pub sampled_at: DateTime<Utc>,
}

impl StatusSample {
    /// Whether this sample qualifies for a rotation slide.
    pub fn eligible(&self) -> bool {
        self.operating && self.wait_minutes.unwrap_or(0) > 0
    }

    pub fn wait_category(&self) -> WaitCategory {
        WaitCategory::for_minutes(self.wait_minutes.unwrap_or(0))
    }

    pub fn display_wait(&self) -> String {
        if !self.operating {
            return "Closed".to_string();
        }
        match self.wait_minutes.unwrap_or(0) {
            0 => "Walk On".to_string(),
            n => format!("{n} min"),
        }
    }
}

/// The most recent successfully fetched state of all units in a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub group: String,
    pub samples: Vec<StatusSample>,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Samples eligible for display (operating with a nonzero wait).
    pub fn open_samples(&self) -> impl Iterator<Item = &StatusSample> {
        self.samples.iter().filter(|s| s.eligible())
    }
}

/// Wait-time bucket used for presentation color coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCategory {
    Short,
    Moderate,
    Long,
    VeryLong,
}

impl WaitCategory {
    pub fn for_minutes(minutes: u32) -> Self {
        match minutes {
            0..=20 => Self::Short,
            21..=45 => Self::Moderate,
            46..=75 => Self::Long,
            _ => Self::VeryLong,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Moderate => "moderate",
            Self::Long => "long",
            Self::VeryLong => "very-long",
        }
    }
}
