use chrono::{DateTime, Utc};

use crate::cache::{FreshnessCache, StalenessLevel};
use crate::closed::is_closed;
use crate::cycle::{CycleKey, ImageCycler};
use crate::model::{Group, WaitCategory};

/// One displayable unit of rotation. Ephemeral: rebuilt every round from the
/// cache, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    pub group: String,
    pub group_name: String,
    pub content: SlideContent,
    pub image_index: usize,
    pub staleness: StalenessLevel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlideContent {
    Ride {
        unit_id: u32,
        unit_name: String,
        theme: String,
        wait_minutes: u32,
        category: WaitCategory,
    },
    /// Synthetic slide standing in for a whole closed group.
    Closed { opens_at: Option<String> },
}

/// Build the ordered slide sequence for one rotation round.
///
/// Per group: a single closed slide when the closed detector fires, otherwise
/// one slide per eligible unit in priority-then-identifier order. Groups with
/// no data ever fetched are skipped outright. Image indices are read from the
/// cycler at build time and frozen into the slides.
pub fn build_round(groups: &[Group], cache: &FreshnessCache, cycler: &ImageCycler) -> Vec<Slide> {
    build_round_at(groups, cache, cycler, Utc::now())
}

pub fn build_round_at(
    groups: &[Group],
    cache: &FreshnessCache,
    cycler: &ImageCycler,
    now: DateTime<Utc>,
) -> Vec<Slide> {
    let mut slides = Vec::new();
    for group in groups {
        let (snapshot, staleness) = cache.get_at(&group.slug, now);
        let Some(snapshot) = snapshot else {
            continue;
        };
        if staleness == StalenessLevel::NoData {
            continue;
        }

        if is_closed(&snapshot, staleness) {
            slides.push(Slide {
                group: group.slug.clone(),
                group_name: group.name.clone(),
                content: SlideContent::Closed {
                    opens_at: group.opens_at.clone(),
                },
                image_index: cycler.current_index(&CycleKey::Group(group.slug.clone())),
                staleness,
            });
            continue;
        }

        let mut units: Vec<_> = group.units.iter().collect();
        units.sort_by_key(|u| (u.priority.unwrap_or(u32::MAX), u.id));

        for unit in units {
            let Some(sample) = snapshot.samples.iter().find(|s| s.unit_id == unit.id) else {
                continue;
            };
            if !sample.eligible() {
                continue;
            }
            let wait = sample.wait_minutes.unwrap_or(0);
            slides.push(Slide {
                group: group.slug.clone(),
                group_name: group.name.clone(),
                content: SlideContent::Ride {
                    unit_id: unit.id,
                    unit_name: unit.name.clone(),
                    theme: unit.theme.clone(),
                    wait_minutes: wait,
                    category: WaitCategory::for_minutes(wait),
                },
                image_index: cycler.current_index(&CycleKey::Unit(unit.id)),
                staleness,
            });
        }
    }
    slides
}
