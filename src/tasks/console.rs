use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::select;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cache::{FreshnessCache, StalenessLevel};
use crate::cycle::ImageCycler;
use crate::model::Group;
use crate::rotation::{Phase, RotationScheduler, RoundSource};
use crate::slides::{Slide, SlideContent, build_round};

const TICK: Duration = Duration::from_millis(250);

/// Round source backed by the live cache: rounds are rebuilt from current
/// snapshots and the cycler advances once per completed round.
pub struct CachedRounds {
    groups: Vec<Group>,
    cache: Arc<FreshnessCache>,
    cycler: ImageCycler,
}

impl CachedRounds {
    pub fn new(groups: Vec<Group>, cache: Arc<FreshnessCache>) -> Self {
        let cycler = ImageCycler::new(&groups);
        Self {
            groups,
            cache,
            cycler,
        }
    }
}

impl RoundSource for CachedRounds {
    fn build_round(&mut self) -> Vec<Slide> {
        build_round(&self.groups, &self.cache, &self.cycler)
    }

    fn advance_round(&mut self) {
        self.cycler.advance_round();
    }
}

/// No-render presenter: drives the full cache + scheduler stack off a frame
/// clock and prints each slide as it lands. The graphical renderer consumes
/// the same `current_slide`/`transition_progress` surface.
pub async fn run(
    groups: Vec<Group>,
    display_duration: Duration,
    transition_duration: Duration,
    cache: Arc<FreshnessCache>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut rounds = CachedRounds::new(groups, cache.clone());
    let mut scheduler = RotationScheduler::new(display_duration, transition_duration);
    scheduler.start(&mut rounds);

    let mut ticker = interval(TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();
    let mut last_line: Option<String> = None;

    info!("console presenter started");
    loop {
        select! {
            _ = cancel.cancelled() => {
                info!("cancel received; exiting console presenter");
                break;
            }
            _ = ticker.tick() => {}
        }

        let now = Instant::now();
        let delta = now.duration_since(last_tick);
        last_tick = now;
        scheduler.tick(delta, &mut rounds);

        if scheduler.phase() != Phase::Showing {
            continue;
        }
        let line = match scheduler.current_slide() {
            Some(slide) => slide_line(slide, &cache),
            None => "-- no rides currently reporting wait times --".to_string(),
        };
        if last_line.as_deref() != Some(line.as_str()) {
            println!("{line}");
            last_line = Some(line);
        }
    }
    Ok(())
}

fn slide_line(slide: &Slide, cache: &FreshnessCache) -> String {
    let mut line = match &slide.content {
        SlideContent::Ride {
            unit_name,
            wait_minutes,
            category,
            ..
        } => format!(
            "{} | {} — {} min ({}) [image {}]",
            slide.group_name,
            unit_name,
            wait_minutes,
            category.as_str(),
            slide.image_index
        ),
        SlideContent::Closed { opens_at } => {
            let mut s = format!("{} | CLOSED", slide.group_name);
            if let Some(opens) = opens_at {
                s.push_str(&format!(" — opens {opens}"));
            }
            s.push_str(&format!(" [image {}]", slide.image_index));
            s
        }
    };
    if slide.staleness == StalenessLevel::Stale {
        if let Some(age) = cache.age_minutes(&slide.group) {
            line.push_str(&format!(" [stale {age}m]"));
        }
    }
    line
}

/// One-shot text report of every group's open rides, waits descending,
/// mirroring the kiosk's closed/unknown distinctions.
pub fn text_summary(groups: &[Group], cache: &FreshnessCache) -> String {
    let mut out = String::new();
    let mut total_open = 0usize;
    let mut last_fetch = None;

    out.push_str(&format!("{}\n", "=".repeat(60)));
    out.push_str("PARK WAIT TIMES\n");
    out.push_str(&format!("{}\n", "=".repeat(60)));

    for group in groups {
        out.push_str(&format!("\n{}\n{}\n", group.name, "-".repeat(40)));
        let (snapshot, staleness) = cache.get(&group.slug);
        let Some(snapshot) = snapshot else {
            out.push_str("  No data yet\n");
            continue;
        };
        if staleness == StalenessLevel::NoData {
            out.push_str("  No data yet\n");
            continue;
        }
        last_fetch = last_fetch.max(Some(snapshot.fetched_at));

        let mut open: Vec<_> = snapshot.open_samples().collect();
        if open.is_empty() {
            out.push_str("  No rides currently reporting wait times\n");
            continue;
        }
        open.sort_by_key(|s| std::cmp::Reverse(s.wait_minutes.unwrap_or(0)));
        for sample in &open {
            out.push_str(&format!("  {}: {}\n", sample.name, sample.display_wait()));
        }
        total_open += open.len();
    }

    out.push_str(&format!("\n{}\n", "=".repeat(60)));
    out.push_str(&format!("Total open rides: {total_open}\n"));
    if let Some(fetched) = last_fetch {
        out.push_str(&format!("Data fetched at: {}\n", fetched.format("%H:%M")));
    }
    out.push_str(&format!("{}\n", "=".repeat(60)));
    out
}
