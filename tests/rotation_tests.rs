use std::time::Duration;

use waitboard::cache::StalenessLevel;
use waitboard::model::WaitCategory;
use waitboard::rotation::{Phase, RotationScheduler, RoundSource};
use waitboard::slides::{Slide, SlideContent};

fn slide(n: u32) -> Slide {
    Slide {
        group: "magic-kingdom".to_string(),
        group_name: "Magic Kingdom".to_string(),
        content: SlideContent::Ride {
            unit_id: n,
            unit_name: format!("ride-{n}"),
            theme: "classic".to_string(),
            wait_minutes: 10,
            category: WaitCategory::Short,
        },
        image_index: 0,
        staleness: StalenessLevel::Fresh,
    }
}

/// Stub source with a scripted sequence of rounds.
struct ScriptedRounds {
    rounds: Vec<Vec<Slide>>,
    builds: usize,
    advances: usize,
}

impl ScriptedRounds {
    fn new(rounds: Vec<Vec<Slide>>) -> Self {
        Self {
            rounds,
            builds: 0,
            advances: 0,
        }
    }
}

impl RoundSource for ScriptedRounds {
    fn build_round(&mut self) -> Vec<Slide> {
        let round = if self.builds < self.rounds.len() {
            self.rounds[self.builds].clone()
        } else {
            self.rounds.last().cloned().unwrap_or_default()
        };
        self.builds += 1;
        round
    }

    fn advance_round(&mut self) {
        self.advances += 1;
    }
}

const DISPLAY: Duration = Duration::from_secs(8);
const TRANSITION: Duration = Duration::from_millis(500);

fn tick_for(scheduler: &mut RotationScheduler, source: &mut ScriptedRounds, total: Duration) {
    // 100ms ticks, uneven last step tolerated by the delta model
    let step = Duration::from_millis(100);
    let mut left = total;
    while left > Duration::ZERO {
        let d = left.min(step);
        scheduler.tick(d, source);
        left -= d;
    }
}

#[test]
fn seven_slide_round_completes_after_expected_wall_time() {
    let round: Vec<Slide> = (0..7).map(slide).collect();
    let mut source = ScriptedRounds::new(vec![round.clone(), round]);
    let mut scheduler = RotationScheduler::new(DISPLAY, TRANSITION);
    scheduler.start(&mut source);

    // 7 slides at 8s showing + 0.5s transition each
    tick_for(&mut scheduler, &mut source, Duration::from_millis(8500 * 7));

    assert_eq!(scheduler.completed_rounds(), 1);
    assert_eq!(source.advances, 1);
    assert!(matches!(
        scheduler.current_slide().map(|s| &s.content),
        Some(SlideContent::Ride { unit_id: 0, .. })
    ));
}

#[test]
fn index_advances_through_round_in_order() {
    let round: Vec<Slide> = (0..3).map(slide).collect();
    let mut source = ScriptedRounds::new(vec![round.clone(), round]);
    let mut scheduler = RotationScheduler::new(DISPLAY, TRANSITION);
    scheduler.start(&mut source);

    let ids = |s: &RotationScheduler| match s.current_slide().map(|s| &s.content) {
        Some(SlideContent::Ride { unit_id, .. }) => *unit_id,
        _ => panic!("expected ride slide"),
    };

    assert_eq!(ids(&scheduler), 0);
    tick_for(&mut scheduler, &mut source, Duration::from_millis(8500));
    assert_eq!(ids(&scheduler), 1);
    tick_for(&mut scheduler, &mut source, Duration::from_millis(8500));
    assert_eq!(ids(&scheduler), 2);
}

#[test]
fn transition_progress_ramps_and_resets() {
    let round: Vec<Slide> = (0..2).map(slide).collect();
    let mut source = ScriptedRounds::new(vec![round]);
    let mut scheduler = RotationScheduler::new(DISPLAY, TRANSITION);
    scheduler.start(&mut source);

    assert_eq!(scheduler.transition_progress(), 0.0);
    scheduler.tick(DISPLAY, &mut source);
    assert_eq!(scheduler.phase(), Phase::Transitioning);

    scheduler.tick(Duration::from_millis(250), &mut source);
    let mid = scheduler.transition_progress();
    assert!(mid > 0.4 && mid < 0.6, "mid-transition progress was {mid}");

    scheduler.tick(Duration::from_millis(250), &mut source);
    assert_eq!(scheduler.phase(), Phase::Showing);
    assert_eq!(scheduler.transition_progress(), 0.0);
}

#[test]
fn empty_round_holds_without_boundary_crossings() {
    let mut source = ScriptedRounds::new(vec![vec![], vec![], vec![]]);
    let mut scheduler = RotationScheduler::new(DISPLAY, TRANSITION);
    scheduler.start(&mut source);

    assert!(scheduler.current_slide().is_none());
    tick_for(&mut scheduler, &mut source, Duration::from_secs(60));

    assert_eq!(scheduler.completed_rounds(), 0);
    assert_eq!(source.advances, 0);
    assert_eq!(scheduler.phase(), Phase::Showing);
    // re-polled at each would-be boundary
    assert!(source.builds > 1);
}

#[test]
fn empty_round_recovers_when_slides_appear() {
    let mut source = ScriptedRounds::new(vec![vec![], vec![], vec![slide(9)]]);
    let mut scheduler = RotationScheduler::new(DISPLAY, TRANSITION);
    scheduler.start(&mut source);

    tick_for(&mut scheduler, &mut source, Duration::from_secs(17));
    assert!(scheduler.current_slide().is_some());
    assert_eq!(scheduler.completed_rounds(), 0);
    assert_eq!(source.advances, 0);
}

#[test]
fn shrinking_round_keeps_index_valid() {
    let first: Vec<Slide> = (0..5).map(slide).collect();
    let second: Vec<Slide> = (0..2).map(slide).collect();
    let mut source = ScriptedRounds::new(vec![first, second.clone(), second]);
    let mut scheduler = RotationScheduler::new(DISPLAY, TRANSITION);
    scheduler.start(&mut source);

    // run through the full first round and into the second
    tick_for(&mut scheduler, &mut source, Duration::from_millis(8500 * 6));
    assert_eq!(scheduler.completed_rounds(), 1);
    assert!(scheduler.current_slide().is_some());
    assert!(scheduler.round_len() == 2);
}

#[test]
fn single_slide_round_still_crosses_boundaries() {
    let round = vec![slide(1)];
    let mut source = ScriptedRounds::new(vec![round.clone(), round.clone(), round]);
    let mut scheduler = RotationScheduler::new(DISPLAY, TRANSITION);
    scheduler.start(&mut source);

    tick_for(&mut scheduler, &mut source, Duration::from_millis(8500 * 2));
    assert_eq!(scheduler.completed_rounds(), 2);
    assert_eq!(source.advances, 2);
}
