use std::time::Duration;

use tracing::debug;

use crate::slides::Slide;

/// Supplies rotation rounds. The concrete implementation rebuilds slides from
/// the cache and steps the image cycler; tests substitute stubs.
pub trait RoundSource {
    fn build_round(&mut self) -> Vec<Slide>;
    fn advance_round(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Showing,
    Transitioning,
}

/// Wall-clock-driven state machine over one round of slides.
///
/// Ticks accumulate arbitrary deltas, so the machine is independent of frame
/// rate. Each tick is O(1) except at a round boundary, where the next round is
/// rebuilt. An empty round holds in `Showing` and re-polls the source at each
/// would-be boundary without crossing one.
#[derive(Debug)]
pub struct RotationScheduler {
    display_duration: Duration,
    transition_duration: Duration,
    round: Vec<Slide>,
    index: usize,
    elapsed: Duration,
    phase: Phase,
    completed_rounds: u64,
}

impl RotationScheduler {
    pub fn new(display_duration: Duration, transition_duration: Duration) -> Self {
        Self {
            display_duration,
            transition_duration,
            round: Vec::new(),
            index: 0,
            elapsed: Duration::ZERO,
            phase: Phase::Showing,
            completed_rounds: 0,
        }
    }

    /// Build the first round. Separate from `new` so the scheduler can be
    /// constructed before the cache has any data.
    pub fn start(&mut self, source: &mut impl RoundSource) {
        self.round = source.build_round();
        self.index = 0;
        self.elapsed = Duration::ZERO;
        self.phase = Phase::Showing;
        debug!(slides = self.round.len(), "initial round built");
    }

    pub fn tick(&mut self, delta: Duration, source: &mut impl RoundSource) {
        self.elapsed += delta;
        match self.phase {
            Phase::Showing => {
                if self.elapsed < self.display_duration {
                    return;
                }
                self.elapsed = Duration::ZERO;
                if self.round.is_empty() {
                    // Would-be boundary with nothing to show: re-poll without
                    // advancing the cycler or counting a round.
                    self.round = source.build_round();
                    self.index = 0;
                    if !self.round.is_empty() {
                        debug!(slides = self.round.len(), "round available after hold");
                    }
                    return;
                }
                self.phase = Phase::Transitioning;
            }
            Phase::Transitioning => {
                if self.elapsed < self.transition_duration {
                    return;
                }
                self.elapsed = Duration::ZERO;
                self.phase = Phase::Showing;
                self.index += 1;
                if self.index >= self.round.len() {
                    self.completed_rounds += 1;
                    source.advance_round();
                    self.round = source.build_round();
                    self.index = 0;
                    debug!(
                        round = self.completed_rounds,
                        slides = self.round.len(),
                        "round boundary crossed"
                    );
                }
            }
        }
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        self.round.get(self.index)
    }

    /// Crossfade progress for the presentation layer; 0 while showing.
    pub fn transition_progress(&self) -> f32 {
        match self.phase {
            Phase::Showing => 0.0,
            Phase::Transitioning => {
                if self.transition_duration.is_zero() {
                    return 1.0;
                }
                (self.elapsed.as_secs_f32() / self.transition_duration.as_secs_f32()).clamp(0.0, 1.0)
            }
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn completed_rounds(&self) -> u64 {
        self.completed_rounds
    }

    pub fn round_len(&self) -> usize {
        self.round.len()
    }
}
