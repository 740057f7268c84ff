use std::collections::HashMap;

use crate::model::Group;

/// Keys into the cycler: ride slides cycle per unit, the closed slide cycles
/// through the group's own image set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CycleKey {
    Unit(u32),
    Group(String),
}

#[derive(Debug)]
struct CycleState {
    index: usize,
    set_size: usize,
    advanced_in_round: u64,
}

/// Per-key image index, advanced uniformly once per completed rotation round
/// regardless of whether a key's slide appeared that round.
#[derive(Debug)]
pub struct ImageCycler {
    states: HashMap<CycleKey, CycleState>,
    round: u64,
}

impl ImageCycler {
    pub fn new(groups: &[Group]) -> Self {
        let mut states = HashMap::new();
        for group in groups {
            states.insert(
                CycleKey::Group(group.slug.clone()),
                CycleState {
                    index: 0,
                    set_size: group.images.max(1),
                    advanced_in_round: 0,
                },
            );
            for unit in &group.units {
                states.insert(
                    CycleKey::Unit(unit.id),
                    CycleState {
                        index: 0,
                        set_size: unit.images.max(1),
                        advanced_in_round: 0,
                    },
                );
            }
        }
        Self { states, round: 0 }
    }

    /// Current image index for a key; always within `[0, set_size)`. Unknown
    /// keys fall back to index 0.
    pub fn current_index(&self, key: &CycleKey) -> usize {
        self.states.get(key).map(|s| s.index).unwrap_or(0)
    }

    /// Step every multi-image set forward by one, wrapping modulo set size.
    /// Called by the rotation scheduler exactly once per completed round.
    pub fn advance_round(&mut self) {
        self.round += 1;
        for state in self.states.values_mut() {
            if state.set_size > 1 && state.advanced_in_round < self.round {
                state.index = (state.index + 1) % state.set_size;
                state.advanced_in_round = self.round;
            }
        }
    }

    pub fn completed_rounds(&self) -> u64 {
        self.round
    }
}
