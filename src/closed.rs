use crate::cache::StalenessLevel;
use crate::model::Snapshot;

/// Whether a group should render in closed mode: no sample is operating with
/// a nonzero wait, and we actually have data. A group that has never been
/// fetched is unknown, never closed.
pub fn is_closed(snapshot: &Snapshot, staleness: StalenessLevel) -> bool {
    if staleness == StalenessLevel::NoData {
        return false;
    }
    snapshot.open_samples().next().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StatusSample;
    use chrono::Utc;

    fn snapshot(samples: Vec<(bool, u32)>) -> Snapshot {
        let now = Utc::now();
        Snapshot {
            group: "magic-kingdom".to_string(),
            samples: samples
                .into_iter()
                .enumerate()
                .map(|(i, (operating, wait))| StatusSample {
                    unit_id: i as u32,
                    name: format!("ride-{i}"),
                    operating,
                    wait_minutes: operating.then_some(wait),
                    sampled_at: now,
                })
                .collect(),
            fetched_at: now,
        }
    }

    #[test]
    fn open_ride_means_not_closed() {
        let snap = snapshot(vec![(false, 0), (true, 15)]);
        assert!(!is_closed(&snap, StalenessLevel::Fresh));
    }

    #[test]
    fn all_shut_or_zero_wait_means_closed() {
        let snap = snapshot(vec![(false, 0), (true, 0)]);
        assert!(is_closed(&snap, StalenessLevel::Fresh));
        assert!(is_closed(&snap, StalenessLevel::Stale));
    }

    #[test]
    fn empty_snapshot_is_closed_when_data_exists() {
        let snap = snapshot(vec![]);
        assert!(is_closed(&snap, StalenessLevel::Fresh));
    }

    #[test]
    fn no_data_is_never_closed() {
        let snap = snapshot(vec![]);
        assert!(!is_closed(&snap, StalenessLevel::NoData));
    }
}
