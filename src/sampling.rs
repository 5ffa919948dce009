//! Rate-limited selection of confirmed-smoke frames for cropping.

use std::time::Duration;

/// Admits at most one frame per `interval`.
///
/// The gate must see timestamps in ascending order; one gate belongs to one
/// traversal of one batch.
#[derive(Clone, Debug)]
pub struct SamplingGate {
    interval_s: i64,
    last_sampled: Option<i64>,
}

impl SamplingGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_s: i64::try_from(interval.as_secs()).unwrap_or(i64::MAX),
            last_sampled: None,
        }
    }

    pub fn last_sampled(&self) -> Option<i64> {
        self.last_sampled
    }

    /// Decide whether the frame at `epoch` is due, recording it if so.
    pub fn admit(&mut self, epoch: i64) -> bool {
        let due = match self.last_sampled {
            None => true,
            Some(last) => epoch.saturating_sub(last) >= self.interval_s,
        };
        if due {
            self.last_sampled = Some(epoch);
        }
        due
    }
}

/// Thread a fresh gate through `epochs`, returning one decision per input.
pub fn select_due<I>(epochs: I, interval: Duration) -> Vec<bool>
where
    I: IntoIterator<Item = i64>,
{
    epochs
        .into_iter()
        .scan(SamplingGate::new(interval), |gate, epoch| Some(gate.admit(epoch)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn first_frame_is_always_selected() {
        let mut gate = SamplingGate::new(MINUTE);
        assert_eq!(gate.last_sampled(), None);
        assert!(gate.admit(1_500_000_000));
        assert_eq!(gate.last_sampled(), Some(1_500_000_000));
    }

    #[test]
    fn frames_thirty_seconds_apart_select_only_the_first() {
        assert_eq!(select_due([1_500_000_000, 1_500_000_030], MINUTE), vec![true, false]);
    }

    #[test]
    fn interval_boundary_is_inclusive() {
        assert_eq!(
            select_due([1_500_000_000, 1_500_000_059, 1_500_000_060], MINUTE),
            vec![true, false, true]
        );
    }

    #[test]
    fn dense_frames_are_rate_limited() {
        let epochs: Vec<i64> = (0..600).step_by(7).map(|s| 1_500_000_000 + s).collect();
        let decisions = select_due(epochs.iter().copied(), MINUTE);
        let selected: Vec<i64> = epochs
            .iter()
            .zip(&decisions)
            .filter(|(_, due)| **due)
            .map(|(epoch, _)| *epoch)
            .collect();
        assert_eq!(selected.first(), Some(&1_500_000_000));
        for pair in selected.windows(2) {
            assert!(pair[1] - pair[0] >= 60);
        }
        // the gap between selections never exceeds interval + frame spacing
        for pair in selected.windows(2) {
            assert!(pair[1] - pair[0] < 60 + 7);
        }
    }

    #[test]
    fn skipped_frames_do_not_move_the_window() {
        assert_eq!(
            select_due([0, 40, 70, 100, 130], MINUTE),
            vec![true, false, true, false, true]
        );
    }

    #[test]
    fn separate_traversals_do_not_share_state() {
        let epochs = [1_500_000_000, 1_500_000_010];
        assert_eq!(select_due(epochs, MINUTE), select_due(epochs, MINUTE));
    }
}
