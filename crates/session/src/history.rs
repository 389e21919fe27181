use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use simcore::{Model, VehicleState};

use crate::Diagnostics;

/// Entries retained per session; older ones are evicted first
pub const HISTORY_CAPACITY: usize = 100;

/// Snapshot appended after every step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub time: f64,
    pub state: VehicleState,
    pub diagnostics: Diagnostics,
    /// Target the step was driven toward, after clamping (rad)
    #[serde(rename = "target_angle_deg", with = "simcore::units::degrees")]
    pub target_angle: f64,
}

/// Bounded ring of the most recent steps
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        History::with_capacity(HISTORY_CAPACITY)
    }
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        History {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Model for History {
    fn reset(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mechanics::{FrictionModel, TurnKinematics};
    use simcore::VehicleParams;

    fn entry(time: f64) -> HistoryEntry {
        let params = VehicleParams::default();
        let kin = TurnKinematics::compute(&params, 0.0, 10.0);
        let friction = FrictionModel::from_params(&params).evaluate(kin.centripetal_force);
        HistoryEntry {
            time,
            state: VehicleState { time, ..VehicleState::initial(10.0) },
            diagnostics: Diagnostics::from_parts(&kin, &friction),
            target_angle: 0.0,
        }
    }

    #[test]
    fn test_evicts_oldest_on_overflow() {
        let mut history = History::with_capacity(3);
        for i in 1..=5 {
            history.push(entry(i as f64));
        }
        let times: Vec<f64> = history.iter().map(|e| e.time).collect();
        assert_eq!(times, vec![3.0, 4.0, 5.0]);
        assert_eq!(history.latest().map(|e| e.time), Some(5.0));
    }

    #[test]
    fn test_default_capacity() {
        let mut history = History::default();
        for i in 0..250 {
            history.push(entry(i as f64));
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.iter().next().map(|e| e.time), Some(150.0));
    }

    #[test]
    fn test_reset_empties() {
        let mut history = History::default();
        history.push(entry(0.1));
        history.reset();
        assert!(history.is_empty());
    }
}
