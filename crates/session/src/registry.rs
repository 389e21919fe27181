//! Keyed, bounded collection of live sessions
//!
//! The map lock is only held long enough to look up, insert or remove a
//! handle. Each session has its own lock, so a long `run` on one session does
//! not block requests against another.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::warn;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use simcore::{SimError, SimResult, VehicleState};
use uuid::Uuid;

use crate::config::{ParamUpdate, SimulationConfig};
use crate::history::HistoryEntry;
use crate::session::{SimulationSession, StepOutcome};
use crate::statistics::SummaryStatistics;
use crate::sweep::{SweepReport, SweepRequest, run_sweep};

pub const DEFAULT_CAPACITY: usize = 100;

/// Opaque session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new_v4() -> Self {
        SessionId(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SessionId {
    type Err = SimError;

    /// A string that is not a valid id cannot name a session either
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(SessionId).map_err(|_| SimError::not_found(s))
    }
}

pub type SessionHandle = Arc<Mutex<SimulationSession>>;

/// One line of `SessionRegistry::list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub state: VehicleState,
    pub history_len: usize,
    pub mass: f64,
    pub gravity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStatus {
    pub active_sessions: usize,
    pub capacity: usize,
}

#[derive(Debug)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
    capacity: usize,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        SessionRegistry::with_capacity(DEFAULT_CAPACITY)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        SessionRegistry {
            sessions: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate `config`, build a session and register it under a fresh id
    pub fn create(&self, config: SimulationConfig) -> SimResult<(SessionId, VehicleState)> {
        let session = SimulationSession::new(config)?;
        let state = *session.state();

        let mut sessions = self.sessions.lock();
        if sessions.len() >= self.capacity {
            warn!("rejecting new simulation, registry is full ({} sessions)", self.capacity);
            return Err(SimError::Capacity { limit: self.capacity });
        }
        let mut id = SessionId::new_v4();
        while sessions.contains_key(&id) {
            id = SessionId::new_v4();
        }
        sessions.insert(id, Arc::new(Mutex::new(session)));
        Ok((id, state))
    }

    pub fn get(&self, id: SessionId) -> SimResult<SessionHandle> {
        self.sessions
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| SimError::not_found(id))
    }

    /// Current state and the most recent diagnostics, if any step has run
    pub fn snapshot(&self, id: SessionId) -> SimResult<(VehicleState, Option<HistoryEntry>)> {
        let handle = self.get(id)?;
        let session = handle.lock();
        Ok((*session.state(), session.history().latest().copied()))
    }

    pub fn step(&self, id: SessionId, target_angle: f64) -> SimResult<StepOutcome> {
        self.get(id)?.lock().step(target_angle)
    }

    pub fn run(&self, id: SessionId, duration: f64, target_angle: f64) -> SimResult<Vec<StepOutcome>> {
        let handle = self.get(id)?;
        let mut session = handle.lock();
        session.run(duration, target_angle)
    }

    /// Apply `update` and return the resulting configuration
    pub fn update_params(&self, id: SessionId, update: &ParamUpdate) -> SimResult<SimulationConfig> {
        let handle = self.get(id)?;
        let mut session = handle.lock();
        session.update_params(update)?;
        Ok(session.config().clone())
    }

    pub fn reset(&self, id: SessionId, initial_velocity: Option<f64>) -> SimResult<VehicleState> {
        let handle = self.get(id)?;
        let mut session = handle.lock();
        session.reset(initial_velocity)?;
        Ok(*session.state())
    }

    /// Retained history, oldest first
    pub fn history(&self, id: SessionId) -> SimResult<Vec<HistoryEntry>> {
        Ok(self.get(id)?.lock().history().to_vec())
    }

    pub fn statistics(&self, id: SessionId) -> SimResult<SummaryStatistics> {
        Ok(self.get(id)?.lock().statistics())
    }

    pub fn delete(&self, id: SessionId) -> SimResult<()> {
        match self.sessions.lock().remove(&id) {
            Some(_) => Ok(()),
            None => Err(SimError::not_found(id)),
        }
    }

    pub fn list(&self) -> Vec<SessionSummary> {
        let handles: Vec<(SessionId, SessionHandle)> = self
            .sessions
            .lock()
            .iter()
            .map(|(id, handle)| (*id, Arc::clone(handle)))
            .collect();

        handles
            .into_iter()
            .map(|(id, handle)| {
                let session = handle.lock();
                SessionSummary {
                    id,
                    state: *session.state(),
                    history_len: session.history().len(),
                    mass: session.config().vehicle.mass,
                    gravity: session.config().vehicle.gravity,
                }
            })
            .collect()
    }

    pub fn status(&self) -> RegistryStatus {
        RegistryStatus {
            active_sessions: self.len(),
            capacity: self.capacity,
        }
    }

    /// Run a sweep on throwaway sessions; the registry itself is not touched
    pub fn parameter_sweep(&self, request: &SweepRequest) -> SimResult<SweepReport> {
        run_sweep(request)
    }
}
