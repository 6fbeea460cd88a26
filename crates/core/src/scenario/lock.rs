//! Scenario-level read/write/simulation lock, per §5 and §9.
//!
//! Modeled as an explicit counter trio rather than [`std::sync::RwLock`]
//! directly, because the three regimes aren't the usual reader/writer split:
//! a run holds the scenario open for reading (queries remain valid) for its
//! entire duration while *also* excluding configuration writes, so "someone
//! is simulating" needs its own counter distinct from plain readers.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::EngineError;

/// Free / shared-read / shared-simulation / exclusive-write regimes over one
/// scenario's configuration and step archive.
#[derive(Debug, Default)]
pub struct ScenarioLock {
    readers: AtomicU32,
    simulating: AtomicU32,
    writer: AtomicU32,
}

/// RAII guard releasing a read lock on drop.
pub struct ReadGuard<'a>(&'a ScenarioLock);
impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        self.0.readers.fetch_sub(1, Ordering::AcqRel);
    }
}

/// RAII guard releasing the simulation lock on drop.
pub struct SimulationGuard<'a>(&'a ScenarioLock);
impl Drop for SimulationGuard<'_> {
    fn drop(&mut self) {
        self.0.simulating.fetch_sub(1, Ordering::AcqRel);
    }
}

/// RAII guard releasing the exclusive write lock on drop.
pub struct WriteGuard<'a>(&'a ScenarioLock);
impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.0.writer.store(0, Ordering::Release);
    }
}

impl ScenarioLock {
    #[must_use]
    pub fn new() -> Self {
        ScenarioLock::default()
    }

    /// Acquire a plain read lock (queries, inspections). Fails only while an
    /// exclusive write is in progress.
    pub fn read(&self) -> Result<ReadGuard<'_>, EngineError> {
        if self.writer.load(Ordering::Acquire) != 0 {
            return Err(EngineError::ScenarioBadState {
                state: "write_locked",
            });
        }
        self.readers.fetch_add(1, Ordering::AcqRel);
        Ok(ReadGuard(self))
    }

    /// Acquire the simulation lock held for the duration of a run. Multiple
    /// concurrent simulation holders are permitted (e.g. nested step calls
    /// from a host-level driver), but configuration writes are blocked the
    /// whole time this counter is non-zero.
    pub fn begin_simulation(&self) -> SimulationGuard<'_> {
        self.simulating.fetch_add(1, Ordering::AcqRel);
        SimulationGuard(self)
    }

    /// Acquire the exclusive write lock used for configuration changes and
    /// teardown. Returns [`EngineError::ScenarioSimulationRunning`] (not a
    /// blocking wait) if a run currently holds the simulation lock, and
    /// [`EngineError::ScenarioBadState`] if another writer or any reader is
    /// active.
    pub fn write(&self) -> Result<WriteGuard<'_>, EngineError> {
        if self.simulating.load(Ordering::Acquire) != 0 {
            return Err(EngineError::ScenarioSimulationRunning);
        }
        if self
            .writer
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(EngineError::ScenarioBadState {
                state: "write_locked",
            });
        }
        if self.readers.load(Ordering::Acquire) != 0 {
            self.writer.store(0, Ordering::Release);
            return Err(EngineError::ScenarioBadState { state: "read_locked" });
        }
        Ok(WriteGuard(self))
    }

    #[must_use]
    pub fn is_simulating(&self) -> bool {
        self.simulating.load(Ordering::Acquire) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_fails_distinctly_while_simulation_runs() {
        let lock = ScenarioLock::new();
        let _sim = lock.begin_simulation();
        assert_eq!(lock.write().unwrap_err(), EngineError::ScenarioSimulationRunning);
    }

    #[test]
    fn write_fails_while_read_locked() {
        let lock = ScenarioLock::new();
        let _r = lock.read().unwrap();
        assert!(lock.write().is_err());
    }

    #[test]
    fn write_succeeds_once_readers_and_simulation_release() {
        let lock = ScenarioLock::new();
        {
            let _r = lock.read().unwrap();
            let _sim = lock.begin_simulation();
        }
        assert!(lock.write().is_ok());
    }

    #[test]
    fn read_fails_while_write_locked() {
        let lock = ScenarioLock::new();
        let _w = lock.write().unwrap();
        assert!(lock.read().is_err());
    }
}
