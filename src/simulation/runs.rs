//! Latest-run-wins publication of simulation results.
//!
//! Interactive callers may start a new run before the previous one has
//! finished. Each run takes a [`RunToken`] when it starts; when it finishes it
//! may only publish if its token is still the most recently issued one.
//! The check and the store happen under one lock, so an observer sees either
//! the previous complete output or the new complete output, never a mix and
//! never a stale run's results.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::results::SimulationOutput;
use crate::config::SimulationConfig;
use crate::dosing::DosingRegimen;
use crate::error::ValidationError;
use crate::models::PDParameters;

/// Opaque identifier handed out when a run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunToken(u64);

#[derive(Debug, Clone)]
struct Published {
    token: RunToken,
    output: Arc<SimulationOutput>,
}

#[derive(Debug)]
pub struct RunCoordinator {
    /// Last token handed out by `begin`.
    latest: AtomicU64,
    /// Cleared by `close` once the owner no longer wants results.
    interested: AtomicBool,
    published: Mutex<Option<Published>>,
}

impl Default for RunCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RunCoordinator {
    pub fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
            interested: AtomicBool::new(true),
            published: Mutex::new(None),
        }
    }

    /// Starts a new run, superseding every run started before it.
    pub fn begin(&self) -> RunToken {
        let token = RunToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1);
        debug!("Run {:?} started", token);
        token
    }

    pub fn is_current(&self, token: RunToken) -> bool {
        self.interested.load(Ordering::SeqCst) && self.latest.load(Ordering::SeqCst) == token.0
    }

    /// Commits `output` if `token` still belongs to the newest run.
    ///
    /// Returns `false` and drops the output when a newer run has started
    /// or the coordinator has been closed.
    pub fn publish(&self, token: RunToken, output: SimulationOutput) -> bool {
        let mut slot = self.lock();
        if !self.is_current(token) {
            warn!(
                "Discarding results of stale run {:?} (latest is {})",
                token,
                self.latest.load(Ordering::SeqCst)
            );
            return false;
        }

        *slot = Some(Published {
            token,
            output: Arc::new(output),
        });
        debug!("Run {:?} published", token);
        true
    }

    /// Most recently published output, if any.
    pub fn latest(&self) -> Option<Arc<SimulationOutput>> {
        self.lock().as_ref().map(|p| Arc::clone(&p.output))
    }

    pub fn latest_token(&self) -> Option<RunToken> {
        self.lock().as_ref().map(|p| p.token)
    }

    /// Stops accepting results; in-flight runs will be discarded.
    pub fn close(&self) {
        self.interested.store(false, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, Option<Published>> {
        // Published values are only ever replaced whole, so a poisoned
        // guard still holds a consistent value.
        self.published.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs the engine under a fresh token and publishes the result if it is
/// still current. Validation failures publish nothing.
pub fn run_tracked(
    coordinator: &RunCoordinator,
    drug: &DosingRegimen,
    inhibitor: &DosingRegimen,
    pd: &PDParameters,
    sim: &SimulationConfig,
) -> Result<(RunToken, bool), ValidationError> {
    let token = coordinator.begin();
    let output = super::run(drug, inhibitor, pd, sim)?;
    let published = coordinator.publish(token, output);
    Ok((token, published))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::run;
    use std::sync::mpsc;
    use std::thread;

    fn inputs(max_concentration: f64) -> (DosingRegimen, DosingRegimen, PDParameters, SimulationConfig) {
        (
            DosingRegimen::new(24.0, 1.0, 6.0, max_concentration),
            DosingRegimen::new(24.0, 1.0, 8.0, 50.0),
            PDParameters::new(2.0, 3.0, 25.0, 1.0),
            SimulationConfig { num_cycles: 2, time_step: 0.5 },
        )
    }

    fn output(max_concentration: f64) -> SimulationOutput {
        let (drug, inhibitor, pd, sim) = inputs(max_concentration);
        run(&drug, &inhibitor, &pd, &sim).unwrap()
    }

    #[test]
    fn test_tokens_increase() {
        let coordinator = RunCoordinator::new();
        let a = coordinator.begin();
        let b = coordinator.begin();
        assert!(b > a);
        assert!(!coordinator.is_current(a));
        assert!(coordinator.is_current(b));
    }

    #[test]
    fn test_stale_completion_discarded() {
        let coordinator = RunCoordinator::new();
        let a = coordinator.begin();
        let b = coordinator.begin();

        // B finishes first, then A's late completion arrives
        assert!(coordinator.publish(b, output(100.0)));
        assert!(!coordinator.publish(a, output(200.0)));

        let latest = coordinator.latest().unwrap();
        assert_eq!(latest.summary.drug_max_conc, output(100.0).summary.drug_max_conc);
        assert_eq!(coordinator.latest_token(), Some(b));
    }

    #[test]
    fn test_superseded_before_publish() {
        let coordinator = RunCoordinator::new();
        let a = coordinator.begin();
        let _b = coordinator.begin();
        assert!(!coordinator.publish(a, output(100.0)));
        assert!(coordinator.latest().is_none());
    }

    #[test]
    fn test_close_discards_in_flight() {
        let coordinator = RunCoordinator::new();
        let a = coordinator.begin();
        coordinator.close();
        assert!(!coordinator.publish(a, output(100.0)));
        assert!(coordinator.latest().is_none());
    }

    #[test]
    fn test_run_tracked_publishes() {
        let coordinator = RunCoordinator::new();
        let (drug, inhibitor, pd, sim) = inputs(80.0);
        let (token, published) = run_tracked(&coordinator, &drug, &inhibitor, &pd, &sim).unwrap();
        assert!(published);
        assert_eq!(coordinator.latest_token(), Some(token));
        assert_eq!(*coordinator.latest().unwrap(), output(80.0));
    }

    #[test]
    fn test_run_tracked_validation_publishes_nothing() {
        let coordinator = RunCoordinator::new();
        let (mut drug, inhibitor, pd, sim) = inputs(80.0);
        drug.half_life = -1.0;
        assert!(run_tracked(&coordinator, &drug, &inhibitor, &pd, &sim).is_err());
        assert!(coordinator.latest().is_none());
    }

    #[test]
    fn test_concurrent_runs_only_latest_observable() {
        let coordinator = RunCoordinator::new();
        let (a_started_tx, a_started_rx) = mpsc::channel();
        let (b_done_tx, b_done_rx) = mpsc::channel();

        thread::scope(|scope| {
            let coordinator = &coordinator;

            let run_a = scope.spawn(move || {
                let token = coordinator.begin();
                a_started_tx.send(()).unwrap();
                let result = output(200.0);
                // hold A's completion until B has published
                b_done_rx.recv().unwrap();
                coordinator.publish(token, result)
            });

            let run_b = scope.spawn(move || {
                a_started_rx.recv().unwrap();
                let token = coordinator.begin();
                let published = coordinator.publish(token, output(100.0));
                b_done_tx.send(()).unwrap();
                published
            });

            assert!(run_b.join().unwrap());
            assert!(!run_a.join().unwrap());
        });

        let latest = coordinator.latest().unwrap();
        assert_eq!(*latest, output(100.0));
    }
}
