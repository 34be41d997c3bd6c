//! Atomic action timing.
//!
//! Every collaborator call a scenario makes is wrapped in
//! [`AtomicActions::timed`], which measures its wall-clock duration and
//! records it under a fixed action name (e.g. `neutron.create_bgpvpn`).
//! Failed calls are recorded as well; the error itself is returned untouched.

use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::metrics as m;

/// One timed call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomicAction {
    pub name: String,
    /// Seconds since the Unix epoch when the call started
    pub started_at: f64,
    /// Call duration in seconds
    pub duration: f64,
    pub failed: bool,
}

/// Ordered recorder of atomic actions for one iteration.
#[derive(Debug, Default)]
pub struct AtomicActions {
    actions: Mutex<Vec<AtomicAction>>,
}

impl AtomicActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Awaits `fut`, recording its duration under `name`.
    pub async fn timed<T, E, F>(&self, name: &str, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let started_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();
        let start = Instant::now();
        let result = fut.await;
        self.record(name, started_at, start.elapsed(), result.is_err());
        result
    }

    fn record(&self, name: &str, started_at: f64, elapsed: Duration, failed: bool) {
        let duration = elapsed.as_secs_f64();
        debug!(action = name, duration, failed, "atomic action finished");
        metrics::histogram!(m::ATOMIC_ACTION_DURATION_SECONDS, m::LABEL_ACTION => name.to_owned())
            .record(duration);
        if failed {
            metrics::counter!(m::ATOMIC_ACTION_FAILURES_TOTAL, m::LABEL_ACTION => name.to_owned())
                .increment(1);
        }

        let action = AtomicAction {
            name: name.to_owned(),
            started_at,
            duration,
            failed,
        };
        // A poisoned lock only means another recorder panicked mid-push.
        let mut guard = match self.actions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(action);
    }

    /// Snapshot of the recorded actions, in call order.
    pub fn snapshot(&self) -> Vec<AtomicAction> {
        match self.actions.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Names of the recorded actions, in call order.
    pub fn names(&self) -> Vec<String> {
        self.snapshot().into_iter().map(|a| a.name).collect()
    }

    pub fn into_inner(self) -> Vec<AtomicAction> {
        match self.actions.into_inner() {
            Ok(actions) => actions,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
