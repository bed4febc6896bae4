// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-quota admission gate and its periodic replenisher.
//!
//! The gate admits at most `max_requests` operations per window. Admitted
//! units are consumed for good: capacity comes back only when the
//! replenisher resets the gate to its maximum, once per window. This is a
//! hard cap per window, not a concurrency limiter that frees a slot when a
//! call finishes.

use crate::error::Error;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tracing::debug;

/// Lifecycle of the gate/replenisher pair.
///
/// `Running` → `ShuttingDown` on [`crate::Client::shutdown`]; the
/// replenisher task observes the signal and moves to `Stopped`. There is no
/// way back to `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Replenisher is live; quota resets every window
    Running,
    /// Shutdown requested, replenisher has not yet exited
    ShuttingDown,
    /// Replenisher has exited; no further quota resets will happen
    Stopped,
}

impl GateState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Running,
            1 => Self::ShuttingDown,
            _ => Self::Stopped,
        }
    }
}

/// Counting admission primitive shared by all callers.
///
/// `available` lives inside the semaphore and is mutated from exactly two
/// places: [`AdmissionGate::admit`] (take one unit, blocking while none are
/// left) and [`AdmissionGate::replenish`] (bulk top-up back to the maximum).
#[derive(Debug)]
pub struct AdmissionGate {
    permits: Semaphore,
    max_requests: u32,
}

impl AdmissionGate {
    /// Create a gate with `max_requests` units available immediately.
    /// The limit must already be validated as non-zero.
    pub(crate) fn new(max_requests: u32) -> Self {
        Self {
            permits: Semaphore::new(max_requests as usize),
            max_requests,
        }
    }

    /// Wait for an admission unit and consume it.
    ///
    /// The unit is forgotten rather than held: completing the guarded
    /// operation never returns it. Acquire-and-decrement is indivisible, so
    /// concurrent callers can never both take the last unit.
    ///
    /// Cancel-safe: dropping the future before it resolves consumes
    /// nothing. A closed gate (teardown) surfaces as [`Error::Interrupted`].
    pub async fn admit(&self) -> Result<(), Error> {
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| Error::Interrupted)?;
        permit.forget();
        Ok(())
    }

    /// Units currently available.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Restore availability to `max_requests` in one bulk release.
    ///
    /// Only the replenisher task calls this; everyone else can only take
    /// permits away between the read and the add, so the topped-up count
    /// never exceeds the maximum.
    pub(crate) fn replenish(&self) {
        let max = self.max_requests as usize;
        let deficit = max.saturating_sub(self.permits.available_permits());
        if deficit > 0 {
            self.permits.add_permits(deficit);
        }
    }
}

/// Owned background task resetting the gate once per window.
#[derive(Debug)]
pub(crate) struct Replenisher {
    shutdown_tx: watch::Sender<bool>,
    state: Arc<AtomicU8>,
}

impl Replenisher {
    /// Spawn the replenisher. The first reset happens one full window after
    /// construction, then every window, whether or not any calls arrived.
    pub(crate) fn spawn(gate: Arc<AdmissionGate>, window: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let state = Arc::new(AtomicU8::new(GateState::Running as u8));
        let task_state = Arc::clone(&state);

        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + window;
            let mut ticks = tokio::time::interval_at(start, window);
            loop {
                tokio::select! {
                    // Fires on shutdown(), or errors out when the owning
                    // client was dropped; both mean stop.
                    _ = shutdown_rx.changed() => break,
                    _ = ticks.tick() => {
                        gate.replenish();
                        debug!(available = gate.available(), "Quota window replenished");
                    }
                }
            }
            task_state.store(GateState::Stopped as u8, Ordering::SeqCst);
            debug!("Replenisher stopped");
        });

        Self { shutdown_tx, state }
    }

    /// Request shutdown. Idempotent: only the first call transitions
    /// `Running` → `ShuttingDown` and signals the task.
    pub(crate) fn shutdown(&self) {
        if self
            .state
            .compare_exchange(
                GateState::Running as u8,
                GateState::ShuttingDown as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
        {
            debug!("Shutting down replenisher");
            // Send fails only if the task already exited
            let _ = self.shutdown_tx.send(true);
        }
    }

    pub(crate) fn state(&self) -> GateState {
        GateState::from_u8(self.state.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, timeout};

    const WINDOW: Duration = Duration::from_millis(100);

    #[tokio::test]
    async fn test_admission_consumes_without_refund() {
        let gate = AdmissionGate::new(3);
        for _ in 0..3 {
            gate.admit().await.unwrap();
        }
        assert_eq!(gate.available(), 0);

        // No replenisher running: the fourth admit must park forever
        let blocked = timeout(Duration::from_millis(50), gate.admit()).await;
        assert!(blocked.is_err(), "admit should block with no units left");
    }

    #[tokio::test]
    async fn test_replenish_resets_to_max_not_additive() {
        let gate = AdmissionGate::new(3);
        gate.admit().await.unwrap();
        gate.admit().await.unwrap();
        assert_eq!(gate.available(), 1);

        gate.replenish();
        assert_eq!(gate.available(), 3);

        // Replenishing a full gate must not push it past the maximum
        gate.replenish();
        gate.replenish();
        assert_eq!(gate.available(), 3);
    }

    #[tokio::test]
    async fn test_replenisher_first_fire_after_one_window() {
        let gate = Arc::new(AdmissionGate::new(2));
        gate.admit().await.unwrap();
        gate.admit().await.unwrap();

        let replenisher = Replenisher::spawn(Arc::clone(&gate), WINDOW);

        // Well before the first window boundary: still empty
        sleep(Duration::from_millis(30)).await;
        assert_eq!(gate.available(), 0);

        // Past the boundary: back to max
        sleep(Duration::from_millis(120)).await;
        assert_eq!(gate.available(), 2);

        replenisher.shutdown();
    }

    #[tokio::test]
    async fn test_shutdown_stops_future_fires() {
        let gate = Arc::new(AdmissionGate::new(1));
        let replenisher = Replenisher::spawn(Arc::clone(&gate), WINDOW);

        gate.admit().await.unwrap();
        replenisher.shutdown();

        // Give the task time to observe the signal, then two full windows
        sleep(WINDOW * 3).await;
        assert_eq!(gate.available(), 0, "no resets after shutdown");
        assert_eq!(replenisher.state(), GateState::Stopped);
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let gate = Arc::new(AdmissionGate::new(1));
        let replenisher = Replenisher::spawn(gate, WINDOW);

        replenisher.shutdown();
        replenisher.shutdown();
        replenisher.shutdown();

        sleep(Duration::from_millis(20)).await;
        assert_eq!(replenisher.state(), GateState::Stopped);
    }

    #[tokio::test]
    async fn test_blocked_admit_wakes_on_replenish() {
        let gate = Arc::new(AdmissionGate::new(1));
        gate.admit().await.unwrap();

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.admit().await })
        };

        sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished(), "waiter should still be parked");

        gate.replenish();
        timeout(Duration::from_millis(100), waiter)
            .await
            .expect("waiter should be admitted after replenish")
            .unwrap()
            .unwrap();
    }
}
