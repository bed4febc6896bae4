// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Client wiring: validated construction, gated execution, shutdown.

use crate::config::Config;
use crate::error::{Error, ExecuteError};
use crate::gate::{AdmissionGate, GateState, Replenisher};
use crate::submitter::{DocumentSubmitter, SubmitOutcome};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::info;

/// Rate-limited CRPT submission client.
///
/// Owns the admission gate, its replenisher task and the HTTP submitter.
/// Cheap to share behind an `Arc`; all methods take `&self`.
#[derive(Debug)]
pub struct Client {
    gate: Arc<AdmissionGate>,
    replenisher: Replenisher,
    submitter: DocumentSubmitter,
}

impl Client {
    /// Validate the configuration and start the client.
    ///
    /// Fails with [`Error::InvalidConfiguration`] before anything is
    /// spawned if the window, the request limit or the endpoint is
    /// unusable. Must be called from within a tokio runtime: the
    /// replenisher task starts here and fires for the first time one full
    /// window later.
    pub fn new(config: Config) -> Result<Self, Error> {
        config.validate().map_err(Error::InvalidConfiguration)?;
        let submitter = DocumentSubmitter::new(&config.api)?;

        info!(
            endpoint = %config.api.endpoint,
            max_requests = config.rate_limit.max_requests,
            window_ms = config.rate_limit.window_ms,
            "Starting CRPT submission client"
        );

        let gate = Arc::new(AdmissionGate::new(config.rate_limit.max_requests));
        let replenisher =
            Replenisher::spawn(Arc::clone(&gate), config.rate_limit.window_duration());

        Ok(Self {
            gate,
            replenisher,
            submitter,
        })
    }

    /// Run an arbitrary operation once a quota unit is available.
    ///
    /// Suspends until admission, consumes one unit, runs `operation`
    /// exactly once and passes its outcome through unmodified. The unit is
    /// not refunded when the operation fails or finishes; only the
    /// replenisher restores capacity. Dropping the returned future before
    /// admission cancels the wait without consuming anything.
    pub async fn execute<T, E, F, Fut>(&self, operation: F) -> Result<T, ExecuteError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.gate
            .admit()
            .await
            .map_err(|_| ExecuteError::Interrupted)?;
        operation().await.map_err(ExecuteError::Operation)
    }

    /// Like [`Client::execute`], but the wait for admission races a
    /// caller-supplied cancellation future.
    ///
    /// If `cancel` completes first the call returns
    /// [`ExecuteError::Interrupted`]: the operation never runs and no unit
    /// is consumed. Passing `tokio::time::sleep(..)` as `cancel` gives a
    /// bounded wait; the gate itself imposes no timeout. Once admitted,
    /// the operation runs to completion regardless of `cancel`.
    pub async fn execute_with_cancel<T, E, F, Fut, C>(
        &self,
        cancel: C,
        operation: F,
    ) -> Result<T, ExecuteError<E>>
    where
        C: Future<Output = ()>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        tokio::select! {
            admitted = self.gate.admit() => {
                admitted.map_err(|_| ExecuteError::Interrupted)?;
                operation().await.map_err(ExecuteError::Operation)
            }
            _ = cancel => Err(ExecuteError::Interrupted),
        }
    }

    /// Submit a document through the built-in HTTP submitter, gated by the
    /// quota. `signature` is the caller's detached signature, sent as a
    /// bearer token.
    pub async fn submit_document<D>(
        &self,
        document: &D,
        signature: &str,
    ) -> Result<SubmitOutcome, Error>
    where
        D: Serialize + ?Sized,
    {
        self.execute(|| self.submitter.submit(document, signature))
            .await
            .map_err(Error::from)
    }

    /// Stop the replenisher. Idempotent. Operations already admitted are
    /// unaffected; callers still waiting for admission will never be
    /// admitted again and must cancel themselves (see
    /// [`Client::execute_with_cancel`]).
    pub fn shutdown(&self) {
        self.replenisher.shutdown();
    }

    /// Current lifecycle state of the gate/replenisher pair.
    pub fn state(&self) -> GateState {
        self.replenisher.state()
    }

    /// Quota units currently available. Snapshot only; another caller may
    /// take a unit immediately after this returns.
    pub fn available_units(&self) -> usize {
        self.gate.available()
    }
}
