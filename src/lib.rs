// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Rate-limited client for the CRPT document submission API.
//!
//! This crate gates outbound document submissions behind a fixed-quota
//! rate limiter:
//!
//! - At most `max_requests` operations are admitted per `window_ms` window
//! - Consumed capacity is restored in bulk by a periodic replenisher, not
//!   returned per completed call
//! - Concurrent callers block (asynchronously) until capacity is available
//! - A thin [`submitter::DocumentSubmitter`] posts JSON payloads with a
//!   bearer signature; callers can also gate arbitrary operations via
//!   [`Client::execute`]
//!
//! ## Usage
//!
//! ```no_run
//! use crpt_api_client::{Client, Config};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(Config::default())?;
//! let outcome = client
//!     .submit_document(&serde_json::json!({ "doc_id": "42" }), "signature")
//!     .await?;
//! println!("submitted: {}", outcome.status);
//! client.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod gate;
pub mod submitter;

pub use client::Client;
pub use config::Config;
pub use error::{Error, ExecuteError, SubmitError};
pub use gate::{AdmissionGate, GateState};
pub use submitter::{DocumentSubmitter, SubmitOutcome};
