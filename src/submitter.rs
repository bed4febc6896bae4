// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Thin HTTP collaborator that posts document payloads to the CRPT API.
//!
//! The submitter knows nothing about rate limiting and nothing about the
//! document schema: it serializes whatever the caller hands it and reports
//! the API's verdict. Gating lives in [`crate::Client`].

use crate::config::ApiConfig;
use crate::error::{Error, SubmitError};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

/// Successful submission outcome.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    /// HTTP status returned by the API (always 2xx here)
    pub status: reqwest::StatusCode,
    /// Raw response body
    pub body: String,
}

/// HTTP submitter for document creation requests.
#[derive(Debug)]
pub struct DocumentSubmitter {
    http: reqwest::Client,
    endpoint: Url,
}

impl DocumentSubmitter {
    /// Create a submitter for the configured endpoint.
    pub fn new(config: &ApiConfig) -> Result<Self, Error> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            Error::InvalidConfiguration(format!(
                "invalid endpoint URL {:?}: {e}",
                config.endpoint
            ))
        })?;
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
        })
    }

    /// POST the JSON-serialized document with the detached signature as a
    /// bearer token. Any 2xx status is success; everything else comes back
    /// as [`SubmitError::Rejected`] with the response body attached.
    pub async fn submit<D>(&self, document: &D, signature: &str) -> Result<SubmitOutcome, SubmitError>
    where
        D: Serialize + ?Sized,
    {
        let payload = serde_json::to_string(document)?;
        debug!(endpoint = %self.endpoint, bytes = payload.len(), "Submitting document");

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .bearer_auth(signature)
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            debug!(%status, "Document accepted");
            Ok(SubmitOutcome { status, body })
        } else {
            warn!(%status, "Document rejected by API");
            Err(SubmitError::Rejected { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_rejects_unparsable_endpoint() {
        let config = ApiConfig {
            endpoint: "not a url".to_string(),
        };
        assert!(matches!(
            DocumentSubmitter::new(&config),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[tokio::test]
    async fn test_unserializable_payload_is_a_serialize_error() {
        let submitter = DocumentSubmitter::new(&ApiConfig::default()).unwrap();

        // serde_json cannot encode maps with non-string keys
        let mut payload: BTreeMap<(u8, u8), &str> = BTreeMap::new();
        payload.insert((1, 2), "doc");

        let err = submitter.submit(&payload, "sig").await.unwrap_err();
        assert!(matches!(err, SubmitError::Serialize(_)));
    }
}
