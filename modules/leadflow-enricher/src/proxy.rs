//! Calls a deployed enrichment function instead of the provider.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use leadflow_common::{Contact, EnrichmentOptions};

use crate::error::BatchEnrichmentError;
use crate::traits::{BatchOutcome, Enricher};
use crate::wire::{EnrichRequest, EnrichResponse};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ProxyEnricher {
    client: reqwest::Client,
    endpoint: String,
}

impl ProxyEnricher {
    /// `endpoint` is the full URL of the function, e.g. `https://host/api/enrich`.
    pub fn new(endpoint: &str) -> Result<Self, BatchEnrichmentError> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, BatchEnrichmentError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport_error)?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

fn transport_error(err: reqwest::Error) -> BatchEnrichmentError {
    if err.is_timeout() {
        BatchEnrichmentError::Timeout(err.to_string())
    } else {
        BatchEnrichmentError::Failed(format!("network error: {err}"))
    }
}

#[async_trait]
impl Enricher for ProxyEnricher {
    async fn enrich(
        &self,
        credential: &str,
        batch: &[Contact],
        options: &EnrichmentOptions,
    ) -> Result<BatchOutcome, BatchEnrichmentError> {
        let request = EnrichRequest {
            api_key: credential.to_string(),
            contacts: batch.to_vec(),
            options: *options,
        };

        debug!(endpoint = %self.endpoint, contacts = batch.len(), "Calling enrichment function");

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        let body = resp.text().await.map_err(transport_error)?;
        let parsed = serde_json::from_str::<EnrichResponse>(&body);

        if !status.is_success() {
            return Err(match parsed {
                Ok(EnrichResponse {
                    kind: Some(kind),
                    error,
                    ..
                }) => BatchEnrichmentError::from_kind(&kind, error.unwrap_or_default()),
                Ok(EnrichResponse { error: Some(e), .. }) => {
                    BatchEnrichmentError::from_status(status.as_u16(), e)
                }
                _ => BatchEnrichmentError::from_status(status.as_u16(), body),
            });
        }

        let response = parsed.map_err(|e| {
            BatchEnrichmentError::Failed(format!("malformed response from enrichment function: {e}"))
        })?;

        if !response.success {
            let kind = response.kind.as_deref().unwrap_or("failed");
            return Err(BatchEnrichmentError::from_kind(
                kind,
                response.error.unwrap_or_else(|| "enrichment failed".to_string()),
            ));
        }

        if response.results.len() != batch.len() {
            return Err(BatchEnrichmentError::Failed(format!(
                "malformed response from enrichment function: {} results for {} contacts",
                response.results.len(),
                batch.len()
            )));
        }

        Ok(BatchOutcome::new(response.results, response.api_calls))
    }
}
