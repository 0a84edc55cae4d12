//! The enrichment call seam.

use std::sync::Arc;

use async_trait::async_trait;

use leadflow_common::{Contact, EnrichedContact, EnrichmentOptions};

use crate::error::BatchEnrichmentError;

/// What one successful enrichment call returns.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    /// One entry per input contact, same order.
    pub results: Vec<EnrichedContact>,
    /// Upstream requests the call made internally. At least 1 is counted.
    pub api_calls: u32,
}

impl BatchOutcome {
    pub fn new(results: Vec<EnrichedContact>, api_calls: u32) -> Self {
        Self { results, api_calls }
    }
}

/// Enriches one batch of contacts.
///
/// Implemented by [`ProviderEnricher`](crate::ProviderEnricher) (provider API),
/// [`ProxyEnricher`](crate::ProxyEnricher) (deployed function) and `MockEnricher` (tests).
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(
        &self,
        credential: &str,
        batch: &[Contact],
        options: &EnrichmentOptions,
    ) -> Result<BatchOutcome, BatchEnrichmentError>;
}

#[async_trait]
impl<E: Enricher + ?Sized> Enricher for Arc<E> {
    async fn enrich(
        &self,
        credential: &str,
        batch: &[Contact],
        options: &EnrichmentOptions,
    ) -> Result<BatchOutcome, BatchEnrichmentError> {
        (**self).enrich(credential, batch, options).await
    }
}

#[async_trait]
impl<E: Enricher + ?Sized> Enricher for Box<E> {
    async fn enrich(
        &self,
        credential: &str,
        batch: &[Contact],
        options: &EnrichmentOptions,
    ) -> Result<BatchOutcome, BatchEnrichmentError> {
        (**self).enrich(credential, batch, options).await
    }
}
