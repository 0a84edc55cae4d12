//! Scripted [`Enricher`] for tests.
//!
//! Each call pops the next [`Step`]; an empty script means "succeed".

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use leadflow_common::{Contact, EnrichedContact, EnrichmentOptions};

use crate::error::BatchEnrichmentError;
use crate::pause::PauseSignal;
use crate::traits::{BatchOutcome, Enricher};

/// What the mock does on one call.
#[derive(Debug, Clone)]
pub enum Step {
    /// Every contact matches with a title and company.
    Succeed,
    /// Contacts at these batch positions come back failed with "no match found".
    NoMatchFor(Vec<usize>),
    FailWith(BatchEnrichmentError),
    /// Sleep far longer than any test timeout.
    Hang,
    /// Return one result fewer than the batch.
    ShortResults,
    /// Raise the signal mid-call, then succeed. The call still completes.
    PauseDuring(PauseSignal),
}

/// One recorded call.
#[derive(Debug, Clone)]
pub struct Call {
    pub credential: String,
    pub contacts: Vec<Contact>,
    pub options: EnrichmentOptions,
}

#[derive(Default)]
pub struct MockEnricher {
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Call>>,
}

impl MockEnricher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scripted(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: Mutex::new(steps.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

/// A matched result with a few fields filled in.
pub fn matched(contact: &Contact) -> EnrichedContact {
    let mut enriched = EnrichedContact::matched(contact.clone());
    enriched.title = Some("Engineer".into());
    enriched.company = Some("Acme".into());
    enriched
}

/// `n` distinct contacts in a stable order.
pub fn contacts(n: usize) -> Vec<Contact> {
    (0..n)
        .map(|i| Contact::new(format!("First{i}"), format!("Last{i}")).with_domain("acme.io"))
        .collect()
}

#[async_trait]
impl Enricher for MockEnricher {
    async fn enrich(
        &self,
        credential: &str,
        batch: &[Contact],
        options: &EnrichmentOptions,
    ) -> Result<BatchOutcome, BatchEnrichmentError> {
        self.calls.lock().unwrap().push(Call {
            credential: credential.to_string(),
            contacts: batch.to_vec(),
            options: *options,
        });
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Step::Succeed);

        let all_matched = || batch.iter().map(matched).collect::<Vec<_>>();

        match step {
            Step::Succeed => Ok(BatchOutcome::new(all_matched(), 1)),
            Step::NoMatchFor(positions) => {
                let results = batch
                    .iter()
                    .enumerate()
                    .map(|(i, c)| {
                        if positions.contains(&i) {
                            EnrichedContact::failed(c.clone(), "no match found")
                        } else {
                            matched(c)
                        }
                    })
                    .collect();
                Ok(BatchOutcome::new(results, 1))
            }
            Step::FailWith(err) => Err(err),
            Step::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(BatchOutcome::new(all_matched(), 1))
            }
            Step::ShortResults => {
                let mut results = all_matched();
                results.pop();
                Ok(BatchOutcome::new(results, 1))
            }
            Step::PauseDuring(signal) => {
                signal.raise();
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(BatchOutcome::new(all_matched(), 1))
            }
        }
    }
}
