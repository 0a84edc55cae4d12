//! The batch loop.
//!
//! One batch at a time: check the pause signal, call the enricher under a
//! timeout, fold the outcome into the [`RunContext`] through the reducer, emit
//! events, sleep between batches. The context is owned by the loop for the
//! whole run and handed back to the caller when it stops.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info_span, warn, Instrument};

use leadflow_common::config::{
    DEFAULT_BATCH_SIZE, DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_INTER_BATCH_DELAY_MS,
};
use leadflow_common::{Contact, EnrichmentOptions, FileConfig};

use crate::error::{BatchEnrichmentError, OrchestrationError, RunError, ValidationError};
use crate::events::RunEvent;
use crate::observer::{RunObserver, TracingObserver};
use crate::pause::PauseSignal;
use crate::reducer;
use crate::state::{RunContext, RunState};
use crate::traits::Enricher;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub batch_size: usize,
    /// Forwarded verbatim to every enrichment call.
    pub options: EnrichmentOptions,
    /// Sleep between batches. Never applied after the last one.
    pub inter_batch_delay: Duration,
    /// Upper bound on one enrichment call. Expiry fails that batch only.
    pub call_timeout: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            options: EnrichmentOptions::default(),
            inter_batch_delay: Duration::from_millis(DEFAULT_INTER_BATCH_DELAY_MS),
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
        }
    }
}

impl From<&FileConfig> for RunConfig {
    fn from(config: &FileConfig) -> Self {
        Self {
            batch_size: config.run.batch_size,
            options: config.options,
            inter_batch_delay: config.run.inter_batch_delay(),
            call_timeout: config.run.call_timeout(),
        }
    }
}

pub struct Orchestrator<E> {
    enricher: E,
    config: RunConfig,
    observer: Arc<dyn RunObserver>,
}

impl<E: Enricher> Orchestrator<E> {
    /// Events go to a [`TracingObserver`] until [`Orchestrator::with_observer`] replaces it.
    pub fn new(enricher: E, config: RunConfig) -> Self {
        Self {
            enricher,
            config,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: impl RunObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn validate(&self, contacts: &[Contact], credential: &str) -> Result<(), ValidationError> {
        if contacts.is_empty() {
            return Err(ValidationError::NoContacts);
        }
        if credential.trim().is_empty() {
            return Err(ValidationError::MissingCredential);
        }
        if self.config.batch_size == 0 {
            return Err(ValidationError::InvalidBatchSize);
        }
        Ok(())
    }

    /// Start a fresh run over `contacts`.
    ///
    /// Returns the final context when the run completes or pauses. Per-batch
    /// failures are inside it as failed contacts.
    pub async fn run(
        &self,
        contacts: Vec<Contact>,
        credential: &str,
        pause: &PauseSignal,
    ) -> Result<RunContext, RunError> {
        if let Err(err) = self.validate(&contacts, credential) {
            warn!(error = %err, "Enrichment run rejected");
            return Err(err.into());
        }

        let ctx = RunContext::new(contacts, self.config.batch_size);
        self.drive(ctx, credential, pause, false).await
    }

    /// Continue a paused run from its first unprocessed batch.
    ///
    /// Statistics keep accumulating in the same context and batch numbering
    /// carries on. The pause signal is not cleared here; reset it first.
    pub async fn resume(
        &self,
        report: RunContext,
        credential: &str,
        pause: &PauseSignal,
    ) -> Result<RunContext, RunError> {
        let checked = if report.state != RunState::Paused {
            Err(ValidationError::NotResumable(report.state))
        } else if report.batch_size == 0 {
            Err(ValidationError::InvalidBatchSize)
        } else {
            self.validate(report.remaining(), credential)
        };
        if let Err(err) = checked {
            warn!(run_id = %report.run_id, error = %err, "Resume rejected");
            return Err(err.into());
        }

        self.drive(report, credential, pause, true).await
    }

    async fn drive(
        &self,
        mut ctx: RunContext,
        credential: &str,
        pause: &PauseSignal,
        resumed: bool,
    ) -> Result<RunContext, RunError> {
        let span = info_span!("enrichment_run", run_id = %ctx.run_id, resumed);
        async move {
            ctx.state = RunState::Running;
            ctx.finished_at = None;
            self.emit(RunEvent::RunStarted {
                total_contacts: ctx.contacts.len(),
                total_batches: ctx.total_batches(),
                remaining: ctx.remaining().len(),
                resumed,
            });

            while let Some(batch) = ctx.next_span() {
                if pause.is_raised() {
                    return Ok(self.pause(ctx));
                }

                self.emit(RunEvent::BatchStarted {
                    index: batch.index,
                    total: batch.total,
                    size: batch.len(),
                });

                let call = self.enricher.enrich(
                    credential,
                    ctx.batch_contacts(batch),
                    &self.config.options,
                );
                let result = match tokio::time::timeout(self.config.call_timeout, call).await {
                    Ok(result) => result,
                    Err(_) => Err(BatchEnrichmentError::Timeout(format!(
                        "no response within {}s",
                        self.config.call_timeout.as_secs_f64()
                    ))),
                };

                let tally = match result {
                    Ok(outcome) => match reducer::apply_success(&mut ctx, batch, outcome) {
                        Ok(tally) => tally,
                        Err(error) => return Err(self.fail(ctx, error)),
                    },
                    Err(error) => {
                        self.emit(RunEvent::BatchFailed {
                            index: batch.index,
                            error: error.to_string(),
                        });
                        reducer::apply_failure(&mut ctx, batch, &error)
                    }
                };

                self.emit(RunEvent::BatchCompleted {
                    index: batch.index,
                    success_count: tally.success,
                    fail_count: tally.failed,
                });
                self.emit(RunEvent::Progress {
                    completed_batches: ctx.batches_completed,
                    total_batches: batch.total,
                    percent: ctx.percent_complete(),
                });

                if !ctx.is_exhausted() && !pause.is_raised() {
                    self.delay(pause).await;
                }
            }

            Ok(self.complete(ctx))
        }
        .instrument(span)
        .await
    }

    /// Inter-batch sleep. Cut short by a pause so the loop can stop promptly.
    async fn delay(&self, pause: &PauseSignal) {
        if self.config.inter_batch_delay.is_zero() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(self.config.inter_batch_delay) => {}
            _ = pause.wait() => {}
        }
    }

    fn complete(&self, mut ctx: RunContext) -> RunContext {
        ctx.stats.finalize_quality(&ctx.results);
        ctx.state = RunState::Completed;
        ctx.finished_at = Some(Utc::now());
        self.emit(RunEvent::RunCompleted { stats: ctx.stats });
        ctx
    }

    fn pause(&self, mut ctx: RunContext) -> RunContext {
        ctx.stats.finalize_quality(&ctx.results);
        ctx.state = RunState::Paused;
        self.emit(RunEvent::RunPaused {
            stats: ctx.stats,
            remaining: ctx.remaining().len(),
        });
        ctx
    }

    fn fail(&self, mut ctx: RunContext, error: OrchestrationError) -> RunError {
        ctx.stats.finalize_quality(&ctx.results);
        ctx.state = RunState::Failed;
        ctx.finished_at = Some(Utc::now());
        self.emit(RunEvent::RunFailed {
            error: error.to_string(),
        });
        RunError::Orchestration {
            error,
            context: Box::new(ctx),
        }
    }

    fn emit(&self, event: RunEvent) {
        self.observer.observe(&event);
    }
}
