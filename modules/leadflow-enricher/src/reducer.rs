//! Pure state updates for one finished batch. No I/O.
//!
//! Each function applies a batch's full set of increments to the context in one
//! step, so observers never see a partially merged batch.

use leadflow_common::{quality, EnrichedContact};

use crate::batch::BatchSpan;
use crate::error::{BatchEnrichmentError, OrchestrationError};
use crate::state::RunContext;
use crate::traits::BatchOutcome;

/// Per-batch counts, reported in `BatchCompleted`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTally {
    pub success: usize,
    pub failed: usize,
}

/// Merge a successful call's results.
///
/// Results are matched to the batch by position; the input contact overwrites
/// whatever identity fields the call echoed back. A count mismatch leaves the
/// context untouched.
pub fn apply_success(
    ctx: &mut RunContext,
    span: BatchSpan,
    outcome: BatchOutcome,
) -> Result<BatchTally, OrchestrationError> {
    if outcome.results.len() != span.len() {
        return Err(OrchestrationError::ResultCountMismatch {
            batch: span.index,
            expected: span.len(),
            actual: outcome.results.len(),
        });
    }

    let mut tally = BatchTally::default();
    let merged: Vec<EnrichedContact> = ctx
        .batch_contacts(span)
        .iter()
        .cloned()
        .zip(outcome.results)
        .map(|(contact, mut result)| {
            result.contact = contact;
            if result.is_success() {
                tally.success += 1;
                if result.quality_score.is_none() {
                    result.quality_score = Some(quality::score(&result));
                }
            } else {
                tally.failed += 1;
            }
            result
        })
        .collect();

    ctx.results.extend(merged);
    ctx.batches_completed += 1;

    let stats = &mut ctx.stats;
    stats.processed += span.len() as u32;
    stats.successful += tally.success as u32;
    stats.failed += tally.failed as u32;
    stats.api_calls += outcome.api_calls.max(1);
    stats.credits_used += span.len() as u32;

    Ok(tally)
}

/// Absorb a failed call: every contact in the batch becomes a failed result.
///
/// A failed batch adds exactly one to `api_calls`, however many provider calls
/// the enricher made before the error.
pub fn apply_failure(
    ctx: &mut RunContext,
    span: BatchSpan,
    error: &BatchEnrichmentError,
) -> BatchTally {
    let message = error.to_string();
    let failed: Vec<EnrichedContact> = ctx
        .batch_contacts(span)
        .iter()
        .cloned()
        .map(|contact| EnrichedContact::failed(contact, message.clone()))
        .collect();

    ctx.results.extend(failed);
    ctx.batches_completed += 1;

    let stats = &mut ctx.stats;
    stats.processed += span.len() as u32;
    stats.failed += span.len() as u32;
    stats.api_calls += 1;

    BatchTally {
        success: 0,
        failed: span.len(),
    }
}
