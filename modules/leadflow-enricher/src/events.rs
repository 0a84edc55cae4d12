//! Observable run events.
//!
//! Purely observational: nothing in the loop reads them back.

use std::fmt;

use serde::{Deserialize, Serialize};

use leadflow_common::RunStatistics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    RunStarted {
        total_contacts: usize,
        total_batches: usize,
        /// Contacts this invocation will attempt. Smaller than `total_contacts` on resume.
        remaining: usize,
        resumed: bool,
    },
    BatchStarted {
        index: usize,
        total: usize,
        size: usize,
    },
    BatchCompleted {
        index: usize,
        success_count: usize,
        fail_count: usize,
    },
    BatchFailed {
        index: usize,
        error: String,
    },
    Progress {
        completed_batches: usize,
        total_batches: usize,
        percent: u8,
    },
    RunCompleted {
        stats: RunStatistics,
    },
    RunPaused {
        stats: RunStatistics,
        remaining: usize,
    },
    RunFailed {
        error: String,
    },
}

impl RunEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            RunEvent::RunStarted { .. } => "run_started",
            RunEvent::BatchStarted { .. } => "batch_started",
            RunEvent::BatchCompleted { .. } => "batch_completed",
            RunEvent::BatchFailed { .. } => "batch_failed",
            RunEvent::Progress { .. } => "progress",
            RunEvent::RunCompleted { .. } => "run_completed",
            RunEvent::RunPaused { .. } => "run_paused",
            RunEvent::RunFailed { .. } => "run_failed",
        }
    }
}

impl fmt::Display for RunEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunEvent::RunStarted {
                total_contacts,
                total_batches,
                remaining,
                resumed,
            } => {
                if *resumed {
                    write!(
                        f,
                        "Resuming enrichment: {remaining} of {total_contacts} contacts left ({total_batches} batches total)"
                    )
                } else {
                    write!(
                        f,
                        "Starting enrichment of {total_contacts} contacts in {total_batches} batches"
                    )
                }
            }
            RunEvent::BatchStarted { index, total, size } => {
                write!(f, "Processing batch {index}/{total} ({size} contacts)")
            }
            RunEvent::BatchCompleted {
                index,
                success_count,
                fail_count,
            } => write!(
                f,
                "Batch {index} completed: {success_count} enriched, {fail_count} failed"
            ),
            RunEvent::BatchFailed { index, error } => write!(f, "Batch {index} failed: {error}"),
            RunEvent::Progress {
                completed_batches,
                total_batches,
                percent,
            } => write!(f, "Progress: {completed_batches}/{total_batches} batches ({percent}%)"),
            RunEvent::RunCompleted { stats } => write!(
                f,
                "Enrichment completed: {} processed, {} successful, {} failed, quality {}/100",
                stats.processed, stats.successful, stats.failed, stats.quality_score
            ),
            RunEvent::RunPaused { stats, remaining } => write!(
                f,
                "Enrichment paused after {} contacts; {remaining} remaining",
                stats.processed
            ),
            RunEvent::RunFailed { error } => write!(f, "Enrichment failed: {error}"),
        }
    }
}
