//! Run state owned by the orchestrator.
//!
//! `RunContext` is the single owned value threaded through the batch loop.
//! Mutations happen in the reducer, one whole batch at a time.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use leadflow_common::{Contact, EnrichedContact, RunStatistics};

use crate::batch::{batch_count, BatchSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Completed,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Paused => "paused",
            RunState::Completed => "completed",
            RunState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Everything one run owns: the input list, the merged aggregate, counters, and lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunContext {
    pub run_id: Uuid,
    pub contacts: Vec<Contact>,
    pub batch_size: usize,
    /// Merged results; always a prefix of `contacts` in the same order.
    pub results: Vec<EnrichedContact>,
    pub stats: RunStatistics,
    pub state: RunState,
    pub batches_completed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// What a finished `run` or `resume` hands back.
pub type RunReport = RunContext;

impl RunContext {
    pub fn new(contacts: Vec<Contact>, batch_size: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            contacts,
            batch_size,
            results: Vec::new(),
            stats: RunStatistics::default(),
            state: RunState::Idle,
            batches_completed: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn total_batches(&self) -> usize {
        batch_count(self.contacts.len(), self.batch_size)
    }

    /// Contacts not yet merged into the aggregate.
    pub fn remaining(&self) -> &[Contact] {
        &self.contacts[self.results.len().min(self.contacts.len())..]
    }

    pub fn is_exhausted(&self) -> bool {
        self.results.len() >= self.contacts.len()
    }

    /// The first unprocessed batch, if any.
    pub fn next_span(&self) -> Option<BatchSpan> {
        if self.is_exhausted() || self.batch_size == 0 {
            return None;
        }
        let start = self.results.len();
        let end = (start + self.batch_size).min(self.contacts.len());
        Some(BatchSpan {
            index: self.batches_completed + 1,
            total: self.total_batches(),
            start,
            end,
        })
    }

    pub fn batch_contacts(&self, span: BatchSpan) -> &[Contact] {
        &self.contacts[span.start..span.end]
    }

    /// Aggregate size as a rounded percentage of the full contact list.
    pub fn percent_complete(&self) -> u8 {
        if self.contacts.is_empty() {
            return 0;
        }
        let pct = self.results.len() as f64 / self.contacts.len() as f64 * 100.0;
        pct.round().min(100.0) as u8
    }
}
