use serde::{Deserialize, Serialize};

use crate::quality;
use crate::types::EnrichedContact;

/// Counters accumulated over a run. Only ever incremented, one batch at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatistics {
    pub processed: u32,
    pub successful: u32,
    pub failed: u32,
    pub api_calls: u32,
    pub credits_used: u32,
    /// Rounded mean quality over successful contacts, 0-100.
    pub quality_score: u8,
}

impl RunStatistics {
    /// Recompute `quality_score` from the aggregate.
    pub fn finalize_quality(&mut self, aggregate: &[EnrichedContact]) {
        self.quality_score = quality::mean_score(aggregate);
    }

    /// Share of processed contacts that were enriched, 0-100.
    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            return 0.0;
        }
        f64::from(self.successful) / f64::from(self.processed) * 100.0
    }
}

impl std::fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Enrichment Run ===")?;
        writeln!(f, "Processed:     {}", self.processed)?;
        writeln!(
            f,
            "Successful:    {} ({:.0}%)",
            self.successful,
            self.success_rate()
        )?;
        writeln!(f, "Failed:        {}", self.failed)?;
        writeln!(f, "API calls:     {}", self.api_calls)?;
        writeln!(f, "Credits used:  {}", self.credits_used)?;
        write!(f, "Quality score: {}/100", self.quality_score)
    }
}
