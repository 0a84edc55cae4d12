//! Batch enrichment orchestrator.
//!
//! Splits a contact list into fixed-size batches and drives them one at a time
//! through an [`Enricher`]. Per-batch failures are absorbed into failed
//! contacts; only a broken result contract aborts the run. Progress is published
//! as [`RunEvent`]s to a [`RunObserver`], and a [`PauseSignal`] stops the loop at
//! the next batch boundary.

pub mod batch;
pub mod error;
pub mod events;
pub mod observer;
pub mod orchestrator;
pub mod pause;
pub mod provider;
pub mod proxy;
pub mod reducer;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
pub mod wire;

pub use batch::{batch_count, BatchSpan};
pub use error::{BatchEnrichmentError, OrchestrationError, RunError, ValidationError};
pub use events::RunEvent;
pub use observer::{ChannelObserver, MemoryObserver, RunObserver, TracingObserver};
pub use orchestrator::{Orchestrator, RunConfig};
pub use pause::PauseSignal;
pub use provider::ProviderEnricher;
pub use proxy::ProxyEnricher;
pub use reducer::BatchTally;
pub use state::{RunContext, RunReport, RunState};
pub use traits::{BatchOutcome, Enricher};
pub use wire::{EnrichRequest, EnrichResponse, MAX_CONTACTS_PER_REQUEST};
