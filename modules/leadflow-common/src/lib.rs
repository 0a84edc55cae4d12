pub mod config;
pub mod contacts;
pub mod error;
pub mod export;
pub mod quality;
pub mod stats;
pub mod types;

pub use config::{load_config, FileConfig, ProviderSettings, RunSettings, Secrets};
pub use contacts::{dedupe, load_contacts, ContactUpload};
pub use error::{LeadflowError, Result};
pub use export::ExportDocument;
pub use stats::RunStatistics;
pub use types::{Contact, EmploymentRecord, EnrichedContact, EnrichmentOptions, EnrichmentStatus};
