//! Direct calls to the enrichment provider.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use apollo_client::{ApolloClient, BulkMatchRequest, MatchDetail, Person, MAX_BULK_DETAILS};
use leadflow_common::{quality, Contact, EmploymentRecord, EnrichedContact, EnrichmentOptions};

use crate::error::BatchEnrichmentError;
use crate::traits::{BatchOutcome, Enricher};

/// Returned for unmatched contacts.
pub const NO_MATCH: &str = "no match found";

/// The provider answers with this address when an email is not unlocked for the account.
const LOCKED_EMAIL_MARKER: &str = "email_not_unlocked";

/// Enriches a batch through the provider's bulk match endpoint, splitting it
/// into chunks the endpoint accepts.
pub struct ProviderEnricher {
    client: ApolloClient,
}

impl ProviderEnricher {
    pub fn new(base_url: &str) -> Result<Self, BatchEnrichmentError> {
        Ok(Self {
            client: ApolloClient::new(base_url)?,
        })
    }

    /// The client's own timeout backs up the orchestrator's call timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, BatchEnrichmentError> {
        Ok(Self {
            client: ApolloClient::with_timeout(base_url, timeout)?,
        })
    }
}

#[async_trait]
impl Enricher for ProviderEnricher {
    async fn enrich(
        &self,
        credential: &str,
        batch: &[Contact],
        options: &EnrichmentOptions,
    ) -> Result<BatchOutcome, BatchEnrichmentError> {
        let mut results = Vec::with_capacity(batch.len());
        let mut api_calls = 0u32;

        for chunk in batch.chunks(MAX_BULK_DETAILS) {
            let request = BulkMatchRequest {
                details: chunk.iter().map(match_detail).collect(),
                reveal_personal_emails: options.reveal_personal_emails,
                reveal_phone_number: options.reveal_phone_numbers,
            };

            let response = self.client.bulk_match(credential, &request).await?;
            api_calls += 1;

            if response.matches.len() != chunk.len() {
                return Err(BatchEnrichmentError::Failed(format!(
                    "provider returned {} matches for {} contacts",
                    response.matches.len(),
                    chunk.len()
                )));
            }

            debug!(
                chunk = chunk.len(),
                matched = response.matches.iter().filter(|m| m.is_some()).count(),
                "Chunk matched"
            );

            results.extend(
                chunk
                    .iter()
                    .zip(response.matches)
                    .map(|(contact, person)| match person {
                        Some(person) => to_enriched(contact.clone(), &person, options),
                        None => EnrichedContact::failed(contact.clone(), NO_MATCH),
                    }),
            );
        }

        info!(contacts = batch.len(), api_calls, "Provider batch enriched");
        Ok(BatchOutcome::new(results, api_calls))
    }
}

fn match_detail(contact: &Contact) -> MatchDetail {
    MatchDetail {
        first_name: contact.first_name.clone(),
        last_name: contact.last_name.clone(),
        domain: contact.domain.clone(),
        email: contact.email.clone(),
    }
}

fn usable_email(email: Option<&str>) -> Option<String> {
    email
        .map(str::trim)
        .filter(|e| !e.is_empty() && !e.contains(LOCKED_EMAIL_MARKER))
        .map(String::from)
}

/// Map a matched person onto the contact, keeping only what `options` asked for.
pub fn to_enriched(
    contact: Contact,
    person: &Person,
    options: &EnrichmentOptions,
) -> EnrichedContact {
    let org = person.organization.as_ref();
    let current_job = person.employment_history.iter().find(|e| e.current);

    let mut enriched = EnrichedContact::matched(contact);
    enriched.title = person.title.clone().or_else(|| person.headline.clone());
    enriched.company = org
        .and_then(|o| o.name.clone())
        .or_else(|| current_job.and_then(|e| e.organization_name.clone()));
    enriched.industry = org.and_then(|o| o.industry.clone());
    enriched.location = person.location();
    enriched.linkedin_url = person.linkedin_url.clone();
    enriched.work_email = usable_email(person.email.as_deref());

    if options.reveal_personal_emails {
        enriched.personal_email = person
            .personal_emails
            .iter()
            .find_map(|e| usable_email(Some(e.as_str())));
    }
    if options.reveal_phone_numbers {
        enriched.phone_numbers = person
            .phone_numbers
            .iter()
            .filter_map(|p| p.best())
            .map(String::from)
            .collect();
    }
    if options.include_social_profiles {
        enriched.twitter_url = person.twitter_url.clone();
        enriched.github_url = person.github_url.clone();
    }
    if options.include_employment_history {
        enriched.employment_history = person
            .employment_history
            .iter()
            .map(|e| EmploymentRecord {
                title: e.title.clone(),
                company: e.organization_name.clone(),
                start_date: e.start_date.clone(),
                end_date: e.end_date.clone(),
                current: e.current,
            })
            .collect();
    }

    enriched.quality_score = Some(quality::score(&enriched));
    enriched
}
