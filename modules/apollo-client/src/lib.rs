pub mod error;
pub mod types;

pub use error::{ApolloError, ErrorKind, Result};
pub use types::{
    BulkMatchRequest, BulkMatchResponse, EmploymentEntry, MatchDetail, Organization, Person,
    PhoneNumber,
};

use std::time::Duration;

use types::ErrorBody;

/// The bulk match endpoint accepts at most this many details per call.
pub const MAX_BULK_DETAILS: usize = 10;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ApolloClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApolloClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Match up to [`MAX_BULK_DETAILS`] people in one call.
    pub async fn bulk_match(
        &self,
        api_key: &str,
        request: &BulkMatchRequest,
    ) -> Result<BulkMatchResponse> {
        if request.details.len() > MAX_BULK_DETAILS {
            return Err(ApolloError::Api {
                status: 422,
                message: format!(
                    "bulk_match accepts at most {MAX_BULK_DETAILS} details, got {}",
                    request.details.len()
                ),
            });
        }

        let url = format!("{}/api/v1/people/bulk_match", self.base_url);
        tracing::debug!(details = request.details.len(), "Calling people/bulk_match");

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("Cache-Control", "no-cache")
            .query(&[
                (
                    "reveal_personal_emails",
                    request.reveal_personal_emails.to_string(),
                ),
                ("reveal_phone_number", request.reveal_phone_number.to_string()),
            ])
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApolloError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let body = resp.text().await?;
        let parsed: BulkMatchResponse = serde_json::from_str(&body)?;
        tracing::debug!(
            matches = parsed.matches.len(),
            credits = ?parsed.credits_consumed,
            "bulk_match returned"
        );
        Ok(parsed)
    }
}

/// Pull a readable message out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error: Some(msg), ..
        })
        | Ok(ErrorBody {
            message: Some(msg), ..
        }) => msg,
        _ => body.to_string(),
    }
}
