//! JSON body of the deployed enrichment function, shared by server and client.

use serde::{Deserialize, Serialize};

use leadflow_common::{Contact, EnrichedContact, EnrichmentOptions};

use crate::error::BatchEnrichmentError;

/// Largest batch the function accepts in one request.
pub const MAX_CONTACTS_PER_REQUEST: usize = 25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichRequest {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub options: EnrichmentOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<EnrichedContact>,
    #[serde(default)]
    pub api_calls: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// `BatchEnrichmentError::kind` of a failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl EnrichResponse {
    pub fn ok(results: Vec<EnrichedContact>, api_calls: u32) -> Self {
        Self {
            success: true,
            results,
            api_calls,
            error: None,
            kind: None,
        }
    }

    pub fn err(error: &BatchEnrichmentError) -> Self {
        Self {
            success: false,
            results: Vec::new(),
            api_calls: 0,
            error: Some(error.message().to_string()),
            kind: Some(error.kind().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_keys() {
        let body = serde_json::json!({
            "apiKey": "k",
            "contacts": [{"firstName": "Ada", "lastName": "Lovelace", "domain": "acme.io"}],
            "options": {"revealPersonalEmails": true}
        });
        let req: EnrichRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.api_key, "k");
        assert_eq!(req.contacts[0].domain.as_deref(), Some("acme.io"));
        assert!(req.options.reveal_personal_emails);
        assert!(!req.options.reveal_phone_numbers);
    }

    #[test]
    fn error_response_carries_kind() {
        let resp = EnrichResponse::err(&BatchEnrichmentError::RateLimited("slow down".into()));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["kind"], "rate_limited");
        assert_eq!(json["error"], "slow down");
        assert!(json.get("results").is_none());
    }
}
