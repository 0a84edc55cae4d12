use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Contact: one uploaded row
// ---------------------------------------------------------------------------

/// An uploaded contact. Identity is positional: its index in the uploaded list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Contact {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            domain: None,
            email: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Enrichment options, forwarded verbatim to the enrichment call
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnrichmentOptions {
    #[serde(alias = "reveal_personal_emails")]
    pub reveal_personal_emails: bool,
    #[serde(alias = "reveal_phone_numbers")]
    pub reveal_phone_numbers: bool,
    #[serde(alias = "include_social_profiles")]
    pub include_social_profiles: bool,
    #[serde(alias = "include_employment_history")]
    pub include_employment_history: bool,
}

// ---------------------------------------------------------------------------
// EnrichedContact: one merged result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentStatus {
    Success,
    Failed,
}

impl fmt::Display for EnrichmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrichmentStatus::Success => write!(f, "success"),
            EnrichmentStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub current: bool,
}

/// A contact plus whatever the enrichment call found for it.
///
/// On failure every enrichment field is empty and `error` carries the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedContact {
    #[serde(flatten)]
    pub contact: Contact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_email: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phone_numbers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub employment_history: Vec<EmploymentRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<u8>,
    pub enrichment_status: EnrichmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EnrichedContact {
    /// A successful result with no fields populated yet.
    pub fn matched(contact: Contact) -> Self {
        Self {
            contact,
            title: None,
            company: None,
            industry: None,
            location: None,
            linkedin_url: None,
            twitter_url: None,
            github_url: None,
            work_email: None,
            personal_email: None,
            phone_numbers: Vec::new(),
            employment_history: Vec::new(),
            quality_score: None,
            enrichment_status: EnrichmentStatus::Success,
            error: None,
        }
    }

    /// A failed result carrying `error`; enrichment fields stay empty.
    pub fn failed(contact: Contact, error: impl Into<String>) -> Self {
        Self {
            enrichment_status: EnrichmentStatus::Failed,
            error: Some(error.into()),
            ..Self::matched(contact)
        }
    }

    pub fn is_success(&self) -> bool {
        self.enrichment_status == EnrichmentStatus::Success
    }
}
