use serde::{Deserialize, Serialize};

// --- Bulk people match ---

/// One identifying record sent to `people/bulk_match`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchDetail {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Body and query flags for a bulk match call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkMatchRequest {
    pub details: Vec<MatchDetail>,
    #[serde(skip)]
    pub reveal_personal_emails: bool,
    #[serde(skip)]
    pub reveal_phone_number: bool,
}

/// Response from `people/bulk_match`. `matches` is positional: entry `i`
/// corresponds to `details[i]`, `None` when nothing matched.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkMatchResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub matches: Vec<Option<Person>>,
    #[serde(default)]
    pub credits_consumed: Option<f64>,
    #[serde(default)]
    pub missing_records: Option<u32>,
    #[serde(default)]
    pub unique_enriched_records: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Person {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub headline: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub github_url: Option<String>,
    pub facebook_url: Option<String>,
    pub email: Option<String>,
    pub email_status: Option<String>,
    #[serde(default)]
    pub personal_emails: Vec<String>,
    #[serde(default)]
    pub phone_numbers: Vec<PhoneNumber>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub organization: Option<Organization>,
    #[serde(default)]
    pub employment_history: Vec<EmploymentEntry>,
}

impl Person {
    /// "City, State, Country" with empty parts skipped. `None` when nothing is known.
    pub fn location(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.city, &self.state, &self.country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Organization {
    pub id: Option<String>,
    pub name: Option<String>,
    pub website_url: Option<String>,
    pub primary_domain: Option<String>,
    pub industry: Option<String>,
    pub estimated_num_employees: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PhoneNumber {
    pub raw_number: Option<String>,
    pub sanitized_number: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl PhoneNumber {
    /// Prefer the sanitized E.164 form, fall back to the raw number.
    pub fn best(&self) -> Option<&str> {
        self.sanitized_number
            .as_deref()
            .or(self.raw_number.as_deref())
            .filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EmploymentEntry {
    pub organization_name: Option<String>,
    pub title: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub current: bool,
}

/// Error body returned by the API on 4xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}
