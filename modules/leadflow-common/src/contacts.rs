//! Upload side: turn a file of rows into an ordered list of contacts.
//!
//! Rows without a first or last name are dropped here so the orchestrator
//! only ever sees well-formed contacts.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{LeadflowError, Result};
use crate::types::Contact;

/// Parsed upload: the kept contacts in file order plus how many rows were dropped.
#[derive(Debug, Clone, Default)]
pub struct ContactUpload {
    pub contacts: Vec<Contact>,
    pub skipped: usize,
}

/// A row as it appears in the file, before required fields are checked.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContact {
    #[serde(default, alias = "first_name")]
    first_name: Option<String>,
    #[serde(default, alias = "last_name")]
    last_name: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl RawContact {
    fn into_contact(self) -> Option<Contact> {
        let first_name = non_empty(self.first_name)?;
        let last_name = non_empty(self.last_name)?;
        Some(Contact {
            first_name,
            last_name,
            domain: non_empty(self.domain).map(|d| normalize_domain(&d)),
            email: non_empty(self.email),
        })
    }
}

/// Load contacts from a `.json` or `.csv` file, chosen by extension.
pub fn load_contacts(path: &Path) -> Result<ContactUpload> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let file = std::fs::File::open(path)?;
    let upload = match ext.as_deref() {
        Some("json") => parse_json(file)?,
        Some("csv") => parse_csv(file)?,
        _ => {
            return Err(LeadflowError::Upload(format!(
                "unsupported contact file '{}': expected .csv or .json",
                path.display()
            )))
        }
    };

    info!(
        path = %path.display(),
        contacts = upload.contacts.len(),
        skipped = upload.skipped,
        "Loaded contacts"
    );
    Ok(upload)
}

/// Parse a JSON array of contact objects.
pub fn parse_json<R: Read>(reader: R) -> Result<ContactUpload> {
    let rows: Vec<RawContact> = serde_json::from_reader(reader)?;
    Ok(collect(rows.into_iter()))
}

/// Parse CSV with a header row. Header names are matched loosely:
/// `firstName`, `first_name` and `First Name` all map to the first name.
pub fn parse_csv<R: Read>(reader: R) -> Result<ContactUpload> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(RawContact {
            first_name: columns.first_name.and_then(|i| record.get(i)).map(String::from),
            last_name: columns.last_name.and_then(|i| record.get(i)).map(String::from),
            domain: columns.domain.and_then(|i| record.get(i)).map(String::from),
            email: columns.email.and_then(|i| record.get(i)).map(String::from),
        });
    }
    Ok(collect(rows.into_iter()))
}

/// Drop exact duplicates by normalised (first, last, domain-or-email), keeping
/// the first occurrence. Returns the filtered list and how many were removed.
pub fn dedupe(contacts: Vec<Contact>) -> (Vec<Contact>, usize) {
    let mut seen = HashSet::new();
    let before = contacts.len();
    let kept: Vec<Contact> = contacts
        .into_iter()
        .filter(|c| seen.insert(dedupe_key(c)))
        .collect();
    let removed = before - kept.len();
    if removed > 0 {
        info!(removed, "Removed duplicate contacts");
    }
    (kept, removed)
}

fn dedupe_key(c: &Contact) -> (String, String, String) {
    let anchor = c
        .domain
        .as_deref()
        .or(c.email.as_deref())
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    (
        c.first_name.trim().to_lowercase(),
        c.last_name.trim().to_lowercase(),
        anchor,
    )
}

fn collect(rows: impl Iterator<Item = RawContact>) -> ContactUpload {
    let mut upload = ContactUpload::default();
    for (line, raw) in rows.enumerate() {
        match raw.into_contact() {
            Some(contact) => upload.contacts.push(contact),
            None => {
                warn!(row = line + 1, "Skipping row without first and last name");
                upload.skipped += 1;
            }
        }
    }
    upload
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Strip scheme, `www.` and any path so `https://www.acme.io/about` becomes `acme.io`.
fn normalize_domain(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    let without_scheme = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let without_www = without_scheme.strip_prefix("www.").unwrap_or(without_scheme);
    without_www
        .split('/')
        .next()
        .unwrap_or(without_www)
        .to_string()
}

/// Column positions for the recognised headers.
struct ColumnMap {
    first_name: Option<usize>,
    last_name: Option<usize>,
    domain: Option<usize>,
    email: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let mut map = ColumnMap {
            first_name: None,
            last_name: None,
            domain: None,
            email: None,
        };
        for (i, header) in headers.iter().enumerate() {
            let key: String = header
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase();
            let slot = match key.as_str() {
                "firstname" | "first" | "givenname" => &mut map.first_name,
                "lastname" | "last" | "surname" | "familyname" => &mut map.last_name,
                "domain" | "companydomain" | "website" => &mut map.domain,
                "email" | "emailaddress" => &mut map.email,
                _ => continue,
            };
            slot.get_or_insert(i);
        }

        if map.first_name.is_none() || map.last_name.is_none() {
            return Err(LeadflowError::Upload(
                "CSV must have first name and last name columns".to_string(),
            ));
        }
        Ok(map)
    }
}
