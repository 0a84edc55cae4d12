//! Export side: write the final aggregate as JSON or flat CSV.
//!
//! Export never alters a contact's values. Reading an export back yields the
//! same field values that were written, so a failed contact keeps its error and
//! empty enrichment fields.

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{LeadflowError, Result};
use crate::stats::RunStatistics;
use crate::types::{Contact, EnrichedContact, EnrichmentStatus};

/// Everything the dashboard shows after a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub contacts: Vec<EnrichedContact>,
    pub statistics: RunStatistics,
}

impl ExportDocument {
    pub fn new(contacts: Vec<EnrichedContact>, statistics: RunStatistics) -> Self {
        Self {
            contacts,
            statistics,
        }
    }

    /// Write to `path`, choosing CSV for a `.csv` extension and JSON otherwise.
    /// CSV carries only the contacts; statistics are a JSON-only section.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

        if is_csv {
            write_csv(file, &self.contacts)?;
        } else {
            self.write_json(file)?;
        }
        info!(path = %path.display(), contacts = self.contacts.len(), "Wrote export");
        Ok(())
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn read_json<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// One flat CSV row. List fields are JSON arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportRow {
    first_name: String,
    last_name: String,
    domain: Option<String>,
    email: Option<String>,
    title: Option<String>,
    company: Option<String>,
    industry: Option<String>,
    location: Option<String>,
    linkedin_url: Option<String>,
    twitter_url: Option<String>,
    github_url: Option<String>,
    work_email: Option<String>,
    personal_email: Option<String>,
    phone_numbers: Option<String>,
    employment_history: Option<String>,
    quality_score: Option<u8>,
    enrichment_status: EnrichmentStatus,
    error: Option<String>,
}

impl TryFrom<&EnrichedContact> for ExportRow {
    type Error = LeadflowError;

    fn try_from(c: &EnrichedContact) -> Result<Self> {
        Ok(Self {
            first_name: c.contact.first_name.clone(),
            last_name: c.contact.last_name.clone(),
            domain: c.contact.domain.clone(),
            email: c.contact.email.clone(),
            title: c.title.clone(),
            company: c.company.clone(),
            industry: c.industry.clone(),
            location: c.location.clone(),
            linkedin_url: c.linkedin_url.clone(),
            twitter_url: c.twitter_url.clone(),
            github_url: c.github_url.clone(),
            work_email: c.work_email.clone(),
            personal_email: c.personal_email.clone(),
            phone_numbers: list_cell(&c.phone_numbers)?,
            employment_history: list_cell(&c.employment_history)?,
            quality_score: c.quality_score,
            enrichment_status: c.enrichment_status,
            error: c.error.clone(),
        })
    }
}

impl TryFrom<ExportRow> for EnrichedContact {
    type Error = LeadflowError;

    fn try_from(row: ExportRow) -> Result<Self> {
        Ok(Self {
            contact: Contact {
                first_name: row.first_name,
                last_name: row.last_name,
                domain: row.domain,
                email: row.email,
            },
            title: row.title,
            company: row.company,
            industry: row.industry,
            location: row.location,
            linkedin_url: row.linkedin_url,
            twitter_url: row.twitter_url,
            github_url: row.github_url,
            work_email: row.work_email,
            personal_email: row.personal_email,
            phone_numbers: parse_list_cell(row.phone_numbers.as_deref())?,
            employment_history: parse_list_cell(row.employment_history.as_deref())?,
            quality_score: row.quality_score,
            enrichment_status: row.enrichment_status,
            error: row.error,
        })
    }
}

pub fn write_csv<W: Write>(writer: W, contacts: &[EnrichedContact]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for contact in contacts {
        wtr.serialize(ExportRow::try_from(contact)?)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_csv<R: Read>(reader: R) -> Result<Vec<EnrichedContact>> {
    let mut rdr = csv::Reader::from_reader(reader);
    rdr.deserialize::<ExportRow>()
        .map(|row| EnrichedContact::try_from(row?))
        .collect()
}

/// List cells hold a JSON array so every field of every entry survives.
fn list_cell<T: Serialize>(items: &[T]) -> Result<Option<String>> {
    if items.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::to_string(items)?))
}

fn parse_list_cell<T: serde::de::DeserializeOwned>(cell: Option<&str>) -> Result<Vec<T>> {
    match cell.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(json) => Ok(serde_json::from_str(json)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EmploymentRecord;

    fn failed_aggregate() -> Vec<EnrichedContact> {
        vec![
            EnrichedContact::failed(
                Contact::new("Ada", "Lovelace").with_domain("acme.io"),
                "Batch 2 failed: rate limited",
            ),
            EnrichedContact::failed(
                Contact::new("Grace", "Hopper").with_email("grace@navy.mil"),
                "Batch 2 failed: rate limited",
            ),
        ]
    }

    #[test]
    fn failed_contacts_survive_csv_export_unchanged() {
        let original = failed_aggregate();
        let mut buf = Vec::new();
        write_csv(&mut buf, &original).unwrap();

        let restored = read_csv(buf.as_slice()).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn failed_contacts_survive_json_export_unchanged() {
        let doc = ExportDocument::new(
            failed_aggregate(),
            RunStatistics {
                processed: 2,
                failed: 2,
                api_calls: 1,
                ..Default::default()
            },
        );
        let mut buf = Vec::new();
        doc.write_json(&mut buf).unwrap();

        let restored = ExportDocument::read_json(buf.as_slice()).unwrap();
        assert_eq!(restored, doc);
    }

    #[test]
    fn enriched_contact_survives_csv_export_unchanged() {
        let mut c = EnrichedContact::matched(Contact::new("Ada", "Lovelace"));
        c.title = Some("CTO".into());
        c.phone_numbers = vec!["+1 555 0100".into(), "ext; 12".into()];
        c.employment_history = vec![
            EmploymentRecord {
                title: Some("CTO".into()),
                company: Some("Acme @ Labs".into()),
                start_date: Some("2020-01-01".into()),
                end_date: None,
                current: true,
            },
            EmploymentRecord {
                title: Some("Engineer".into()),
                company: Some("Initech".into()),
                start_date: Some("2015-03-01".into()),
                end_date: Some("2019-12-31".into()),
                current: false,
            },
        ];
        c.quality_score = Some(40);

        let mut buf = Vec::new();
        write_csv(&mut buf, std::slice::from_ref(&c)).unwrap();

        let restored = read_csv(buf.as_slice()).unwrap();
        assert_eq!(restored, vec![c]);
    }

    #[test]
    fn unreadable_list_cell_is_an_error() {
        let text = "firstName,lastName,domain,email,title,company,industry,location,linkedinUrl,\
twitterUrl,githubUrl,workEmail,personalEmail,phoneNumbers,employmentHistory,qualityScore,\
enrichmentStatus,error\nAda,Lovelace,,,,,,,,,,,,not json,,,success,\n";

        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, LeadflowError::Json(_)));
    }

    #[test]
    fn write_to_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let doc = ExportDocument::new(failed_aggregate(), RunStatistics::default());

        let csv_path = dir.path().join("out.csv");
        doc.write_to(&csv_path).unwrap();
        let csv_text = std::fs::read_to_string(&csv_path).unwrap();
        assert!(csv_text.starts_with("firstName,lastName"));

        let json_path = dir.path().join("out.json");
        doc.write_to(&json_path).unwrap();
        let json = std::fs::File::open(&json_path).unwrap();
        assert_eq!(ExportDocument::read_json(json).unwrap(), doc);
    }
}
