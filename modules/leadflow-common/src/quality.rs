use crate::types::EnrichedContact;

/// Field weights for the per-contact quality score. Sums to 100.
const WEIGHT_TITLE: u32 = 15;
const WEIGHT_COMPANY: u32 = 15;
const WEIGHT_INDUSTRY: u32 = 10;
const WEIGHT_LOCATION: u32 = 10;
const WEIGHT_LINKEDIN: u32 = 15;
const WEIGHT_WORK_EMAIL: u32 = 20;
const WEIGHT_PERSONAL_EMAIL: u32 = 5;
const WEIGHT_PHONE: u32 = 5;
const WEIGHT_EMPLOYMENT: u32 = 5;

/// 0-100 heuristic: how many of the optional profile fields were populated.
/// Failed contacts always score 0.
pub fn score(contact: &EnrichedContact) -> u8 {
    if !contact.is_success() {
        return 0;
    }

    let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());

    let mut total = 0;
    if filled(&contact.title) {
        total += WEIGHT_TITLE;
    }
    if filled(&contact.company) {
        total += WEIGHT_COMPANY;
    }
    if filled(&contact.industry) {
        total += WEIGHT_INDUSTRY;
    }
    if filled(&contact.location) {
        total += WEIGHT_LOCATION;
    }
    if filled(&contact.linkedin_url) {
        total += WEIGHT_LINKEDIN;
    }
    if filled(&contact.work_email) {
        total += WEIGHT_WORK_EMAIL;
    }
    if filled(&contact.personal_email) {
        total += WEIGHT_PERSONAL_EMAIL;
    }
    if !contact.phone_numbers.is_empty() {
        total += WEIGHT_PHONE;
    }
    if !contact.employment_history.is_empty() {
        total += WEIGHT_EMPLOYMENT;
    }

    total.min(100) as u8
}

/// Rounded mean of `quality_score` over successful contacts; 0 when there are none.
/// A successful contact with no recorded score counts as 0.
pub fn mean_score(contacts: &[EnrichedContact]) -> u8 {
    let scores: Vec<u32> = contacts
        .iter()
        .filter(|c| c.is_success())
        .map(|c| u32::from(c.quality_score.unwrap_or(0).min(100)))
        .collect();

    if scores.is_empty() {
        return 0;
    }

    let sum: u32 = scores.iter().sum();
    (f64::from(sum) / scores.len() as f64).round() as u8
}
