//! Defines the core data structures flowing in and out of the cleaning and
//! scoring passes.

use crate::social::SocialLinks;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The unvalidated payload a crawler produces for one company.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RawEnrichedData {
    pub company_id: String,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub primary_phone: Option<String>,
    #[serde(default)]
    pub secondary_phones: Vec<String>,
    /// Platform label (any spelling) → candidate URLs. Keys are visited in
    /// sorted order, so when two labels name the same platform the
    /// lexicographically smaller one is tried first.
    #[serde(default, alias = "socials")]
    pub social_links: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub addresses: Vec<String>,
    #[serde(default)]
    pub contact_form_url: Option<String>,
}

/// Validated and normalized contact information for one company.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanedData {
    pub company_id: String,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub socials: SocialLinks,
    /// Empty when no address candidate survived.
    pub address: String,
    /// Empty when the raw URL was missing or unparseable.
    pub contact_form_url: String,
}

/// The signals the scoring engine reads. Built per request, never stored.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LeadFeatures {
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    /// Platform key → stored value; a value may hold several URLs separated
    /// by commas, semicolons, pipes or whitespace.
    pub socials: BTreeMap<String, String>,
    pub has_https: bool,
    pub has_contact_page: bool,
    pub has_about_page: bool,
    pub has_contact_form: bool,
    pub address: String,
    pub website: String,
}

/// Per-category points. Each field is already clamped to its cap.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub contact_completeness: u32,
    pub website_quality: u32,
    pub social_presence: u32,
    pub business_profile: u32,
}

impl ScoreBreakdown {
    pub fn sum(&self) -> u32 {
        self.contact_completeness + self.website_quality + self.social_presence + self.business_profile
    }
}

/// Aggregate lead score in 0..=100 with its breakdown.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreResult {
    pub total: u32,
    pub breakdown: ScoreBreakdown,
}

/// A persisted enrichment record as the storage layer hands it back,
/// including crawl metadata (`website`, `https_enabled`, `contact_page_url`,
/// `has_contact_page`).
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct EnrichmentRecord {
    pub company_id: String,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub socials: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact_form_url: Option<String>,
    #[serde(default)]
    pub about_summary: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl EnrichmentRecord {
    /// Wraps a freshly cleaned record with the crawl metadata that came with it.
    pub fn from_cleaned(
        cleaned: &CleanedData,
        about_summary: Option<String>,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        let socials = cleaned
            .socials
            .iter()
            .map(|(platform, url)| (platform.as_str().to_string(), vec![url.to_string()]))
            .collect();

        let non_empty = |value: &str| (!value.is_empty()).then(|| value.to_string());

        Self {
            company_id: cleaned.company_id.clone(),
            emails: cleaned.emails.clone(),
            phones: cleaned.phones.clone(),
            socials,
            address: non_empty(&cleaned.address),
            contact_form_url: non_empty(&cleaned.contact_form_url),
            about_summary,
            metadata,
        }
    }
}

/// Outcome of cleaning one raw payload in batch mode.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProcessingResult {
    pub company_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaned: Option<CleanedData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A stored record paired with its score, as returned to API consumers.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ScoredRecord {
    pub enrichment: EnrichmentRecord,
    pub score: ScoreResult,
}
