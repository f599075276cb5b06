//! Builds scoring inputs from a stored enrichment record.

use crate::models::{EnrichmentRecord, LeadFeatures};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Derives `LeadFeatures` from a persisted record and its crawl metadata.
///
/// * socials: first non-blank link per platform key
/// * contact page: a contact form implies one; otherwise `contact_page_url`
///   or the `has_contact_page` flag from metadata
/// * https: the `https_enabled` flag, else the website scheme
/// * about page: a non-blank `about_summary`
pub fn build_lead_features(record: &EnrichmentRecord) -> LeadFeatures {
    let website = metadata_string(&record.metadata, "website");

    let has_contact_form = has_text(record.contact_form_url.as_deref());
    let has_contact_page = has_contact_form
        || !metadata_string(&record.metadata, "contact_page_url").is_empty()
        || metadata_bool(&record.metadata, "has_contact_page").unwrap_or(false);

    let has_https = metadata_bool(&record.metadata, "https_enabled").unwrap_or(false)
        || website.to_lowercase().starts_with("https://");

    LeadFeatures {
        emails: record.emails.clone(),
        phones: record.phones.clone(),
        socials: flatten_socials(&record.socials),
        has_https,
        has_contact_page,
        has_about_page: has_text(record.about_summary.as_deref()),
        has_contact_form,
        address: record.address.as_deref().unwrap_or("").trim().to_string(),
        website,
    }
}

fn flatten_socials(values: &BTreeMap<String, Vec<String>>) -> BTreeMap<String, String> {
    values
        .iter()
        .filter_map(|(platform, links)| {
            links
                .iter()
                .map(|link| link.trim())
                .find(|link| !link.is_empty())
                .map(|link| (platform.clone(), link.to_string()))
        })
        .collect()
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn metadata_string(meta: &Map<String, Value>, key: &str) -> String {
    meta.get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn metadata_bool(meta: &Map<String, Value>, key: &str) -> Option<bool> {
    meta.get(key).and_then(Value::as_bool)
}
