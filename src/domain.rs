//! Utility functions for handling domain names and URLs.

use crate::error::{AppError, Result};
use url::{Host, Position, Url};

/// Parses a scraped URL string into an `https` URL, adding a scheme if
/// necessary.
///
/// # Returns
/// * `Ok(Url)` with scheme `https` and a non-empty host.
/// * `Err(AppError)` if the input is blank, unparseable, or has no host.
pub fn normalize_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::InsufficientInput("URL is empty".to_string()));
    }

    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let mut url = Url::parse(&with_scheme)?;

    if url.host_str().is_none_or(str::is_empty) {
        return Err(AppError::DomainExtraction(format!(
            "No host in URL: {}",
            with_scheme
        )));
    }

    if url.scheme() != "https" && url.set_scheme("https").is_err() {
        // Non-special schemes cannot be switched in place; rebuild from the authority on.
        let rest = url[Position::BeforeUsername..].to_string();
        url = Url::parse(&format!("https://{}", rest))?;
    }

    Ok(url)
}

/// Returns true if the query key starts with one of the (lower-case) tracking
/// prefixes, ignoring case.
pub fn is_tracking_param(key: &str, prefixes: &[String]) -> bool {
    let key = key.to_lowercase();
    prefixes.iter().any(|prefix| key.starts_with(prefix.as_str()))
}

/// Removes tracking query parameters in place. The query string is only
/// rewritten when something was actually removed; a rewritten query lists the
/// remaining keys in sorted order, repeated keys keeping their value order.
pub fn strip_tracking_params(url: &mut Url, prefixes: &[String]) {
    if url.query().is_none() {
        return;
    }

    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let mut kept: Vec<(String, String)> = pairs
        .iter()
        .filter(|(key, _)| !is_tracking_param(key, prefixes))
        .cloned()
        .collect();

    if kept.len() == pairs.len() {
        return;
    }

    kept.sort_by(|a, b| a.0.cmp(&b.0));
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept.iter());
    }
}

/// Converts a domain to its ASCII (punycode) form.
pub fn to_ascii_domain(domain: &str) -> Result<String> {
    match Host::parse(domain) {
        Ok(Host::Domain(ascii)) if !ascii.is_empty() => Ok(ascii),
        Ok(other) => Err(AppError::DomainExtraction(format!(
            "'{}' is not a domain name ({})",
            domain, other
        ))),
        Err(e) => Err(AppError::UrlParse(e)),
    }
}

/// Extracts the host (e.g., "example.com") from a website string, lower-cased
/// and without a leading "www.". Returns an empty string when nothing usable
/// can be parsed.
pub fn get_domain_from_url(website_url_str: &str) -> String {
    let raw = website_url_str.trim().to_lowercase();
    if raw.is_empty() {
        return String::new();
    }

    let with_scheme = if raw.contains("://") {
        raw
    } else {
        format!("https://{}", raw)
    };

    let Ok(url) = Url::parse(&with_scheme) else {
        tracing::debug!("Could not parse website '{}'", website_url_str);
        return String::new();
    };

    let host = url.host_str().unwrap_or("").trim();
    host.strip_prefix("www.").unwrap_or(host).to_string()
}
