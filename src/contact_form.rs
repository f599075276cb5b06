//! Contact-form URL sanitizing.

use crate::domain::{normalize_url, strip_tracking_params};

/// Forces `https`, drops tracking parameters and returns the URL as text.
/// Blank or unparseable input yields an empty string. No host allow-list and
/// no liveness probe apply here.
pub fn sanitize_contact_form(raw: &str, tracking_prefixes: &[String]) -> String {
    match normalize_url(raw) {
        Ok(mut url) => {
            strip_tracking_params(&mut url, tracking_prefixes);
            url.to_string()
        }
        Err(e) => {
            if !raw.trim().is_empty() {
                tracing::debug!(target: "process_record_task", "Dropping contact form URL '{}': {}", raw, e);
            }
            String::new()
        }
    }
}
