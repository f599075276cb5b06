//! Lead quality scoring.
//!
//! Four independently capped categories add up to a 0–100 total:
//!
//! | category             | cap | signals                                        |
//! |----------------------|-----|------------------------------------------------|
//! | contact completeness | 30  | email 10, phone 10, one per social link (≤10) |
//! | website quality      | 30  | https 10, contact page 10, about 5, form 5    |
//! | social presence      | 20  | linkedin, instagram, facebook, youtube/tiktok |
//! | business profile     | 20  | complete address 10, own domain 10            |
//!
//! Scoring is pure; every network check already happened during cleaning.

use crate::config::Config;
use crate::domain::get_domain_from_url;
use crate::models::{LeadFeatures, ScoreBreakdown, ScoreResult};
use std::collections::{BTreeMap, HashSet};

const CONTACT_CAP: u32 = 30;
const WEBSITE_CAP: u32 = 30;
const SOCIAL_CAP: u32 = 20;
const BUSINESS_CAP: u32 = 20;
const MAX_SOCIAL_LINK_POINTS: u32 = 10;

/// Scores lead features against the rubric, using the configured list of
/// free-hosting domains for the business-profile check.
#[derive(Debug, Clone)]
pub struct LeadScorer {
    free_hosting_domains: Vec<String>,
}

impl LeadScorer {
    pub fn new(free_hosting_domains: Vec<String>) -> Self {
        Self {
            free_hosting_domains,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.free_hosting_domains.clone())
    }

    pub fn compute_score(&self, input: &LeadFeatures) -> ScoreResult {
        let breakdown = ScoreBreakdown {
            contact_completeness: score_contact_completeness(input),
            website_quality: score_website_quality(input),
            social_presence: score_social_presence(input),
            business_profile: self.score_business_profile(input),
        };

        let result = ScoreResult {
            total: breakdown.sum(),
            breakdown,
        };
        tracing::debug!(target: "score_task", "Computed score {:?}", result);
        result
    }

    fn score_business_profile(&self, input: &LeadFeatures) -> u32 {
        let mut score = 0;
        if has_complete_address(&input.address) {
            score += 10;
        }
        if self.is_high_quality_domain(&input.website) {
            score += 10;
        }
        score.min(BUSINESS_CAP)
    }

    /// A website on its own domain: not hosted under a free site builder and
    /// with at least one dot once `www.` is stripped.
    pub fn is_high_quality_domain(&self, website: &str) -> bool {
        let domain = get_domain_from_url(website);
        if domain.is_empty() {
            return false;
        }
        let free_hosted = self.free_hosting_domains.iter().any(|bad| {
            domain == *bad || domain.ends_with(&format!(".{}", bad))
        });
        !free_hosted && domain.contains('.')
    }
}

impl Default for LeadScorer {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Scores with the default free-hosting list.
pub fn compute_score(input: &LeadFeatures) -> ScoreResult {
    LeadScorer::default().compute_score(input)
}

fn score_contact_completeness(input: &LeadFeatures) -> u32 {
    let mut score = 0;
    if has_value(&input.emails) {
        score += 10;
    }
    if has_value(&input.phones) {
        score += 10;
    }
    score += count_social_links(&input.socials).min(MAX_SOCIAL_LINK_POINTS);
    score.min(CONTACT_CAP)
}

fn score_website_quality(input: &LeadFeatures) -> u32 {
    let mut score = 0;
    if has_https(input) {
        score += 10;
    }
    if input.has_contact_page {
        score += 10;
    }
    if input.has_about_page {
        score += 5;
    }
    if input.has_contact_form {
        score += 5;
    }
    score.min(WEBSITE_CAP)
}

fn score_social_presence(input: &LeadFeatures) -> u32 {
    if input.socials.is_empty() {
        return 0;
    }

    let normalized = normalize_social_keys(&input.socials);
    let present = |key: &str| normalized.get(key).is_some_and(|value| !value.is_empty());

    let mut score = 0;
    if present("linkedin") {
        score += 5;
    }
    if present("instagram") {
        score += 5;
    }
    if present("facebook") {
        score += 5;
    }
    if present("youtube") || present("tiktok") {
        score += 5;
    }
    score.min(SOCIAL_CAP)
}

fn has_value(values: &[String]) -> bool {
    values.iter().any(|value| !value.trim().is_empty())
}

/// Number of distinct link tokens across every stored social value.
fn count_social_links(socials: &BTreeMap<String, String>) -> u32 {
    let tokens: HashSet<&str> = socials
        .values()
        .flat_map(|value| split_social_value(value))
        .collect();
    u32::try_from(tokens.len()).unwrap_or(u32::MAX)
}

fn split_social_value(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| matches!(c, ',' | ';' | '|') || c.is_whitespace())
        .filter(|token| !token.is_empty())
}

/// Lower-cases and trims keys. When two keys collapse onto one, a non-empty
/// value wins over an empty one.
fn normalize_social_keys(socials: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut result: BTreeMap<String, String> = BTreeMap::new();
    for (key, value) in socials {
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        let value = value.trim().to_string();
        let entry = result.entry(key).or_default();
        if entry.is_empty() {
            *entry = value;
        }
    }
    result
}

fn has_https(input: &LeadFeatures) -> bool {
    input.has_https || input.website.trim().to_lowercase().starts_with("https://")
}

/// At least 10 bytes after trimming, with a letter, a digit and a comma.
pub fn has_complete_address(raw: &str) -> bool {
    let address = raw.trim();
    if address.len() < 10 {
        return false;
    }
    let has_letter = address.chars().any(char::is_alphabetic);
    let has_digit = address.chars().any(|c| c.is_ascii_digit());
    let has_separator = address.contains(',');
    has_letter && has_digit && has_separator
}

#[cfg(test)]
mod tests {
    use super::*;

    fn socials(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_full_coverage_scores_100() {
        let input = LeadFeatures {
            emails: vec!["info@example.com".to_string()],
            phones: vec!["+123456789".to_string()],
            socials: socials(&[
                ("LinkedIn", "https://linkedin.com/company/acme"),
                ("instagram", "https://instagram.com/acme"),
                ("facebook", "https://facebook.com/acme"),
                ("youtube", "https://youtube.com/@acme,https://youtube.com/@acme-demo"),
                (
                    "other",
                    "https://twitter.com/acme|https://twitter.com/acme2|https://twitter.com/acme3|https://twitter.com/acme4|https://twitter.com/acme5|https://twitter.com/acme6",
                ),
            ]),
            has_https: true,
            has_contact_page: true,
            has_about_page: true,
            has_contact_form: true,
            address: "123 Main Street, Springfield, US".to_string(),
            website: "https://acme.com".to_string(),
        };

        let score = compute_score(&input);

        assert_eq!(score.total, 100);
        assert_eq!(score.breakdown.contact_completeness, 30);
        assert_eq!(score.breakdown.website_quality, 30);
        assert_eq!(score.breakdown.social_presence, 20);
        assert_eq!(score.breakdown.business_profile, 20);
    }

    #[test]
    fn test_minimal_signals_score_zero() {
        let input = LeadFeatures {
            emails: vec!["   ".to_string()],
            socials: socials(&[("linkedin", "")]),
            website: "http://myshop.wordpress.com".to_string(),
            address: "Jl. Merdeka".to_string(),
            ..LeadFeatures::default()
        };

        let score = compute_score(&input);

        assert_eq!(score.total, 0);
        assert_eq!(score.breakdown, ScoreBreakdown::default());
    }

    #[test]
    fn test_social_links_are_counted_once_and_capped() {
        let input = LeadFeatures {
            socials: socials(&[
                ("linkedin", "https://linkedin.com/a https://linkedin.com/a"),
                ("facebook", "https://facebook.com/a;\thttps://facebook.com/b"),
            ]),
            ..LeadFeatures::default()
        };
        assert_eq!(compute_score(&input).breakdown.contact_completeness, 3);
    }

    #[test]
    fn test_youtube_and_tiktok_share_points() {
        let input = LeadFeatures {
            socials: socials(&[
                ("YouTube", "https://youtube.com/@a"),
                ("tiktok", "https://tiktok.com/@a"),
            ]),
            ..LeadFeatures::default()
        };
        assert_eq!(compute_score(&input).breakdown.social_presence, 5);
    }

    #[test]
    fn test_collapsed_keys_prefer_non_empty_value() {
        let input = LeadFeatures {
            socials: socials(&[("LinkedIn", "https://linkedin.com/a"), ("linkedin", " ")]),
            ..LeadFeatures::default()
        };
        assert_eq!(compute_score(&input).breakdown.social_presence, 5);
    }

    #[test]
    fn test_https_from_website_prefix() {
        let input = LeadFeatures {
            website: "  HTTPS://Acme.com".to_string(),
            ..LeadFeatures::default()
        };
        let score = compute_score(&input);
        assert_eq!(score.breakdown.website_quality, 10);
        assert_eq!(score.breakdown.business_profile, 10);
        assert_eq!(score.total, 20);
    }

    #[test]
    fn test_high_quality_domain() {
        let scorer = LeadScorer::default();
        let cases = [
            ("https://example.com", true),
            ("http://www.example.co.id", true),
            ("mybrand.wordpress.com", false),
            ("wordpress.com", false),
            ("", false),
            ("ftp://subdomain.googlepages.com", false),
            ("localhost", false),
        ];
        for (input, want) in cases {
            assert_eq!(scorer.is_high_quality_domain(input), want, "{}", input);
        }
    }

    #[test]
    fn test_configured_free_hosting_list() {
        let scorer = LeadScorer::new(vec!["example.net".to_string()]);
        assert!(!scorer.is_high_quality_domain("shop.example.net"));
        assert!(scorer.is_high_quality_domain("mybrand.wordpress.com"));
    }

    #[test]
    fn test_has_complete_address() {
        let cases = [
            ("123 Main St, Springfield, US", true),
            (" 456 High Road London ", false),
            ("Somewhere", false),
            ("Jl. Merdeka No. 8, Jakarta", true),
            ("1,a", false),
            ("Rue Ⅻ, Paris Ville", false),
            ("Plot ½, Green Lane", false),
        ];
        for (input, want) in cases {
            assert_eq!(has_complete_address(input), want, "{}", input);
        }
    }
}
