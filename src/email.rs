//! Email syntax, domain and MX validation.

use crate::dns::MxResolver;
use crate::domain::to_ascii_domain;
use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9._%+\-']+@[a-z0-9.-]+\.[a-z]{2,}$")
        .expect("Failed to compile email regex pattern. This should not happen.")
});

/// Returns true if the (already lower-cased) address matches the accepted syntax.
pub fn is_valid_email_syntax(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Structural domain check: at least one dot, no empty labels, and no label
/// starting or ending with a hyphen.
pub fn is_domain_valid(domain: &str) -> bool {
    if !domain.contains('.') {
        return false;
    }
    domain
        .split('.')
        .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'))
}

/// Cleans scraped email lists. Each distinct domain gets a single MX lookup
/// per call to [`EmailCleaner::clean`].
#[derive(Clone)]
pub struct EmailCleaner {
    resolver: Arc<dyn MxResolver>,
    lookup_timeout: Duration,
}

impl EmailCleaner {
    pub fn new(resolver: Arc<dyn MxResolver>, lookup_timeout: Duration) -> Self {
        Self {
            resolver,
            lookup_timeout,
        }
    }

    /// Normalizes, validates and deduplicates raw email strings, keeping the
    /// first occurrence of each address in input order.
    pub async fn clean(&self, emails: &[String]) -> Vec<String> {
        if emails.is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<(String, String)> = Vec::with_capacity(emails.len());
        for raw in emails {
            let email = raw.trim().to_lowercase();
            if email.is_empty() {
                continue;
            }
            if !is_valid_email_syntax(&email) {
                tracing::debug!(target: "email_task", "Rejecting '{}': invalid syntax", email);
                continue;
            }
            let Some((_, domain)) = email.split_once('@') else {
                continue;
            };
            if !is_domain_valid(domain) {
                tracing::debug!(target: "email_task", "Rejecting '{}': malformed domain", email);
                continue;
            }
            match to_ascii_domain(domain) {
                Ok(ascii) => candidates.push((email, ascii)),
                Err(e) => {
                    tracing::debug!(target: "email_task", "Rejecting '{}': {}", email, e);
                }
            }
        }

        let mut seen_domains = HashSet::new();
        let domains: Vec<&str> = candidates
            .iter()
            .map(|(_, domain)| domain.as_str())
            .filter(|domain| seen_domains.insert(*domain))
            .collect();

        let lookups = join_all(domains.iter().map(|domain| self.has_mx_record(domain))).await;
        let domain_cache: HashMap<&str, bool> = domains.into_iter().zip(lookups).collect();

        let mut seen = HashSet::new();
        let mut valid = Vec::new();
        for (email, domain) in &candidates {
            if !domain_cache.get(domain.as_str()).copied().unwrap_or(false) {
                continue;
            }
            if seen.insert(email.clone()) {
                valid.push(email.clone());
            }
        }

        tracing::debug!(target: "email_task",
            "Kept {} of {} emails ({} domains checked)",
            valid.len(), emails.len(), domain_cache.len()
        );
        valid
    }

    async fn has_mx_record(&self, domain: &str) -> bool {
        match tokio::time::timeout(self.lookup_timeout, self.resolver.lookup_mx(domain)).await {
            Ok(Ok(records)) => !records.is_empty(),
            Ok(Err(e)) => {
                tracing::debug!(target: "email_task", "MX check failed for {}: {}", domain, e);
                false
            }
            Err(_) => {
                tracing::warn!(target: "email_task",
                    "MX lookup for {} exceeded {:?}", domain, self.lookup_timeout
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubResolver;

    fn cleaner(resolver: Arc<StubResolver>) -> EmailCleaner {
        EmailCleaner::new(resolver, Duration::from_secs(3))
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_clean_validates_syntax_and_mx() {
        let resolver = Arc::new(StubResolver::with_domains(&["example.com"]));
        let got = cleaner(resolver)
            .clean(&strings(&[
                "Test@Example.com",
                "test@example.com",
                "invalid@",
                "user@missingmx.com",
            ]))
            .await;
        assert_eq!(got, vec!["test@example.com"]);
    }

    #[tokio::test]
    async fn test_clean_looks_up_each_domain_once() {
        let resolver = Arc::new(StubResolver::with_domains(&["example.com"]));
        let got = cleaner(resolver.clone())
            .clean(&strings(&[
                "a@example.com",
                "b@example.com",
                "c@nomx.org",
                " B@EXAMPLE.COM ",
                "d@nomx.org",
            ]))
            .await;

        assert_eq!(got, vec!["a@example.com", "b@example.com"]);
        let mut lookups = resolver.lookups();
        lookups.sort();
        assert_eq!(lookups, vec!["example.com", "nomx.org"]);
    }

    #[tokio::test]
    async fn test_clean_rejects_malformed_domains_without_lookup() {
        let resolver = Arc::new(StubResolver::with_domains(&[
            "-bad.com",
            "a..com",
            "xn--zz.com",
        ]));
        let got = cleaner(resolver.clone())
            .clean(&strings(&[
                "x@-bad.com",
                "x@bad-.com",
                "x@a..com",
                "x@nodot",
                "x@xn--zz.com",
                "   ",
                "",
            ]))
            .await;
        assert!(got.is_empty());
        assert!(resolver.lookups().is_empty());
    }

    #[tokio::test]
    async fn test_clean_treats_timeout_as_no_mx() {
        let resolver = Arc::new(StubResolver::slow(Duration::from_secs(5), &["slow.com"]));
        let got = EmailCleaner::new(resolver, Duration::from_millis(20))
            .clean(&strings(&["hi@slow.com"]))
            .await;
        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn test_clean_empty_input() {
        let resolver = Arc::new(StubResolver::default());
        assert!(cleaner(resolver).clean(&[]).await.is_empty());
    }

    #[test]
    fn test_is_domain_valid() {
        assert!(is_domain_valid("example.com"));
        assert!(is_domain_valid("mail.my-company.co.id"));
        assert!(!is_domain_valid("localhost"));
        assert!(!is_domain_valid("example..com"));
        assert!(!is_domain_valid("-example.com"));
        assert!(!is_domain_valid("example-.com"));
    }

    #[test]
    fn test_email_syntax() {
        assert!(is_valid_email_syntax("o'neil+news@example.co"));
        assert!(!is_valid_email_syntax("Upper@example.com"));
        assert!(!is_valid_email_syntax("user@example.c"));
        assert!(!is_valid_email_syntax("user example@example.com"));
    }
}
