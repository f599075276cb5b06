//! Region-aware phone number normalization.

use crate::config::FALLBACK_PHONE_REGION;
use phonenumber::Mode;
use phonenumber::country::Id as CountryId;
use std::collections::HashSet;
use std::str::FromStr;

/// E.164 allows at most 15 digits; anything under 4 cannot be a dialable number.
const POSSIBLE_DIGITS: std::ops::RangeInclusive<usize> = 4..=15;

/// Parses phone numbers with a default region and renders them as E.164.
#[derive(Debug, Clone, Copy)]
pub struct PhoneNormalizer {
    region: CountryId,
}

impl PhoneNormalizer {
    /// Builds a normalizer for a region code such as "US" or "id". Blank or
    /// unknown codes fall back to Indonesia.
    pub fn new(region_code: &str) -> Self {
        let code = region_code.trim().to_uppercase();
        let region = CountryId::from_str(&code)
            .or_else(|_| CountryId::from_str(FALLBACK_PHONE_REGION))
            .unwrap_or(CountryId::ID);
        if code != FALLBACK_PHONE_REGION && region == CountryId::ID {
            tracing::warn!(target: "phone_task",
                "Unknown phone region '{}', using {}", region_code, FALLBACK_PHONE_REGION
            );
        }
        Self { region }
    }

    pub fn region(&self) -> CountryId {
        self.region
    }

    /// Normalizes a single candidate. Returns `None` for blanks and for
    /// anything that does not parse into a possible, valid number.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let number = match phonenumber::parse(Some(self.region), raw) {
            Ok(number) => number,
            Err(e) => {
                tracing::debug!(target: "phone_task", "Failed to parse phone '{}': {:?}", raw, e);
                return None;
            }
        };

        let formatted = number.format().mode(Mode::E164).to_string();
        let digits = formatted.chars().filter(char::is_ascii_digit).count();
        if !POSSIBLE_DIGITS.contains(&digits) {
            tracing::debug!(target: "phone_task", "Impossible phone length: {}", raw);
            return None;
        }
        if !phonenumber::is_valid(&number) {
            tracing::debug!(target: "phone_task", "Invalid phone number: {}", raw);
            return None;
        }

        Some(formatted)
    }

    /// Combines the primary phone with the secondaries (primary first) and
    /// returns the distinct canonical numbers in first-seen order.
    pub fn normalize_all(&self, primary: Option<&str>, secondary: &[String]) -> Vec<String> {
        let candidates = primary
            .into_iter()
            .chain(secondary.iter().map(String::as_str))
            .filter(|raw| !raw.trim().is_empty());

        let mut seen = HashSet::new();
        let mut valid = Vec::new();
        for raw in candidates {
            if let Some(normalized) = self.normalize(raw) {
                if seen.insert(normalized.clone()) {
                    valid.push(normalized);
                }
            }
        }
        valid
    }
}

impl Default for PhoneNormalizer {
    fn default() -> Self {
        Self::new(FALLBACK_PHONE_REGION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupes_across_primary_and_secondary() {
        let normalizer = PhoneNormalizer::new("US");
        let phones = normalizer.normalize_all(
            Some(" (415) 555-1234 "),
            &["+14155551234".to_string(), "12345".to_string()],
        );
        assert_eq!(phones, vec!["+14155551234"]);
    }

    #[test]
    fn test_primary_comes_first() {
        let normalizer = PhoneNormalizer::new("US");
        let phones = normalizer.normalize_all(
            Some("+44 121 234 5678"),
            &["".to_string(), "(415) 555-1234".to_string()],
        );
        assert_eq!(phones, vec!["+441212345678", "+14155551234"]);
    }

    #[test]
    fn test_garbage_is_dropped() {
        let normalizer = PhoneNormalizer::new("US");
        assert_eq!(normalizer.normalize("call us!"), None);
        assert_eq!(normalizer.normalize("   "), None);
        assert_eq!(normalizer.normalize("12345"), None);
        assert!(normalizer.normalize_all(None, &[]).is_empty());
    }

    #[test]
    fn test_region_fallback() {
        assert_eq!(PhoneNormalizer::new("").region(), CountryId::ID);
        assert_eq!(PhoneNormalizer::new("zz-nowhere").region(), CountryId::ID);
        assert_eq!(PhoneNormalizer::new(" us ").region(), CountryId::US);
    }
}
