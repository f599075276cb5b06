//! Property checks for the pure scoring and selection helpers.

use lead_refinery::address::{address_score, select_best_address};
use lead_refinery::domain::get_domain_from_url;
use lead_refinery::email::is_valid_email_syntax;
use lead_refinery::models::LeadFeatures;
use lead_refinery::scoring::compute_score;
use proptest::prelude::*;
use std::collections::BTreeMap;

fn arb_features() -> impl Strategy<Value = LeadFeatures> {
    (
        prop::collection::vec(".{0,20}", 0..4),
        prop::collection::vec("[+0-9 ]{0,15}", 0..4),
        prop::collection::btree_map("[A-Za-z]{0,10}", "[a-z:/.,;| ]{0,60}", 0..8),
        any::<[bool; 4]>(),
        ".{0,40}",
        "(https?://)?[a-z.]{0,30}",
    )
        .prop_map(|(emails, phones, socials, flags, address, website)| LeadFeatures {
            emails,
            phones,
            socials: socials.into_iter().collect::<BTreeMap<_, _>>(),
            has_https: flags[0],
            has_contact_page: flags[1],
            has_about_page: flags[2],
            has_contact_form: flags[3],
            address,
            website,
        })
}

proptest! {
    #[test]
    fn score_stays_within_caps(features in arb_features()) {
        let score = compute_score(&features);
        prop_assert!(score.total <= 100);
        prop_assert_eq!(score.total, score.breakdown.sum());
        prop_assert!(score.breakdown.contact_completeness <= 30);
        prop_assert!(score.breakdown.website_quality <= 30);
        prop_assert!(score.breakdown.social_presence <= 20);
        prop_assert!(score.breakdown.business_profile <= 20);
    }

    #[test]
    fn score_is_deterministic(features in arb_features()) {
        prop_assert_eq!(compute_score(&features), compute_score(&features));
    }

    #[test]
    fn best_address_is_a_trimmed_candidate(candidates in prop::collection::vec(".{0,50}", 0..6)) {
        let best = select_best_address(&candidates);
        if best.is_empty() {
            prop_assert!(candidates.iter().all(|c| c.trim().is_empty()));
        } else {
            prop_assert!(candidates.iter().any(|c| c.trim() == best));
            let top = address_score(&best);
            prop_assert!(candidates.iter().all(|c| address_score(c.trim()) <= top));
        }
    }

    #[test]
    fn text_helpers_never_panic(input in ".{0,80}") {
        let _ = is_valid_email_syntax(&input);
        let _ = get_domain_from_url(&input);
    }
}
