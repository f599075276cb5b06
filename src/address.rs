//! Picks the most complete postal address among scraped candidates.

/// Segment count dominates: an address with more `,`/`;`-separated parts
/// always beats one with fewer, whatever their lengths.
pub fn address_score(address: &str) -> usize {
    let segments = address
        .split([',', ';'])
        .filter(|segment| !segment.is_empty())
        .count();
    segments * 1000 + address.chars().count()
}

/// Returns the highest-scoring trimmed candidate, or an empty string when
/// every candidate is blank. Ties keep the earlier candidate.
pub fn select_best_address(addresses: &[String]) -> String {
    let mut best = "";
    let mut best_score = 0;
    for raw in addresses {
        let address = raw.trim();
        if address.is_empty() {
            continue;
        }
        let score = address_score(address);
        if score > best_score {
            best_score = score;
            best = address;
        }
    }
    best.to_string()
}
