//! Ratcliff/Obershelp string similarity, plus the location-specific
//! wrapper used by the ocean lane matcher (§4.3).
//!
//! No crate in the retrieval pack brings in a string-similarity library,
//! so this is a direct implementation of the algorithm rather than a
//! dependency: find the longest common substring, then recurse on the
//! unmatched left and right remainders and sum the matched lengths.

/// Ratcliff/Obershelp similarity ratio in `[0.0, 1.0]`. Two empty strings
/// are defined as identical (ratio 1.0), matching `difflib.SequenceMatcher`.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_length(&a, &b) as f64 / total as f64
}

fn matched_length(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (a_start, b_start, len) = longest_common_substring(a, b);
    if len == 0 {
        return 0;
    }
    matched_length(&a[..a_start], &b[..b_start]) + len + matched_length(&a[a_start + len..], &b[b_start + len..])
}

/// Naive O(n·m·k) longest-common-substring scan; city/port strings are
/// short enough that this never matters in practice.
fn longest_common_substring(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0usize, 0usize, 0usize);
    for i in 0..a.len() {
        for j in 0..b.len() {
            let mut k = 0;
            while i + k < a.len() && j + k < b.len() && a[i + k] == b[j + k] {
                k += 1;
            }
            if k > best.2 {
                best = (i, j, k);
            }
        }
    }
    best
}

/// Strip 2-3 letter codes, parenthesized asides, and anything after the
/// first comma, leaving (hopefully) a bare city name for comparison.
pub fn extract_city_name(location: &str) -> String {
    let mut out = String::new();
    let mut chars = location.chars().peekable();
    let mut depth = 0i32;
    while let Some(c) = chars.next() {
        if c == '(' {
            depth += 1;
            continue;
        }
        if c == ')' {
            depth = (depth - 1).max(0);
            continue;
        }
        if c == ',' {
            break;
        }
        if depth == 0 {
            out.push(c);
        }
    }

    let words: Vec<&str> = out.split_whitespace().collect();
    words
        .into_iter()
        .filter(|w| !(w.len() <= 3 && w.chars().all(|c| c.is_ascii_alphabetic())))
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Fuzzy-match two free-text locations (§4.3 step 2): exact, then
/// containment, then city-name equality, then city-name similarity
/// (scaled by 0.8), then whole-string similarity — each gated by a 0.70
/// floor below the exact/containment tiers.
pub fn fuzzy_location_score(invoice_location: &str, rate_card_location: &str) -> f64 {
    if invoice_location.is_empty() || rate_card_location.is_empty() {
        return 0.0;
    }
    let inv = invoice_location.to_lowercase();
    let inv = inv.trim();
    let rate = rate_card_location.to_lowercase();
    let rate = rate.trim();

    if inv == rate {
        return 1.0;
    }
    if rate.contains(inv) || inv.contains(rate) {
        return 0.9;
    }

    let inv_city = extract_city_name(inv);
    let rate_city = extract_city_name(rate);
    if !inv_city.is_empty() && !rate_city.is_empty() {
        if inv_city == rate_city {
            return 0.85;
        }
        let city_similarity = similarity_ratio(&inv_city, &rate_city);
        if city_similarity > 0.7 {
            return city_similarity * 0.8;
        }
    }

    let overall = similarity_ratio(inv, rate);
    if overall > 0.7 {
        overall
    } else {
        0.0
    }
}
