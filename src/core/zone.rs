//! Address → zone resolution (component C1).
//!
//! Addresses arrive as free text (`"123 Example St; Melbourne; VIC; 3000; AU"`)
//! rather than structured fields, so country and AU-domestic-zone extraction
//! both work by progressively looser substring scans over the uppercased text.

/// Fixed country-name → ISO code fallback table, used when an address has
/// no bare two-letter code of its own.
const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("ITALY", "IT"),
    ("ITALIA", "IT"),
    ("GERMANY", "DE"),
    ("DEUTSCHLAND", "DE"),
    ("AUSTRALIA", "AU"),
    ("NETHERLANDS", "NL"),
    ("HOLLAND", "NL"),
    ("NEDERLAND", "NL"),
    ("UNITED STATES", "US"),
    ("USA", "US"),
    ("UNITED KINGDOM", "GB"),
    ("UK", "GB"),
    ("FRANCE", "FR"),
    ("SPAIN", "ES"),
    ("CHINA", "CN"),
];

/// Extract an ISO country code from a free-text address.
///
/// Scans `;`-separated segments from the end for a bare two-letter
/// uppercase code first (the common case — the code is the last field),
/// then falls back to matching a full country name anywhere in the text.
pub fn extract_country(address: &str) -> Option<String> {
    if address.trim().is_empty() {
        return None;
    }

    for part in address.split(';').rev() {
        let part = part.trim();
        if part.len() == 2 && part.chars().all(|c| c.is_ascii_uppercase()) {
            return Some(part.to_string());
        }
    }

    let upper = address.to_uppercase();
    COUNTRY_NAMES
        .iter()
        .find(|(name, _)| upper.contains(name))
        .map(|(_, code)| code.to_string())
}

/// Major-city / state → rate zone table for DHL Express AU domestic lanes.
/// City codes and names take priority over state names/codes since a
/// state can span several rate zones.
const AU_ZONE_TABLE: &[(&str, u8)] = &[
    ("MELBOURNE", 1),
    ("MEL", 1),
    ("BRISBANE", 2),
    ("BNE", 2),
    ("SYDNEY", 3),
    ("SYD", 3),
    ("CANBERRA", 4),
    ("CBR", 4),
    ("ADELAIDE", 5),
    ("ADL", 5),
    ("PERTH", 5),
    ("PER", 5),
    ("HOBART", 5),
    ("HBA", 5),
    ("DARWIN", 5),
    ("DRW", 5),
    ("VIC", 1),
    ("VICTORIA", 1),
    ("QLD", 2),
    ("QUEENSLAND", 2),
    ("NSW", 3),
    ("NEW SOUTH WALES", 3),
    ("ACT", 4),
    ("SA", 5),
    ("SOUTH AUSTRALIA", 5),
    ("WA", 5),
    ("WESTERN AUSTRALIA", 5),
    ("TAS", 5),
    ("TASMANIA", 5),
    ("NT", 5),
    ("NORTHERN TERRITORY", 5),
];

/// Full state names are matched first — they're the least ambiguous and
/// avoid the short-code false positives that come from scanning city/code
/// substrings inside a longer state name.
const FULL_STATE_NAMES: &[&str] = &[
    "SOUTH AUSTRALIA",
    "WESTERN AUSTRALIA",
    "NEW SOUTH WALES",
    "NORTHERN TERRITORY",
    "QUEENSLAND",
    "TASMANIA",
];

const CITY_NAMES: &[&str] = &[
    "MELBOURNE", "BRISBANE", "SYDNEY", "CANBERRA", "ADELAIDE", "PERTH", "HOBART", "DARWIN",
];

const CITY_CODES: &[&str] = &["MEL", "BNE", "SYD", "CBR", "ADL", "PER", "HBA", "DRW"];

const SHORT_STATE_CODES: &[&str] = &["VIC", "VICTORIA", "QLD", "NSW", "ACT", "SA", "WA", "TAS", "NT"];

fn zone_for(key: &str) -> u8 {
    AU_ZONE_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, z)| *z)
        .unwrap_or(5)
}

/// Resolve the DHL Express AU-domestic rate zone (1-5) implied by an
/// address. Falls through full state name → city name → city code → short
/// state code, defaulting to zone 5 ("Rest of Australia") for anything
/// that matches none of them.
pub fn au_domestic_zone(address: &str) -> u8 {
    if address.trim().is_empty() {
        return 5;
    }
    let upper = address.to_uppercase();

    if let Some(state) = FULL_STATE_NAMES.iter().find(|s| upper.contains(**s)) {
        return zone_for(state);
    }
    if let Some(city) = CITY_NAMES.iter().find(|c| upper.contains(**c)) {
        return zone_for(city);
    }
    if let Some(code) = CITY_CODES.iter().find(|c| upper.contains(**c)) {
        return zone_for(code);
    }
    if let Some(state) = SHORT_STATE_CODES.iter().find(|s| upper.contains(**s)) {
        return zone_for(state);
    }
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_trailing_country_code() {
        assert_eq!(extract_country("123 Main St; Melbourne; VIC; 3000; AU").as_deref(), Some("AU"));
    }

    #[test]
    fn extracts_country_name_fallback() {
        assert_eq!(extract_country("Via Roma 1, Milano, Italy").as_deref(), Some("IT"));
    }

    #[test]
    fn unresolvable_address_returns_none() {
        assert_eq!(extract_country("a field with no signal"), None);
    }

    #[test]
    fn au_zone_prefers_city_over_state_code() {
        // "NSW" appears nowhere here; Sydney should resolve directly to zone 3.
        assert_eq!(au_domestic_zone("10 George St, Sydney NSW 2000"), 3);
    }

    #[test]
    fn au_zone_defaults_to_rest_of_australia() {
        assert_eq!(au_domestic_zone("Somewhere unlisted, AU"), 5);
    }

    #[test]
    fn au_zone_full_state_name_wins_over_short_code_substring() {
        // "SA" is a substring check risk; a full state name should still resolve correctly.
        assert_eq!(au_domestic_zone("Adelaide, South Australia"), 5);
    }
}
