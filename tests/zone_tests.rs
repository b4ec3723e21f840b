//! Zone resolution invariant (spec §8 item 8): idempotent and case-insensitive.

use rateaudit::core::zone::{au_domestic_zone, extract_country};

#[test]
fn country_extraction_is_idempotent() {
    let address = "221B Baker St; London; GB";
    let first = extract_country(address);
    let second = extract_country(address);
    assert_eq!(first, second);
}

#[test]
fn country_extraction_is_case_insensitive() {
    let upper = extract_country("Via Roma 1, Milano, ITALY");
    let lower = extract_country("via roma 1, milano, italy");
    let mixed = extract_country("Via Roma 1, Milano, Italy");
    assert_eq!(upper, lower);
    assert_eq!(lower, mixed);
    assert_eq!(upper.as_deref(), Some("IT"));
}

#[test]
fn au_zone_is_idempotent_and_case_insensitive() {
    let a = au_domestic_zone("10 George St, Sydney NSW 2000");
    let b = au_domestic_zone("10 george st, sydney nsw 2000");
    assert_eq!(a, b);
    assert_eq!(a, 3);
}

#[test]
fn bare_two_letter_code_takes_priority_over_country_name() {
    // The address mentions "Germany" in the street name but ends in the FR code.
    assert_eq!(extract_country("Rue de Germany 5; Paris; FR"), Some("FR".into()));
}
