//! Service-surcharge resolution (part of C3, specified in §4.6).
//!
//! Matching a free-text invoice line description to a catalog row is a
//! four-step cascade, followed by a variant-selection walk for the small
//! set of merged service codes (overweight/oversize pieces and the like)
//! that carry more than one catalog row under one `original_service_code`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::store::{SurchargeChargeType, SurchargeRow};
use super::types::ProductCategory;

/// Canonical phrase → service code, used only when no catalog row's own
/// `service_name` matches (cascade step 4).
const FUZZY_SERVICE_MAPPINGS: &[(&str, &str)] = &[
    ("CHANGE OF BILLING", "KA"),
    ("OVER LENGTH", "KA"),
    ("OVERWEIGHT", "KA"),
    ("DIRECT SIGNATURE", "SF"),
    ("ADULT SIGNATURE", "SD"),
    ("SIGNATURE", "SF"),
    ("REMOTE AREA PICKUP", "OB"),
    ("REMOTE AREA DELIVERY", "OO"),
    ("REMOTE AREA", "RA"),
    ("BONDED STORAGE", "WK"),
    ("EXPORT DECLARATION", "WO"),
    ("NEUTRAL DELIVERY", "NN"),
    ("NON CONVEYABLE PIECE", "YO"),
    ("OVERWEIGHT PIECE", "YY"),
    ("OVERSIZE PIECE", "YB"),
    ("SATURDAY DELIVERY", "AA"),
    ("SATURDAY PICKUP", "AB"),
    ("RESIDENTIAL ADDRESS", "TK"),
    ("ADDRESS CORRECTION", "MA"),
];

/// Resolve the catalog service code implied by a free-text description,
/// via the exact/substring/reverse-substring/fuzzy-dictionary cascade.
/// Rows flagged `needs_variant_lookup` never win this lookup directly —
/// the caller re-resolves through [`select_variant`] using the code found
/// here as `original_service_code`.
fn match_service_code(catalog: &[SurchargeRow], description: &str) -> Option<String> {
    let upper = description.to_uppercase();
    let upper = upper.trim();

    if let Some(row) = catalog.iter().find(|r| !r.needs_variant_lookup && r.service_name.to_uppercase() == upper) {
        return Some(row.service_code.clone());
    }
    if let Some(row) = catalog
        .iter()
        .find(|r| !r.needs_variant_lookup && upper.contains(&r.service_name.to_uppercase()))
    {
        return Some(row.service_code.clone());
    }
    if let Some(row) = catalog
        .iter()
        .find(|r| !r.needs_variant_lookup && r.service_name.to_uppercase().contains(upper))
    {
        return Some(row.service_code.clone());
    }
    FUZZY_SERVICE_MAPPINGS
        .iter()
        .find(|(phrase, _)| upper.contains(phrase))
        .map(|(_, code)| code.to_string())
}

/// Among rows sharing `original_service_code == code`, prefer one whose
/// `products_applicable` matches `product_category`; otherwise fall back
/// to the "All Products" variant (`products_applicable = None`).
fn select_variant<'a>(catalog: &'a [SurchargeRow], code: &str, product_category: ProductCategory) -> Option<&'a SurchargeRow> {
    let variants: Vec<&SurchargeRow> = catalog
        .iter()
        .filter(|r| r.original_service_code.as_deref() == Some(code))
        .collect();

    if let Some(exact) = variants.iter().find(|r| r.products_applicable == Some(product_category)) {
        return Some(exact);
    }
    variants.into_iter().find(|r| r.products_applicable.is_none())
}

/// Resolve the catalog row that prices a surcharge line, per the full
/// §4.6 cascade (direct lookup, then variant walk for merged codes).
pub fn resolve_surcharge<'a>(catalog: &'a [SurchargeRow], description: &str, product_category: ProductCategory) -> Option<&'a SurchargeRow> {
    let code = match_service_code(catalog, description)?;

    if let Some(direct) = catalog.iter().find(|r| !r.needs_variant_lookup && r.service_code == code) {
        return Some(direct);
    }
    select_variant(catalog, &code, product_category)
}

/// `max(18.00, weight_kg × 0.35)` — bonded storage's built-in formula.
/// Not a catalog row; the resolution cascade recognizes it by
/// [`SurchargeChargeType::BondedStorageFormula`] on the matched row.
pub fn bonded_storage_charge(weight_kg: Decimal) -> Decimal {
    (weight_kg * dec!(0.35)).max(dec!(18.00))
}

/// Expected amount for a matched catalog row, given the line's own weight
/// (already resolved via cross-line AWB borrowing if it was zero).
pub fn expected_charge(row: &SurchargeRow, weight_kg: Decimal) -> Decimal {
    match row.charge_type {
        SurchargeChargeType::Flat => row.rate,
        SurchargeChargeType::PerKg => {
            let calculated = row.rate * weight_kg;
            match row.minimum_charge {
                Some(min) if calculated < min => min,
                _ => calculated,
            }
        }
        SurchargeChargeType::PerShipmentWeightGated { threshold_kg } => {
            if weight_kg > threshold_kg {
                row.rate
            } else {
                Decimal::ZERO
            }
        }
        SurchargeChargeType::BondedStorageFormula => bonded_storage_charge(weight_kg),
    }
}
