//! DHL Express calculators: international import/export, third-party,
//! and Australia domestic (component C3, §4.4).

pub mod au_domestic;
pub mod international;
pub mod third_party;

use rust_decimal::Decimal;

use crate::core::error::AuditError;
use crate::core::store::RateStore;
use crate::core::surcharge::{expected_charge, resolve_surcharge};
use crate::core::types::{AuditType, ChargeKind, Invoice, VarianceLineItem};

pub(crate) fn push_pass_through(items: &mut Vec<VarianceLineItem>, invoice: &Invoice, kind: ChargeKind) {
    let actual = invoice.actual_usd(kind).unwrap_or(Decimal::ZERO);
    items.push(VarianceLineItem {
        charge_kind: kind,
        actual_usd: actual,
        expected_usd: actual,
        variance_usd: Decimal::ZERO,
        variance_pct: Decimal::ZERO,
        audit_type: AuditType::PassThrough,
    });
}

pub(crate) fn percent(variance: Decimal, expected: Decimal) -> Decimal {
    if expected > Decimal::ZERO {
        (variance.abs() / expected) * Decimal::ONE_HUNDRED
    } else if variance > Decimal::ZERO {
        Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Every express flavor shares the same treatment for charges the
/// zone/weight freight formula doesn't cover: fuel/security/duty-tax/
/// customs pass through, and the remaining kinds (origin/destination
/// handling, pickup, delivery, "other") go through the service-surcharge
/// cascade (§4.6) keyed on the invoice's free-text description, falling
/// back to `additional_charge` when nothing in the catalog matches.
pub(crate) fn ancillary_line_items(invoice: &Invoice, store: &dyn RateStore) -> Result<Vec<VarianceLineItem>, AuditError> {
    let catalog = store.list_service_surcharges().map_err(AuditError::StoreUnavailable)?;
    let product_category = invoice.product_category();
    let weight = invoice.rating_weight_kg();

    let mut items = Vec::new();
    for kind in [ChargeKind::Fuel, ChargeKind::Security, ChargeKind::DutyTax, ChargeKind::Customs] {
        push_pass_through(&mut items, invoice, kind);
    }

    for kind in [ChargeKind::OriginHandling, ChargeKind::DestinationHandling, ChargeKind::Pickup, ChargeKind::Delivery, ChargeKind::Other] {
        let actual = invoice.actual_usd(kind)?;
        if actual == Decimal::ZERO {
            continue;
        }
        match resolve_surcharge(&catalog, &invoice.description, product_category) {
            Some(row) => {
                let expected = expected_charge(row, weight);
                items.push(VarianceLineItem {
                    charge_kind: kind,
                    actual_usd: actual,
                    expected_usd: expected,
                    variance_usd: actual - expected,
                    variance_pct: percent(actual - expected, expected),
                    audit_type: AuditType::RateCardComparison,
                });
            }
            None => items.push(VarianceLineItem {
                charge_kind: kind,
                actual_usd: actual,
                expected_usd: Decimal::ZERO,
                variance_usd: actual,
                variance_pct: Decimal::ONE_HUNDRED,
                audit_type: AuditType::AdditionalCharge,
            }),
        }
    }

    Ok(items)
}
