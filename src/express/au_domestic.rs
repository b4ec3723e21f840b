use rust_decimal::Decimal;

use crate::core::error::AuditError;
use crate::core::store::RateStore;
use crate::core::types::{AuditResult, AuditResultDetails, AuditType, ChargeKind, ConsideredRateCard, Invoice, VarianceLineItem};
use crate::core::variance;
use crate::core::zone::au_domestic_zone;

use super::{ancillary_line_items, percent};

/// Pick the row whose weight band is closest to `weight_kg`, breaking ties
/// toward the lower band. The AU domestic table is sparse enough that an
/// exact weight match is the exception rather than the rule.
fn nearest_weight_rate(rows: &[(Decimal, Decimal)], weight_kg: Decimal) -> Option<Decimal> {
    rows.iter()
        .min_by_key(|(band_weight, _)| (band_weight - weight_kg).abs())
        .map(|(_, rate)| *rate)
}

/// Audit a DHL Express Australia domestic invoice: both addresses resolve
/// to a rate zone (1-5), the zone pair resolves to a rate-zone letter via
/// the matrix, and the nearest weight band in that rate zone gives the
/// expected flat rate.
pub fn audit(invoice: &Invoice, store: &dyn RateStore) -> Result<AuditResult, AuditError> {
    let origin_zone = au_domestic_zone(&invoice.origin);
    let dest_zone = au_domestic_zone(&invoice.destination);

    let rate_zone = match store.lookup_au_domestic_matrix(origin_zone, dest_zone).map_err(AuditError::StoreUnavailable)? {
        Some(r) => r,
        None => return Ok(AuditResult::no_rate_card(invoice.invoice_no.clone())),
    };

    let rows = store.list_au_domestic_rates(&rate_zone).map_err(AuditError::StoreUnavailable)?;
    let weight = invoice.rating_weight_kg();
    let freight_expected = match nearest_weight_rate(&rows, weight) {
        Some(r) => r,
        None => return Ok(AuditResult::no_rate_card(invoice.invoice_no.clone())),
    };

    let actual_freight = invoice.actual_usd(ChargeKind::Freight)?;
    let mut line_items = vec![VarianceLineItem {
        charge_kind: ChargeKind::Freight,
        actual_usd: actual_freight,
        expected_usd: freight_expected,
        variance_usd: actual_freight - freight_expected,
        variance_pct: percent(actual_freight - freight_expected, freight_expected),
        audit_type: AuditType::RateCardComparison,
    }];
    line_items.extend(ancillary_line_items(invoice, store)?);

    let classification = variance::classify(&line_items);
    let total_actual_usd = invoice.total_actual_usd()?;
    let total_expected_usd: Decimal = line_items.iter().map(|l| l.expected_usd).sum();

    let considered = ConsideredRateCard {
        rate_card_id: None,
        lane_description: Some(format!("zone {} → zone {} (rate zone {})", origin_zone, dest_zone, rate_zone)),
        service: Some("AU Domestic".into()),
        audit_status: classification.status,
        total_expected: total_expected_usd,
        total_actual: total_actual_usd,
        total_variance: classification.total_variance_usd,
        variances: line_items.clone(),
        calculation_details: serde_json::json!({
            "origin_zone": origin_zone,
            "dest_zone": dest_zone,
            "rate_zone": rate_zone,
            "weight_kg": weight,
        }),
        status_reason: Some(format!("Variance: {:.2}%", classification.variance_percent)),
    };

    Ok(AuditResult {
        invoice_no: invoice.invoice_no.clone(),
        status: classification.status,
        total_invoice_amount_usd: total_actual_usd,
        total_expected_amount_usd: total_expected_usd,
        total_variance_usd: total_actual_usd - total_expected_usd,
        variance_percent: classification.variance_percent,
        rate_cards_checked: 1,
        best_match_identifier: None,
        line_items,
        details: AuditResultDetails {
            invoice_details: serde_json::json!({ "invoice_no": invoice.invoice_no }),
            audit_results: vec![considered],
            warnings: Vec::new(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::InMemoryRateStore;
    use crate::core::types::{Mode, ServiceType};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn store() -> InMemoryRateStore {
        InMemoryRateStore {
            au_domestic_matrix: vec![((1, 3), "A".into())],
            au_domestic_rates: vec![("A".into(), dec!(5), dec!(20)), ("A".into(), dec!(10), dec!(30))],
            ..Default::default()
        }
    }

    fn invoice(weight: Decimal) -> Invoice {
        let mut charges = BTreeMap::new();
        charges.insert(ChargeKind::Freight, dec!(30));
        Invoice {
            invoice_no: "INV-AU-1".into(),
            mode: Mode::AuDomestic,
            origin: "Melbourne, VIC".into(),
            destination: "Sydney, NSW".into(),
            weight_kg: weight,
            chargeable_weight_kg: None,
            volume_m3: None,
            service_type: ServiceType::Domestic,
            currency: "USD".into(),
            exchange_rate_to_usd: None,
            actual_charges: charges,
            description: "AU domestic parcel".into(),
            awb: None,
            quote_id: None,
        }
    }

    #[test]
    fn nearest_weight_band_wins_over_exact_when_absent() {
        let result = audit(&invoice(dec!(9)), &store()).unwrap();
        assert_eq!(result.line_items[0].expected_usd, dec!(30));
    }

    #[test]
    fn exact_weight_band_matches_directly() {
        let result = audit(&invoice(dec!(5)), &store()).unwrap();
        assert_eq!(result.line_items[0].expected_usd, dec!(20));
    }

    #[test]
    fn missing_rate_zone_is_no_rate_card() {
        let mut s = store();
        s.au_domestic_matrix.clear();
        let result = audit(&invoice(dec!(5)), &s).unwrap();
        assert_eq!(result.status, crate::core::types::AuditStatus::NoRateCard);
    }
}
