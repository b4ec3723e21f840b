use rust_decimal::Decimal;

use crate::core::error::AuditError;
use crate::core::store::RateStore;
use crate::core::types::{AuditResult, AuditResultDetails, AuditType, ChargeKind, ConsideredRateCard, Invoice, VarianceLineItem};
use crate::core::variance;
use crate::core::zone::extract_country;

use super::{ancillary_line_items, percent};

/// Audit a DHL Express third-party-billed invoice: each address resolves
/// to a zone, the zone pair resolves to a rate-zone letter via the
/// matrix, and the rate zone plus weight resolve to a flat rate.
pub fn audit(invoice: &Invoice, store: &dyn RateStore) -> Result<AuditResult, AuditError> {
    let origin_country = extract_country(&invoice.origin).ok_or_else(|| AuditError::ZoneUnknown {
        field: "origin".into(),
        reason: format!("could not extract a country code from '{}'", invoice.origin),
    })?;
    let dest_country = extract_country(&invoice.destination).ok_or_else(|| AuditError::ZoneUnknown {
        field: "destination".into(),
        reason: format!("could not extract a country code from '{}'", invoice.destination),
    })?;

    let origin_zone = match store.lookup_third_party_zone(&origin_country).map_err(AuditError::StoreUnavailable)? {
        Some(z) => z,
        None => return Ok(AuditResult::no_rate_card(invoice.invoice_no.clone())),
    };
    let dest_zone = match store.lookup_third_party_zone(&dest_country).map_err(AuditError::StoreUnavailable)? {
        Some(z) => z,
        None => return Ok(AuditResult::no_rate_card(invoice.invoice_no.clone())),
    };

    let rate_zone = match store.lookup_third_party_matrix(&origin_zone, &dest_zone).map_err(AuditError::StoreUnavailable)? {
        Some(r) => r,
        None => return Ok(AuditResult::no_rate_card(invoice.invoice_no.clone())),
    };

    let weight = invoice.rating_weight_kg();
    let row = match store
        .lookup_third_party_weight_rate(weight, &rate_zone)
        .map_err(AuditError::StoreUnavailable)?
    {
        Some(r) => r,
        None => return Ok(AuditResult::no_rate_card(invoice.invoice_no.clone())),
    };

    let freight_expected = row.rate;
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
        lane_description: Some(format!("{} → {} (rate zone {})", origin_country, dest_country, rate_zone)),
        service: Some("Third Party".into()),
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
    use crate::core::store::{InMemoryRateStore, ThirdPartyRateRow};
    use crate::core::types::{Mode, ServiceType};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn store() -> InMemoryRateStore {
        InMemoryRateStore {
            third_party_zones: vec![("DE".into(), "3".into()), ("US".into(), "7".into())],
            third_party_matrix: vec![(("3".into(), "7".into()), "B".into())],
            third_party_rates: vec![(
                "B".into(),
                ThirdPartyRateRow { weight_from: dec!(0), weight_to: dec!(50), rate: dec!(80) },
            )],
            ..Default::default()
        }
    }

    fn invoice() -> Invoice {
        let mut charges = BTreeMap::new();
        charges.insert(ChargeKind::Freight, dec!(80));
        Invoice {
            invoice_no: "INV-3P-1".into(),
            mode: Mode::Express3p,
            origin: "Berlin; DE".into(),
            destination: "New York; US".into(),
            weight_kg: dec!(10),
            chargeable_weight_kg: None,
            volume_m3: None,
            service_type: ServiceType::Export,
            currency: "USD".into(),
            exchange_rate_to_usd: None,
            actual_charges: charges,
            description: "THIRD PARTY shipment".into(),
            awb: None,
            quote_id: None,
        }
    }

    #[test]
    fn matrix_and_weight_rate_resolve_to_exact_match() {
        let result = audit(&invoice(), &store()).unwrap();
        assert_eq!(result.line_items[0].expected_usd, dec!(80));
        assert_eq!(result.status, crate::core::types::AuditStatus::Approved);
    }

    #[test]
    fn missing_matrix_entry_is_no_rate_card() {
        let mut s = store();
        s.third_party_matrix.clear();
        let result = audit(&invoice(), &s).unwrap();
        assert_eq!(result.status, crate::core::types::AuditStatus::NoRateCard);
    }
}
