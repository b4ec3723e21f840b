use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::core::error::AuditError;
use crate::core::store::{ExpressServiceType, RateSection, RateStore};
use crate::core::types::{AuditResult, AuditResultDetails, AuditType, ChargeKind, ConsideredRateCard, Invoice, VarianceLineItem};
use crate::core::variance;
use crate::core::zone::extract_country;

use super::{ancillary_line_items, percent};

/// Documents if the description says so and doesn't also say "NONDOC".
fn detect_section(description: &str) -> RateSection {
    let upper = description.to_uppercase();
    if upper.contains("DOC") && !upper.contains("NONDOC") {
        RateSection::Documents
    } else {
        RateSection::NonDocuments
    }
}

/// Audit a DHL Express international (import or export) invoice: resolve
/// the country-pair zone, then the weight-banded rate within it.
pub fn audit(invoice: &Invoice, store: &dyn RateStore, service_type: ExpressServiceType) -> Result<AuditResult, AuditError> {
    let origin_country = extract_country(&invoice.origin).ok_or_else(|| AuditError::ZoneUnknown {
        field: "origin".into(),
        reason: format!("could not extract a country code from '{}'", invoice.origin),
    })?;
    let dest_country = extract_country(&invoice.destination).ok_or_else(|| AuditError::ZoneUnknown {
        field: "destination".into(),
        reason: format!("could not extract a country code from '{}'", invoice.destination),
    })?;

    let zone = match store.lookup_express_zone(&origin_country, &dest_country).map_err(AuditError::StoreUnavailable)? {
        Some(z) => z,
        None => return Ok(AuditResult::no_rate_card(invoice.invoice_no.clone())),
    };

    let section = detect_section(&invoice.description);
    let weight = invoice.rating_weight_kg();

    let freight_expected = if weight <= dec!(30) {
        if let Some(row) = store
            .lookup_express_rate(service_type, section, &zone, weight)
            .map_err(AuditError::StoreUnavailable)?
        {
            Some(row.rate)
        } else if let Some(row) = store
            .lookup_express_multiplier(service_type, section, &zone, weight)
            .map_err(AuditError::StoreUnavailable)?
        {
            Some(row.rate * weight)
        } else {
            None
        }
    } else {
        let base = store
            .lookup_express_rate(service_type, section, &zone, dec!(30))
            .map_err(AuditError::StoreUnavailable)?;
        let adder = store
            .lookup_express_multiplier(service_type, section, &zone, weight)
            .map_err(AuditError::StoreUnavailable)?;
        match (base, adder) {
            (Some(base), Some(adder)) => Some(base.rate + adder.rate * (weight - dec!(30)) / dec!(0.5)),
            _ => None,
        }
    };

    let Some(freight_expected) = freight_expected else {
        return Ok(AuditResult::no_rate_card(invoice.invoice_no.clone()));
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
        lane_description: Some(format!("{} → {} (zone {})", origin_country, dest_country, zone)),
        service: Some(format!("{:?}", service_type)),
        audit_status: classification.status,
        total_expected: total_expected_usd,
        total_actual: total_actual_usd,
        total_variance: classification.total_variance_usd,
        variances: line_items.clone(),
        calculation_details: serde_json::json!({ "zone": zone, "weight_kg": weight, "section": format!("{:?}", section) }),
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
