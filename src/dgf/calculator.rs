//! DGF spot-quote calculator (component C3, §4.4).
//!
//! DGF doesn't negotiate carrier rate cards; each lane gets a one-off spot
//! quote instead, and that quote is the audit baseline. Freight tolerance
//! is 5%, handling-fee tolerance is 10% — looser, since a spot quote is a
//! point estimate rather than a contracted rate.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::core::error::AuditError;
use crate::core::store::{RateStore, SpotQuote};
use crate::core::types::{AuditResult, AuditResultDetails, AuditType, ChargeKind, ConsideredRateCard, Invoice, VarianceLineItem};
use crate::core::variance;

fn to_usd(amount: Decimal, quote: &SpotQuote) -> Decimal {
    if quote.quoted_currency.eq_ignore_ascii_case("USD") {
        amount
    } else {
        amount * quote.quote_fx_rate
    }
}

/// Within its own tolerance, a DGF line is considered a match and reports
/// no variance at all — tighter than the 5%/15% the general classifier
/// applies everywhere else, since a spot quote is a point estimate rather
/// than a negotiated rate.
fn line_item(charge_kind: ChargeKind, actual_usd: Decimal, expected_usd: Decimal, tolerance_pct: Decimal) -> VarianceLineItem {
    let raw_variance = actual_usd - expected_usd;
    let raw_pct = if expected_usd > Decimal::ZERO {
        (raw_variance.abs() / expected_usd) * Decimal::ONE_HUNDRED
    } else if raw_variance > Decimal::ZERO {
        Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    if raw_pct <= tolerance_pct {
        return VarianceLineItem {
            charge_kind,
            actual_usd,
            expected_usd: actual_usd,
            variance_usd: Decimal::ZERO,
            variance_pct: Decimal::ZERO,
            audit_type: AuditType::RateCardComparison,
        };
    }

    VarianceLineItem {
        charge_kind,
        actual_usd,
        expected_usd,
        variance_usd: raw_variance,
        variance_pct: raw_pct,
        audit_type: AuditType::RateCardComparison,
    }
}

/// Audit a DGF air or sea invoice against its matching spot quote.
pub fn audit(invoice: &Invoice, store: &dyn RateStore) -> Result<AuditResult, AuditError> {
    let Some(quote_id) = invoice.quote_id.as_deref() else {
        return Ok(AuditResult::no_rate_card(invoice.invoice_no.clone()));
    };

    let Some(quote) = store.lookup_dgf_quote(quote_id).map_err(AuditError::StoreUnavailable)? else {
        return Ok(AuditResult::no_rate_card(invoice.invoice_no.clone()));
    };

    let freight_expected = if let Some(rate_per_kg) = quote.rate_per_kg {
        to_usd(rate_per_kg * invoice.rating_weight_kg(), &quote)
    } else if let Some(rate_per_cbm) = quote.rate_per_cbm {
        let volume = invoice.volume_m3.unwrap_or(Decimal::ZERO);
        to_usd(rate_per_cbm * volume, &quote)
    } else {
        return Ok(AuditResult::no_rate_card(invoice.invoice_no.clone()));
    };

    let actual_freight = invoice.actual_usd(ChargeKind::Freight)?;
    let mut line_items = vec![line_item(ChargeKind::Freight, actual_freight, freight_expected, dec!(5))];

    let actual_handling = invoice.actual_usd(ChargeKind::OriginHandling)? + invoice.actual_usd(ChargeKind::DestinationHandling)?;
    let expected_handling = to_usd(quote.handling_fees, &quote);
    line_items.push(line_item(ChargeKind::OriginHandling, actual_handling, expected_handling, dec!(10)));

    for kind in [ChargeKind::Fuel, ChargeKind::Security, ChargeKind::Pickup, ChargeKind::Delivery, ChargeKind::Customs, ChargeKind::DutyTax, ChargeKind::Other] {
        let actual = invoice.actual_usd(kind)?;
        line_items.push(VarianceLineItem {
            charge_kind: kind,
            actual_usd: actual,
            expected_usd: actual,
            variance_usd: Decimal::ZERO,
            variance_pct: Decimal::ZERO,
            audit_type: AuditType::PassThrough,
        });
    }

    let classification = variance::classify(&line_items);
    let total_actual_usd = invoice.total_actual_usd()?;
    let total_expected_usd: Decimal = line_items.iter().map(|l| l.expected_usd).sum();

    let considered = ConsideredRateCard {
        rate_card_id: Some(quote.quote_id.clone()),
        lane_description: None,
        service: Some(format!("{:?}", quote.mode)),
        audit_status: classification.status,
        total_expected: total_expected_usd,
        total_actual: total_actual_usd,
        total_variance: classification.total_variance_usd,
        variances: line_items.clone(),
        calculation_details: serde_json::json!({ "quote_id": quote.quote_id }),
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
        best_match_identifier: Some(quote.quote_id.clone()),
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
    use std::collections::BTreeMap;

    fn invoice(mode: Mode, weight: Decimal, volume: Option<Decimal>) -> Invoice {
        let mut charges = BTreeMap::new();
        charges.insert(ChargeKind::Freight, dec!(500));
        Invoice {
            invoice_no: "INV-DGF-1".into(),
            mode,
            origin: "Shanghai".into(),
            destination: "Rotterdam".into(),
            weight_kg: weight,
            chargeable_weight_kg: None,
            volume_m3: volume,
            service_type: ServiceType::Import,
            currency: "USD".into(),
            exchange_rate_to_usd: None,
            actual_charges: charges,
            description: "DGF spot shipment".into(),
            awb: None,
            quote_id: Some("Q-1".into()),
        }
    }

    #[test]
    fn air_quote_freight_within_tolerance_is_approved() {
        let store = InMemoryRateStore {
            spot_quotes: vec![SpotQuote {
                quote_id: "Q-1".into(),
                mode: Mode::DgfAir,
                rate_per_kg: Some(dec!(5)),
                rate_per_cbm: None,
                handling_fees: dec!(0),
                quoted_currency: "USD".into(),
                quote_fx_rate: dec!(1),
            }],
            ..Default::default()
        };
        let result = audit(&invoice(Mode::DgfAir, dec!(100), None), &store).unwrap();
        assert_eq!(result.line_items[0].expected_usd, dec!(500));
        assert_eq!(result.status, crate::core::types::AuditStatus::Approved);
    }

    #[test]
    fn sea_quote_uses_volume_and_rate_per_cbm() {
        let store = InMemoryRateStore {
            spot_quotes: vec![SpotQuote {
                quote_id: "Q-1".into(),
                mode: Mode::DgfSea,
                rate_per_kg: None,
                rate_per_cbm: Some(dec!(50)),
                handling_fees: dec!(0),
                quoted_currency: "USD".into(),
                quote_fx_rate: dec!(1),
            }],
            ..Default::default()
        };
        let result = audit(&invoice(Mode::DgfSea, dec!(0), Some(dec!(10))), &store).unwrap();
        assert_eq!(result.line_items[0].expected_usd, dec!(500));
    }

    #[test]
    fn missing_quote_is_no_rate_card() {
        let store = InMemoryRateStore::default();
        let result = audit(&invoice(Mode::DgfAir, dec!(100), None), &store).unwrap();
        assert_eq!(result.status, crate::core::types::AuditStatus::NoRateCard);
    }
}
