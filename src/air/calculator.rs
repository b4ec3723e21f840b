use rust_decimal::Decimal;

use crate::core::error::AuditError;
use crate::core::store::{port_alias, AirLane, RateStore};
use crate::core::types::{AuditResult, AuditResultDetails, AuditType, ChargeKind, ConsideredRateCard, Invoice, VarianceLineItem};
use crate::core::variance;

/// Fetch candidate air lanes, retrying with the `CNPVG ↔ CNSHA`-style
/// alias on either endpoint when the direct lookup is empty.
fn candidate_lanes(store: &dyn RateStore, origin_port: &str, dest_port: &str) -> Result<Vec<AirLane>, AuditError> {
    let direct = store.find_air_lanes(origin_port, dest_port).map_err(AuditError::StoreUnavailable)?;
    if !direct.is_empty() {
        return Ok(direct);
    }

    let mut found = Vec::new();
    if let Some(alias) = port_alias(origin_port) {
        found = store.find_air_lanes(alias, dest_port).map_err(AuditError::StoreUnavailable)?;
    }
    if found.is_empty() {
        if let Some(alias) = port_alias(dest_port) {
            found = store.find_air_lanes(origin_port, alias).map_err(AuditError::StoreUnavailable)?;
        }
    }
    if found.is_empty() {
        if let (Some(o_alias), Some(d_alias)) = (port_alias(origin_port), port_alias(dest_port)) {
            found = store.find_air_lanes(o_alias, d_alias).map_err(AuditError::StoreUnavailable)?;
        }
    }
    Ok(found)
}

/// Price one invoice against one air lane, producing every line item.
/// Freight, origin, destination, security, and delivery are rate-card
/// comparisons; fuel, duty/tax, customs, pickup, and other pass through.
fn price_lane(invoice: &Invoice, lane: &AirLane) -> ConsideredRateCard {
    let weight = invoice.rating_weight_kg();
    let mut line_items = Vec::new();

    let bracket_rate = lane.bracket_rate(weight);
    push_comparison(&mut line_items, invoice, ChargeKind::Freight, (weight * bracket_rate).max(lane.minimum_charge));

    let ptd = (weight * lane.ptd_freight_charge).max(lane.ptd_min_charge);
    push_comparison(&mut line_items, invoice, ChargeKind::OriginHandling, ptd);
    push_comparison(&mut line_items, invoice, ChargeKind::Delivery, ptd);

    push_comparison(&mut line_items, invoice, ChargeKind::DestinationHandling, lane.destination_min_charge);
    push_comparison(&mut line_items, invoice, ChargeKind::Security, lane.security_surcharge);

    for kind in [ChargeKind::Fuel, ChargeKind::DutyTax, ChargeKind::Customs, ChargeKind::Pickup, ChargeKind::Other] {
        push_pass_through(&mut line_items, invoice, kind);
    }

    let expected_total: Decimal = line_items
        .iter()
        .filter(|l| l.audit_type == AuditType::RateCardComparison)
        .map(|l| l.expected_usd)
        .sum();
    let actual_total: Decimal = line_items.iter().map(|l| l.actual_usd).sum();
    let classification = variance::classify(&line_items);

    ConsideredRateCard {
        rate_card_id: Some(lane.rate_card.id.clone()),
        lane_description: Some(format!("{} → {}", lane.origin_port, lane.destination_port)),
        service: Some(lane.service.clone()),
        audit_status: classification.status,
        total_expected: expected_total,
        total_actual: actual_total,
        total_variance: classification.total_variance_usd,
        variances: line_items,
        calculation_details: serde_json::json!({
            "weight_kg": weight,
            "bracket_rate": bracket_rate,
            "ptd_freight_charge": lane.ptd_freight_charge,
        }),
        status_reason: Some(format!("Variance: {:.2}%", classification.variance_percent)),
    }
}

fn push_comparison(items: &mut Vec<VarianceLineItem>, invoice: &Invoice, kind: ChargeKind, expected: Decimal) {
    let actual = invoice.actual_usd(kind).unwrap_or(Decimal::ZERO);
    items.push(VarianceLineItem {
        charge_kind: kind,
        actual_usd: actual,
        expected_usd: expected,
        variance_usd: actual - expected,
        variance_pct: percent(actual - expected, expected),
        audit_type: AuditType::RateCardComparison,
    });
}

fn push_pass_through(items: &mut Vec<VarianceLineItem>, invoice: &Invoice, kind: ChargeKind) {
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

fn percent(variance: Decimal, expected: Decimal) -> Decimal {
    if expected > Decimal::ZERO {
        (variance.abs() / expected) * Decimal::ONE_HUNDRED
    } else if variance > Decimal::ZERO {
        Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Audit one air freight invoice.
///
/// When more than one lane matches (typically a Standard and an Expedite
/// service on the same route), every lane is priced and the one with the
/// smallest absolute auditable variance wins — the invoice is not assumed
/// to pin a service.
pub fn audit(invoice: &Invoice, store: &dyn RateStore) -> Result<AuditResult, AuditError> {
    let lanes = candidate_lanes(store, &invoice.origin, &invoice.destination)?;
    if lanes.is_empty() {
        return Ok(AuditResult::no_rate_card(invoice.invoice_no.clone()));
    }

    let mut considered: Vec<ConsideredRateCard> = lanes.iter().map(|lane| price_lane(invoice, lane)).collect();
    considered.sort_by_key(|c| c.total_variance.abs());
    let best = considered.first().cloned().expect("checked non-empty above");

    let total_actual_usd = invoice.total_actual_usd()?;
    let total_expected_usd: Decimal = best.variances.iter().map(|l| l.expected_usd).sum();

    Ok(AuditResult {
        invoice_no: invoice.invoice_no.clone(),
        status: best.audit_status,
        total_invoice_amount_usd: total_actual_usd,
        total_expected_amount_usd: total_expected_usd,
        total_variance_usd: total_actual_usd - total_expected_usd,
        variance_percent: variance::classify(&best.variances).variance_percent,
        rate_cards_checked: lanes.len() as u32,
        best_match_identifier: best.rate_card_id.clone(),
        line_items: best.variances.clone(),
        details: AuditResultDetails {
            invoice_details: serde_json::json!({ "invoice_no": invoice.invoice_no, "weight_kg": invoice.rating_weight_kg() }),
            audit_results: considered,
            warnings: Vec::new(),
        },
    })
}
