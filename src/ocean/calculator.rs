use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::core::error::AuditError;
use crate::core::store::{ContainerSize, OceanChargeRate, OceanLane, RateStore};
use crate::core::types::{AuditResult, AuditResultDetails, AuditType, ChargeKind, ConsideredRateCard, Invoice, ServiceType, VarianceLineItem};
use crate::core::variance;

use super::matcher::find_candidates;

/// Chargeable volume in CBM: the invoice's own value, or `weight_kg / 300`
/// when it reports zero (the industry-standard air/ocean weight-to-volume
/// approximation).
fn volume_cbm(invoice: &Invoice) -> Decimal {
    match invoice.volume_m3 {
        Some(v) if v > Decimal::ZERO => v,
        _ => invoice.weight_kg / dec!(300),
    }
}

/// 20ft above 25t, 40HC above 30t. The 25t check is evaluated first, so it
/// also catches everything above 30t — the 40HC branch never fires. That
/// matches the reference engine's own (`if weight > 25000 ... elif weight
/// > 30000`) precedence, dead 40HC branch included.
fn select_container_size(weight_kg: Decimal) -> ContainerSize {
    if weight_kg > dec!(25000) {
        ContainerSize::Ft20
    } else if weight_kg > dec!(30000) {
        ContainerSize::Ft40Hc
    } else {
        ContainerSize::Ft40
    }
}

fn push_rate_comparison(items: &mut Vec<VarianceLineItem>, invoice: &Invoice, kind: ChargeKind, expected: Decimal) {
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

fn lcl_expected(rate: OceanChargeRate, volume: Decimal) -> Decimal {
    (rate.per_cbm * volume).max(rate.minimum)
}

fn price_lcl(invoice: &Invoice, lane: &OceanLane, lcl: &crate::core::store::OceanLcl) -> Vec<VarianceLineItem> {
    let volume = volume_cbm(invoice);
    let mut items = Vec::new();

    let freight_rate = lcl.freight.unwrap_or(OceanChargeRate { minimum: Decimal::ZERO, per_cbm: Decimal::ZERO });
    push_rate_comparison(&mut items, invoice, ChargeKind::Freight, lcl_expected(freight_rate, volume));

    if let Some(rate) = lcl.origin_handling {
        push_rate_comparison(&mut items, invoice, ChargeKind::OriginHandling, lcl_expected(rate, volume));
    }
    if let Some(rate) = lcl.destination_handling {
        push_rate_comparison(&mut items, invoice, ChargeKind::DestinationHandling, lcl_expected(rate, volume));
    }
    if let Some(rate) = lcl.delivery {
        push_rate_comparison(&mut items, invoice, ChargeKind::Delivery, lcl_expected(rate, volume));
    }

    // Pickup compares against the rate card when one exists; absent a
    // rate it is treated as pass-through rather than an unrateable charge.
    match lcl.pickup {
        Some(rate) => push_rate_comparison(&mut items, invoice, ChargeKind::Pickup, lcl_expected(rate, volume)),
        None => push_pass_through(&mut items, invoice, ChargeKind::Pickup),
    }

    // PSS only applies when the lane explicitly carries a PSS row; the
    // invoice has no dedicated PSS charge kind, so it is billed under Other.
    if let Some(rate) = lcl.pss {
        push_rate_comparison(&mut items, invoice, ChargeKind::Other, lcl_expected(rate, volume));
    } else {
        push_pass_through(&mut items, invoice, ChargeKind::Other);
    }

    for kind in [ChargeKind::Fuel, ChargeKind::Security, ChargeKind::DutyTax, ChargeKind::Customs] {
        push_pass_through(&mut items, invoice, kind);
    }

    items
}

fn price_fcl(invoice: &Invoice, fcl: &crate::core::store::OceanFcl) -> Vec<VarianceLineItem> {
    let size = select_container_size(invoice.weight_kg);
    let mut items = Vec::new();
    let charges = fcl.for_size(size).cloned().unwrap_or_default();

    // If only `total` exists, fold it into freight.
    let freight_expected = charges.freight.unwrap_or_else(|| charges.total.unwrap_or(Decimal::ZERO));
    push_rate_comparison(&mut items, invoice, ChargeKind::Freight, freight_expected);

    if let Some(amount) = charges.origin_handling {
        push_rate_comparison(&mut items, invoice, ChargeKind::OriginHandling, amount);
    }
    if let Some(amount) = charges.destination_handling {
        push_rate_comparison(&mut items, invoice, ChargeKind::DestinationHandling, amount);
    }
    if let Some(amount) = charges.delivery {
        push_rate_comparison(&mut items, invoice, ChargeKind::Delivery, amount);
    }
    match charges.pickup {
        Some(amount) => push_rate_comparison(&mut items, invoice, ChargeKind::Pickup, amount),
        None => push_pass_through(&mut items, invoice, ChargeKind::Pickup),
    }
    match charges.pss {
        Some(amount) => push_rate_comparison(&mut items, invoice, ChargeKind::Other, amount),
        None => push_pass_through(&mut items, invoice, ChargeKind::Other),
    }

    for kind in [ChargeKind::Fuel, ChargeKind::Security, ChargeKind::DutyTax, ChargeKind::Customs] {
        push_pass_through(&mut items, invoice, kind);
    }

    items
}

fn price_lane(invoice: &Invoice, lane: &OceanLane, final_score: f64) -> ConsideredRateCard {
    let line_items = match invoice.service_type {
        ServiceType::Lcl => lane.lcl.as_ref().map(|lcl| price_lcl(invoice, lane, lcl)).unwrap_or_default(),
        _ => lane.fcl.as_ref().map(|fcl| price_fcl(invoice, fcl)).unwrap_or_default(),
    };

    let expected_total: Decimal = line_items
        .iter()
        .filter(|l| l.audit_type == AuditType::RateCardComparison)
        .map(|l| l.expected_usd)
        .sum();
    let actual_total: Decimal = line_items.iter().map(|l| l.actual_usd).sum();
    let classification = variance::classify(&line_items);

    ConsideredRateCard {
        rate_card_id: Some(lane.rate_card.id.clone()),
        lane_description: Some(format!("{} → {}", lane.lane_origin, lane.lane_destination)),
        service: Some(lane.service.clone()),
        audit_status: classification.status,
        total_expected: expected_total,
        total_actual: actual_total,
        total_variance: classification.total_variance_usd,
        variances: line_items,
        calculation_details: serde_json::json!({
            "match_score": final_score,
            "volume_cbm": volume_cbm(invoice),
        }),
        status_reason: Some(format!("Variance: {:.2}%", classification.variance_percent)),
    }
}

/// Audit one ocean freight invoice: find fuzzy-matched candidate lanes,
/// price every one, and pick the highest-scoring candidate's result.
pub fn audit(invoice: &Invoice, store: &dyn RateStore) -> Result<AuditResult, AuditError> {
    let lanes = store.list_ocean_lanes().map_err(AuditError::StoreUnavailable)?;
    let service_hint = match invoice.service_type {
        ServiceType::Fcl => Some("FCL"),
        ServiceType::Lcl => Some("LCL"),
        _ => None,
    };
    let candidates = find_candidates(&lanes, &invoice.origin, &invoice.destination, service_hint);

    if candidates.is_empty() {
        return Ok(AuditResult::no_rate_card(invoice.invoice_no.clone()));
    }

    let considered: Vec<ConsideredRateCard> = candidates.iter().map(|c| price_lane(invoice, c.lane, c.final_score)).collect();
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
        rate_cards_checked: candidates.len() as u32,
        best_match_identifier: best.rate_card_id.clone(),
        line_items: best.variances.clone(),
        details: AuditResultDetails {
            invoice_details: serde_json::json!({ "invoice_no": invoice.invoice_no }),
            audit_results: considered,
            warnings: Vec::new(),
        },
    })
}
