//! End-to-end scenario E2 from spec §8: ocean LCL pickup/freight minimums.

#![cfg(feature = "ocean")]

use chrono::NaiveDate;
use rateaudit::core::store::{InMemoryRateStore, OceanChargeRate, OceanLane, OceanLcl};
use rateaudit::core::types::{AuditStatus, ChargeKind, Invoice, Mode, RateCardHeader, ServiceType};
use rateaudit::ocean;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

fn lane() -> OceanLane {
    OceanLane {
        rate_card: RateCardHeader {
            id: "OC-E2".into(),
            carrier: "Test Ocean".into(),
            mode: Mode::Ocean,
            valid_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            valid_to: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        },
        lane_origin: "Shanghai".into(),
        lane_destination: "Sydney".into(),
        cities_included_origin: vec![],
        cities_included_destination: vec![],
        port_of_loading: Some("CNSHA".into()),
        port_of_discharge: Some("AUSYD".into()),
        service: "LCL".into(),
        lcl: Some(OceanLcl {
            pickup: Some(OceanChargeRate { minimum: dec!(50), per_cbm: dec!(12) }),
            origin_handling: None,
            freight: Some(OceanChargeRate { minimum: dec!(250), per_cbm: dec!(65) }),
            destination_handling: None,
            delivery: None,
            pss: None,
        }),
        fcl: None,
    }
}

fn invoice(pickup_actual: rust_decimal::Decimal, freight_actual: rust_decimal::Decimal) -> Invoice {
    let mut charges = BTreeMap::new();
    charges.insert(ChargeKind::Pickup, pickup_actual);
    charges.insert(ChargeKind::Freight, freight_actual);
    Invoice {
        invoice_no: "E2".into(),
        mode: Mode::Ocean,
        origin: "Shanghai".into(),
        destination: "Sydney".into(),
        weight_kg: dec!(1000),
        chargeable_weight_kg: None,
        volume_m3: Some(dec!(4.5)),
        service_type: ServiceType::Lcl,
        currency: "USD".into(),
        exchange_rate_to_usd: None,
        actual_charges: charges,
        description: String::new(),
        awb: None,
        quote_id: None,
    }
}

#[test]
fn pickup_and_freight_minimums_are_quoted_correctly() {
    let store = InMemoryRateStore { ocean_lanes: vec![lane()], ..Default::default() };
    let result = ocean::audit(&invoice(dec!(54), dec!(292.5)), &store).unwrap();
    let pickup = result.line_items.iter().find(|l| l.charge_kind == ChargeKind::Pickup).unwrap();
    let freight = result.line_items.iter().find(|l| l.charge_kind == ChargeKind::Freight).unwrap();
    // max(50, 12 * 4.5) = 54
    assert_eq!(pickup.expected_usd, dec!(54));
    // max(250, 65 * 4.5) = 292.5
    assert_eq!(freight.expected_usd, dec!(292.5));
    assert_eq!(result.status, AuditStatus::Approved);
}

#[test]
fn overbilled_pickup_and_freight_is_review_required() {
    let store = InMemoryRateStore { ocean_lanes: vec![lane()], ..Default::default() };
    let result = ocean::audit(&invoice(dec!(54), dec!(310)), &store).unwrap();
    assert_eq!(result.status, AuditStatus::ReviewRequired);
    // (54-54) + (310-292.5) = 17.5 over the 346.5 auditable expected total ~= 5.05%
    assert!(result.variance_percent > dec!(5) && result.variance_percent < dec!(6));
}
