use chrono::NaiveDate;
use rateaudit::air;
use rateaudit::core::store::{AirLane, InMemoryRateStore};
use rateaudit::core::types::{ChargeKind, Invoice, Mode, RateCardHeader, ServiceType};
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

fn main() {
    let lane = AirLane {
        rate_card: RateCardHeader {
            id: "AC-001".into(),
            carrier: "Demo Air Cargo".into(),
            mode: Mode::Air,
            valid_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            valid_to: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        },
        origin_port: "CNSHA".into(),
        destination_port: "AUSYD".into(),
        service: "Standard".into(),
        bracket_under_1000: dec!(2.50),
        bracket_1000_to_2000: dec!(2.10),
        bracket_2000_to_3000: dec!(1.90),
        bracket_at_least_3000: dec!(1.70),
        minimum_charge: dec!(500),
        fuel_rate_per_kg: dec!(0.15),
        ptd_freight_charge: dec!(0),
        ptd_min_charge: dec!(0),
        destination_min_charge: dec!(0),
        security_surcharge: dec!(0.05),
        pss: None,
        adder_rate_per_half_kg: None,
    };
    let store = InMemoryRateStore { air_lanes: vec![lane], ..Default::default() };

    let mut charges = BTreeMap::new();
    charges.insert(ChargeKind::Freight, dec!(3300));
    charges.insert(ChargeKind::Fuel, dec!(225));
    charges.insert(ChargeKind::Security, dec!(75));

    let invoice = Invoice {
        invoice_no: "INV-AIR-001".into(),
        mode: Mode::Air,
        origin: "CNSHA".into(),
        destination: "AUSYD".into(),
        weight_kg: dec!(1500),
        chargeable_weight_kg: None,
        volume_m3: None,
        service_type: ServiceType::Export,
        currency: "USD".into(),
        exchange_rate_to_usd: None,
        actual_charges: charges,
        description: "Air freight export".into(),
        awb: None,
        quote_id: None,
    };

    println!("=== Air Freight Audit ===");
    let result = air::audit(&invoice, &store).unwrap();
    println!("  status: {:?}", result.status);
    println!("  total actual:   {}", result.total_invoice_amount_usd);
    println!("  total expected: {}", result.total_expected_amount_usd);
    println!("  variance:       {}% ({})", result.variance_percent, result.total_variance_usd);
    for line in &result.line_items {
        println!("  - {:?}: actual={} expected={} ({:?})", line.charge_kind, line.actual_usd, line.expected_usd, line.audit_type);
    }
}
