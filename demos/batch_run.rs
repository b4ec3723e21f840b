use chrono::NaiveDate;
use rateaudit::batch::{AuditEngine, InMemoryResultStore, Page, ResultFilter};
use rateaudit::core::store::{AirLane, InMemoryRateStore};
use rateaudit::core::types::{ChargeKind, Invoice, Mode, RateCardHeader, ServiceType};
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

fn invoice(invoice_no: &str, weight_kg: rust_decimal::Decimal, freight_actual: rust_decimal::Decimal) -> Invoice {
    let mut charges = BTreeMap::new();
    charges.insert(ChargeKind::Freight, freight_actual);
    Invoice {
        invoice_no: invoice_no.into(),
        mode: Mode::Air,
        origin: "CNSHA".into(),
        destination: "AUSYD".into(),
        weight_kg,
        chargeable_weight_kg: None,
        volume_m3: None,
        service_type: ServiceType::Export,
        currency: "USD".into(),
        exchange_rate_to_usd: None,
        actual_charges: charges,
        description: "Air freight export".into(),
        awb: None,
        quote_id: None,
    }
}

fn main() {
    tracing_subscriber::fmt::init();

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
        fuel_rate_per_kg: dec!(0),
        ptd_freight_charge: dec!(0),
        ptd_min_charge: dec!(0),
        destination_min_charge: dec!(0),
        security_surcharge: dec!(0),
        pss: None,
        adder_rate_per_half_kg: None,
    };

    let invoices = vec![
        invoice("INV-1", dec!(1500), dec!(3150)),  // exact match, approved
        invoice("INV-2", dec!(1500), dec!(3400)),  // ~7.9% over, review required
        invoice("INV-3", dec!(1500), dec!(4500)),  // ~42.9% over, rejected
    ];
    let rate_store = InMemoryRateStore { air_lanes: vec![lane], invoices, ..Default::default() };
    let engine = AuditEngine::new(rate_store, InMemoryResultStore::default());

    println!("=== Batch Audit ===");
    let summary = engine.run_batch("demo-batch", vec!["INV-1".into(), "INV-2".into(), "INV-3".into()]).unwrap();
    println!("  batch {} finished as {:?} in {}ms", summary.batch_id, summary.status, summary.processing_time_ms);
    println!("  approved={} review_required={} rejected={}", summary.counts.approved, summary.counts.review_required, summary.counts.rejected);

    let page = engine
        .get_batch_results(&summary.batch_id, ResultFilter::default(), Page { offset: 0, limit: 10 })
        .unwrap();
    for row in page.items {
        println!("  - {}: {:?}", row.result.invoice_no, row.result.status);
    }
}
