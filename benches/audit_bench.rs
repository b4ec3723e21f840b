use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicU64;

use rateaudit::batch::coordinator::run_batch;
use rateaudit::batch::{BatchOptions, InMemoryResultStore, Selector};
use rateaudit::core::store::{InMemoryRateStore, OceanChargeRate, OceanLane, OceanLcl};
use rateaudit::core::types::{ChargeKind, Invoice, Mode, RateCardHeader, ServiceType};
use rateaudit::ocean;

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

static LANE_SEQ: AtomicU64 = AtomicU64::new(0);

fn ocean_lane(origin: &str, destination: &str) -> OceanLane {
    let n = LANE_SEQ.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    OceanLane {
        rate_card: RateCardHeader {
            id: format!("OC-{n}"),
            carrier: "Bench Ocean".into(),
            mode: Mode::Ocean,
            valid_from: test_date(),
            valid_to: test_date(),
        },
        lane_origin: origin.into(),
        lane_destination: destination.into(),
        cities_included_origin: vec![],
        cities_included_destination: vec![],
        port_of_loading: None,
        port_of_discharge: None,
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

/// A rate book with 200 lanes spanning 20 ports on each side, so the fuzzy
/// matcher (C4) has to score a realistically large candidate set instead
/// of matching the first lane trivially.
fn large_ocean_rate_book() -> InMemoryRateStore {
    let ports = [
        "Shanghai", "Ningbo", "Qingdao", "Shenzhen", "Guangzhou", "Hong Kong", "Busan", "Singapore", "Hamburg", "Rotterdam",
    ];
    let destinations = [
        "Sydney", "Melbourne", "Brisbane", "Fremantle", "Auckland", "Los Angeles", "Long Beach", "Oakland", "Vancouver", "Tokyo",
    ];
    let mut lanes = Vec::new();
    for origin in ports {
        for dest in destinations {
            lanes.push(ocean_lane(origin, dest));
        }
    }
    InMemoryRateStore { ocean_lanes: lanes, ..Default::default() }
}

fn ocean_invoice(origin: &str, destination: &str) -> Invoice {
    let mut charges = BTreeMap::new();
    charges.insert(ChargeKind::Pickup, dec!(54));
    charges.insert(ChargeKind::Freight, dec!(292.5));
    Invoice {
        invoice_no: format!("BENCH-{origin}-{destination}"),
        mode: Mode::Ocean,
        origin: origin.into(),
        destination: destination.into(),
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

fn bench_ocean_fuzzy_match(c: &mut Criterion) {
    let store = large_ocean_rate_book();
    let invoice = ocean_invoice("Shanghai, China", "Sydney, Australia");
    c.bench_function("ocean_fuzzy_match_200_lanes", |b| {
        b.iter(|| black_box(ocean::audit(black_box(&invoice), black_box(&store))));
    });
}

fn air_invoice(n: usize) -> Invoice {
    let mut charges = BTreeMap::new();
    charges.insert(ChargeKind::Freight, dec!(3150));
    Invoice {
        invoice_no: format!("BATCH-{n}"),
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
        description: String::new(),
        awb: None,
        quote_id: None,
    }
}

fn batch_rate_store(count: usize) -> InMemoryRateStore {
    use rateaudit::core::store::AirLane;
    let lane = AirLane {
        rate_card: RateCardHeader {
            id: "AC-BENCH".into(),
            carrier: "Bench Air".into(),
            mode: Mode::Air,
            valid_from: test_date(),
            valid_to: test_date(),
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
    InMemoryRateStore {
        air_lanes: vec![lane],
        invoices: (0..count).map(air_invoice).collect(),
        ..Default::default()
    }
}

fn bench_batch_throughput_1000_invoices(c: &mut Criterion) {
    // The coordinator logs via `tracing`; without a subscriber those events
    // are dropped silently, which would hide real failures during a bench run.
    let _ = tracing_subscriber::fmt::try_init();

    c.bench_function("batch_coordinator_1000_invoices", |b| {
        b.iter(|| {
            let rate_store = batch_rate_store(1000);
            let result_store = InMemoryResultStore::default();
            black_box(run_batch(
                &rate_store,
                &result_store,
                "bench",
                Selector::AllYtd,
                BatchOptions::default(),
            ))
        });
    });
}

criterion_group!(benches, bench_ocean_fuzzy_match, bench_batch_throughput_1000_invoices);
criterion_main!(benches);
