//! End-to-end scenarios E4/E5/E6 from spec §8: DHL Express calculators.

#![cfg(feature = "express")]

use rateaudit::core::store::{ExpressRateRow, ExpressServiceType, InMemoryRateStore};
use rateaudit::core::types::{AuditStatus, ChargeKind, Invoice, Mode, ServiceType};
use rateaudit::express;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

fn invoice(mode: Mode, origin: &str, destination: &str, weight: rust_decimal::Decimal, freight_actual: rust_decimal::Decimal, service_type: ServiceType, description: &str) -> Invoice {
    let mut charges = BTreeMap::new();
    charges.insert(ChargeKind::Freight, freight_actual);
    Invoice {
        invoice_no: "EXP".into(),
        mode,
        origin: origin.into(),
        destination: destination.into(),
        weight_kg: weight,
        chargeable_weight_kg: None,
        volume_m3: None,
        service_type,
        currency: "USD".into(),
        exchange_rate_to_usd: None,
        actual_charges: charges,
        description: description.into(),
        awb: None,
        quote_id: None,
    }
}

#[test]
fn e4_import_flat_rate_within_tolerance_is_approved() {
    let store = InMemoryRateStore {
        express_zones: vec![(("DE".into(), "AU".into()), "6".into())],
        express_rates: vec![(
            ExpressServiceType::Import,
            rateaudit::core::store::RateSection::NonDocuments,
            "6".into(),
            ExpressRateRow { weight_from: dec!(0), weight_to: dec!(30), rate: dec!(88.50), is_multiplier: false },
        )],
        ..Default::default()
    };
    let inv = invoice(Mode::Express, "Berlin; DE", "Sydney; AU", dec!(5), dec!(90.00), ServiceType::Import, "NONDOC");
    let result = express::international::audit(&inv, &store, ExpressServiceType::Import).unwrap();
    assert_eq!(result.line_items[0].expected_usd, dec!(88.50));
    assert_eq!(result.status, AuditStatus::Approved);
}

#[test]
fn e5_over_30kg_export_uses_base_plus_multiplier() {
    let store = InMemoryRateStore {
        express_zones: vec![(("AU".into(), "US".into()), "X".into())],
        express_rates: vec![
            (
                ExpressServiceType::Export,
                rateaudit::core::store::RateSection::NonDocuments,
                "X".into(),
                ExpressRateRow { weight_from: dec!(0), weight_to: dec!(30), rate: dec!(380), is_multiplier: false },
            ),
            (
                ExpressServiceType::Export,
                rateaudit::core::store::RateSection::NonDocuments,
                "X".into(),
                ExpressRateRow { weight_from: dec!(30.5), weight_to: dec!(70), rate: dec!(3.90), is_multiplier: true },
            ),
        ],
        ..Default::default()
    };
    let inv = invoice(Mode::Express, "Sydney; AU", "New York; US", dec!(47.5), dec!(516.50), ServiceType::Export, "NONDOC shipment");
    let result = express::international::audit(&inv, &store, ExpressServiceType::Export).unwrap();
    assert_eq!(result.line_items[0].expected_usd, dec!(516.50));
    assert_eq!(result.status, AuditStatus::Approved);
}

#[test]
fn e6_au_domestic_melbourne_to_sydney() {
    let store = InMemoryRateStore {
        au_domestic_matrix: vec![((1, 3), "B".into())],
        au_domestic_rates: vec![("B".into(), dec!(10), dec!(16.47))],
        ..Default::default()
    };
    let inv = invoice(Mode::AuDomestic, "Melbourne, VIC", "Sydney, NSW", dec!(10), dec!(16.47), ServiceType::Domestic, "parcel");
    let result = express::au_domestic::audit(&inv, &store).unwrap();
    assert_eq!(result.line_items[0].expected_usd, dec!(16.47));
    assert_eq!(result.status, AuditStatus::Approved);
}
