use rateaudit::core::store::{ExpressRateRow, ExpressServiceType, InMemoryRateStore, RateSection, SpotQuote};
use rateaudit::core::types::{ChargeKind, Invoice, Mode, ServiceType};
use rateaudit::{dgf, express};
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

fn main() {
    // ── DHL Express import ──────────────────────────────────────────
    println!("=== Express Import ===");
    let express_store = InMemoryRateStore {
        express_zones: vec![(("DE".into(), "AU".into()), "6".into())],
        express_rates: vec![(
            ExpressServiceType::Import,
            RateSection::NonDocuments,
            "6".into(),
            ExpressRateRow { weight_from: dec!(0), weight_to: dec!(30), rate: dec!(88.50), is_multiplier: false },
        )],
        ..Default::default()
    };
    let mut express_charges = BTreeMap::new();
    express_charges.insert(ChargeKind::Freight, dec!(90));
    let express_invoice = Invoice {
        invoice_no: "INV-EXP-1".into(),
        mode: Mode::Express,
        origin: "Berlin; DE".into(),
        destination: "Sydney; AU".into(),
        weight_kg: dec!(5),
        chargeable_weight_kg: None,
        volume_m3: None,
        service_type: ServiceType::Import,
        currency: "USD".into(),
        exchange_rate_to_usd: None,
        actual_charges: express_charges,
        description: "NONDOC".into(),
        awb: None,
        quote_id: None,
    };
    let result = express::international::audit(&express_invoice, &express_store, ExpressServiceType::Import).unwrap();
    println!("  status: {:?}, expected: {}", result.status, result.line_items[0].expected_usd);

    // ── DGF sea spot quote ───────────────────────────────────────────
    println!("\n=== DGF Sea Spot Quote ===");
    let dgf_store = InMemoryRateStore {
        spot_quotes: vec![SpotQuote {
            quote_id: "Q-1001".into(),
            mode: Mode::DgfSea,
            rate_per_kg: None,
            rate_per_cbm: Some(dec!(50)),
            handling_fees: dec!(75),
            quoted_currency: "USD".into(),
            quote_fx_rate: dec!(1),
        }],
        ..Default::default()
    };
    let mut dgf_charges = BTreeMap::new();
    dgf_charges.insert(ChargeKind::Freight, dec!(500));
    dgf_charges.insert(ChargeKind::OriginHandling, dec!(75));
    let dgf_invoice = Invoice {
        invoice_no: "INV-DGF-1".into(),
        mode: Mode::DgfSea,
        origin: "Shanghai".into(),
        destination: "Rotterdam".into(),
        weight_kg: dec!(0),
        chargeable_weight_kg: None,
        volume_m3: Some(dec!(10)),
        service_type: ServiceType::Import,
        currency: "USD".into(),
        exchange_rate_to_usd: None,
        actual_charges: dgf_charges,
        description: "DGF sea spot shipment".into(),
        awb: None,
        quote_id: Some("Q-1001".into()),
    };
    let result = dgf::audit(&dgf_invoice, &dgf_store).unwrap();
    println!("  status: {:?}, total expected: {}", result.status, result.total_expected_amount_usd);
}
