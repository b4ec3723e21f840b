use rateaudit::air;
use rateaudit::core::store::InMemoryRateStore;
use rateaudit::core::types::{ChargeKind, Invoice, Mode, ServiceType};
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

fn invoice() -> Invoice {
    let mut charges = BTreeMap::new();
    charges.insert(ChargeKind::Freight, dec!(1000));
    Invoice {
        invoice_no: "INV-ERR-1".into(),
        mode: Mode::Air,
        origin: "CNSHA".into(),
        destination: "AUSYD".into(),
        weight_kg: dec!(500),
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
    // ── 1. No rate card on file: a verdict, not an error ───────────────
    println!("=== No Rate Card ===");
    let empty_store = InMemoryRateStore::default();
    let result = air::audit(&invoice(), &empty_store).unwrap();
    println!("  status: {:?} (Ok, not Err)", result.status);

    // ── 2. Missing exchange rate on a non-USD invoice ──────────────────
    println!("\n=== Currency Missing ===");
    let mut eur_invoice = invoice();
    eur_invoice.currency = "EUR".into();
    eur_invoice.exchange_rate_to_usd = None;
    match air::audit(&eur_invoice, &empty_store) {
        Ok(_) => println!("  unexpectedly succeeded"),
        Err(e) => println!("  {}", e),
    }

    // ── 3. Invoice not found, via the invocation surface ───────────────
    println!("\n=== Invoice Not Found ===");
    use rateaudit::batch::{AuditEngine, InMemoryResultStore};
    let engine = AuditEngine::new(InMemoryRateStore::default(), InMemoryResultStore::default());
    match engine.audit_invoice("UNKNOWN") {
        Ok(_) => println!("  unexpectedly succeeded"),
        Err(e) => println!("  {}", e),
    }
}
