//! Invocation surface: the handful of operations a CLI/HTTP collaborator
//! calls (§6). `AuditEngine` is a thin struct holding the two store
//! handles — the Rate Store is logically a singleton per process, passed
//! in explicitly rather than reached for through module-level state.

use crate::core::error::AuditError;
use crate::core::store::RateStore;
use crate::core::types::AuditResult;

use super::coordinator::{run_batch, BatchOptions, BatchSummary, Selector};
use super::dispatch::audit_one;
use super::store::{AuditResultStore, Page, PagedResults, ResultFilter};

/// Holds the two store handles every audit operation needs. Carries no
/// mutable state of its own.
pub struct AuditEngine<S: RateStore, R: AuditResultStore> {
    rate_store: S,
    result_store: R,
}

impl<S: RateStore, R: AuditResultStore> AuditEngine<S, R> {
    pub fn new(rate_store: S, result_store: R) -> Self {
        Self { rate_store, result_store }
    }

    /// Audit one invoice synchronously, outside of any batch.
    pub fn audit_invoice(&self, invoice_no: &str) -> Result<AuditResult, AuditError> {
        let invoice = self
            .rate_store
            .get_invoice(invoice_no)
            .map_err(AuditError::StoreUnavailable)?
            .ok_or_else(|| AuditError::InvoiceNotFound(invoice_no.to_string()))?;
        audit_one(&invoice, &self.rate_store)
    }

    /// Audit every invoice on file, with `force_reaudit` controlling
    /// whether prior results for those invoices are deleted first.
    pub fn run_full_audit(&self, batch_name: &str, force_reaudit: bool) -> Result<BatchSummary, AuditError> {
        let options = BatchOptions { force_reaudit, ..BatchOptions::default() };
        run_batch(&self.rate_store, &self.result_store, batch_name, Selector::AllYtd, options)
    }

    /// Audit a bounded list of invoices.
    pub fn run_batch(&self, batch_name: &str, invoice_numbers: Vec<String>) -> Result<BatchSummary, AuditError> {
        run_batch(
            &self.rate_store,
            &self.result_store,
            batch_name,
            Selector::Invoices(invoice_numbers),
            BatchOptions::default(),
        )
    }

    /// Cascade-delete a batch: its audit results first, then the batch row.
    pub fn delete_batch(&self, batch_id: &str) -> Result<bool, AuditError> {
        self.result_store.delete_batch_cascade(batch_id).map_err(AuditError::StoreUnavailable)
    }

    pub fn get_batch_results(&self, batch_id: &str, filter: ResultFilter, page: Page) -> Result<PagedResults, AuditError> {
        self.result_store.get_batch_results(batch_id, &filter, page).map_err(AuditError::StoreUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::store::InMemoryResultStore;
    use crate::core::store::InMemoryRateStore;
    use crate::core::types::{ChargeKind, Invoice, Mode, ServiceType};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn invoice() -> Invoice {
        let mut charges = BTreeMap::new();
        charges.insert(ChargeKind::Freight, dec!(100));
        Invoice {
            invoice_no: "INV-1".into(),
            mode: Mode::Air,
            origin: "USLAX".into(),
            destination: "DEFRA".into(),
            weight_kg: dec!(500),
            chargeable_weight_kg: None,
            volume_m3: None,
            service_type: ServiceType::Export,
            currency: "USD".into(),
            exchange_rate_to_usd: None,
            actual_charges: charges,
            description: "air freight".into(),
            awb: None,
            quote_id: None,
        }
    }

    #[test]
    fn audit_invoice_returns_not_found_for_unknown_invoice() {
        let engine = AuditEngine::new(InMemoryRateStore::default(), InMemoryResultStore::default());
        let err = engine.audit_invoice("UNKNOWN").unwrap_err();
        assert!(matches!(err, AuditError::InvoiceNotFound(_)));
    }

    #[test]
    fn run_batch_persists_one_result_per_invoice() {
        let engine = AuditEngine::new(
            InMemoryRateStore { invoices: vec![invoice()], ..Default::default() },
            InMemoryResultStore::default(),
        );
        let summary = engine.run_batch("b1", vec!["INV-1".into()]).unwrap();
        let page = engine.get_batch_results(&summary.batch_id, ResultFilter::default(), Page { offset: 0, limit: 10 }).unwrap();
        assert_eq!(page.total, 1);
    }
}
