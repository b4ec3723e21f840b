//! Result Persistence (component C8).
//!
//! Two logical tables — `batch_runs` and `audit_results` — with no
//! uniqueness constraint on `(batch_run_id, invoice_no)`: a single batch
//! writes at most one row per invoice by construction of the coordinator,
//! but across batches, results for the same invoice coexist and readers
//! select the most recent.

use std::sync::Mutex;

use chrono::Utc;

use crate::core::error::StoreError;
use crate::core::types::{AuditResult, AuditStatus, BatchCounts, BatchRun, BatchStatus};

/// One persisted audit row, scoped to the batch that produced it.
#[derive(Debug, Clone)]
pub struct StoredAuditResult {
    pub batch_run_id: String,
    pub result: AuditResult,
    pub created_at: chrono::DateTime<Utc>,
}

/// Optional filter for [`AuditResultStore::get_batch_results`].
#[derive(Debug, Clone, Default)]
pub struct ResultFilter {
    pub status: Option<AuditStatus>,
}

#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

#[derive(Debug, Clone)]
pub struct PagedResults {
    pub items: Vec<StoredAuditResult>,
    pub total: usize,
}

/// Write side of C8, plus the paged reads the invocation surface needs.
/// Mirrors [`crate::core::RateStore`]'s contract: every method returns
/// `Ok` with an empty/absent value rather than erroring on a miss, and the
/// trait is `Send + Sync` so `AuditEngine` can share it behind an `Arc`.
pub trait AuditResultStore: Send + Sync {
    fn insert_batch_run(&self, run: BatchRun) -> Result<(), StoreError>;

    fn update_batch_run_totals(
        &self,
        batch_id: &str,
        counts: BatchCounts,
        status: BatchStatus,
        processing_time_ms: u64,
    ) -> Result<(), StoreError>;

    fn insert_audit_result(&self, batch_id: &str, result: AuditResult) -> Result<(), StoreError>;

    /// Pre-delete step for `force_reaudit`; does not touch the batch row.
    fn delete_audit_results_for(&self, invoice_numbers: &[String]) -> Result<(), StoreError>;

    /// Deletes `audit_results` referencing `batch_id` first, then the
    /// `batch_runs` row itself, so no result is ever left orphaned.
    fn delete_batch_cascade(&self, batch_id: &str) -> Result<bool, StoreError>;

    fn get_batch_results(&self, batch_id: &str, filter: &ResultFilter, page: Page) -> Result<PagedResults, StoreError>;

    fn get_batch_run(&self, batch_id: &str) -> Result<Option<BatchRun>, StoreError>;
}

/// In-memory [`AuditResultStore`] used by tests, demos, and benchmarks.
#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    batch_runs: Mutex<Vec<BatchRun>>,
    results: Mutex<Vec<StoredAuditResult>>,
}

impl AuditResultStore for InMemoryResultStore {
    fn insert_batch_run(&self, run: BatchRun) -> Result<(), StoreError> {
        self.batch_runs.lock().unwrap().push(run);
        Ok(())
    }

    fn update_batch_run_totals(
        &self,
        batch_id: &str,
        counts: BatchCounts,
        status: BatchStatus,
        processing_time_ms: u64,
    ) -> Result<(), StoreError> {
        let mut runs = self.batch_runs.lock().unwrap();
        let Some(run) = runs.iter_mut().find(|r| r.id == batch_id) else {
            return Err(StoreError::Data(format!("batch run {batch_id} not found")));
        };
        run.counts = counts;
        run.status = status;
        run.processing_time_ms = processing_time_ms;
        run.completed_at = Some(Utc::now());
        Ok(())
    }

    fn insert_audit_result(&self, batch_id: &str, result: AuditResult) -> Result<(), StoreError> {
        self.results.lock().unwrap().push(StoredAuditResult {
            batch_run_id: batch_id.to_string(),
            result,
            created_at: Utc::now(),
        });
        Ok(())
    }

    fn delete_audit_results_for(&self, invoice_numbers: &[String]) -> Result<(), StoreError> {
        self.results.lock().unwrap().retain(|r| !invoice_numbers.contains(&r.result.invoice_no));
        Ok(())
    }

    fn delete_batch_cascade(&self, batch_id: &str) -> Result<bool, StoreError> {
        self.results.lock().unwrap().retain(|r| r.batch_run_id != batch_id);
        let mut runs = self.batch_runs.lock().unwrap();
        let before = runs.len();
        runs.retain(|r| r.id != batch_id);
        Ok(runs.len() < before)
    }

    fn get_batch_results(&self, batch_id: &str, filter: &ResultFilter, page: Page) -> Result<PagedResults, StoreError> {
        let results = self.results.lock().unwrap();
        let matching: Vec<StoredAuditResult> = results
            .iter()
            .filter(|r| r.batch_run_id == batch_id)
            .filter(|r| filter.status.map(|s| s == r.result.status).unwrap_or(true))
            .cloned()
            .collect();
        let total = matching.len();
        let items = matching.into_iter().skip(page.offset).take(page.limit).collect();
        Ok(PagedResults { items, total })
    }

    fn get_batch_run(&self, batch_id: &str) -> Result<Option<BatchRun>, StoreError> {
        Ok(self.batch_runs.lock().unwrap().iter().find(|r| r.id == batch_id).cloned())
    }
}
