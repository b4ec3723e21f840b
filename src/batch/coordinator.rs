//! Batch Coordinator (component C7, §4.8).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::core::error::AuditError;
use crate::core::store::RateStore;
use crate::core::types::{AuditResult, AuditStatus, BatchCounts, BatchRun, BatchStatus};

use super::dispatch::audit_one;
use super::store::AuditResultStore;

/// Which invoices a batch covers.
#[derive(Debug, Clone)]
pub enum Selector {
    AllYtd,
    Invoices(Vec<String>),
}

/// Batch-run configuration. Every field defaults to the conservative,
/// spec-suggested value.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Delete existing audit results for the selected invoices before
    /// this batch writes its own.
    pub force_reaudit: bool,
    /// Persist accumulated counters at least this often, so a crash loses
    /// only the tail of the batch.
    pub commit_interval: usize,
    /// Soft per-invoice wall-clock budget; on timeout the invoice is
    /// recorded as `status=error` rather than aborting the batch.
    pub per_invoice_timeout: Duration,
    /// Checked between invoices; in-flight work always finishes and is
    /// persisted before the batch is marked `cancelled`.
    pub cancellation: Option<Arc<AtomicBool>>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            force_reaudit: false,
            commit_interval: 50,
            per_invoice_timeout: Duration::from_secs(30),
            cancellation: None,
        }
    }
}

/// Summary of one batch invocation, as returned to the invocation surface.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub batch_id: String,
    pub status: BatchStatus,
    pub counts: BatchCounts,
    pub processing_time_ms: u64,
}

pub(crate) fn resolve_invoice_numbers(rate_store: &dyn RateStore, selector: &Selector) -> Result<Vec<String>, AuditError> {
    match selector {
        Selector::Invoices(list) => Ok(list.clone()),
        Selector::AllYtd => Ok(rate_store
            .list_ytd_invoices()
            .map_err(AuditError::StoreUnavailable)?
            .into_iter()
            .map(|s| s.invoice_no)
            .collect()),
    }
}

fn is_cancelled(options: &BatchOptions) -> bool {
    options.cancellation.as_ref().map(|flag| flag.load(Ordering::SeqCst)).unwrap_or(false)
}

/// Mark the batch `error` with whatever counts accumulated, then re-raise.
/// Best-effort: if the store is too unavailable to take even this write,
/// the original error still propagates.
fn abort_batch(
    result_store: &dyn AuditResultStore,
    batch_id: &str,
    counts: BatchCounts,
    started: Instant,
    error: AuditError,
) -> Result<BatchSummary, AuditError> {
    tracing::error!(batch_id = %batch_id, error = %error, "store unavailable, aborting batch");
    let _ = result_store.update_batch_run_totals(batch_id, counts, BatchStatus::Error, started.elapsed().as_millis() as u64);
    Err(error)
}

/// Audit every selected invoice, persisting one `AuditResult` row per
/// invoice and a final `BatchRun` summary. Per-invoice failures (missing
/// invoice, timeout, pricing failure) are recorded as `status=error` and do
/// not abort the batch. A store-level failure is a batch-level exception:
/// the `BatchRun` is updated to `status=error` with whatever counts
/// accumulated so far, and then the error re-raises as
/// `Err(AuditError::StoreUnavailable)` out of this function.
pub fn run_batch(
    rate_store: &dyn RateStore,
    result_store: &dyn AuditResultStore,
    batch_name: &str,
    selector: Selector,
    options: BatchOptions,
) -> Result<BatchSummary, AuditError> {
    let started = Instant::now();
    let batch_id = format!("{batch_name}-{}", Utc::now().timestamp_millis());

    let invoice_numbers = resolve_invoice_numbers(rate_store, &selector)?;

    if options.force_reaudit {
        result_store
            .delete_audit_results_for(&invoice_numbers)
            .map_err(AuditError::StoreUnavailable)?;
    }

    result_store
        .insert_batch_run(BatchRun {
            id: batch_id.clone(),
            name: batch_name.to_string(),
            status: BatchStatus::Running,
            counts: BatchCounts::default(),
            processing_time_ms: 0,
            created_at: Utc::now(),
            completed_at: None,
        })
        .map_err(AuditError::StoreUnavailable)?;

    tracing::info!(batch_id = %batch_id, invoice_count = invoice_numbers.len(), "starting batch");

    let mut counts = BatchCounts::default();
    let mut final_status = BatchStatus::Completed;

    for (index, invoice_no) in invoice_numbers.iter().enumerate() {
        if is_cancelled(&options) {
            final_status = BatchStatus::Cancelled;
            break;
        }

        let result = match audit_one_with_timeout(rate_store, invoice_no, options.per_invoice_timeout) {
            Ok(result) => result,
            Err(e) => return abort_batch(result_store, &batch_id, counts, started, e),
        };
        counts.record(result.status);

        if result.status == AuditStatus::Error {
            tracing::warn!(invoice_no = %invoice_no, "invoice audit recorded as error");
        }

        if let Err(e) = result_store.insert_audit_result(&batch_id, result) {
            return abort_batch(result_store, &batch_id, counts, started, AuditError::StoreUnavailable(e));
        }

        if (index + 1) % options.commit_interval.max(1) == 0 {
            if let Err(e) = result_store.update_batch_run_totals(&batch_id, counts, BatchStatus::Running, started.elapsed().as_millis() as u64) {
                return abort_batch(result_store, &batch_id, counts, started, AuditError::StoreUnavailable(e));
            }
        }
    }

    result_store
        .update_batch_run_totals(&batch_id, counts, final_status, started.elapsed().as_millis() as u64)
        .map_err(AuditError::StoreUnavailable)?;

    Ok(BatchSummary {
        batch_id,
        status: final_status,
        counts,
        processing_time_ms: started.elapsed().as_millis() as u64,
    })
}

/// Look up and price one invoice, recording a missing invoice, pricing
/// failure, or over-budget audit as `status=error` rather than propagating.
/// A store-level failure is the one exception: it bubbles out as
/// `Err(AuditError::StoreUnavailable)` so the caller can abort the batch
/// instead of silently skipping to the next invoice.
pub(crate) fn audit_one_with_timeout(rate_store: &dyn RateStore, invoice_no: &str, timeout: Duration) -> Result<AuditResult, AuditError> {
    let invoice = match rate_store.get_invoice(invoice_no) {
        Ok(Some(invoice)) => invoice,
        Ok(None) => return Ok(AuditResult::error(invoice_no, "Invoice not found")),
        Err(e) => return Err(AuditError::StoreUnavailable(e)),
    };

    let started = Instant::now();
    let result = audit_one(&invoice, rate_store);
    if started.elapsed() > timeout {
        return Ok(AuditResult::error(invoice_no, "timeout"));
    }

    match result {
        Ok(result) => Ok(result),
        Err(AuditError::StoreUnavailable(e)) => Err(AuditError::StoreUnavailable(e)),
        Err(e) => Ok(AuditResult::error(invoice_no, e.to_string())),
    }
}
