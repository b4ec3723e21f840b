//! Parallel batch execution (`parallel` feature, implies `batch` + `rayon`).
//!
//! Per-invoice audits are independent and the rate store is read-only, so
//! workers run concurrently; only the final counter aggregation is shared
//! mutable state, and it is written once, after every worker has drained
//! (§5).

use std::sync::atomic::Ordering;
use std::time::Instant;

use chrono::Utc;
use rayon::prelude::*;

use crate::core::error::AuditError;
use crate::core::store::RateStore;
use crate::core::types::{BatchCounts, BatchRun, BatchStatus};

use super::coordinator::{BatchOptions, BatchSummary, Selector};
use super::store::AuditResultStore;

/// Same contract as [`super::coordinator::run_batch`], but invoices are
/// priced across a rayon thread pool. Persistence writes are still
/// serialized one at a time — the store owns the result stream.
pub fn run_batch_parallel(
    rate_store: &(impl RateStore + Sync),
    result_store: &(impl AuditResultStore + Sync),
    batch_name: &str,
    selector: Selector,
    options: BatchOptions,
) -> Result<BatchSummary, AuditError> {
    let started = Instant::now();
    let batch_id = format!("{batch_name}-{}", Utc::now().timestamp_millis());

    let invoice_numbers = super::coordinator::resolve_invoice_numbers(rate_store, &selector)?;

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

    tracing::info!(batch_id = %batch_id, invoice_count = invoice_numbers.len(), "starting parallel batch");

    let cancelled = options.cancellation.as_ref().map(|flag| flag.load(Ordering::SeqCst)).unwrap_or(false);
    let to_run: &[String] = if cancelled { &[] } else { &invoice_numbers };

    // A store-level failure on any worker is a batch-level exception: mark
    // the run `error` with whatever the other workers turned up and
    // re-raise, same as the sequential coordinator.
    let results: Vec<_> = to_run
        .par_iter()
        .map(|invoice_no| super::coordinator::audit_one_with_timeout(rate_store, invoice_no, options.per_invoice_timeout))
        .collect();

    let mut counts = BatchCounts::default();
    for result in results {
        let result = match result {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(batch_id = %batch_id, error = %e, "store unavailable, aborting parallel batch");
                let _ = result_store.update_batch_run_totals(&batch_id, counts, BatchStatus::Error, started.elapsed().as_millis() as u64);
                return Err(e);
            }
        };
        counts.record(result.status);
        if let Err(e) = result_store.insert_audit_result(&batch_id, result) {
            tracing::error!(batch_id = %batch_id, error = %e, "store unavailable, aborting parallel batch");
            let _ = result_store.update_batch_run_totals(&batch_id, counts, BatchStatus::Error, started.elapsed().as_millis() as u64);
            return Err(AuditError::StoreUnavailable(e));
        }
    }

    let final_status = if cancelled { BatchStatus::Cancelled } else { BatchStatus::Completed };
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
