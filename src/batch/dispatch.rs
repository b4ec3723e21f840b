//! Glue between the mode/route dispatcher (C6) and the per-mode pricing
//! calculators (C3). Kept in `batch` rather than `core` so `core` never has
//! to depend on the optional `air`/`ocean`/`express`/`dgf` calculator
//! crates it sits underneath.

use crate::core::dispatch::{route, Route};
use crate::core::error::AuditError;
use crate::core::store::RateStore;
use crate::core::types::{AuditResult, AuditStatus, Invoice};

/// Price one invoice through whichever calculator its route selects.
pub fn audit_one(invoice: &Invoice, store: &dyn RateStore) -> Result<AuditResult, AuditError> {
    match route(invoice) {
        #[cfg(feature = "air")]
        Route::Air => crate::air::audit(invoice, store),
        #[cfg(not(feature = "air"))]
        Route::Air => Err(AuditError::PricingFailure {
            invoice_no: invoice.invoice_no.clone(),
            reason: "air calculator is not compiled in (enable the `air` feature)".into(),
        }),

        #[cfg(feature = "ocean")]
        Route::Ocean => crate::ocean::audit(invoice, store),
        #[cfg(not(feature = "ocean"))]
        Route::Ocean => Err(AuditError::PricingFailure {
            invoice_no: invoice.invoice_no.clone(),
            reason: "ocean calculator is not compiled in (enable the `ocean` feature)".into(),
        }),

        #[cfg(feature = "express")]
        Route::ExpressAuDomestic => crate::express::au_domestic::audit(invoice, store),
        #[cfg(not(feature = "express"))]
        Route::ExpressAuDomestic => express_disabled(invoice),

        #[cfg(feature = "express")]
        Route::ExpressExport => crate::express::international::audit(invoice, store, crate::core::store::ExpressServiceType::Export),
        #[cfg(not(feature = "express"))]
        Route::ExpressExport => express_disabled(invoice),

        #[cfg(feature = "express")]
        Route::ExpressImport => crate::express::international::audit(invoice, store, crate::core::store::ExpressServiceType::Import),
        #[cfg(not(feature = "express"))]
        Route::ExpressImport => express_disabled(invoice),

        #[cfg(feature = "express")]
        Route::ExpressThirdParty => crate::express::third_party::audit(invoice, store),
        #[cfg(not(feature = "express"))]
        Route::ExpressThirdParty => express_disabled(invoice),

        Route::ExpressReviewRequired => Ok(AuditResult {
            status: AuditStatus::ReviewRequired,
            ..AuditResult::no_rate_card(invoice.invoice_no.clone())
        }),

        #[cfg(feature = "dgf")]
        Route::DgfAir | Route::DgfSea => crate::dgf::audit(invoice, store),
        #[cfg(not(feature = "dgf"))]
        Route::DgfAir | Route::DgfSea => Err(AuditError::PricingFailure {
            invoice_no: invoice.invoice_no.clone(),
            reason: "DGF calculator is not compiled in (enable the `dgf` feature)".into(),
        }),
    }
}

#[cfg(not(feature = "express"))]
fn express_disabled(invoice: &Invoice) -> Result<AuditResult, AuditError> {
    Err(AuditError::PricingFailure {
        invoice_no: invoice.invoice_no.clone(),
        reason: "express calculators are not compiled in (enable the `express` feature)".into(),
    })
}
