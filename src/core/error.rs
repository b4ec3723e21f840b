use thiserror::Error;

/// Errors that can occur while auditing a single invoice or a batch.
///
/// `NoRateCard` and an ambiguous service-code match are deliberately *not*
/// represented here — per-invoice "no candidate rate card" and "multiple
/// equally applicable surcharge variants" are not exceptional conditions,
/// they are verdicts (see [`crate::core::AuditStatus`]) or warnings folded
/// into the result details. Only conditions that prevent producing any
/// result at all are errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuditError {
    /// The selector referenced an invoice the store does not know about.
    #[error("invoice {0} not found")]
    InvoiceNotFound(String),

    /// A required zone lookup (country or AU city/state) could not be
    /// resolved from the address text.
    #[error("could not resolve zone for {field}: {reason}")]
    ZoneUnknown {
        /// Which field the lookup was for (e.g. "origin", "destination").
        field: String,
        reason: String,
    },

    /// The invoice currency is not USD and carries no exchange rate.
    #[error("invoice {invoice_no} has currency {currency} with no exchange_rate_to_usd")]
    CurrencyMissing {
        invoice_no: String,
        currency: String,
    },

    /// A pricing calculator failed while computing the expected breakdown.
    #[error("pricing calculation failed for {invoice_no}: {reason}")]
    PricingFailure { invoice_no: String, reason: String },

    /// The backing rate/result store could not be reached or returned an
    /// unexpected failure. This propagates to the caller; it never aborts
    /// only the current invoice.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// The invoice's soft wall-clock audit budget was exceeded.
    #[error("audit of {0} timed out")]
    Timeout(String),
}

/// Error returned by [`crate::core::RateStore`] and
/// [`crate::batch::AuditResultStore`] implementations.
///
/// The engine treats every variant the same way: it propagates as
/// [`AuditError::StoreUnavailable`] and terminates the in-flight batch.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The store could not be reached (connection, timeout, I/O).
    #[error("connection error: {0}")]
    Connection(String),

    /// The store reported a constraint violation or unexpected row shape.
    #[error("data error: {0}")]
    Data(String),
}
