//! Variance classification (component C5).
//!
//! Only [`AuditType::RateCardComparison`] lines are "auditable" — they are
//! the only ones that can disagree with a rate card. Pass-through charges
//! are defined to have zero variance and don't participate in the
//! percentage used to classify the invoice. An [`AuditType::AdditionalCharge`]
//! line is a charge billed with no matching expected row at all; it is
//! excluded from the percentage the same way, but it floors the verdict
//! at `review_required` — a missing expected row is never waved through
//! as `approved`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::types::{AuditStatus, AuditType, VarianceLineItem};

/// Classification result: overall status plus the two summary numbers
/// carried on [`super::types::AuditResult`].
pub struct Classification {
    pub status: AuditStatus,
    /// Sum of `variance_usd` over rate-card-compared lines only.
    pub auditable_variance_usd: Decimal,
    /// `auditable_variance_usd` as a percentage of the rate-card-compared
    /// expected total; 0 when that total is 0.
    pub variance_percent: Decimal,
    /// Sum of `variance_usd` over every line (auditable, pass-through, and
    /// additional-charge) — the number actually billed above/below expected.
    pub total_variance_usd: Decimal,
}

/// Classify a completed set of line-item comparisons for one invoice.
///
/// An undercharge (the carrier expected more than it billed) is always
/// approved regardless of magnitude — the rate-card audit exists to catch
/// overcharges, not to flag money left on the table.
pub fn classify(line_items: &[VarianceLineItem]) -> Classification {
    let mut auditable_variance_usd = Decimal::ZERO;
    let mut auditable_expected_usd = Decimal::ZERO;
    let mut total_variance_usd = Decimal::ZERO;
    let mut has_unmatched_charge = false;

    for item in line_items {
        total_variance_usd += item.variance_usd;
        if item.audit_type == AuditType::RateCardComparison {
            auditable_variance_usd += item.variance_usd;
            auditable_expected_usd += item.expected_usd;
        } else if item.audit_type == AuditType::AdditionalCharge {
            has_unmatched_charge = true;
        }
    }

    let variance_percent = if auditable_expected_usd > Decimal::ZERO {
        auditable_variance_usd / auditable_expected_usd * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    let status = if auditable_variance_usd <= Decimal::ZERO {
        AuditStatus::Approved
    } else if variance_percent.abs() <= dec!(5) {
        AuditStatus::Approved
    } else if variance_percent.abs() <= dec!(15) {
        AuditStatus::ReviewRequired
    } else {
        AuditStatus::Rejected
    };

    // A charge with no matching expected row at all never clears as approved.
    let status = if has_unmatched_charge && status == AuditStatus::Approved {
        AuditStatus::ReviewRequired
    } else {
        status
    };

    Classification {
        status,
        auditable_variance_usd,
        variance_percent,
        total_variance_usd,
    }
}
