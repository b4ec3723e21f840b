use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::AuditError;
use super::zone::extract_country;

/// Transportation mode of an invoice, and therefore which pricing
/// calculator the dispatcher (C6) routes it to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Air,
    Ocean,
    Express,
    /// DHL Express third-party (billed to neither the origin nor the
    /// destination account).
    Express3p,
    AuDomestic,
    DgfAir,
    DgfSea,
}

impl Mode {
    /// Whether this mode is DGF spot-quote auditing (air or sea).
    pub fn is_dgf(&self) -> bool {
        matches!(self, Mode::DgfAir | Mode::DgfSea)
    }
}

/// Invoice-level service/load type. The concrete meaning is mode-dependent
/// (FCL/LCL for ocean, Documents/Non-documents for express, Domestic for
/// AU express).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    Fcl,
    Lcl,
    Documents,
    NonDocuments,
    Domestic,
    Export,
    Import,
}

/// A billable charge kind, shared across all modes. `actual_charges` on an
/// [`Invoice`] is keyed by this enum rather than a free-form string so every
/// calculator can exhaustively match the kinds it cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChargeKind {
    Freight,
    Fuel,
    Security,
    OriginHandling,
    DestinationHandling,
    Pickup,
    Delivery,
    Customs,
    DutyTax,
    Other,
}

/// Derived shipment product category used by the service-surcharge variant
/// cascade (§4.6) to pick between a "Domestic", "International", or
/// "All Products" surcharge variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCategory {
    Domestic,
    International,
}

/// Fixed substrings whose presence in an invoice description marks an
/// Express shipment as third-party billed, even when neither endpoint is
/// Australian. See §4.7 / §9 open question 5 — a non-AU shipment without one
/// of these phrases is *not* inferred to be third-party; it is routed to
/// `ReviewRequired` by the dispatcher.
pub const THIRD_PARTY_TAGS: &[&str] = &[
    "3RD PARTY",
    "THIRD PARTY",
    "EXPRESS WORLDWIDE",
    "EXPRESS 3RDCTY",
    "THIRD COUNTRY",
];

/// One invoice to be audited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique invoice number.
    pub invoice_no: String,
    pub mode: Mode,
    /// Free text and/or port/airport code.
    pub origin: String,
    /// Free text and/or port/airport code.
    pub destination: String,
    /// Gross weight.
    pub weight_kg: Decimal,
    /// Chargeable weight, when it differs from gross (always ≥ gross when present).
    pub chargeable_weight_kg: Option<Decimal>,
    pub volume_m3: Option<Decimal>,
    pub service_type: ServiceType,
    /// ISO 4217 currency code of `actual_charges`.
    pub currency: String,
    /// Required whenever `currency != "USD"`.
    pub exchange_rate_to_usd: Option<Decimal>,
    pub actual_charges: BTreeMap<ChargeKind, Decimal>,
    /// Free-text line/service description, used for DOC/NONDOC detection,
    /// third-party tagging, and service-surcharge matching.
    pub description: String,
    /// Air way bill grouping multiple lines of one shipment — used to
    /// borrow a freight line's weight for a zero-weight surcharge line.
    pub awb: Option<String>,
    /// DGF spot-quote identifier, present only for `DgfAir`/`DgfSea`.
    pub quote_id: Option<String>,
}

impl Invoice {
    /// The weight to use for rating: chargeable weight when present, else gross.
    pub fn rating_weight_kg(&self) -> Decimal {
        self.chargeable_weight_kg.unwrap_or(self.weight_kg)
    }

    /// USD conversion rate implied by `currency`/`exchange_rate_to_usd`.
    /// `USD` invoices always convert at 1; anything else requires an
    /// explicit rate (currency conversion is a precondition, never guessed).
    pub fn usd_rate(&self) -> Result<Decimal, AuditError> {
        if self.currency.eq_ignore_ascii_case("USD") {
            return Ok(Decimal::ONE);
        }
        self.exchange_rate_to_usd
            .ok_or_else(|| AuditError::CurrencyMissing {
                invoice_no: self.invoice_no.clone(),
                currency: self.currency.clone(),
            })
    }

    /// A single actual charge converted to USD.
    pub fn actual_usd(&self, kind: ChargeKind) -> Result<Decimal, AuditError> {
        let rate = self.usd_rate()?;
        Ok(self.actual_charges.get(&kind).copied().unwrap_or(Decimal::ZERO) * rate)
    }

    /// Sum of all actual charges converted to USD.
    pub fn total_actual_usd(&self) -> Result<Decimal, AuditError> {
        let rate = self.usd_rate()?;
        Ok(self
            .actual_charges
            .values()
            .copied()
            .sum::<Decimal>()
            * rate)
    }

    /// Whether the description carries one of the [`THIRD_PARTY_TAGS`].
    pub fn has_third_party_tag(&self) -> bool {
        let upper = self.description.to_uppercase();
        THIRD_PARTY_TAGS.iter().any(|tag| upper.contains(tag))
    }

    /// Domestic if both origin and destination resolve to AU, else International.
    /// Drives the service-surcharge variant cascade (§4.6).
    pub fn product_category(&self) -> ProductCategory {
        let origin_au = extract_country(&self.origin).as_deref() == Some("AU");
        let dest_au = extract_country(&self.destination).as_deref() == Some("AU");
        if origin_au && dest_au {
            ProductCategory::Domestic
        } else {
            ProductCategory::International
        }
    }
}

/// Per-charge audit classification, carried on every [`VarianceLineItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditType {
    /// Compared against an expected value derived from a rate card.
    RateCardComparison,
    /// Not auditable — expected is forced to equal actual, variance is 0.
    PassThrough,
    /// Billed but absent from the matched rate card/surcharge catalog.
    AdditionalCharge,
}

/// One charge-kind comparison within an [`AuditResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarianceLineItem {
    pub charge_kind: ChargeKind,
    pub actual_usd: Decimal,
    pub expected_usd: Decimal,
    pub variance_usd: Decimal,
    pub variance_pct: Decimal,
    pub audit_type: AuditType,
}

/// Overall per-invoice verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditStatus {
    Approved,
    ReviewRequired,
    Rejected,
    Error,
    NoRateCard,
}

/// The result of pricing an invoice against one specific rate card /
/// service alternative. The dispatcher may compute more than one of these
/// (e.g. Standard vs Expedite air service) before picking a winner; they
/// are all kept in [`AuditResultDetails::audit_results`] for traceability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsideredRateCard {
    pub rate_card_id: Option<String>,
    pub lane_description: Option<String>,
    pub service: Option<String>,
    pub audit_status: AuditStatus,
    pub total_expected: Decimal,
    pub total_actual: Decimal,
    pub total_variance: Decimal,
    pub variances: Vec<VarianceLineItem>,
    /// Free-form calculation trace (bracket chosen, matched zone, etc.),
    /// kept as JSON since its shape differs per calculator.
    pub calculation_details: serde_json::Value,
    pub status_reason: Option<String>,
}

/// The persisted `details` blob of an [`AuditResult`] (see spec §6).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuditResultDetails {
    pub invoice_details: serde_json::Value,
    pub audit_results: Vec<ConsideredRateCard>,
    /// Non-fatal issues surfaced during the audit (e.g. an ambiguous
    /// service-code variant match, §7 `AmbiguousService`).
    pub warnings: Vec<String>,
}

/// Outcome of auditing one invoice within one batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    pub invoice_no: String,
    pub status: AuditStatus,
    pub total_invoice_amount_usd: Decimal,
    pub total_expected_amount_usd: Decimal,
    pub total_variance_usd: Decimal,
    pub variance_percent: Decimal,
    pub rate_cards_checked: u32,
    pub best_match_identifier: Option<String>,
    pub line_items: Vec<VarianceLineItem>,
    pub details: AuditResultDetails,
}

impl AuditResult {
    /// Build an `error` result for a failure that still has an invoice number.
    pub fn error(invoice_no: impl Into<String>, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            invoice_no: invoice_no.into(),
            status: AuditStatus::Error,
            total_invoice_amount_usd: Decimal::ZERO,
            total_expected_amount_usd: Decimal::ZERO,
            total_variance_usd: Decimal::ZERO,
            variance_percent: Decimal::ZERO,
            rate_cards_checked: 0,
            best_match_identifier: None,
            line_items: Vec::new(),
            details: AuditResultDetails {
                invoice_details: serde_json::Value::Null,
                audit_results: Vec::new(),
                warnings: vec![reason],
            },
        }
    }

    /// Build a `no_rate_card` result — not an error, per §7/§9 open question 2.
    pub fn no_rate_card(invoice_no: impl Into<String>) -> Self {
        Self {
            invoice_no: invoice_no.into(),
            status: AuditStatus::NoRateCard,
            total_invoice_amount_usd: Decimal::ZERO,
            total_expected_amount_usd: Decimal::ZERO,
            total_variance_usd: Decimal::ZERO,
            variance_percent: Decimal::ZERO,
            rate_cards_checked: 0,
            best_match_identifier: None,
            line_items: Vec::new(),
            details: AuditResultDetails::default(),
        }
    }
}

/// Batch run status — a terminal state machine: `Running` → one of
/// `Completed` / `Error` / `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    Running,
    Completed,
    Error,
    Cancelled,
}

/// Verdict counts accumulated over a batch.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BatchCounts {
    pub approved: u32,
    pub review_required: u32,
    pub rejected: u32,
    pub error: u32,
    pub no_rate_card: u32,
}

impl BatchCounts {
    pub fn total(&self) -> u32 {
        self.approved + self.review_required + self.rejected + self.error + self.no_rate_card
    }

    pub fn record(&mut self, status: AuditStatus) {
        match status {
            AuditStatus::Approved => self.approved += 1,
            AuditStatus::ReviewRequired => self.review_required += 1,
            AuditStatus::Rejected => self.rejected += 1,
            AuditStatus::Error => self.error += 1,
            AuditStatus::NoRateCard => self.no_rate_card += 1,
        }
    }
}

/// One batch invocation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRun {
    pub id: String,
    pub name: String,
    pub status: BatchStatus,
    pub counts: BatchCounts,
    pub processing_time_ms: u64,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Carrier- and mode-specific rate card header. The lane-level data
/// (`AirRateEntry`, `OceanRateEntry`, ...) lives in mode-specific tables
/// behind [`crate::core::RateStore`]; this header is what calculators
/// report back as `best_match_identifier` / `rate_card_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateCardHeader {
    pub id: String,
    pub carrier: String,
    pub mode: Mode,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
}
