use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::error::AuditError;
use super::types::*;

/// Builder for constructing an [`Invoice`] to audit.
///
/// ```
/// use rateaudit::core::*;
/// use rust_decimal_macros::dec;
///
/// let invoice = InvoiceBuilder::new("INV-0001", Mode::Air, "HKG", "FRA")
///     .weight_kg(dec!(820))
///     .service_type(ServiceType::Export)
///     .charge(ChargeKind::Freight, dec!(1640.00))
///     .charge(ChargeKind::Security, dec!(45.00))
///     .build()
///     .unwrap();
/// ```
pub struct InvoiceBuilder {
    invoice_no: String,
    mode: Mode,
    origin: String,
    destination: String,
    weight_kg: Decimal,
    chargeable_weight_kg: Option<Decimal>,
    volume_m3: Option<Decimal>,
    service_type: ServiceType,
    currency: String,
    exchange_rate_to_usd: Option<Decimal>,
    actual_charges: BTreeMap<ChargeKind, Decimal>,
    description: String,
    awb: Option<String>,
    quote_id: Option<String>,
}

impl InvoiceBuilder {
    /// Create a new builder with the required mode and origin/destination.
    /// Weight defaults to zero and must be set via [`Self::weight_kg`]
    /// for any mode that rates by weight.
    pub fn new(invoice_no: impl Into<String>, mode: Mode, origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            invoice_no: invoice_no.into(),
            mode,
            origin: origin.into(),
            destination: destination.into(),
            weight_kg: Decimal::ZERO,
            chargeable_weight_kg: None,
            volume_m3: None,
            service_type: ServiceType::Export,
            currency: "USD".to_string(),
            exchange_rate_to_usd: None,
            actual_charges: BTreeMap::new(),
            description: String::new(),
            awb: None,
            quote_id: None,
        }
    }

    pub fn weight_kg(mut self, weight: Decimal) -> Self {
        self.weight_kg = weight;
        self
    }

    pub fn chargeable_weight_kg(mut self, weight: Decimal) -> Self {
        self.chargeable_weight_kg = Some(weight);
        self
    }

    pub fn volume_m3(mut self, volume: Decimal) -> Self {
        self.volume_m3 = Some(volume);
        self
    }

    pub fn service_type(mut self, service_type: ServiceType) -> Self {
        self.service_type = service_type;
        self
    }

    /// Set the invoice currency. Defaults to `"USD"`, for which no
    /// exchange rate is required.
    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = code.into();
        self
    }

    pub fn exchange_rate_to_usd(mut self, rate: Decimal) -> Self {
        self.exchange_rate_to_usd = Some(rate);
        self
    }

    /// Record one actual charge. Calling this twice for the same kind
    /// overwrites the previous value.
    pub fn charge(mut self, kind: ChargeKind, amount: Decimal) -> Self {
        self.actual_charges.insert(kind, amount);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    pub fn awb(mut self, awb: impl Into<String>) -> Self {
        self.awb = Some(awb.into());
        self
    }

    pub fn quote_id(mut self, quote_id: impl Into<String>) -> Self {
        self.quote_id = Some(quote_id.into());
        self
    }

    /// Build the invoice, rejecting a non-USD currency with no exchange rate.
    pub fn build(self) -> Result<Invoice, AuditError> {
        if !self.currency.eq_ignore_ascii_case("USD") && self.exchange_rate_to_usd.is_none() {
            return Err(AuditError::CurrencyMissing {
                invoice_no: self.invoice_no,
                currency: self.currency,
            });
        }
        Ok(Invoice {
            invoice_no: self.invoice_no,
            mode: self.mode,
            origin: self.origin,
            destination: self.destination,
            weight_kg: self.weight_kg,
            chargeable_weight_kg: self.chargeable_weight_kg,
            volume_m3: self.volume_m3,
            service_type: self.service_type,
            currency: self.currency,
            exchange_rate_to_usd: self.exchange_rate_to_usd,
            actual_charges: self.actual_charges,
            description: self.description,
            awb: self.awb,
            quote_id: self.quote_id,
        })
    }
}
