//! Rate Store facade (component C2).
//!
//! The engine never talks to a database directly — every read goes
//! through [`RateStore`]. Implementations wrap whatever storage the
//! caller already has; the engine only ever sees the typed rows below.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::StoreError;
use super::types::{Invoice, Mode, RateCardHeader};

/// One lane row from an air freight rate card.
#[derive(Debug, Clone)]
pub struct AirLane {
    pub rate_card: RateCardHeader,
    pub origin_port: String,
    pub destination_port: String,
    /// e.g. "Standard" / "Expedite".
    pub service: String,
    pub bracket_under_1000: Decimal,
    pub bracket_1000_to_2000: Decimal,
    pub bracket_2000_to_3000: Decimal,
    pub bracket_at_least_3000: Decimal,
    pub minimum_charge: Decimal,
    pub fuel_rate_per_kg: Decimal,
    pub ptd_freight_charge: Decimal,
    pub ptd_min_charge: Decimal,
    pub destination_min_charge: Decimal,
    pub security_surcharge: Decimal,
    /// Present in the lane schema but not consumed by the current air
    /// calculator (§4.4 does not reference it).
    pub pss: Option<Decimal>,
    /// Per-0.5kg adder beyond the 30kg base; unused by the air calculator,
    /// kept for schema parity with the express adder mechanism.
    pub adder_rate_per_half_kg: Option<Decimal>,
}

impl AirLane {
    /// Pick the bracket rate (`ata_cost`) containing `weight_kg`.
    pub fn bracket_rate(&self, weight_kg: Decimal) -> Decimal {
        if weight_kg < Decimal::from(1000) {
            self.bracket_under_1000
        } else if weight_kg < Decimal::from(2000) {
            self.bracket_1000_to_2000
        } else if weight_kg < Decimal::from(3000) {
            self.bracket_2000_to_3000
        } else {
            self.bracket_at_least_3000
        }
    }
}

/// Per-charge-kind minimum + per-CBM rate pair (ocean LCL).
#[derive(Debug, Clone, Copy)]
pub struct OceanChargeRate {
    pub minimum: Decimal,
    pub per_cbm: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct OceanLcl {
    pub pickup: Option<OceanChargeRate>,
    pub origin_handling: Option<OceanChargeRate>,
    pub freight: Option<OceanChargeRate>,
    pub destination_handling: Option<OceanChargeRate>,
    pub delivery: Option<OceanChargeRate>,
    pub pss: Option<OceanChargeRate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerSize {
    Ft20,
    Ft40,
    Ft40Hc,
}

/// Flat per-container charges for one container size. When the rate card
/// only carries a combined `total`, the calculator folds it into `freight`.
#[derive(Debug, Clone, Default)]
pub struct OceanContainerCharges {
    pub pickup: Option<Decimal>,
    pub origin_handling: Option<Decimal>,
    pub freight: Option<Decimal>,
    pub destination_handling: Option<Decimal>,
    pub delivery: Option<Decimal>,
    pub pss: Option<Decimal>,
    pub total: Option<Decimal>,
}

#[derive(Debug, Clone, Default)]
pub struct OceanFcl {
    pub ft20: Option<OceanContainerCharges>,
    pub ft40: Option<OceanContainerCharges>,
    pub ft40hc: Option<OceanContainerCharges>,
}

impl OceanFcl {
    pub fn for_size(&self, size: ContainerSize) -> Option<&OceanContainerCharges> {
        match size {
            ContainerSize::Ft20 => self.ft20.as_ref(),
            ContainerSize::Ft40 => self.ft40.as_ref(),
            ContainerSize::Ft40Hc => self.ft40hc.as_ref(),
        }
    }
}

/// One ocean rate card lane. Both `lcl` and `fcl` tables may be present;
/// the calculator picks the one matching the invoice's `service_type`.
#[derive(Debug, Clone)]
pub struct OceanLane {
    pub rate_card: RateCardHeader,
    pub lane_origin: String,
    pub lane_destination: String,
    pub cities_included_origin: Vec<String>,
    pub cities_included_destination: Vec<String>,
    pub port_of_loading: Option<String>,
    pub port_of_discharge: Option<String>,
    pub service: String,
    pub lcl: Option<OceanLcl>,
    pub fcl: Option<OceanFcl>,
}

/// Documents vs Non-documents — express rate-table section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateSection {
    Documents,
    NonDocuments,
}

/// Import vs Export — which express rate table to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressServiceType {
    Import,
    Export,
}

/// A weight-banded row from an [`ExpressServiceType`] rate table.
#[derive(Debug, Clone)]
pub struct ExpressRateRow {
    pub weight_from: Decimal,
    pub weight_to: Decimal,
    pub rate: Decimal,
    /// True for adder rows that apply per 0.5 kg above the 30 kg base.
    pub is_multiplier: bool,
}

/// Express third-party weight-banded row, keyed by rate zone letter.
#[derive(Debug, Clone)]
pub struct ThirdPartyRateRow {
    pub weight_from: Decimal,
    pub weight_to: Decimal,
    pub rate: Decimal,
}

/// One row of the service-surcharge catalog (§4.6). The matching cascade
/// that picks a row for a given description lives in
/// [`crate::core::surcharge`]; the store just returns the whole catalog.
#[derive(Debug, Clone)]
pub struct SurchargeRow {
    pub service_code: String,
    pub service_name: String,
    pub charge_type: SurchargeChargeType,
    pub rate: Decimal,
    pub minimum_charge: Option<Decimal>,
    /// `None` means "All Products" — matches either category.
    pub products_applicable: Option<super::types::ProductCategory>,
    /// When true, an exact/substring match on `service_name` is skipped
    /// in favor of walking sibling rows sharing `original_service_code`.
    pub needs_variant_lookup: bool,
    pub original_service_code: Option<String>,
    pub variant_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurchargeChargeType {
    Flat,
    PerKg,
    /// Gated on a weight threshold (the `YY` overweight-piece code).
    PerShipmentWeightGated { threshold_kg: Decimal },
    BondedStorageFormula,
}

/// One DGF spot quote.
#[derive(Debug, Clone)]
pub struct SpotQuote {
    pub quote_id: String,
    pub mode: Mode,
    pub rate_per_kg: Option<Decimal>,
    pub rate_per_cbm: Option<Decimal>,
    pub handling_fees: Decimal,
    pub quoted_currency: String,
    pub quote_fx_rate: Decimal,
}

/// Lightweight invoice listing row, as returned by `list_ytd_invoices`.
#[derive(Debug, Clone)]
pub struct InvoiceSummary {
    pub invoice_no: String,
    pub mode: Mode,
}

/// Known alternate port-code pairs. When a direct air-lane lookup finds
/// nothing, the caller retries with the alias (§4.2) — Shanghai Pudong
/// and Shanghai's generic city code are billed interchangeably by some
/// carriers.
pub const PORT_ALIASES: &[(&str, &str)] = &[("CNPVG", "CNSHA")];

/// The alias for `code`, if any, in either direction.
pub fn port_alias(code: &str) -> Option<&'static str> {
    PORT_ALIASES.iter().find_map(|(a, b)| {
        if a.eq_ignore_ascii_case(code) {
            Some(*b)
        } else if b.eq_ignore_ascii_case(code) {
            Some(*a)
        } else {
            None
        }
    })
}

/// Typed, read-only view over rate cards, zone maps, service catalogs,
/// and spot quotes (component C2). Every method returns an empty
/// collection or `None` rather than erroring when nothing matches — an
/// absent rate is a normal outcome the calculators and variance
/// classifier are built to handle, not a store failure.
pub trait RateStore: Send + Sync {
    fn get_invoice(&self, invoice_no: &str) -> Result<Option<Invoice>, StoreError>;

    fn list_ytd_invoices(&self) -> Result<Vec<InvoiceSummary>, StoreError>;

    /// Exact port-code lookup with the `CNPVG ↔ CNSHA` aliasing rule
    /// applied by the caller when the primary lookup is empty.
    fn find_air_lanes(&self, origin_port: &str, dest_port: &str) -> Result<Vec<AirLane>, StoreError>;

    /// Every ocean lane on file; fuzzy scoring (C4) filters in memory.
    fn list_ocean_lanes(&self) -> Result<Vec<OceanLane>, StoreError>;

    fn lookup_express_zone(&self, origin_country: &str, dest_country: &str) -> Result<Option<String>, StoreError>;

    fn lookup_express_rate(
        &self,
        service_type: ExpressServiceType,
        section: RateSection,
        zone: &str,
        weight_kg: Decimal,
    ) -> Result<Option<ExpressRateRow>, StoreError>;

    fn lookup_express_multiplier(
        &self,
        service_type: ExpressServiceType,
        section: RateSection,
        zone: &str,
        weight_kg: Decimal,
    ) -> Result<Option<ExpressRateRow>, StoreError>;

    fn lookup_third_party_zone(&self, country: &str) -> Result<Option<String>, StoreError>;

    fn lookup_third_party_matrix(&self, origin_zone: &str, dest_zone: &str) -> Result<Option<String>, StoreError>;

    fn lookup_third_party_weight_rate(&self, weight_kg: Decimal, rate_zone: &str) -> Result<Option<ThirdPartyRateRow>, StoreError>;

    fn lookup_au_domestic_matrix(&self, origin_zone: u8, dest_zone: u8) -> Result<Option<String>, StoreError>;

    /// Nearest-weight fallback is the caller's responsibility; this
    /// returns every row for `rate_zone` so the calculator can pick one.
    fn list_au_domestic_rates(&self, rate_zone: &str) -> Result<Vec<(Decimal, Decimal)>, StoreError>;

    /// The full service-surcharge catalog; the matching cascade (§4.6)
    /// runs over this in memory.
    fn list_service_surcharges(&self) -> Result<Vec<SurchargeRow>, StoreError>;

    fn lookup_dgf_quote(&self, quote_id: &str) -> Result<Option<SpotQuote>, StoreError>;
}

/// In-memory [`RateStore`] used by tests, demos, and benchmarks. Not
/// intended for production use — callers wrap their real storage layer.
#[derive(Debug, Default)]
pub struct InMemoryRateStore {
    pub invoices: Vec<Invoice>,
    pub air_lanes: Vec<AirLane>,
    pub ocean_lanes: Vec<OceanLane>,
    pub express_zones: Vec<((String, String), String)>,
    pub express_rates: Vec<(ExpressServiceType, RateSection, String, ExpressRateRow)>,
    pub third_party_zones: Vec<(String, String)>,
    pub third_party_matrix: Vec<((String, String), String)>,
    pub third_party_rates: Vec<(String, ThirdPartyRateRow)>,
    pub au_domestic_matrix: Vec<((u8, u8), String)>,
    pub au_domestic_rates: Vec<(String, Decimal, Decimal)>,
    pub surcharges: Vec<SurchargeRow>,
    pub spot_quotes: Vec<SpotQuote>,
    pub rate_card_valid_from: Option<NaiveDate>,
}

impl RateStore for InMemoryRateStore {
    fn get_invoice(&self, invoice_no: &str) -> Result<Option<Invoice>, StoreError> {
        Ok(self.invoices.iter().find(|i| i.invoice_no == invoice_no).cloned())
    }

    fn list_ytd_invoices(&self) -> Result<Vec<InvoiceSummary>, StoreError> {
        Ok(self
            .invoices
            .iter()
            .map(|i| InvoiceSummary { invoice_no: i.invoice_no.clone(), mode: i.mode })
            .collect())
    }

    fn find_air_lanes(&self, origin_port: &str, dest_port: &str) -> Result<Vec<AirLane>, StoreError> {
        Ok(self
            .air_lanes
            .iter()
            .filter(|l| l.origin_port.eq_ignore_ascii_case(origin_port) && l.destination_port.eq_ignore_ascii_case(dest_port))
            .cloned()
            .collect())
    }

    fn list_ocean_lanes(&self) -> Result<Vec<OceanLane>, StoreError> {
        Ok(self.ocean_lanes.clone())
    }

    fn lookup_express_zone(&self, origin_country: &str, dest_country: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .express_zones
            .iter()
            .find(|((o, d), _)| o.eq_ignore_ascii_case(origin_country) && d.eq_ignore_ascii_case(dest_country))
            .map(|(_, z)| z.clone()))
    }

    fn lookup_express_rate(
        &self,
        service_type: ExpressServiceType,
        section: RateSection,
        zone: &str,
        weight_kg: Decimal,
    ) -> Result<Option<ExpressRateRow>, StoreError> {
        Ok(self
            .express_rates
            .iter()
            .filter(|(s, sec, z, row)| *s == service_type && *sec == section && z == zone && !row.is_multiplier)
            .map(|(_, _, _, row)| row)
            .find(|row| row.weight_from <= weight_kg && weight_kg <= row.weight_to)
            .cloned())
    }

    fn lookup_express_multiplier(
        &self,
        service_type: ExpressServiceType,
        section: RateSection,
        zone: &str,
        weight_kg: Decimal,
    ) -> Result<Option<ExpressRateRow>, StoreError> {
        Ok(self
            .express_rates
            .iter()
            .filter(|(s, sec, z, row)| *s == service_type && *sec == section && z == zone && row.is_multiplier)
            .map(|(_, _, _, row)| row)
            .find(|row| row.weight_from <= weight_kg && weight_kg <= row.weight_to)
            .cloned())
    }

    fn lookup_third_party_zone(&self, country: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .third_party_zones
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(country))
            .map(|(_, z)| z.clone()))
    }

    fn lookup_third_party_matrix(&self, origin_zone: &str, dest_zone: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .third_party_matrix
            .iter()
            .find(|((o, d), _)| o == origin_zone && d == dest_zone)
            .map(|(_, z)| z.clone()))
    }

    fn lookup_third_party_weight_rate(&self, weight_kg: Decimal, rate_zone: &str) -> Result<Option<ThirdPartyRateRow>, StoreError> {
        Ok(self
            .third_party_rates
            .iter()
            .filter(|(z, _)| z == rate_zone)
            .map(|(_, row)| row)
            .find(|row| row.weight_from <= weight_kg && weight_kg <= row.weight_to)
            .cloned())
    }

    fn lookup_au_domestic_matrix(&self, origin_zone: u8, dest_zone: u8) -> Result<Option<String>, StoreError> {
        Ok(self
            .au_domestic_matrix
            .iter()
            .find(|((o, d), _)| *o == origin_zone && *d == dest_zone)
            .map(|(_, z)| z.clone()))
    }

    fn list_au_domestic_rates(&self, rate_zone: &str) -> Result<Vec<(Decimal, Decimal)>, StoreError> {
        Ok(self
            .au_domestic_rates
            .iter()
            .filter(|(z, _, _)| z == rate_zone)
            .map(|(_, weight, rate)| (*weight, *rate))
            .collect())
    }

    fn list_service_surcharges(&self) -> Result<Vec<SurchargeRow>, StoreError> {
        Ok(self.surcharges.clone())
    }

    fn lookup_dgf_quote(&self, quote_id: &str) -> Result<Option<SpotQuote>, StoreError> {
        Ok(self.spot_quotes.iter().find(|q| q.quote_id == quote_id).cloned())
    }
}
