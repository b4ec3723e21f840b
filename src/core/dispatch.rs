//! Audit Dispatcher (component C6, §4.7).
//!
//! State-free: given an invoice's mode and the AU/non-AU status of its
//! origin and destination, decide which calculator family handles it.
//! Express is the only mode with a routing table of its own — air, ocean,
//! and DGF route straight through to their one calculator regardless of
//! origin/destination.

use super::types::{Invoice, Mode};
use super::zone::extract_country;

/// Which calculator family an invoice should be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Air,
    Ocean,
    ExpressAuDomestic,
    ExpressExport,
    ExpressImport,
    ExpressThirdParty,
    /// Neither endpoint is AU, mode is `express`, and no third-party tag
    /// is present in the description — not enough information to audit.
    ExpressReviewRequired,
    DgfAir,
    DgfSea,
}

fn is_au(address: &str) -> bool {
    extract_country(address).as_deref() == Some("AU")
}

/// Route an invoice to its calculator family (§4.7's dispatch table).
pub fn route(invoice: &Invoice) -> Route {
    match invoice.mode {
        Mode::Air => Route::Air,
        Mode::Ocean => Route::Ocean,
        Mode::DgfAir => Route::DgfAir,
        Mode::DgfSea => Route::DgfSea,
        Mode::AuDomestic | Mode::Express | Mode::Express3p => {
            let origin_au = is_au(&invoice.origin);
            let dest_au = is_au(&invoice.destination);
            match (origin_au, dest_au) {
                (true, true) => Route::ExpressAuDomestic,
                (true, false) => Route::ExpressExport,
                (false, true) => Route::ExpressImport,
                (false, false) => {
                    if invoice.has_third_party_tag() {
                        Route::ExpressThirdParty
                    } else {
                        Route::ExpressReviewRequired
                    }
                }
            }
        }
    }
}
