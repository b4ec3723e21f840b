//! Fuzzy ocean lane matching (component C4, §4.3).

use crate::core::store::OceanLane;

use super::fuzzy::fuzzy_location_score;

/// One scored candidate lane.
#[derive(Debug, Clone)]
pub struct ScoredLane<'a> {
    pub lane: &'a OceanLane,
    pub final_score: f64,
}

fn port_or_fuzzy_score(invoice_locator: &str, port_code: Option<&str>, lane_locator: &str, cities: &[String]) -> f64 {
    let mut score = 0.0;
    if let Some(port) = port_code {
        if !port.is_empty() && !invoice_locator.is_empty() {
            if port.eq_ignore_ascii_case(invoice_locator) {
                score = 1.0;
            } else if port.to_uppercase().contains(&invoice_locator.to_uppercase())
                || invoice_locator.to_uppercase().contains(&port.to_uppercase())
            {
                score = 0.95;
            }
        }
    }

    if score < 0.5 {
        score = fuzzy_location_score(invoice_locator, lane_locator);
    }

    if score < 0.6 {
        for city in cities {
            let city_score = fuzzy_location_score(invoice_locator, city);
            if city_score > score {
                score = city_score;
            }
        }
    }

    score
}

/// Score every lane against an invoice's `(origin, destination)` pair and
/// an optional service-type hint, returning only candidates where both
/// endpoint scores are ≥ 0.6, sorted by `final_score` descending.
pub fn find_candidates<'a>(lanes: &'a [OceanLane], origin: &str, destination: &str, service_hint: Option<&str>) -> Vec<ScoredLane<'a>> {
    let mut candidates: Vec<ScoredLane<'a>> = lanes
        .iter()
        .filter_map(|lane| {
            let origin_score = port_or_fuzzy_score(
                origin,
                lane.port_of_loading.as_deref(),
                &lane.lane_origin,
                &lane.cities_included_origin,
            );
            let destination_score = port_or_fuzzy_score(
                destination,
                lane.port_of_discharge.as_deref(),
                &lane.lane_destination,
                &lane.cities_included_destination,
            );

            if origin_score < 0.6 || destination_score < 0.6 {
                return None;
            }

            let combined = (origin_score + destination_score) / 2.0;
            let service_bonus = match service_hint {
                Some(hint) if hint.eq_ignore_ascii_case(&lane.service) => 0.1,
                _ => 0.0,
            };
            let final_score = (combined + service_bonus).min(1.0);

            Some(ScoredLane { lane, final_score })
        })
        .collect();

    candidates.sort_by(|a, b| b.final_score.partial_cmp(&a.final_score).unwrap_or(std::cmp::Ordering::Equal));
    candidates
}
