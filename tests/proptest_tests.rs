//! Property-based coverage for the universal invariants in spec §8.

use proptest::prelude::*;
use rateaudit::core::store::AirLane;
use rateaudit::core::types::{AuditStatus, AuditType, ChargeKind, Mode, RateCardHeader, VarianceLineItem};
use rateaudit::core::variance::classify;
use rateaudit::core::zone::{au_domestic_zone, extract_country};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn arb_money() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_line() -> impl Strategy<Value = VarianceLineItem> {
    (arb_money(), arb_money(), 0u8..3).prop_map(|(actual, expected, kind)| {
        let audit_type = match kind {
            0 => AuditType::RateCardComparison,
            1 => AuditType::PassThrough,
            _ => AuditType::AdditionalCharge,
        };
        VarianceLineItem {
            charge_kind: ChargeKind::Freight,
            actual_usd: actual,
            expected_usd: expected,
            variance_usd: actual - expected,
            variance_pct: Decimal::ZERO,
            audit_type,
        }
    })
}

proptest! {
    /// Item 1: total_variance_usd always equals sum(actual) - sum(expected).
    #[test]
    fn total_variance_matches_actual_minus_expected(items in prop::collection::vec(arb_line(), 0..12)) {
        let c = classify(&items);
        let actual_sum: Decimal = items.iter().map(|l| l.actual_usd).sum();
        let expected_sum: Decimal = items.iter().map(|l| l.expected_usd).sum();
        prop_assert_eq!(c.total_variance_usd, actual_sum - expected_sum);
    }

    /// Item 2: pass-through and additional-charge lines never move auditable variance.
    #[test]
    fn only_rate_card_lines_affect_auditable_variance(items in prop::collection::vec(arb_line(), 0..12)) {
        let c = classify(&items);
        let expected: Decimal = items
            .iter()
            .filter(|l| l.audit_type == AuditType::RateCardComparison)
            .map(|l| l.variance_usd)
            .sum();
        prop_assert_eq!(c.auditable_variance_usd, expected);
    }

    /// Item 3: verdict is a strict partition of the variance-percent axis,
    /// with undercharges always approved regardless of magnitude.
    #[test]
    fn verdict_is_a_consistent_partition(actual in arb_money(), expected in (1i64..1_000_000).prop_map(|c| Decimal::new(c, 2))) {
        let item = VarianceLineItem {
            charge_kind: ChargeKind::Freight,
            actual_usd: actual,
            expected_usd: expected,
            variance_usd: actual - expected,
            variance_pct: Decimal::ZERO,
            audit_type: AuditType::RateCardComparison,
        };
        let c = classify(&[item]);
        if actual <= expected {
            prop_assert_eq!(c.status, AuditStatus::Approved);
        } else {
            let pct = ((actual - expected) / expected * dec!(100)).abs();
            if pct <= dec!(5) {
                prop_assert_eq!(c.status, AuditStatus::Approved);
            } else if pct <= dec!(15) {
                prop_assert_eq!(c.status, AuditStatus::ReviewRequired);
            } else {
                prop_assert_eq!(c.status, AuditStatus::Rejected);
            }
        }
    }

    /// Item 8: country/zone resolution is idempotent and case-insensitive.
    #[test]
    fn zone_resolution_is_idempotent(seed in "[A-Za-z ]{0,20}") {
        let address = format!("{seed}; Melbourne; VIC; AU");
        prop_assert_eq!(extract_country(&address), extract_country(&address));
        prop_assert_eq!(au_domestic_zone(&address), au_domestic_zone(&address));

        let upper = address.to_uppercase();
        let lower = address.to_lowercase();
        prop_assert_eq!(au_domestic_zone(&upper), au_domestic_zone(&lower));
    }

    /// Item 9: the air bracket lookup never straddles a boundary —
    /// exactly one bracket rate applies to any weight.
    #[test]
    fn air_bracket_selection_has_no_off_by_one(weight_kg in 0i64..5000) {
        let lane = AirLane {
            rate_card: RateCardHeader {
                id: "AC".into(),
                carrier: "Test".into(),
                mode: Mode::Air,
                valid_from: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                valid_to: chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            },
            origin_port: "AAA".into(),
            destination_port: "BBB".into(),
            service: "Standard".into(),
            bracket_under_1000: dec!(2.50),
            bracket_1000_to_2000: dec!(2.10),
            bracket_2000_to_3000: dec!(1.90),
            bracket_at_least_3000: dec!(1.70),
            minimum_charge: dec!(0),
            fuel_rate_per_kg: dec!(0),
            ptd_freight_charge: dec!(0),
            ptd_min_charge: dec!(0),
            destination_min_charge: dec!(0),
            security_surcharge: dec!(0),
            pss: None,
            adder_rate_per_half_kg: None,
        };
        let weight = Decimal::from(weight_kg);
        let rate = lane.bracket_rate(weight);
        let expected = if weight < dec!(1000) {
            dec!(2.50)
        } else if weight < dec!(2000) {
            dec!(2.10)
        } else if weight < dec!(3000) {
            dec!(1.90)
        } else {
            dec!(1.70)
        };
        prop_assert_eq!(rate, expected);
    }

    /// Item 10: the express >30kg formula (base + adder * extra-half-kg-units)
    /// agrees with the direct arithmetic to within a cent.
    #[test]
    fn express_over_30kg_formula_matches_direct_arithmetic(
        base in (0i64..100_000).prop_map(|c| Decimal::new(c, 2)),
        adder_per_half_kg in (1i64..10_000).prop_map(|c| Decimal::new(c, 2)),
        extra_half_kg_units in 1i64..200,
    ) {
        let weight = dec!(30) + Decimal::new(extra_half_kg_units, 0) * dec!(0.5);
        let formula = base + adder_per_half_kg * (weight - dec!(30)) / dec!(0.5);
        let direct = base + adder_per_half_kg * Decimal::from(extra_half_kg_units);
        prop_assert!((formula - direct).abs() <= dec!(0.01));
    }
}
