//! Synthesized fallback estimate, used when every provider fails or declines.
//!
//! Values come from a static state-average table with randomized variance,
//! not from a live lookup; the result is tagged with
//! `county = "Estimated Data"` so consumers can tell.

use rand::Rng;

use crate::model::{
    AddressQuery, Confidence, MarketValue, PropertyInfo, PropertyValuation, ValueRange,
};

const DEFAULT_BASE_VALUE: u64 = 400_000;

const STATE_BASE_VALUES: &[(&str, u64)] = &[
    ("CA", 850_000),
    ("NY", 650_000),
    ("FL", 400_000),
    ("TX", 350_000),
    ("NJ", 500_000),
    ("MA", 650_000),
    ("WA", 750_000),
    ("OH", 200_000),
];

/// Average value for a two-letter state code, or the default base when the
/// state is absent or unrecognized.
fn base_value_for_state(state: Option<&str>) -> u64 {
    let Some(state) = state else {
        return DEFAULT_BASE_VALUE;
    };

    let code = state.trim().to_uppercase();
    STATE_BASE_VALUES
        .iter()
        .find(|(s, _)| *s == code)
        .map_or(DEFAULT_BASE_VALUE, |(_, value)| *value)
}

/// Produce a structurally valid valuation for any query. Never fails.
///
/// Randomness is confined to the multiplier and the year built; callers that
/// need reproducible output pass a seeded RNG.
pub fn synthesize_estimate<R: Rng>(query: &AddressQuery, rng: &mut R) -> PropertyValuation {
    let multiplier = rng.gen_range(0.8..=1.2);
    let year_built = rng.gen_range(1995..=2019);
    estimate_with(query, multiplier, year_built)
}

fn estimate_with(query: &AddressQuery, multiplier: f64, year_built: u16) -> PropertyValuation {
    let base = base_value_for_state(query.state.as_deref());
    let estimated_value = (base as f64 * multiplier).floor() as u64;

    let variance = estimated_value as f64 * 0.15;
    let value_range = ValueRange {
        low: (estimated_value as f64 - variance).floor() as u64,
        high: (estimated_value as f64 + variance).floor() as u64,
    };

    // Fixed 25/75 land/building split; a convention, not measured data.
    let market_value = MarketValue {
        land: (estimated_value as f64 * 0.25).floor() as u64,
        building: (estimated_value as f64 * 0.75).floor() as u64,
        total: estimated_value,
    };

    let echo = |field: &Option<String>| {
        Some(field.clone().unwrap_or_else(|| "Unknown".to_string()))
    };

    PropertyValuation {
        provider: "estimate".to_string(),
        estimated_value,
        value_range,
        // Synthesized data is never reported as high confidence.
        confidence: Confidence::Medium,
        market_value: Some(market_value),
        property_info: Some(PropertyInfo {
            county: Some("Estimated Data".to_string()),
            city: echo(&query.city),
            state: echo(&query.state),
            zip: echo(&query.zip),
            acreage: Some(0.25),
            year_built: Some(year_built),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn query_for_state(state: Option<&str>) -> AddressQuery {
        AddressQuery {
            street: "1 Main St".to_string(),
            city: None,
            state: state.map(str::to_string),
            zip: None,
        }
    }

    #[test]
    fn california_with_unit_multiplier_matches_table() {
        let valuation = estimate_with(&query_for_state(Some("CA")), 1.0, 2005);

        assert_eq!(valuation.estimated_value, 850_000);
        assert_eq!(valuation.value_range, ValueRange { low: 722_500, high: 977_500 });
        assert_eq!(
            valuation.market_value,
            Some(MarketValue { land: 212_500, building: 637_500, total: 850_000 })
        );
        assert_eq!(valuation.confidence, Confidence::Medium);
        assert_eq!(valuation.provider, "estimate");
    }

    #[test]
    fn synthetic_marker_and_query_echo() {
        let query = AddressQuery {
            street: "1 Main St".to_string(),
            city: Some("Columbus".to_string()),
            state: Some("OH".to_string()),
            zip: None,
        };

        let info = estimate_with(&query, 1.0, 2001).property_info.unwrap();

        assert_eq!(info.county.as_deref(), Some("Estimated Data"));
        assert_eq!(info.city.as_deref(), Some("Columbus"));
        assert_eq!(info.state.as_deref(), Some("OH"));
        assert_eq!(info.zip.as_deref(), Some("Unknown"));
        assert_eq!(info.acreage, Some(0.25));
        assert_eq!(info.year_built, Some(2001));
    }

    #[test]
    fn unknown_state_falls_back_to_default_base() {
        let valuation = estimate_with(&query_for_state(Some("ZZ")), 1.0, 2000);
        assert_eq!(valuation.estimated_value, 400_000);
    }

    #[test]
    fn missing_state_falls_back_to_default_base() {
        let valuation = estimate_with(&query_for_state(None), 1.0, 2000);
        assert_eq!(valuation.estimated_value, 400_000);
    }

    #[test]
    fn state_lookup_ignores_case_and_whitespace() {
        let valuation = estimate_with(&query_for_state(Some(" wa ")), 1.0, 2000);
        assert_eq!(valuation.estimated_value, 750_000);
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let query = query_for_state(Some("NJ"));

        let a = synthesize_estimate(&query, &mut StdRng::seed_from_u64(42));
        let b = synthesize_estimate(&query, &mut StdRng::seed_from_u64(42));

        assert_eq!(a, b);
    }

    #[test]
    fn sampled_values_stay_in_bounds() {
        let query = query_for_state(Some("TX"));
        let base = 350_000u64;

        for seed in 0..100 {
            let valuation = synthesize_estimate(&query, &mut StdRng::seed_from_u64(seed));

            let floor = (base as f64 * 0.8).floor() as u64;
            let ceil = (base as f64 * 1.2).floor() as u64;
            assert!(valuation.estimated_value >= floor);
            assert!(valuation.estimated_value <= ceil);

            assert!(valuation.value_range.low <= valuation.estimated_value);
            assert!(valuation.estimated_value <= valuation.value_range.high);

            let year = valuation.property_info.unwrap().year_built.unwrap();
            assert!((1995..=2019).contains(&year));
        }
    }
}
