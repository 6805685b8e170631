use autobreak_scoring::{
    log_sigmoid_neg, lookup, EdgeProfile, ScoreTerm, ScoringFunction, TERM_TABLE,
};
use proptest::prelude::*;

fn term_strategy() -> impl Strategy<Value = String> {
    (0..TERM_TABLE.len()).prop_flat_map(|i| {
        let descriptor = &TERM_TABLE[i];
        let arity = descriptor.defaults.len();
        let tolerance = descriptor.has_tolerance;
        (
            Just(descriptor.name),
            -1_000.0..1_000.0f64,
            0.01..100.0f64,
            0..=arity,
        )
            .prop_map(move |(name, first, second, given)| {
                let params = [first, if tolerance { second } else { first }];
                let mut text = name.to_string();
                for p in &params[..given] {
                    text.push_str(&format!(":{p}"));
                }
                text
            })
    })
}

fn profile_strategy() -> impl Strategy<Value = EdgeProfile> {
    (0..200usize, 0.0..100.0f64, 0..60usize, -50.0..0.0f64, 1..6usize).prop_map(
        |(length, max_tm, max_segment_length, log_probability, segments)| EdgeProfile {
            length,
            segment_count: segments,
            max_tm,
            max_segment_length,
            has14: max_segment_length >= 14,
            has16: max_segment_length >= 16,
            log_probability,
            structure: (segments * segments) as f64,
            ..EdgeProfile::default()
        },
    )
}

proptest! {
    #[test]
    fn prop_terms_survive_display_and_parse(text in term_strategy()) {
        let term = ScoreTerm::parse(&text).unwrap();
        let again = ScoreTerm::parse(&term.to_string()).unwrap();
        prop_assert_eq!(again, term);
        let descriptor = lookup(term.name()).unwrap();
        prop_assert_eq!(term.parameters().len(), descriptor.defaults.len());
    }

    #[test]
    fn prop_gaussian_terms_peak_at_mean(
        mean in 0..200usize,
        tolerance in 0.5..50.0f64,
        profile in profile_strategy(),
    ) {
        let gauss = ScoreTerm::parse(&format!("glength:{mean}:{tolerance}")).unwrap();
        let log_gauss = ScoreTerm::parse(&format!("llength:{mean}:{tolerance}")).unwrap();

        let value = gauss.evaluate(&profile);
        prop_assert!((0.0..=1.0).contains(&value));
        prop_assert!(log_gauss.evaluate(&profile) <= 0.0);

        let centred = EdgeProfile { length: mean, ..profile };
        prop_assert_eq!(gauss.evaluate(&centred), 1.0);
        prop_assert_eq!(log_gauss.evaluate(&centred), 0.0);
        prop_assert!(value <= gauss.evaluate(&centred));
    }

    #[test]
    fn prop_product_needs_two_terms(
        text in term_strategy(),
        other in term_strategy(),
        profile in profile_strategy(),
    ) {
        let single_sum = ScoringFunction::parse(&[text.as_str()], &["sum"]).unwrap();
        let single_both = ScoringFunction::parse(&[text.as_str()], &["sum", "product"]).unwrap();
        prop_assert_eq!(single_both.evaluate(&profile), single_sum.evaluate(&profile));

        let pair = ScoringFunction::parse(&[text.as_str(), other.as_str()], &["product"]).unwrap();
        let values: Vec<f64> = pair.terms().iter().map(|t| t.evaluate(&profile)).collect();
        let expected = values[0] * values[1];
        let actual = pair.evaluate(&profile);
        prop_assert!(actual == expected || (actual.is_nan() && expected.is_nan()));
    }

    #[test]
    fn prop_structure_scales_squared_segments(
        factor in -10.0..10.0f64,
        profile in profile_strategy(),
    ) {
        let term = ScoreTerm::parse(&format!("structure:{factor}")).unwrap();
        let squared = (profile.segment_count * profile.segment_count) as f64;
        prop_assert_eq!(term.evaluate(&profile), factor * squared);
    }

    #[test]
    fn prop_log_sigmoid_is_monotone_and_finite(a in -1e6..1e6f64, b in -1e6..1e6f64) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (f_lo, f_hi) = (log_sigmoid_neg(lo), log_sigmoid_neg(hi));
        prop_assert!(f_lo.is_finite() && f_hi.is_finite());
        prop_assert!(f_lo >= f_hi);
        prop_assert!(f_lo <= 0.0);
        prop_assert!(f_hi >= -hi.max(0.0) - std::f64::consts::LN_2 - 1e-9);
    }
}
