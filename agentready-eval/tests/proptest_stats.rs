use agentready_eval::stats::{SignificanceCriteria, cohens_d, compare, students_t_test};
use agentready_types::eval::Significance;
use proptest::prelude::*;

fn scores() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..100.0, 2..12)
}

proptest! {
    #[test]
    fn p_value_is_a_probability(a in scores(), b in scores()) {
        if let Ok(test) = students_t_test(&a, &b) {
            prop_assert!((0.0..=1.0).contains(&test.p), "p = {}", test.p);
            prop_assert_eq!(test.df, (a.len() + b.len() - 2) as f64);
        }
    }

    #[test]
    fn swapping_groups_flips_signs_only(a in scores(), b in scores()) {
        if let (Ok(ab), Ok(ba)) = (students_t_test(&a, &b), students_t_test(&b, &a)) {
            prop_assert!((ab.t + ba.t).abs() < 1e-9);
            prop_assert!((ab.p - ba.p).abs() < 1e-9);
        }
        if let (Some(ab), Some(ba)) = (cohens_d(&a, &b), cohens_d(&b, &a)) {
            prop_assert!((ab + ba).abs() < 1e-9);
        }
    }

    #[test]
    fn significance_requires_both_criteria(a in scores(), b in scores()) {
        let criteria = SignificanceCriteria::default();
        let c = compare(&a, &b, &criteria);
        match c.significance {
            Significance::Significant => {
                prop_assert!(c.p_value.unwrap_or(1.0) < criteria.p_threshold);
                prop_assert!(c.cohens_d.unwrap_or(0.0).abs() > criteria.effect_threshold);
            }
            Significance::NotSignificant => {
                prop_assert!(c.p_value.is_some() && c.cohens_d.is_some());
            }
            Significance::InsufficientData { .. } => {
                prop_assert!(c.p_value.is_none() && c.cohens_d.is_none());
            }
        }
    }
}
