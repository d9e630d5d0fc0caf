//! Two-sample statistics for before/after benchmark comparisons.
//!
//! Student's t-test with pooled variance (df = n₁ + n₂ − 2), a two-sided
//! p-value from the regularised incomplete beta function, and Cohen's d with
//! the same pooled standard deviation. Any undefined statistic yields
//! [`Significance::InsufficientData`] instead of a verdict.

use agentready_types::eval::{EffectLabel, Significance};

/// Thresholds for the dual-criterion significance verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignificanceCriteria {
    pub p_threshold: f64,
    pub effect_threshold: f64,
    pub min_samples: usize,
}

impl Default for SignificanceCriteria {
    fn default() -> Self {
        Self {
            p_threshold: 0.05,
            effect_threshold: 0.2,
            min_samples: 2,
        }
    }
}

pub fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    Some(xs.iter().sum::<f64>() / xs.len() as f64)
}

/// Unbiased (n − 1) variance.
pub fn sample_variance(xs: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let m = mean(xs)?;
    Some(xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64)
}

pub fn std_dev(xs: &[f64]) -> Option<f64> {
    sample_variance(xs).map(f64::sqrt)
}

fn pooled_variance(a: &[f64], b: &[f64]) -> Option<f64> {
    let (va, vb) = (sample_variance(a)?, sample_variance(b)?);
    let df = (a.len() + b.len() - 2) as f64;
    Some(((a.len() - 1) as f64 * va + (b.len() - 1) as f64 * vb) / df)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTest {
    /// Positive when `post` is higher than `baseline`.
    pub t: f64,
    pub df: f64,
    pub p: f64,
}

/// Pooled two-sample t-test of `post` against `baseline`.
pub fn students_t_test(baseline: &[f64], post: &[f64]) -> Result<TTest, String> {
    let pooled = pooled_variance(baseline, post)
        .ok_or_else(|| "each group needs at least two samples".to_string())?;
    if pooled.is_nan() || pooled <= 0.0 {
        return Err("pooled variance is zero".to_string());
    }
    let (ma, mb) = match (mean(baseline), mean(post)) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err("empty sample".to_string()),
    };
    let se = (pooled * (1.0 / baseline.len() as f64 + 1.0 / post.len() as f64)).sqrt();
    let t = (mb - ma) / se;
    let df = (baseline.len() + post.len() - 2) as f64;
    let p = two_sided_p(t, df);
    Ok(TTest { t, df, p })
}

/// Cohen's d with pooled standard deviation; `None` when undefined.
pub fn cohens_d(baseline: &[f64], post: &[f64]) -> Option<f64> {
    let pooled = pooled_variance(baseline, post)?;
    if pooled.is_nan() || pooled <= 0.0 {
        return None;
    }
    Some((mean(post)? - mean(baseline)?) / pooled.sqrt())
}

/// Full comparison of a trial against its baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub t_statistic: Option<f64>,
    pub p_value: Option<f64>,
    pub cohens_d: Option<f64>,
    pub effect: Option<EffectLabel>,
    pub significance: Significance,
}

pub fn compare(baseline: &[f64], post: &[f64], criteria: &SignificanceCriteria) -> Comparison {
    let insufficient = |reason: String| Comparison {
        t_statistic: None,
        p_value: None,
        cohens_d: None,
        effect: None,
        significance: Significance::InsufficientData { reason },
    };

    let min = criteria.min_samples.max(2);
    if baseline.len() < min || post.len() < min {
        return insufficient(format!(
            "need at least {min} samples per group, got {} baseline and {} post",
            baseline.len(),
            post.len()
        ));
    }
    let test = match students_t_test(baseline, post) {
        Ok(t) => t,
        Err(reason) => return insufficient(reason),
    };
    let Some(d) = cohens_d(baseline, post) else {
        return insufficient("effect size undefined".to_string());
    };

    let significance = if test.p < criteria.p_threshold && d.abs() > criteria.effect_threshold {
        Significance::Significant
    } else {
        Significance::NotSignificant
    };
    Comparison {
        t_statistic: Some(test.t),
        p_value: Some(test.p),
        cohens_d: Some(d),
        effect: Some(EffectLabel::from_d(d)),
        significance,
    }
}

/// P(|T| ≥ |t|) for Student's t with `df` degrees of freedom.
pub fn two_sided_p(t: f64, df: f64) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }
    let x = df / (df + t * t);
    regularized_incomplete_beta(df / 2.0, 0.5, x).clamp(0.0, 1.0)
}

const LANCZOS_G: f64 = 7.0;
const LANCZOS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut a = LANCZOS[0];
    let t = x + LANCZOS_G + 0.5;
    for (i, c) in LANCZOS.iter().enumerate().skip(1) {
        a += c / (x + i as f64);
    }
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + a.ln()
}

/// I_x(a, b).
pub fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let front = (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln()).exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

const MAX_ITERATIONS: usize = 300;
const EPSILON: f64 = 3e-16;
const FP_MIN: f64 = 1e-300;

/// Modified Lentz evaluation of the incomplete beta continued fraction.
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    let guard = |v: f64| if v.abs() < FP_MIN { FP_MIN } else { v };
    let (qab, qap, qam) = (a + b, a + 1.0, a - 1.0);
    let mut c = 1.0;
    let mut d = 1.0 / guard(1.0 - qab * x / qap);
    let mut h = d;
    for m in 1..=MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        let step = d * c;
        h *= step;
        if (step - 1.0).abs() < EPSILON {
            break;
        }
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: f64, expected: f64, tol: f64) -> bool {
        (actual - expected).abs() < tol
    }

    fn alternating(n: usize, shift: f64) -> Vec<f64> {
        (0..n)
            .map(|i| if i % 2 == 0 { 1.0 + shift } else { -1.0 + shift })
            .collect()
    }

    #[test]
    fn descriptive_statistics() {
        let xs = [70.0, 72.0, 71.0, 69.0, 73.0];
        assert_eq!(mean(&xs), Some(71.0));
        assert_eq!(sample_variance(&xs), Some(2.5));
        assert_eq!(mean(&[]), None);
        assert_eq!(sample_variance(&[1.0]), None);
    }

    #[test]
    fn clear_improvement_is_significant() {
        let baseline = [70.0, 72.0, 71.0, 69.0, 73.0];
        let post = [76.0, 78.0, 75.0, 77.0, 79.0];

        let test = students_t_test(&baseline, &post).expect("defined");
        assert!(close(test.t, 6.0, 1e-9));
        assert_eq!(test.df, 8.0);
        assert!(close(test.p, 0.000323, 5e-6), "p = {}", test.p);

        let d = cohens_d(&baseline, &post).expect("defined");
        assert!(close(d, 3.7947, 1e-4), "d = {d}");

        let c = compare(&baseline, &post, &SignificanceCriteria::default());
        assert_eq!(c.significance, Significance::Significant);
        assert_eq!(c.effect, Some(EffectLabel::Large));
    }

    #[test]
    fn tiny_effect_with_huge_n_is_not_significant() {
        let c = compare(
            &alternating(1352, 0.0),
            &alternating(1352, 0.1),
            &SignificanceCriteria::default(),
        );
        let p = c.p_value.expect("p");
        let d = c.cohens_d.expect("d");
        assert!(close(c.t_statistic.expect("t"), 2.599, 1e-3));
        assert!(p < 0.05, "p = {p}");
        assert!(close(d, 0.09996, 1e-4), "d = {d}");
        assert_eq!(c.significance, Significance::NotSignificant);
    }

    #[test]
    fn large_effect_with_tiny_n_is_not_significant() {
        let c = compare(
            &alternating(4, 0.0),
            &alternating(4, 1.04),
            &SignificanceCriteria::default(),
        );
        assert!(close(c.t_statistic.expect("t"), 1.2737, 1e-3));
        assert!(close(c.p_value.expect("p"), 0.2499, 1e-3));
        assert!(close(c.cohens_d.expect("d"), 0.9007, 1e-3));
        assert_eq!(c.significance, Significance::NotSignificant);
    }

    #[test]
    fn undefined_statistics_are_insufficient_data() {
        let criteria = SignificanceCriteria::default();
        let flat = compare(&[5.0, 5.0, 5.0], &[5.0, 5.0, 5.0], &criteria);
        assert!(matches!(flat.significance, Significance::InsufficientData { .. }));
        assert_eq!(flat.p_value, None);

        let short = compare(&[1.0], &[2.0, 3.0], &criteria);
        assert!(matches!(short.significance, Significance::InsufficientData { .. }));

        let strict = SignificanceCriteria {
            min_samples: 6,
            ..criteria
        };
        let few = compare(&[70.0, 72.0, 71.0, 69.0, 73.0], &[76.0, 78.0, 75.0, 77.0, 79.0], &strict);
        assert!(matches!(few.significance, Significance::InsufficientData { .. }));
    }

    #[test]
    fn p_value_edges() {
        assert!(close(two_sided_p(0.0, 10.0), 1.0, 1e-12));
        assert!(two_sided_p(50.0, 10.0) < 1e-10);
        assert!(close(two_sided_p(-6.0, 8.0), two_sided_p(6.0, 8.0), 1e-15));
    }
}
