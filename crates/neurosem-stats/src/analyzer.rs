//! Statistical tests over per-fold accuracy scores.

use serde::{Deserialize, Serialize};

/// Chance level for a two-alternative forced choice.
pub const CHANCE_LEVEL: f64 = 0.5;

/// Statistical analyzer for forced-choice accuracies.
pub struct StatisticalAnalyzer;

impl StatisticalAnalyzer {
    /// One-sample t-test of the sample mean against `mu`.
    ///
    /// Used to ask whether fold accuracies sit above chance. The effect size
    /// is Cohen's d relative to `mu`.
    pub fn one_sample_t_test(sample: &[f64], mu: f64) -> TestResult {
        let Some(moments) = SampleMoments::of(sample) else {
            return TestResult::null();
        };
        let se = moments.mean_variance().sqrt();
        if se == 0.0 {
            return TestResult::null();
        }

        let t = (moments.mean - mu) / se;
        let p_value = Self::t_to_p(t.abs(), moments.n - 1.0);
        let effect = (moments.mean - mu).abs() / moments.variance.sqrt();
        TestResult::from_parts(t, p_value, effect)
    }

    /// Welch's t-test for two independent groups of fold scores.
    ///
    /// Degrees of freedom follow Welch-Satterthwaite; the effect size is
    /// Cohen's d over the averaged group variances.
    pub fn welch_t_test(group_a: &[f64], group_b: &[f64]) -> TestResult {
        let (Some(a), Some(b)) = (SampleMoments::of(group_a), SampleMoments::of(group_b)) else {
            return TestResult::null();
        };

        let (va, vb) = (a.mean_variance(), b.mean_variance());
        let se_sq = va + vb;
        if se_sq == 0.0 {
            return TestResult::null();
        }

        let t = (a.mean - b.mean) / se_sq.sqrt();
        let df = se_sq.powi(2) / (va.powi(2) / (a.n - 1.0) + vb.powi(2) / (b.n - 1.0));
        let p_value = Self::t_to_p(t.abs(), df);

        let pooled = f64::midpoint(a.variance, b.variance).sqrt();
        let effect = if pooled > 0.0 {
            (a.mean - b.mean).abs() / pooled
        } else {
            0.0
        };
        TestResult::from_parts(t, p_value, effect)
    }

    // Two-sided p-value from a normal approximation; small df widen the tail
    fn t_to_p(t: f64, df: f64) -> f64 {
        let z = if df > 30.0 { t } else { t * (1.0 + 1.0 / (4.0 * df)) };
        2.0 * Self::normal_cdf(-z)
    }

    fn normal_cdf(x: f64) -> f64 {
        0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
    }
}

/// Abramowitz and Stegun 7.1.26 coefficients, highest order first.
const ERF_COEFFS: [f64; 5] = [1.061405429, -1.453152027, 1.421413741, -0.284496736, 0.254829592];
const ERF_P: f64 = 0.3275911;

fn erf(x: f64) -> f64 {
    let t = 1.0 / (1.0 + ERF_P * x.abs());
    let poly = ERF_COEFFS.iter().fold(0.0, |acc, c| acc * t + c) * t;
    (1.0 - poly * (-x * x).exp()).copysign(x)
}

/// Mean and sample variance of a group with at least two scores.
struct SampleMoments {
    n: f64,
    mean: f64,
    variance: f64,
}

impl SampleMoments {
    fn of(sample: &[f64]) -> Option<Self> {
        if sample.len() < 2 {
            return None;
        }
        let (mean, std) = mean_and_std(sample);
        Some(Self {
            n: sample.len() as f64,
            mean,
            variance: std * std,
        })
    }

    /// Variance of the sample mean.
    fn mean_variance(&self) -> f64 {
        self.variance / self.n
    }
}

/// Result of a statistical test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
    pub significant: bool,
    pub effect_size: f64,
}

impl TestResult {
    fn from_parts(statistic: f64, p_value: f64, effect_size: f64) -> Self {
        Self {
            statistic,
            p_value,
            significant: p_value < 0.05,
            effect_size,
        }
    }

    fn null() -> Self {
        Self {
            statistic: 0.0,
            p_value: 1.0,
            significant: false,
            effect_size: 0.0,
        }
    }

    /// Interpret effect size (Cohen's d).
    pub fn effect_interpretation(&self) -> &'static str {
        if self.effect_size < 0.2 {
            "negligible"
        } else if self.effect_size < 0.5 {
            "small"
        } else if self.effect_size < 0.8 {
            "medium"
        } else {
            "large"
        }
    }
}

impl std::fmt::Display for TestResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "t={:.3}, p={:.4}, significant={}, d={:.3} ({})",
            self.statistic,
            self.p_value,
            self.significant,
            self.effect_size,
            self.effect_interpretation()
        )
    }
}

/// Mean and sample standard deviation (ddof = 1).
///
/// Empty input yields `(NaN, 0.0)`; a single value yields `(value, 0.0)`.
pub fn mean_and_std(sample: &[f64]) -> (f64, f64) {
    if sample.is_empty() {
        return (f64::NAN, 0.0);
    }
    let n = sample.len() as f64;
    let mean = sample.iter().sum::<f64>() / n;
    if sample.len() < 2 {
        return (mean, 0.0);
    }
    let variance = sample.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance.sqrt())
}

/// Normal-approximation confidence interval for a mean.
pub fn confidence_interval(sample: &[f64], confidence: f64) -> (f64, f64) {
    if sample.len() < 2 {
        let mean = sample.first().copied().unwrap_or(f64::NAN);
        return (mean, mean);
    }

    let n = sample.len() as f64;
    let (mean, std) = mean_and_std(sample);
    let se = std / n.sqrt();

    let z = match confidence {
        c if c >= 0.99 => 2.576,
        c if c >= 0.95 => 1.96,
        c if c >= 0.90 => 1.645,
        _ => 1.96,
    };

    (mean - z * se, mean + z * se)
}
