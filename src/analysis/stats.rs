//! Derived metrics shared by runs and groups.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Percent more nodes reached through the overlay than directly.
///
/// Without any direct ACK there is no baseline and the improvement is
/// unbounded, reported as positive infinity.
pub fn percent_improvement(n_acks: f64, n_direct_acks: f64) -> f64 {
    if n_direct_acks != 0.0 {
        (n_acks - n_direct_acks) / n_direct_acks * 100.0
    } else {
        f64::INFINITY
    }
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
///
/// Fewer than two samples, or samples that are all zero, give 0.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 || values.iter().all(|v| *v == 0.0) {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Result of an independent two-sample t-test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TTest {
    pub t_statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: f64,
}

/// Independent two-sample Student's t-test with pooled variance.
///
/// Returns `None` when either sample is empty or there are no degrees of
/// freedom left. Identical constant samples give a NaN statistic; distinct
/// constant samples give an infinite one with a p-value of 0.
pub fn student_t_test(sample1: &[f64], sample2: &[f64]) -> Option<TTest> {
    if sample1.is_empty() || sample2.is_empty() {
        return None;
    }

    let n1 = sample1.len() as f64;
    let n2 = sample2.len() as f64;
    let df = n1 + n2 - 2.0;
    if df <= 0.0 {
        return None;
    }

    let mean1 = sample1.iter().sum::<f64>() / n1;
    let mean2 = sample2.iter().sum::<f64>() / n2;
    let ss1 = sample1.iter().map(|x| (x - mean1).powi(2)).sum::<f64>();
    let ss2 = sample2.iter().map(|x| (x - mean2).powi(2)).sum::<f64>();

    let pooled_variance = (ss1 + ss2) / df;
    let se = (pooled_variance * (1.0 / n1 + 1.0 / n2)).sqrt();
    let t_statistic = (mean1 - mean2) / se;

    let p_value = if t_statistic.is_nan() {
        f64::NAN
    } else if t_statistic.is_infinite() {
        0.0
    } else {
        let dist = StudentsT::new(0.0, 1.0, df).ok()?;
        2.0 * (1.0 - dist.cdf(t_statistic.abs()))
    };

    Some(TTest {
        t_statistic,
        p_value,
        degrees_of_freedom: df,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_improvement() {
        assert_eq!(percent_improvement(15.0, 10.0), 50.0);
        assert_eq!(percent_improvement(10.0, 0.0), f64::INFINITY);
        assert_eq!(percent_improvement(0.0, 0.0), f64::INFINITY);
        assert_eq!(percent_improvement(5.0, 5.0), 0.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
    }

    #[test]
    fn test_sample_std_dev() {
        assert_eq!(sample_std_dev(&[0.0, 0.0, 0.0]), 0.0);
        assert_eq!(sample_std_dev(&[]), 0.0);
        assert_eq!(sample_std_dev(&[4.0]), 0.0);
        let std = sample_std_dev(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((std - 1.5811).abs() < 0.001);
    }

    #[test]
    fn test_student_t_test() {
        // Reference values from a pooled-variance t-test
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [3.0, 4.0, 5.0, 6.0, 7.0];
        let result = student_t_test(&a, &b).unwrap();
        assert!((result.t_statistic + 2.0).abs() < 1e-9);
        assert_eq!(result.degrees_of_freedom, 8.0);
        assert!((result.p_value - 0.0805).abs() < 0.001);
    }

    #[test]
    fn test_student_t_test_degenerate() {
        assert!(student_t_test(&[], &[1.0]).is_none());
        assert!(student_t_test(&[1.0], &[2.0]).is_none());

        let same = student_t_test(&[2.0, 2.0], &[2.0, 2.0]).unwrap();
        assert!(same.t_statistic.is_nan());
        assert!(same.p_value.is_nan());

        let apart = student_t_test(&[1.0, 1.0], &[3.0, 3.0]).unwrap();
        assert!(apart.t_statistic.is_infinite());
        assert_eq!(apart.p_value, 0.0);
    }
}
