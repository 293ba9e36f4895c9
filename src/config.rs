use serde::{Deserialize, Serialize};

use crate::analysis::types::{SimTime, TraceError};

/// Default time resolution (in seconds) for time-indexed histograms
pub const DEFAULT_TIME_RESOLUTION: f64 = 0.1;

/// Default base directory for exported reports
pub const DEFAULT_OUTPUT_DIR: &str = "ron_output";

/// Analyzer configuration that mirrors the optional YAML configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Width of a histogram bucket in seconds (e.g. 0.1, 0.01, 1)
    pub time_resolution: f64,
    /// Base directory for the JSON report
    pub output_dir: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            time_resolution: DEFAULT_TIME_RESOLUTION,
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
        }
    }
}

impl AnalyzerConfig {
    pub fn with_resolution(time_resolution: f64) -> Self {
        Self {
            time_resolution,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), TraceError> {
        if !self.time_resolution.is_finite() || self.time_resolution <= 0.0 {
            return Err(TraceError::InvalidConfig(format!(
                "time_resolution must be a positive number, got {}",
                self.time_resolution
            )));
        }
        if self.output_dir.trim().is_empty() {
            return Err(TraceError::InvalidConfig("output_dir must not be empty".to_string()));
        }
        Ok(())
    }

    /// Decimal digits kept when rounding timestamps: 0.1 -> 1, 0.01 -> 2, 10 -> -1
    pub fn decimal_digits(&self) -> i32 {
        (-self.time_resolution.log10()).round() as i32
    }

    /// Histogram bucket index of a raw timestamp.
    ///
    /// With a fractional resolution the timestamp is first rounded on its
    /// exact binary value, so `1.15` (stored as 1.1499...) lands in the 1.1
    /// bucket rather than 1.2.
    pub fn bucket(&self, raw: f64) -> i64 {
        let digits = self.decimal_digits();
        let rounded = if digits >= 0 && raw.is_finite() {
            format!("{:.*}", digits as usize, raw)
                .parse::<f64>()
                .unwrap_or(raw)
        } else {
            raw
        };
        (rounded * self.bucket_scale()).round() as i64
    }

    /// Rounded timestamp at the start of a bucket
    pub fn bucket_time(&self, bucket: i64) -> SimTime {
        bucket as f64 / self.bucket_scale()
    }

    fn bucket_scale(&self) -> f64 {
        10f64.powi(self.decimal_digits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_digits() {
        assert_eq!(AnalyzerConfig::default().decimal_digits(), 1);
        assert_eq!(AnalyzerConfig::with_resolution(0.01).decimal_digits(), 2);
        assert_eq!(AnalyzerConfig::with_resolution(1.0).decimal_digits(), 0);
        assert_eq!(AnalyzerConfig::with_resolution(10.0).decimal_digits(), -1);
    }

    #[test]
    fn test_bucket_rounding() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.bucket(1.04), 10);
        assert_eq!(config.bucket(1.06), 11);
        assert_eq!(config.bucket_time(config.bucket(2.31)), 2.3);

        let fine = AnalyzerConfig::with_resolution(0.01);
        assert_eq!(fine.bucket(0.12), 12);
        assert_eq!(fine.bucket(2.675), 267);

        let coarse = AnalyzerConfig::with_resolution(10.0);
        assert_eq!(coarse.bucket_time(coarse.bucket(47.0)), 50.0);
    }

    #[test]
    fn test_bucket_rounds_exact_binary_value() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.bucket(1.15), 11);
        assert_eq!(config.bucket(0.15), 1);
        assert_eq!(config.bucket(0.35), 3);
        assert_eq!(config.bucket_time(config.bucket(1.15)), 1.1);
    }

    #[test]
    fn test_validate() {
        assert!(AnalyzerConfig::default().validate().is_ok());
        assert!(AnalyzerConfig::with_resolution(0.0).validate().is_err());
        assert!(AnalyzerConfig::with_resolution(-0.1).validate().is_err());
        assert!(AnalyzerConfig::with_resolution(f64::NAN).validate().is_err());
    }
}
