//! Value summaries for decoded variable data
//!
//! Missing values (NaN after CF decoding) and infinities are skipped, the
//! same way reductions skip non-finite values.

use ndarray::ArrayD;

/// Summary statistics over the valid elements of an array
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueSummary {
    /// Number of elements, valid or not
    pub total: usize,
    /// Number of finite elements
    pub valid: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl ValueSummary {
    /// Computes a summary over `values`.
    ///
    /// With no valid elements the min/max/mean/std fields are NaN.
    pub fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a f64>,
    {
        let mut total = 0_usize;
        let mut valid = 0_usize;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        // Welford's running mean and variance
        let mut mean = 0.0_f64;
        let mut m2 = 0.0_f64;

        for &x in values {
            total += 1;
            if !x.is_finite() {
                continue;
            }
            valid += 1;
            min = min.min(x);
            max = max.max(x);
            #[allow(clippy::cast_precision_loss)]
            let n = valid as f64;
            let delta = x - mean;
            mean += delta / n;
            m2 += delta * (x - mean);
        }

        if valid == 0 {
            return Self {
                total,
                valid,
                min: f64::NAN,
                max: f64::NAN,
                mean: f64::NAN,
                std_dev: f64::NAN,
            };
        }

        #[allow(clippy::cast_precision_loss)]
        let std_dev = (m2 / valid as f64).sqrt();
        Self {
            total,
            valid,
            min,
            max,
            mean,
            std_dev,
        }
    }

    pub fn from_array(data: &ArrayD<f64>) -> Self {
        Self::from_values(data.iter())
    }

    /// Share of valid elements in percent (0 for an empty array).
    #[must_use]
    pub fn valid_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            {
                100.0 * self.valid as f64 / self.total as f64
            }
        }
    }

    #[must_use]
    pub const fn has_valid(&self) -> bool {
        self.valid > 0
    }
}
