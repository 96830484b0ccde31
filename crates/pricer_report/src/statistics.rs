//! Descriptive statistics over error samples.

/// Linear-interpolation quantile of an ascending, non-empty sample.
///
/// Position `q · (n - 1)`, interpolated between neighbours.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    (sorted[lo] + (sorted[hi] - sorted[lo]) * frac).clamp(sorted[lo], sorted[hi])
}

/// Linear-interpolation quantile of an unsorted sample. NaNs are ignored.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, q)
}

/// count, mean, std, min, quartiles and max of a sample.
///
/// `std` is the sample standard deviation (n - 1 denominator); it is NaN
/// for fewer than two values. Every statistic except `count` is NaN for an
/// empty sample.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Describe {
    /// Sample size.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation.
    pub std: f64,
    /// Minimum.
    pub min: f64,
    /// 25th percentile.
    pub q25: f64,
    /// Median.
    pub median: f64,
    /// 75th percentile.
    pub q75: f64,
    /// Maximum.
    pub max: f64,
}

impl Describe {
    /// Describe the non-NaN values of `values`.
    ///
    /// # Examples
    /// ```
    /// use pricer_report::statistics::Describe;
    ///
    /// let d = Describe::from_values(&[1.0, 2.0, 3.0, 4.0]);
    /// assert_eq!(d.count, 4);
    /// assert_eq!(d.mean, 2.5);
    /// assert_eq!(d.median, 2.5);
    /// assert_eq!(d.q25, 1.75);
    /// ```
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(f64::total_cmp);
        let count = sorted.len();
        if count == 0 {
            return Self {
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                q25: f64::NAN,
                median: f64::NAN,
                q75: f64::NAN,
                max: f64::NAN,
            };
        }

        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let ss: f64 = sorted.iter().map(|v| (v - mean) * (v - mean)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        Self {
            count,
            mean,
            std,
            min: sorted[0],
            q25: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q75: quantile_sorted(&sorted, 0.75),
            max: sorted[count - 1],
        }
    }
}
