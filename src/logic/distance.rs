use crate::models::{ReferenceCropRecord, SoilSample, AXIS_COUNT};
use serde::{Deserialize, Serialize};

/// How a soil sample is compared with a reference profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Unweighted Euclidean distance in raw units.
    #[default]
    Euclidean,
    /// Euclidean distance after z-scoring every axis over the reference set.
    Standardized,
}

impl DistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Standardized => "standardized",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "euclidean" | "raw" => Some(DistanceMetric::Euclidean),
            "standardized" | "standardised" | "zscore" | "z-score" => {
                Some(DistanceMetric::Standardized)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn euclidean(a: &[f64; AXIS_COUNT], b: &[f64; AXIS_COUNT]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Per-axis mean and spread of a reference set.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisScale {
    mean: [f64; AXIS_COUNT],
    std_dev: [f64; AXIS_COUNT],
}

impl AxisScale {
    /// Population statistics over `records`. Axes without spread keep unit scale.
    pub fn fit(records: &[ReferenceCropRecord]) -> Self {
        let mut mean = [0.0; AXIS_COUNT];
        let mut std_dev = [1.0; AXIS_COUNT];
        if records.is_empty() {
            return Self { mean, std_dev };
        }

        let count = records.len() as f64;
        for record in records {
            for (m, v) in mean.iter_mut().zip(record.axes()) {
                *m += v / count;
            }
        }

        for (axis, sd) in std_dev.iter_mut().enumerate() {
            let variance = records
                .iter()
                .map(|r| (r.axes()[axis] - mean[axis]).powi(2))
                .sum::<f64>()
                / count;
            let spread = variance.sqrt();
            if spread.is_finite() && spread > f64::EPSILON {
                *sd = spread;
            }
        }

        Self { mean, std_dev }
    }

    pub fn apply(&self, axes: [f64; AXIS_COUNT]) -> [f64; AXIS_COUNT] {
        let mut scaled = axes;
        for (i, v) in scaled.iter_mut().enumerate() {
            *v = (*v - self.mean[i]) / self.std_dev[i];
        }
        scaled
    }
}

/// Measures one sample against a fixed reference set.
pub struct DistanceFn {
    scale: Option<AxisScale>,
}

impl DistanceFn {
    pub fn new(metric: DistanceMetric, records: &[ReferenceCropRecord]) -> Self {
        let scale = match metric {
            DistanceMetric::Euclidean => None,
            DistanceMetric::Standardized => Some(AxisScale::fit(records)),
        };
        Self { scale }
    }

    pub fn distance(&self, sample: &SoilSample, record: &ReferenceCropRecord) -> f64 {
        match &self.scale {
            None => euclidean(&sample.axes(), &record.axes()),
            Some(scale) => euclidean(&scale.apply(sample.axes()), &scale.apply(record.axes())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_known_values() {
        let origin = [0.0; AXIS_COUNT];
        assert_eq!(euclidean(&origin, &origin), 0.0);
        assert_eq!(euclidean(&origin, &[3.0, 4.0, 0.0, 0.0, 0.0, 0.0]), 5.0);
        assert_eq!(euclidean(&[1.0; AXIS_COUNT], &[3.0; AXIS_COUNT]), 24f64.sqrt());
    }

    #[test]
    fn raw_distance_uses_moisture_against_humidity() {
        let sample = SoilSample::new(70.0, 40.0, 60.0, 25.0, 70.0, 6.5);
        let record = ReferenceCropRecord::new("Corn", 70.0, 40.0, 60.0, 25.0, 60.0, 6.5)
            .with_rainfall(900.0);
        let f = DistanceFn::new(DistanceMetric::Euclidean, &[record.clone()]);
        assert_eq!(f.distance(&sample, &record), 10.0);
    }

    #[test]
    fn axis_scale_standardizes_spread() {
        let records = vec![
            ReferenceCropRecord::new("A", 0.0, 5.0, 0.0, 0.0, 0.0, 6.0),
            ReferenceCropRecord::new("B", 10.0, 5.0, 0.0, 0.0, 0.0, 8.0),
        ];
        let scale = AxisScale::fit(&records);
        let scaled = scale.apply(records[1].axes());
        assert!((scaled[0] - 1.0).abs() < 1e-12);
        // No spread on P: only centred.
        assert_eq!(scaled[1], 0.0);
        assert!((scaled[5] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn standardized_metric_rebalances_axes() {
        // Raw units favour A (pH gap is tiny next to the N gap); z-scores favour B.
        let a = ReferenceCropRecord::new("A", 50.0, 0.0, 0.0, 0.0, 0.0, 4.0);
        let b = ReferenceCropRecord::new("B", 58.0, 0.0, 0.0, 0.0, 0.0, 7.0);
        let c = ReferenceCropRecord::new("C", 0.0, 0.0, 0.0, 0.0, 0.0, 7.0);
        let records = vec![a.clone(), b.clone(), c];
        let sample = SoilSample::new(50.0, 0.0, 0.0, 0.0, 0.0, 7.0);

        let raw = DistanceFn::new(DistanceMetric::Euclidean, &records);
        assert!(raw.distance(&sample, &a) < raw.distance(&sample, &b));

        let z = DistanceFn::new(DistanceMetric::Standardized, &records);
        assert!(z.distance(&sample, &b) < z.distance(&sample, &a));
    }

    #[test]
    fn metric_from_str() {
        assert_eq!(DistanceMetric::from_str("Euclidean"), Some(DistanceMetric::Euclidean));
        assert_eq!(DistanceMetric::from_str("raw"), Some(DistanceMetric::Euclidean));
        assert_eq!(
            DistanceMetric::from_str("z-score"),
            Some(DistanceMetric::Standardized)
        );
        assert_eq!(DistanceMetric::from_str("cosine"), None);
        assert_eq!(DistanceMetric::default(), DistanceMetric::Euclidean);
    }
}
