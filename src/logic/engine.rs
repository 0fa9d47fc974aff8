use super::distance::{DistanceFn, DistanceMetric};
use super::normalize::normalize_records;
use crate::config::RecommendationConfig;
use crate::datasources::DatasetSource;
use crate::models::{fallback_crops, RecommendationResult, ReferenceCropRecord, SoilSample};

/// Distance at which confidence reaches zero.
///
/// Tuned by hand against typical N/P/K, temperature, humidity and pH ranges;
/// not derived from the data.
pub const DEFAULT_CONFIDENCE_DIVISOR: f64 = 200.0;

/// Closest reference profile to a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropMatch<'a> {
    pub record: &'a ReferenceCropRecord,
    pub distance: f64,
}

/// Nearest-neighbour crop recommender over a pluggable dataset.
pub struct CropRecommender {
    source: Box<dyn DatasetSource>,
    fallback: Vec<ReferenceCropRecord>,
    metric: DistanceMetric,
    confidence_divisor: f64,
}

impl CropRecommender {
    pub fn new(source: impl DatasetSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            fallback: fallback_crops(),
            metric: DistanceMetric::default(),
            confidence_divisor: DEFAULT_CONFIDENCE_DIVISOR,
        }
    }

    /// Profiles used when the dataset yields no rows. An empty table disables the fallback.
    pub fn with_fallback(mut self, fallback: Vec<ReferenceCropRecord>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_confidence_divisor(mut self, divisor: f64) -> Self {
        self.confidence_divisor = divisor;
        self
    }

    pub fn with_config(self, config: &RecommendationConfig) -> Self {
        self.with_metric(config.metric())
            .with_confidence_divisor(config.confidence_divisor)
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Reference profiles for one recommendation: the dataset, or the fallback table.
    pub fn reference_records(&self) -> Vec<ReferenceCropRecord> {
        let raw = self.source.load_reference_records();
        if raw.is_empty() {
            tracing::warn!(
                source = self.source.name(),
                fallback = self.fallback.len(),
                "No crop data loaded, using built-in profiles"
            );
            return self.fallback.clone();
        }
        normalize_records(&raw)
    }

    /// Recommend a crop for `sample`. Never fails; with no reference data at all
    /// the answer is `Unknown` at zero confidence.
    pub fn recommend(&self, sample: &SoilSample) -> RecommendationResult {
        let records = self.reference_records();
        let result =
            recommend_from_records(sample, &records, self.metric, self.confidence_divisor);
        tracing::debug!(
            crop = %result.crop,
            confidence = result.confidence,
            candidates = records.len(),
            metric = %self.metric,
            "Crop recommendation"
        );
        result
    }
}

/// First record at the strictly smallest finite distance from `sample`.
pub fn nearest<'a>(
    sample: &SoilSample,
    records: &'a [ReferenceCropRecord],
    metric: DistanceMetric,
) -> Option<CropMatch<'a>> {
    let sample = sample.sanitized();
    let distance = DistanceFn::new(metric, records);

    let mut best: Option<CropMatch<'a>> = None;
    for record in records {
        let d = distance.distance(&sample, record);
        if !d.is_finite() {
            continue;
        }
        let closer = match best {
            Some(current) => d < current.distance,
            None => true,
        };
        if closer {
            best = Some(CropMatch {
                record,
                distance: d,
            });
        }
    }
    best
}

pub fn confidence_from_distance(distance: f64, divisor: f64) -> f64 {
    let divisor = if divisor.is_finite() && divisor > 0.0 {
        divisor
    } else {
        DEFAULT_CONFIDENCE_DIVISOR
    };
    (1.0 - distance / divisor).clamp(0.0, 1.0)
}

pub fn recommend_from_records(
    sample: &SoilSample,
    records: &[ReferenceCropRecord],
    metric: DistanceMetric,
    confidence_divisor: f64,
) -> RecommendationResult {
    match nearest(sample, records, metric) {
        Some(m) => RecommendationResult::new(
            m.record.crop.clone(),
            confidence_from_distance(m.distance, confidence_divisor),
        ),
        None => RecommendationResult::unknown(),
    }
}
