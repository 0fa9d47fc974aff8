use crate::models::soil::AXIS_COUNT;
use serde::{Deserialize, Serialize};

/// A reference row as read from a dataset, keyed by whatever column names the source uses.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Crop name used when no better answer exists.
pub const UNKNOWN_CROP: &str = "Unknown";

/// One crop profile of the reference dataset, in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCropRecord {
    pub crop: String,
    pub n: f64,
    pub p: f64,
    pub k: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl ReferenceCropRecord {
    pub fn new(
        crop: impl Into<String>,
        n: f64,
        p: f64,
        k: f64,
        temperature: f64,
        humidity: f64,
        ph: f64,
    ) -> Self {
        Self {
            crop: crop.into(),
            n,
            p,
            k,
            temperature,
            humidity,
            ph,
            rainfall: 0.0,
        }
    }

    pub fn with_rainfall(mut self, rainfall: f64) -> Self {
        self.rainfall = rainfall;
        self
    }

    /// Comparison vector: N, P, K, temperature, humidity, pH.
    ///
    /// Rainfall is carried but not compared.
    pub fn axes(&self) -> [f64; AXIS_COUNT] {
        [
            self.n,
            self.p,
            self.k,
            self.temperature,
            self.humidity,
            self.ph,
        ]
    }
}

/// Built-in crop profiles used when the dataset yields nothing.
pub fn fallback_crops() -> Vec<ReferenceCropRecord> {
    vec![
        ReferenceCropRecord::new("Corn", 70.0, 40.0, 60.0, 25.0, 60.0, 6.5),
        ReferenceCropRecord::new("Rice", 60.0, 50.0, 70.0, 26.0, 75.0, 6.2),
        ReferenceCropRecord::new("Vegetables", 80.0, 60.0, 55.0, 22.0, 65.0, 6.8),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ResultFields")]
pub struct RecommendationResult {
    pub crop: String,
    /// Closeness of the match in [0, 1]; not a probability.
    pub confidence: f64,
}

impl RecommendationResult {
    pub fn new(crop: impl Into<String>, confidence: f64) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            crop: crop.into(),
            confidence,
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN_CROP, 0.0)
    }

    pub fn is_unknown(&self) -> bool {
        self.crop == UNKNOWN_CROP && self.confidence == 0.0
    }

    /// Confidence as the whole percentage stored alongside a scan.
    pub fn percent(&self) -> u8 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

/// Wire shape of a result; converted through [`RecommendationResult::new`] so
/// confidence stays within [0, 1].
#[derive(Deserialize)]
struct ResultFields {
    crop: String,
    confidence: f64,
}

impl From<ResultFields> for RecommendationResult {
    fn from(fields: ResultFields) -> Self {
        Self::new(fields.crop, fields.confidence)
    }
}

impl std::fmt::Display for RecommendationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}% match)", self.crop, self.percent())
    }
}
