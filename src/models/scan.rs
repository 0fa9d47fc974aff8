use crate::models::{RecommendationResult, SoilSample};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Owner recorded when no user is signed in.
pub const LOCAL_USER: &str = "local";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Display form stored with the scan, six decimals per coordinate.
    pub fn coordinates(&self) -> String {
        format!("{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

pub fn default_title(position: usize) -> String {
    format!("Scanned Area {}", position)
}

/// A scan about to be written to the history store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScan {
    pub scan_uuid: String,
    pub user_uid: String,
    pub sample: SoilSample,
    pub recommended_crop: String,
    /// Whole percentage, 0-100.
    pub confidence: u8,
    pub location: Option<GeoPoint>,
    pub title: String,
    pub description: String,
    pub date_scanned: DateTime<Utc>,
}

impl NewScan {
    pub fn new(
        user_uid: impl Into<String>,
        sample: SoilSample,
        recommendation: &RecommendationResult,
    ) -> Self {
        Self {
            scan_uuid: uuid::Uuid::new_v4().to_string(),
            user_uid: user_uid.into(),
            sample,
            recommended_crop: recommendation.crop.clone(),
            confidence: recommendation.percent(),
            location: None,
            title: String::new(),
            description: String::new(),
            date_scanned: Utc::now(),
        }
    }

    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn coordinates(&self) -> String {
        self.location.map(|l| l.coordinates()).unwrap_or_default()
    }
}

/// A stored scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    pub id: i64,
    pub scan_uuid: String,
    pub user_uid: String,
    pub sample: SoilSample,
    pub recommended_crop: String,
    pub confidence: u8,
    pub location: Option<GeoPoint>,
    pub title: String,
    pub description: String,
    pub coordinates: String,
    pub date_scanned: DateTime<Utc>,
    pub synced: bool,
    pub created_at: DateTime<Utc>,
}

impl Scan {
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}
