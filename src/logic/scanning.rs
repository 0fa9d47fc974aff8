use super::engine::CropRecommender;
use crate::db::Database;
use crate::error::{Result, SoilScanError};
use crate::models::{default_title, GeoPoint, NewScan, Scan, SoilSample};

/// Records soil scans with their crop recommendation.
pub struct ScanService {
    db: Database,
    recommender: CropRecommender,
}

impl ScanService {
    pub fn new(db: Database, recommender: CropRecommender) -> Self {
        Self { db, recommender }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn recommender(&self) -> &CropRecommender {
        &self.recommender
    }

    /// Recommend a crop for `sample` and store the scan under `user_uid`.
    ///
    /// The recommendation itself cannot fail; only the final write can.
    pub fn create_scan(
        &self,
        user_uid: &str,
        sample: SoilSample,
        location: Option<GeoPoint>,
    ) -> Result<Scan> {
        let previous = self.db.count_user_scans(user_uid).unwrap_or_else(|e| {
            tracing::warn!("Failed to count scans for {}: {}", user_uid, e);
            0
        });

        let sample = sample.sanitized();
        let recommendation = self.recommender.recommend(&sample);

        let mut scan =
            NewScan::new(user_uid, sample, &recommendation).with_title(default_title(previous + 1));
        if let Some(location) = location {
            scan = scan.with_location(location);
        }

        let id = self.db.insert_scan(&scan)?;
        tracing::info!(
            id,
            crop = %recommendation.crop,
            confidence = recommendation.percent(),
            "Recorded scan"
        );

        self.db
            .get_scan(id)?
            .ok_or_else(|| SoilScanError::NotFound(format!("scan {}", id)))
    }

    pub fn list(&self, user_uid: &str) -> Result<Vec<Scan>> {
        self.db.get_user_scans(user_uid)
    }

    pub fn rename(&self, id: i64, title: &str) -> Result<()> {
        if title.trim().is_empty() {
            return Err(SoilScanError::InvalidData("title must not be blank".into()));
        }
        self.db.update_scan_title(id, title)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.db.delete_scan(id)
    }
}
