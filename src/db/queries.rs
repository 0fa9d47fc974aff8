use crate::db::Database;
use crate::error::{Result, SoilScanError};
use crate::models::{default_title, GeoPoint, NewScan, Scan, SoilSample};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::warn;

// Scan Queries

impl Database {
    pub fn insert_scan(&self, scan: &NewScan) -> Result<i64> {
        let created_at = Utc::now().to_rfc3339();
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO scans
                    (scan_uuid, user_uid, nitrogen, phosphorus, potassium, temperature,
                     moisture, ph, recommended_crop, confidence, latitude, longitude,
                     title, description, coordinates, date_scanned, synced, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, 0, ?17)
                "#,
                params![
                    scan.scan_uuid,
                    scan.user_uid,
                    scan.sample.n,
                    scan.sample.p,
                    scan.sample.k,
                    scan.sample.temperature,
                    scan.sample.moisture,
                    scan.sample.ph,
                    scan.recommended_crop,
                    scan.confidence,
                    scan.location.map(|l| l.latitude),
                    scan.location.map(|l| l.longitude),
                    scan.title,
                    scan.description,
                    scan.coordinates(),
                    scan.date_scanned.to_rfc3339(),
                    created_at,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn count_user_scans(&self, user_uid: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM scans WHERE user_uid = ?1",
                [user_uid],
                |row| row.get(0),
            )?;
            Ok(count.max(0) as usize)
        })
    }

    /// Scans of one user, oldest first. Untitled scans are labelled by their
    /// position among all of the user's rows, unreadable ones included.
    pub fn get_user_scans(&self, user_uid: &str) -> Result<Vec<Scan>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM scans WHERE user_uid = ?1 ORDER BY created_at ASC, id ASC",
            )?;
            let scans = stmt
                .query_map([user_uid], row_to_scan)?
                .enumerate()
                .filter_map(|(index, r)| match r {
                    Ok(mut scan) => {
                        if !scan.has_title() {
                            scan.title = default_title(index + 1);
                        }
                        Some(scan)
                    }
                    Err(e) => {
                        warn!(error = %e, position = index + 1, "Skipping unreadable scan row");
                        None
                    }
                })
                .collect();
            Ok(scans)
        })
    }

    pub fn get_scan(&self, id: i64) -> Result<Option<Scan>> {
        self.with_conn(|conn| {
            conn.query_row("SELECT * FROM scans WHERE id = ?1", [id], row_to_scan)
                .optional()
                .map_err(Into::into)
        })
    }

    pub fn latest_scan(&self, user_uid: &str) -> Result<Option<Scan>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM scans WHERE user_uid = ?1 ORDER BY created_at DESC, id DESC LIMIT 1",
                [user_uid],
                row_to_scan,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn update_scan_title(&self, id: i64, title: &str) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE scans SET title = ?1 WHERE id = ?2",
                params![title.trim(), id],
            )?;
            if changed == 0 {
                return Err(SoilScanError::NotFound(format!("scan {}", id)));
            }
            Ok(())
        })
    }

    pub fn delete_scan(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM scans WHERE id = ?1", [id])?;
            if changed == 0 {
                return Err(SoilScanError::NotFound(format!("scan {}", id)));
            }
            Ok(())
        })
    }
}

fn parse_timestamp(value: &str, column: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            warn!(column, value, "Unparsable timestamp in database, using now");
            Utc::now()
        })
}

fn row_to_scan(row: &Row) -> rusqlite::Result<Scan> {
    let latitude: Option<f64> = row.get("latitude")?;
    let longitude: Option<f64> = row.get("longitude")?;
    let date_scanned: String = row.get("date_scanned")?;
    let created_at: String = row.get("created_at")?;
    let synced: i64 = row.get("synced")?;

    let location = match (latitude, longitude) {
        (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
        _ => None,
    };

    Ok(Scan {
        id: row.get("id")?,
        scan_uuid: row.get("scan_uuid")?,
        user_uid: row.get("user_uid")?,
        sample: SoilSample {
            n: row.get("nitrogen")?,
            p: row.get("phosphorus")?,
            k: row.get("potassium")?,
            temperature: row.get("temperature")?,
            moisture: row.get("moisture")?,
            ph: row.get("ph")?,
        },
        recommended_crop: row.get("recommended_crop")?,
        confidence: row.get("confidence")?,
        location,
        title: row.get::<_, Option<String>>("title")?.unwrap_or_default(),
        description: row.get::<_, Option<String>>("description")?.unwrap_or_default(),
        coordinates: row.get::<_, Option<String>>("coordinates")?.unwrap_or_default(),
        date_scanned: parse_timestamp(&date_scanned, "date_scanned"),
        synced: synced != 0,
        created_at: parse_timestamp(&created_at, "created_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecommendationResult;

    fn sample() -> SoilSample {
        SoilSample::new(70.0, 40.0, 60.0, 25.0, 60.0, 6.5)
    }

    fn new_scan(user: &str, title: &str) -> NewScan {
        NewScan::new(user, sample(), &RecommendationResult::new("Corn", 0.92)).with_title(title)
    }

    #[test]
    fn insert_and_fetch_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let scan = new_scan("alice", "North field").with_location(GeoPoint::new(10.5, -3.25));
        let id = db.insert_scan(&scan).unwrap();

        let stored = db.get_scan(id).unwrap().unwrap();
        assert_eq!(stored.scan_uuid, scan.scan_uuid);
        assert_eq!(stored.sample, sample());
        assert_eq!(stored.recommended_crop, "Corn");
        assert_eq!(stored.confidence, 92);
        assert_eq!(stored.location, Some(GeoPoint::new(10.5, -3.25)));
        assert_eq!(stored.coordinates, "10.500000, -3.250000");
        assert!(!stored.synced);
    }

    #[test]
    fn user_scans_are_isolated_and_ordered() {
        let db = Database::open_in_memory().unwrap();
        db.insert_scan(&new_scan("alice", "first")).unwrap();
        db.insert_scan(&new_scan("bob", "other")).unwrap();
        db.insert_scan(&new_scan("alice", "second")).unwrap();

        let titles: Vec<_> = db
            .get_user_scans("alice")
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, ["first", "second"]);
        assert_eq!(db.count_user_scans("alice").unwrap(), 2);
        assert_eq!(db.count_user_scans("nobody").unwrap(), 0);
        assert!(db.get_user_scans("nobody").unwrap().is_empty());
    }

    #[test]
    fn blank_titles_get_positional_defaults() {
        let db = Database::open_in_memory().unwrap();
        db.insert_scan(&new_scan("alice", "Orchard")).unwrap();
        db.insert_scan(&new_scan("alice", "   ")).unwrap();

        let scans = db.get_user_scans("alice").unwrap();
        assert_eq!(scans[0].title, "Orchard");
        assert_eq!(scans[1].title, "Scanned Area 2");
    }

    #[test]
    fn unreadable_rows_keep_their_position() {
        let db = Database::open_in_memory().unwrap();
        db.insert_scan(&new_scan("alice", "")).unwrap();
        let broken = db.insert_scan(&new_scan("alice", "")).unwrap();
        db.insert_scan(&new_scan("alice", "")).unwrap();
        db.with_conn(|conn| {
            conn.execute("UPDATE scans SET confidence = 300 WHERE id = ?1", [broken])?;
            Ok(())
        })
        .unwrap();

        let titles: Vec<_> = db
            .get_user_scans("alice")
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, ["Scanned Area 1", "Scanned Area 3"]);
        assert_eq!(db.count_user_scans("alice").unwrap(), 3);
    }

    #[test]
    fn rename_and_delete() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_scan(&new_scan("alice", "old")).unwrap();

        db.update_scan_title(id, "  Renamed  ").unwrap();
        assert_eq!(db.get_scan(id).unwrap().unwrap().title, "Renamed");

        db.delete_scan(id).unwrap();
        assert!(db.get_scan(id).unwrap().is_none());
    }

    #[test]
    fn missing_scan_operations_report_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.update_scan_title(99, "x"),
            Err(SoilScanError::NotFound(_))
        ));
        assert!(matches!(db.delete_scan(99), Err(SoilScanError::NotFound(_))));
    }

    #[test]
    fn latest_scan_is_most_recent_insert() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.latest_scan("alice").unwrap().is_none());
        db.insert_scan(&new_scan("alice", "one")).unwrap();
        let id = db.insert_scan(&new_scan("alice", "two")).unwrap();
        assert_eq!(db.latest_scan("alice").unwrap().unwrap().id, id);
    }
}
