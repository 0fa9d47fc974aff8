use super::{DatasetLoad, DatasetSource};
use crate::models::{RawRecord, ReferenceCropRecord};

/// Reference rows held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticDataset {
    records: Vec<RawRecord>,
}

impl StaticDataset {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Raw rows in the dataset's own column spelling.
    pub fn from_crops(crops: &[ReferenceCropRecord]) -> Self {
        let records = crops
            .iter()
            .map(|c| {
                let mut row = RawRecord::new();
                row.insert("Crops".into(), c.crop.clone().into());
                row.insert("N".into(), c.n.into());
                row.insert("P".into(), c.p.into());
                row.insert("K".into(), c.k.into());
                row.insert("Temperature".into(), c.temperature.into());
                row.insert("Humidity".into(), c.humidity.into());
                row.insert("pH".into(), c.ph.into());
                row.insert("rainfall".into(), c.rainfall.into());
                row
            })
            .collect();
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl DatasetSource for StaticDataset {
    fn name(&self) -> &str {
        "static"
    }

    fn load(&self) -> DatasetLoad {
        DatasetLoad::Records(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::normalize::normalize_records;
    use crate::models::fallback_crops;

    #[test]
    fn from_crops_round_trips_through_normalization() {
        let crops = fallback_crops();
        let dataset = StaticDataset::from_crops(&crops);
        assert_eq!(dataset.len(), 3);
        assert_eq!(normalize_records(&dataset.load_reference_records()), crops);
    }

    #[test]
    fn empty_dataset_loads_nothing() {
        let dataset = StaticDataset::empty();
        assert!(dataset.is_empty());
        assert_eq!(dataset.load(), DatasetLoad::Records(Vec::new()));
    }
}
