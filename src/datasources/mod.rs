pub mod bundled;
pub mod sqlite;
pub mod static_list;

pub use bundled::ensure_dataset;
pub use sqlite::SqliteDataset;
pub use static_list::StaticDataset;

use crate::models::RawRecord;

/// Outcome of reading a reference dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetLoad {
    Records(Vec<RawRecord>),
    /// The backing store could not be read; carries the reason for logging.
    Unavailable(String),
}

impl DatasetLoad {
    pub fn into_records(self) -> Vec<RawRecord> {
        match self {
            DatasetLoad::Records(records) => records,
            DatasetLoad::Unavailable(_) => Vec::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, DatasetLoad::Records(_))
    }
}

/// A source of raw reference crop rows.
pub trait DatasetSource: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &str;

    /// Read every row once. Implementations report failure as
    /// [`DatasetLoad::Unavailable`] instead of erroring.
    fn load(&self) -> DatasetLoad;

    /// Rows of the dataset, or none if it cannot be read.
    fn load_reference_records(&self) -> Vec<RawRecord> {
        match self.load() {
            DatasetLoad::Records(records) => {
                tracing::debug!(source = self.name(), rows = records.len(), "Loaded crop dataset");
                records
            }
            DatasetLoad::Unavailable(reason) => {
                tracing::warn!(source = self.name(), "Crop dataset unavailable: {}", reason);
                Vec::new()
            }
        }
    }
}

impl<T: DatasetSource + ?Sized> DatasetSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load(&self) -> DatasetLoad {
        (**self).load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl DatasetSource for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn load(&self) -> DatasetLoad {
            DatasetLoad::Unavailable("disk on fire".into())
        }
    }

    #[test]
    fn unavailable_source_yields_no_records() {
        assert!(Broken.load_reference_records().is_empty());
        assert!(!Broken.load().is_available());
    }

    #[test]
    fn into_records_passes_rows_through() {
        let mut row = RawRecord::new();
        row.insert("crop".into(), "Corn".into());
        let load = DatasetLoad::Records(vec![row.clone()]);
        assert!(load.is_available());
        assert_eq!(load.into_records(), vec![row]);
    }
}
