use crate::datasources::sqlite::DEFAULT_TABLE;
use crate::error::{Result, SoilScanError};
use crate::logic::distance::DistanceMetric;
use crate::logic::engine::DEFAULT_CONFIDENCE_DIVISOR;
use crate::models::LOCAL_USER;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DATASET_FILE: &str = "cropDataset.db";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub recommendation: RecommendationConfig,
    pub scans: ScanConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Working copy of the crop dataset; defaults to `<data dir>/SQLite/cropDataset.db`.
    pub path: Option<PathBuf>,
    /// Shipped dataset copied to `path` on first use.
    pub bundled_path: Option<PathBuf>,
    pub table: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: None,
            bundled_path: None,
            table: DEFAULT_TABLE.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub metric: String,
    pub confidence_divisor: f64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            metric: DistanceMetric::default().as_str().into(),
            confidence_divisor: DEFAULT_CONFIDENCE_DIVISOR,
        }
    }
}

impl RecommendationConfig {
    pub fn metric(&self) -> DistanceMetric {
        DistanceMetric::from_str(&self.metric).unwrap_or_else(|| {
            tracing::warn!(
                metric = %self.metric,
                "Unknown distance metric in config, defaulting to euclidean"
            );
            DistanceMetric::Euclidean
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    pub default_user: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            default_user: LOCAL_USER.into(),
        }
    }
}

impl Config {
    /// Load config.yaml from `config_override` or the standard locations.
    ///
    /// An explicit path must exist; otherwise a missing file means defaults.
    pub fn load(config_override: Option<&PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) if !p.exists() => {
                return Err(SoilScanError::Config(format!(
                    "Config file not found at {:?}",
                    p
                )))
            }
            Some(p) => Some(p.clone()),
            None => Self::find_config_path(),
        };

        let Some(config_path) = config_path else {
            tracing::info!("No config.yaml found, using defaults");
            return Ok(Self::default());
        };

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| SoilScanError::Config(format!("Failed to read config: {}", e)))?;
        Self::from_yaml(&config_str)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // Substitute environment variables
        let content = Self::substitute_env_vars(content);

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| SoilScanError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let divisor = self.recommendation.confidence_divisor;
        if !divisor.is_finite() || divisor <= 0.0 {
            return Err(SoilScanError::Config(format!(
                "confidence_divisor must be a positive number, got {}",
                divisor
            )));
        }
        if self.dataset.table.trim().is_empty() {
            return Err(SoilScanError::Config("dataset.table must not be empty".into()));
        }
        Ok(())
    }

    /// First config.yaml found in ./config or the XDG config directory.
    fn find_config_path() -> Option<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join("soilscan").join("config.yaml"))
            .filter(|p| p.exists())
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns and substitute
        let Ok(re) = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") else {
            return result;
        };

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        // CLI override takes priority
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        // Then check env var
        if let Ok(dir) = std::env::var("SOILSCAN_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        // Use XDG data directory
        let data_dir = dirs::data_dir()
            .ok_or_else(|| SoilScanError::Config("Cannot determine data directory".into()))?
            .join("soilscan");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    /// Scan history database.
    pub fn db_path(data_dir: &Path) -> PathBuf {
        data_dir.join("soilscan.db")
    }

    /// Writable crop dataset location.
    pub fn dataset_path(&self, data_dir: &Path) -> PathBuf {
        self.dataset
            .path
            .clone()
            .unwrap_or_else(|| data_dir.join("SQLite").join(DATASET_FILE))
    }
}
