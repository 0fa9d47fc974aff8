use clap::{Args, Parser, Subcommand};
use soilscan::models::RawRecord;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "soilscan",
    version,
    about = "Soil scans with crop recommendations"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override data directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recommend a crop for one soil reading
    Recommend {
        #[command(flatten)]
        sample: SampleArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Manage recorded scans
    #[command(subcommand)]
    Scan(ScanCommand),
    /// Manage the crop reference dataset
    #[command(subcommand)]
    Dataset(DatasetCommand),
}

#[derive(Subcommand)]
pub enum ScanCommand {
    /// Record a scan with its recommendation
    Add {
        #[command(flatten)]
        sample: SampleArgs,

        /// Owner of the scan (defaults to scans.default_user)
        #[arg(short, long)]
        user: Option<String>,

        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,

        #[arg(long)]
        json: bool,
    },
    /// List scans, oldest first
    List {
        #[arg(short, long)]
        user: Option<String>,

        #[arg(long)]
        json: bool,
    },
    /// Change a scan's title
    Rename { id: i64, title: String },
    /// Delete a scan
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum DatasetCommand {
    /// Copy the bundled dataset into the data directory if missing
    Setup,
    /// Report where crop data comes from and how many rows it has
    Check,
}

/// Soil reading given as flags or as a JSON object.
#[derive(Args, Debug, Default)]
pub struct SampleArgs {
    /// Nitrogen
    #[arg(short = 'n', long = "n")]
    pub n: Option<f64>,

    /// Phosphorus
    #[arg(short = 'p', long = "p")]
    pub p: Option<f64>,

    /// Potassium
    #[arg(short = 'k', long = "k")]
    pub k: Option<f64>,

    #[arg(short = 't', long, allow_hyphen_values = true)]
    pub temperature: Option<f64>,

    #[arg(short = 'm', long)]
    pub moisture: Option<f64>,

    #[arg(long)]
    pub ph: Option<f64>,

    /// Sensor payload, e.g. '{"n":70,"p":40,"k":60,"temperature":25,"moisture":60,"ph":6.5}'
    #[arg(long, conflicts_with_all = ["n", "p", "k", "temperature", "moisture", "ph"])]
    pub sample: Option<String>,
}

impl SampleArgs {
    /// Raw payload for `SoilSample::from_raw`.
    pub fn to_raw(&self) -> anyhow::Result<RawRecord> {
        if let Some(json) = &self.sample {
            let value: serde_json::Value = serde_json::from_str(json)?;
            return value
                .as_object()
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("--sample must be a JSON object"));
        }

        let mut raw = RawRecord::new();
        for (key, value) in [
            ("n", self.n),
            ("p", self.p),
            ("k", self.k),
            ("temperature", self.temperature),
            ("moisture", self.moisture),
            ("ph", self.ph),
        ] {
            if let Some(v) = value {
                raw.insert(key.into(), v.into());
            }
        }
        Ok(raw)
    }
}
