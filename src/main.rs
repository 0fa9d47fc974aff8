mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands, DatasetCommand, ScanCommand};
use soilscan::config::Config;
use soilscan::datasources::{ensure_dataset, SqliteDataset};
use soilscan::db::Database;
use soilscan::logic::{CropRecommender, ScanService};
use soilscan::models::{GeoPoint, Scan, SoilSample};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_ref())?;
    let data_dir = Config::data_dir(cli.data_dir.as_ref())?;

    match cli.command {
        Commands::Recommend { sample, json } => {
            let sample = SoilSample::from_raw(&sample.to_raw()?);
            let recommender = build_recommender(&config, &data_dir);
            let result = recommender.recommend(&sample);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result);
            }
        }
        Commands::Scan(command) => {
            let db = Database::open(&Config::db_path(&data_dir))
                .context("Failed to open scan history")?;
            let service = ScanService::new(db, build_recommender(&config, &data_dir));
            run_scan_command(&service, &config, command)?;
        }
        Commands::Dataset(command) => run_dataset_command(&config, &data_dir, command)?,
    }

    Ok(())
}

/// Materialize the dataset if a bundled copy is configured; failures only degrade to fallback.
fn build_recommender(config: &Config, data_dir: &Path) -> CropRecommender {
    let dataset_path = config.dataset_path(data_dir);
    if let Some(bundled) = &config.dataset.bundled_path {
        if let Err(e) = ensure_dataset(bundled, &dataset_path) {
            tracing::warn!("Failed to set up crop dataset: {}", e);
        }
    }

    let source = SqliteDataset::new(dataset_path).with_table(config.dataset.table.clone());
    CropRecommender::new(source).with_config(&config.recommendation)
}

fn run_scan_command(
    service: &ScanService,
    config: &Config,
    command: ScanCommand,
) -> anyhow::Result<()> {
    match command {
        ScanCommand::Add {
            sample,
            user,
            lat,
            lon,
            json,
        } => {
            let user = user.unwrap_or_else(|| config.scans.default_user.clone());
            let sample = SoilSample::from_raw(&sample.to_raw()?);
            let location = lat.zip(lon).map(|(lat, lon)| GeoPoint::new(lat, lon));
            let scan = service.create_scan(&user, sample, location)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&scan)?);
            } else {
                print_scan(&scan);
            }
        }
        ScanCommand::List { user, json } => {
            let user = user.unwrap_or_else(|| config.scans.default_user.clone());
            let scans = service.list(&user)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&scans)?);
            } else if scans.is_empty() {
                println!("No scans recorded for {}", user);
            } else {
                for scan in &scans {
                    print_scan(scan);
                }
            }
        }
        ScanCommand::Rename { id, title } => {
            service.rename(id, &title)?;
            println!("Renamed scan {}", id);
        }
        ScanCommand::Delete { id } => {
            service.delete(id)?;
            println!("Deleted scan {}", id);
        }
    }
    Ok(())
}

fn run_dataset_command(
    config: &Config,
    data_dir: &Path,
    command: DatasetCommand,
) -> anyhow::Result<()> {
    let dataset_path = config.dataset_path(data_dir);
    match command {
        DatasetCommand::Setup => {
            let bundled = config
                .dataset
                .bundled_path
                .as_ref()
                .context("dataset.bundled_path is not configured")?;
            if ensure_dataset(bundled, &dataset_path)? {
                println!("Copied crop dataset to {}", dataset_path.display());
            } else {
                println!("Crop dataset already present at {}", dataset_path.display());
            }
        }
        DatasetCommand::Check => {
            let source =
                SqliteDataset::new(&dataset_path).with_table(config.dataset.table.clone());
            println!("Dataset: {} (table {})", dataset_path.display(), source.table());
            match source.row_count() {
                Ok(rows) => println!("Status: OK, {} rows", rows),
                Err(e) => println!(
                    "Status: UNAVAILABLE ({}), built-in profiles will be used",
                    e
                ),
            }
            let recommender = CropRecommender::new(source).with_config(&config.recommendation);
            println!(
                "Metric: {} | Reference profiles in use: {}",
                recommender.metric(),
                recommender.reference_records().len()
            );
        }
    }
    Ok(())
}

fn print_scan(scan: &Scan) {
    let location = if scan.coordinates.is_empty() {
        "no location".to_string()
    } else {
        scan.coordinates.clone()
    };
    println!(
        "#{:<4} {:<20} {:<12} {:>3}%  {}  {}",
        scan.id,
        scan.title,
        scan.recommended_crop,
        scan.confidence,
        location,
        scan.date_scanned.format("%Y-%m-%d %H:%M")
    );
}
