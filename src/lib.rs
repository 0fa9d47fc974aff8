//! Soil scans with nearest-neighbour crop recommendations.

pub mod config;
pub mod datasources;
pub mod db;
pub mod error;
pub mod logic;
pub mod models;

pub use error::{Result, SoilScanError};
