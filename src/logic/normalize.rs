//! Canonicalization of loosely-keyed dataset rows.
//!
//! Datasets spell the same column several ways (`Crops` vs `crop`, `Humidity`
//! vs `humidity`). Every canonical field owns an ordered alias list; the first
//! alias holding a non-null value wins.

use crate::models::{RawRecord, ReferenceCropRecord, UNKNOWN_CROP};
use regex_lite::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Ordered column names accepted for one canonical field, highest priority first.
pub type FieldAliases = &'static [&'static str];

pub const CROP_ALIASES: FieldAliases = &["crop", "Crops", "crop_name", "CROP", "Crop", "label"];
pub const N_ALIASES: FieldAliases = &["N", "n", "Nitrogen", "nitrogen"];
pub const P_ALIASES: FieldAliases = &["P", "p", "Phosphorus", "phosphorus"];
pub const K_ALIASES: FieldAliases = &["K", "k", "Potassium", "potassium"];
pub const TEMPERATURE_ALIASES: FieldAliases = &["Temperature", "temperature", "temp"];
pub const HUMIDITY_ALIASES: FieldAliases = &["Humidity", "humidity", "h"];
pub const PH_ALIASES: FieldAliases = &["pH", "ph", "PH"];
pub const RAINFALL_ALIASES: FieldAliases = &["RainFall", "rainfall", "Rainfall"];

/// First non-null value stored under any of `aliases`.
pub fn resolve<'a>(raw: &'a RawRecord, aliases: FieldAliases) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|alias| raw.get(*alias))
        .find(|value| !value.is_null())
}

pub fn resolve_f64(raw: &RawRecord, aliases: FieldAliases) -> f64 {
    resolve(raw, aliases).map(coerce_f64).unwrap_or(0.0)
}

/// Numeric reading of a raw value; anything unparsable is 0.
///
/// Strings are read up to the end of their leading number, so `"6.5 pH"` is 6.5.
pub fn coerce_f64(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_number(s),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn parse_leading_number(s: &str) -> Option<f64> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let re = NUMBER.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("numeric pattern")
    });
    re.find(s.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

fn resolve_crop_name(raw: &RawRecord) -> String {
    let name = match resolve(raw, CROP_ALIASES) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    if name.is_empty() {
        UNKNOWN_CROP.to_string()
    } else {
        name
    }
}

pub fn normalize_record(raw: &RawRecord) -> ReferenceCropRecord {
    ReferenceCropRecord {
        crop: resolve_crop_name(raw),
        n: resolve_f64(raw, N_ALIASES),
        p: resolve_f64(raw, P_ALIASES),
        k: resolve_f64(raw, K_ALIASES),
        temperature: resolve_f64(raw, TEMPERATURE_ALIASES),
        humidity: resolve_f64(raw, HUMIDITY_ALIASES),
        ph: resolve_f64(raw, PH_ALIASES),
        rainfall: resolve_f64(raw, RAINFALL_ALIASES),
    }
}

pub fn normalize_records(raw: &[RawRecord]) -> Vec<ReferenceCropRecord> {
    raw.iter().map(normalize_record).collect()
}
