use crate::logic::normalize::{self, FieldAliases};
use crate::models::RawRecord;
use serde::{Deserialize, Serialize};

/// Number of axes compared by the recommendation engine.
pub const AXIS_COUNT: usize = 6;

/// Axis labels in comparison order.
pub const AXIS_LABELS: [&str; AXIS_COUNT] = ["N", "P", "K", "Temperature", "Moisture", "pH"];

/// pH assumed when a sensor payload carries none.
pub const NEUTRAL_PH: f64 = 7.0;

const SAMPLE_N: FieldAliases = &["n", "N", "nitrogen", "Nitrogen"];
const SAMPLE_P: FieldAliases = &["p", "P", "phosphorus", "Phosphorus"];
const SAMPLE_K: FieldAliases = &["k", "K", "potassium", "Potassium"];
const SAMPLE_TEMPERATURE: FieldAliases = &["temperature", "Temperature", "temp"];
const SAMPLE_MOISTURE: FieldAliases = &["moisture", "Moisture", "humidity", "Humidity"];
const SAMPLE_PH: FieldAliases = &["ph", "pH", "PH"];

/// One soil-sensor reading submitted for a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilSample {
    pub n: f64,
    pub p: f64,
    pub k: f64,
    pub temperature: f64,
    pub moisture: f64,
    pub ph: f64,
}

impl SoilSample {
    pub fn new(n: f64, p: f64, k: f64, temperature: f64, moisture: f64, ph: f64) -> Self {
        Self {
            n,
            p,
            k,
            temperature,
            moisture,
            ph,
        }
        .sanitized()
    }

    /// Build a sample from a loosely-typed sensor payload.
    ///
    /// Each field accepts a few spellings (`n`/`N`/`nitrogen`, `moisture`/`humidity`, ...).
    /// Missing or non-numeric values become 0, except pH which falls back to
    /// [`NEUTRAL_PH`] when absent, unparsable or zero.
    pub fn from_raw(raw: &RawRecord) -> Self {
        let ph = match normalize::resolve_f64(raw, SAMPLE_PH) {
            v if v == 0.0 => NEUTRAL_PH,
            v => v,
        };

        Self::new(
            normalize::resolve_f64(raw, SAMPLE_N),
            normalize::resolve_f64(raw, SAMPLE_P),
            normalize::resolve_f64(raw, SAMPLE_K),
            normalize::resolve_f64(raw, SAMPLE_TEMPERATURE),
            normalize::resolve_f64(raw, SAMPLE_MOISTURE),
            ph,
        )
    }

    /// Replace NaN and infinities with 0.
    pub fn sanitized(self) -> Self {
        let clean = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            n: clean(self.n),
            p: clean(self.p),
            k: clean(self.k),
            temperature: clean(self.temperature),
            moisture: clean(self.moisture),
            ph: clean(self.ph),
        }
    }

    /// Comparison vector: N, P, K, temperature, moisture, pH.
    pub fn axes(&self) -> [f64; AXIS_COUNT] {
        [
            self.n,
            self.p,
            self.k,
            self.temperature,
            self.moisture,
            self.ph,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn from_raw_accepts_aliases() {
        let sample = SoilSample::from_raw(&raw(json!({
            "N": 70, "phosphorus": "40", "k": 60.0,
            "temp": 25, "humidity": 60, "pH": 6.5
        })));
        assert_eq!(sample, SoilSample::new(70.0, 40.0, 60.0, 25.0, 60.0, 6.5));
    }

    #[test]
    fn from_raw_coerces_garbage_to_zero() {
        let sample = SoilSample::from_raw(&raw(json!({
            "n": "abc", "p": null, "k": true, "temperature": [], "moisture": ""
        })));
        assert_eq!(sample.axes(), [0.0, 0.0, 0.0, 0.0, 0.0, NEUTRAL_PH]);
    }

    #[test]
    fn from_raw_treats_unreadable_or_zero_ph_as_neutral() {
        for ph in [json!("x"), json!(""), json!(0), json!("0.0"), json!(null)] {
            let sample = SoilSample::from_raw(&raw(json!({ "n": 10, "ph": ph })));
            assert_eq!(sample.ph, NEUTRAL_PH, "pH {ph} should be neutral");
        }
        let sample = SoilSample::from_raw(&raw(json!({ "pH": "5.8" })));
        assert_eq!(sample.ph, 5.8);
    }

    #[test]
    fn from_raw_defaults_missing_ph_to_neutral() {
        let sample = SoilSample::from_raw(&raw(json!({ "n": 10 })));
        assert_eq!(sample.ph, NEUTRAL_PH);
        assert_eq!(sample.moisture, 0.0);
    }

    #[test]
    fn new_sanitizes_non_finite_values() {
        let sample = SoilSample::new(f64::NAN, f64::INFINITY, 3.0, 4.0, 5.0, 6.0);
        assert_eq!(sample.axes(), [0.0, 0.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
