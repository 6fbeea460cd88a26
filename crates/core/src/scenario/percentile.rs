//! Growth-percentile scaling of `RSI` per §4.14.
//!
//! A fuel class's spread-rate distribution is summarized by a lookup table
//! keyed on `(fuel_class_guid, fire_description)`; a user-selected
//! `growth_percentile` then yields a scalar that is multiplied onto `RSI`
//! before the ellipse model (§4.5) runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `(fuel_class_guid, fire_description) -> percentile_value` lookup table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PercentileTable {
    entries: BTreeMap<(String, String), f64>,
}

impl PercentileTable {
    #[must_use]
    pub fn new() -> Self {
        PercentileTable::default()
    }

    pub fn insert(&mut self, fuel_class_guid: impl Into<String>, fire_description: impl Into<String>, value: f64) {
        self.entries.insert((fuel_class_guid.into(), fire_description.into()), value);
    }

    /// The scalar to apply to `RSI` for `fuel_class_guid`/`fire_description`
    /// at the given `growth_percentile`, or `1.0` when the class has no
    /// registered entry (treated as "no scaling known" rather than an
    /// error, since an unregistered class is common for ad hoc fuel types).
    #[must_use]
    pub fn scale(&self, fuel_class_guid: &str, fire_description: &str, growth_percentile: f64) -> f64 {
        self.entries
            .get(&(fuel_class_guid.to_string(), fire_description.to_string()))
            .map(|base| percentile_curve(*base, growth_percentile))
            .unwrap_or(1.0)
    }
}

/// Maps a registered base scalar and the user's chosen percentile to an
/// actual multiplier. The base scalar is itself the table's median (P50)
/// value; percentiles above/below 50 scale the deviation from 1.0 linearly,
/// clamped to stay non-negative.
fn percentile_curve(base: f64, growth_percentile: f64) -> f64 {
    let deviation = base - 1.0;
    let fraction = (growth_percentile - 50.0) / 50.0;
    (1.0 + deviation * fraction).max(0.0)
}

/// Applies [`PercentileTable::scale`] to `rsi`, honoring the
/// `IGNITIONS_PERCENTILE_ENABLE` flag: when disabled, the scalar is exactly
/// `1.0` regardless of the table's contents.
#[must_use]
pub fn scaled_rsi(
    rsi: f64,
    table: &PercentileTable,
    fuel_class_guid: &str,
    fire_description: &str,
    growth_percentile: f64,
    enabled: bool,
) -> f64 {
    if !enabled {
        return rsi;
    }
    rsi * table.scale(fuel_class_guid, fire_description, growth_percentile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_flag_forces_unit_scalar() {
        let mut table = PercentileTable::new();
        table.insert("grass", "default", 1.5);
        let scaled = scaled_rsi(10.0, &table, "grass", "default", 90.0, false);
        assert_eq!(scaled, 10.0);
    }

    #[test]
    fn unregistered_class_defaults_to_unit_scalar() {
        let table = PercentileTable::new();
        assert_eq!(table.scale("unknown", "default", 90.0), 1.0);
    }

    #[test]
    fn higher_percentile_increases_scale_above_baseline() {
        let mut table = PercentileTable::new();
        table.insert("grass", "default", 1.5);
        let p50 = table.scale("grass", "default", 50.0);
        let p90 = table.scale("grass", "default", 90.0);
        assert_eq!(p50, 1.0);
        assert!(p90 > p50);
    }
}
