//! Fire-behavior statistic identifiers and unit conversion.
//!
//! Mirrors the `CWFGM_FIRE_STAT_*` table from the original scenario growth
//! engine: a small closed set of per-vertex scalars, each with a fixed
//! physical dimension, retrievable either in native units or converted via
//! [`Unit`].

use serde::{Deserialize, Serialize};

/// Identifies one fire-behavior statistic carried by a [`crate::core_types::fire_point::FirePoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatId {
    /// Raw RSI from the fuel model (m/min), before vector-of-growth adjustment.
    FbpRsi,
    /// Raw equilibrium rate of spread (m/min).
    FbpRoseq,
    /// Raw instantaneous rate of spread (m/min).
    FbpRos,
    /// Raw back rate of spread (m/min).
    FbpBros,
    /// Raw flank rate of spread (m/min).
    FbpFros,
    /// Azimuth of the rate-of-spread vector, returned in Cartesian radians.
    Raz,
    /// Rate of spread adjusted for the vertex's vector of growth (m/min).
    Ros,
    /// Crown fraction burned adjusted for vector of growth (fraction 0-1).
    Cfb,
    /// Raw ("head") crown fraction burned from the fuel model (fraction 0-1).
    Hcfb,
    /// Crown fuel consumption adjusted for vector of growth (kg/m^2).
    Cfc,
    /// Surface fuel consumption adjusted for vector of growth (kg/m^2).
    Sfc,
    /// Total fuel consumption adjusted for vector of growth (kg/m^2).
    Tfc,
    /// Fire intensity adjusted for vector of growth (kW/m).
    Fi,
    /// Raw ("head") fire intensity from the fuel model (kW/m).
    Hfi,
    /// Flame length (m).
    FlameLength,
    /// Whether the vertex is still actively spreading: 1.0 if `status == Normal`, else 0.0.
    Active,
}

/// Unit selector for [`crate::core_types::fire_point::FirePoint::retrieve_attribute`].
///
/// `Native` passes the stored value through unchanged; the others convert
/// the subset of stats that carry a matching dimension and are no-ops on
/// unitless stats (`Raz`, `Active`, `Cfb`, `Hcfb`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// No conversion: same value as `retrieve_stat`.
    Native,
    /// Rate-of-spread-kind stats in meters per minute (already the storage unit).
    MetersPerMinute,
    /// Rate-of-spread-kind stats in kilometers per hour.
    KilometersPerHour,
    /// Intensity stats in kilowatts per meter (already the storage unit).
    KilowattsPerMeter,
    /// Consumption stats in kilograms per square meter (already the storage unit).
    KgPerSquareMeter,
    /// Consumption stats in tonnes per hectare.
    TonnesPerHectare,
    /// Length stats in meters (already the storage unit).
    Meters,
    /// Length stats in feet.
    Feet,
}

/// Which physical dimension a stat carries, for unit conversion dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    RateOfSpread,
    Intensity,
    Consumption,
    Length,
    Unitless,
}

impl StatId {
    fn dimension(self) -> Dimension {
        match self {
            StatId::FbpRsi
            | StatId::FbpRoseq
            | StatId::FbpRos
            | StatId::FbpBros
            | StatId::FbpFros
            | StatId::Ros => Dimension::RateOfSpread,
            StatId::Fi | StatId::Hfi => Dimension::Intensity,
            StatId::Cfc | StatId::Sfc | StatId::Tfc => Dimension::Consumption,
            StatId::FlameLength => Dimension::Length,
            StatId::Raz | StatId::Cfb | StatId::Hcfb | StatId::Active => Dimension::Unitless,
        }
    }
}

/// Convert `value` (stored in this stat's native units) to `unit`.
///
/// Units that don't match the stat's dimension are ignored (the native
/// value passes through), matching the original engine's behavior of
/// silently leaving unitless stats alone regardless of the requested unit.
#[must_use]
pub fn convert(stat: StatId, value: f64, unit: Unit) -> f64 {
    if unit == Unit::Native {
        return value;
    }
    match (stat.dimension(), unit) {
        (Dimension::RateOfSpread, Unit::KilometersPerHour) => value * 0.06,
        (Dimension::RateOfSpread, Unit::MetersPerMinute) => value,
        (Dimension::Intensity, Unit::KilowattsPerMeter) => value,
        (Dimension::Consumption, Unit::KgPerSquareMeter) => value,
        (Dimension::Consumption, Unit::TonnesPerHectare) => value * 10.0,
        (Dimension::Length, Unit::Meters) => value,
        (Dimension::Length, Unit::Feet) => value * 3.280_839_895,
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_is_always_identity() {
        for stat in [StatId::Ros, StatId::Fi, StatId::Raz, StatId::FlameLength] {
            assert_eq!(convert(stat, 12.34, Unit::Native), 12.34);
        }
    }

    #[test]
    fn unitless_stats_ignore_requested_unit() {
        assert_eq!(convert(StatId::Raz, 1.5, Unit::Meters), 1.5);
        assert_eq!(convert(StatId::Active, 1.0, Unit::KilowattsPerMeter), 1.0);
    }

    #[test]
    fn rate_of_spread_converts_to_kmh() {
        // 1 m/min == 0.06 km/h
        assert!((convert(StatId::Ros, 1.0, Unit::KilometersPerHour) - 0.06).abs() < 1e-12);
    }

    #[test]
    fn consumption_converts_to_tonnes_per_hectare() {
        assert!((convert(StatId::Sfc, 1.0, Unit::TonnesPerHectare) - 10.0).abs() < 1e-12);
    }
}
