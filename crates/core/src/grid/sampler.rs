//! [`GridSampler`]: the fuel/elevation/weather query contract the engine
//! consumes at `(x, y, t)`.
//!
//! Production hosts back this with a real GIS/weather stack; this module
//! also ships [`UniformGridSampler`], a reference implementation over flat
//! or [`TerrainData`]-backed terrain with a single uniform fuel type and
//! steady weather, sufficient to drive the end-to-end scenarios this crate
//! tests against.

use crate::error::EngineError;
use crate::grid::terrain::TerrainData;

/// Interpolation/accuracy toggles passed to every [`GridSampler::sample`]
/// call, mirroring the `WEATHER_INTERPOLATE_*`/`ACCURATE_FMC_LOCATION`
/// configuration flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleOptions {
    pub temporal: bool,
    pub spatial: bool,
    pub precip: bool,
    pub wind: bool,
    pub wind_vector: bool,
    pub temp_rh: bool,
    pub calc_fwi: bool,
    pub history: bool,
    pub accurate_fmc_location: bool,
}

impl Default for SampleOptions {
    fn default() -> Self {
        SampleOptions {
            temporal: true,
            spatial: true,
            precip: true,
            wind: true,
            wind_vector: false,
            temp_rh: true,
            calc_fwi: true,
            history: false,
            accurate_fmc_location: false,
        }
    }
}

/// Spatial reference / scenario-level metadata, queried once rather than
/// per-point.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialReferenceInfo {
    pub wkt: String,
    pub plot_resolution: f64,
    pub timezone_id: String,
    pub dst_start: Option<i64>,
    pub dst_end: Option<i64>,
}

/// One point-in-time sample of fuel, terrain, and weather.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSample {
    pub fuel_type: String,
    /// Slope, degrees (0 = flat).
    pub slope: f64,
    /// Aspect, compass degrees (0 = north).
    pub aspect: f64,
    pub elevation: f64,
    /// Wind speed, km/h.
    pub wind_speed: f64,
    /// Wind direction, compass degrees (direction the wind is blowing *from*).
    pub wind_direction: f64,
    pub gust_speed: Option<f64>,
    pub temperature: f64,
    pub relative_humidity: f64,
    pub precipitation: f64,
    pub fwi: f64,
}

impl GridSample {
    /// True if `fuel_type` names a non-burnable surface (water, rock, bare
    /// ground, other conventionally unburnable covers).
    #[must_use]
    pub fn is_burnable(&self) -> bool {
        !matches!(
            self.fuel_type.as_str(),
            "water" | "rock" | "non_fuel" | "bare_ground"
        )
    }
}

/// The fuel/elevation/weather query contract the engine consumes.
///
/// Object-safe so a host can hand the engine a boxed implementation backed
/// by any GIS stack, without this crate depending on one.
pub trait GridSampler: Send + Sync {
    /// Sample fuel/terrain/weather at `(x, y)` at time `t` (seconds, same
    /// epoch as [`crate::core_types::ignition::Ignition::start_time`]).
    fn sample(
        &self,
        x: f64,
        y: f64,
        t: i64,
        options: &SampleOptions,
    ) -> Result<GridSample, EngineError>;

    /// Scenario-wide metadata not tied to a single point.
    fn spatial_reference(&self) -> Result<SpatialReferenceInfo, EngineError>;
}

/// Reference [`GridSampler`]: one uniform fuel type, steady weather, and
/// optional [`TerrainData`] for slope/aspect/elevation.
pub struct UniformGridSampler {
    pub fuel_type: String,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub temperature: f64,
    pub relative_humidity: f64,
    pub precipitation: f64,
    pub fwi: f64,
    pub terrain: Option<TerrainData>,
    pub default_elevation: f64,
}

impl UniformGridSampler {
    #[must_use]
    pub fn flat(fuel_type: impl Into<String>) -> Self {
        UniformGridSampler {
            fuel_type: fuel_type.into(),
            wind_speed: 0.0,
            wind_direction: 0.0,
            temperature: 20.0,
            relative_humidity: 40.0,
            precipitation: 0.0,
            fwi: 10.0,
            terrain: None,
            default_elevation: 0.0,
        }
    }

    #[must_use]
    pub fn with_wind(mut self, speed_kmh: f64, direction_deg: f64) -> Self {
        self.wind_speed = speed_kmh;
        self.wind_direction = direction_deg;
        self
    }

    #[must_use]
    pub fn with_terrain(mut self, terrain: TerrainData) -> Self {
        self.terrain = Some(terrain);
        self
    }
}

impl GridSampler for UniformGridSampler {
    fn sample(
        &self,
        x: f64,
        y: f64,
        _t: i64,
        _options: &SampleOptions,
    ) -> Result<GridSample, EngineError> {
        #[allow(clippy::cast_possible_truncation)]
        let (slope, aspect, elevation) = match &self.terrain {
            Some(t) => (
                f64::from(t.slope_at_horn(x as f32, y as f32)),
                f64::from(t.aspect_at_horn(x as f32, y as f32)),
                f64::from(t.elevation_at(x as f32, y as f32)),
            ),
            None => (0.0, 0.0, self.default_elevation),
        };
        Ok(GridSample {
            fuel_type: self.fuel_type.clone(),
            slope,
            aspect,
            elevation,
            wind_speed: self.wind_speed,
            wind_direction: self.wind_direction,
            gust_speed: None,
            temperature: self.temperature,
            relative_humidity: self.relative_humidity,
            precipitation: self.precipitation,
            fwi: self.fwi,
        })
    }

    fn spatial_reference(&self) -> Result<SpatialReferenceInfo, EngineError> {
        Ok(SpatialReferenceInfo {
            wkt: String::new(),
            plot_resolution: 1.0,
            timezone_id: "UTC".into(),
            dst_start: None,
            dst_end: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_sampler_returns_zero_slope_and_given_fuel() {
        let sampler = UniformGridSampler::flat("grass");
        let sample = sampler.sample(0.0, 0.0, 0, &SampleOptions::default()).unwrap();
        assert_eq!(sample.fuel_type, "grass");
        assert_eq!(sample.slope, 0.0);
        assert!(sample.is_burnable());
    }

    #[test]
    fn water_fuel_type_is_not_burnable() {
        let sampler = UniformGridSampler::flat("water");
        let sample = sampler.sample(0.0, 0.0, 0, &SampleOptions::default()).unwrap();
        assert!(!sample.is_burnable());
    }

    #[test]
    fn with_wind_overrides_speed_and_direction() {
        let sampler = UniformGridSampler::flat("grass").with_wind(20.0, 270.0);
        let sample = sampler.sample(0.0, 0.0, 0, &SampleOptions::default()).unwrap();
        assert_eq!(sample.wind_speed, 20.0);
        assert_eq!(sample.wind_direction, 270.0);
    }
}
