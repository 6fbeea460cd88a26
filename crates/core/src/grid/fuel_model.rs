//! [`FuelModel`]: converts sampled weather/fuel/terrain into FBP-style
//! scalar fire behavior outputs.

use crate::error::EngineError;
use crate::grid::sampler::GridSample;
use std::collections::BTreeMap;

/// Per-call override table (e.g. a user-specified fine fuel moisture code
/// overriding the grid's weather-derived value).
pub type FuelOverrides = BTreeMap<String, f64>;

/// Scalar outputs of one fuel-model evaluation, in the same fields and
/// units as [`crate::core_types::fire_point::FbpScalars`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FbpOutputs {
    pub rsi: f64,
    pub roseq: f64,
    pub ros: f64,
    pub bros: f64,
    pub fros: f64,
    /// Azimuth, compass radians.
    pub raz: f64,
    pub sfc: f64,
    pub cfb: f64,
    pub cfc: f64,
    pub tfc: f64,
    pub fi: f64,
}

/// Converts sampled weather/terrain into FBP outputs for one fuel type.
///
/// Object-safe so hosts can supply a real fuel-behavior library; this crate
/// ships [`RothermelStyleFuelModel`], a simplified reference model adequate
/// for the disk-growth and wind-driven end-to-end scenarios this crate
/// tests against.
pub trait FuelModel: Send + Sync {
    fn compute(
        &self,
        fuel_type: &str,
        sample: &GridSample,
        moisture: f64,
        overrides: &FuelOverrides,
    ) -> Result<FbpOutputs, EngineError>;

    /// Flame length (m) given tree height (m), crown fraction burned, and
    /// fire intensity (kW/m).
    fn flame_length(&self, tree_height: f64, cfb: f64, fi: f64) -> f64;

    /// Representative tree height (m) registered for `fuel_type`, for
    /// callers that need to invoke `flame_length` without tracking their own
    /// per-fuel canopy data.
    fn tree_height(&self, fuel_type: &str) -> Result<f64, EngineError>;
}

/// One registered fuel type's static parameters.
#[derive(Debug, Clone, Copy)]
pub struct FuelParams {
    /// Fuel load available to burn (kg/m^2).
    pub fuel_load: f64,
    /// Baseline rate of spread at zero wind (m/min).
    pub base_ros: f64,
    /// Wind-speed sensitivity coefficient (applied multiplicatively).
    pub wind_coefficient: f64,
    /// Slope sensitivity coefficient.
    pub slope_coefficient: f64,
    /// Low-intensity fuels never develop crown involvement above this cap.
    pub max_cfb: f64,
    /// Representative tree height (m), used for flame length.
    pub tree_height: f64,
    /// Below this moisture-adjusted RSI, the point reports `NoRos`-worthy zero spread.
    pub minimum_rsi: f64,
}

/// A simplified Rothermel-inspired surface fire spread reference model: one
/// [`FuelParams`] row per registered fuel type, wind/slope scaling applied
/// multiplicatively to a base rate of spread.
pub struct RothermelStyleFuelModel {
    fuels: BTreeMap<String, FuelParams>,
}

impl RothermelStyleFuelModel {
    #[must_use]
    pub fn new() -> Self {
        RothermelStyleFuelModel {
            fuels: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_fuel(mut self, fuel_type: impl Into<String>, params: FuelParams) -> Self {
        self.fuels.insert(fuel_type.into(), params);
        self
    }

    /// A simple grass fuel type: fast-spreading, low crown involvement.
    #[must_use]
    pub fn with_default_grass(self) -> Self {
        self.with_fuel(
            "grass",
            FuelParams {
                fuel_load: 0.3,
                base_ros: 1.0,
                wind_coefficient: 0.05,
                slope_coefficient: 0.02,
                max_cfb: 0.1,
                tree_height: 0.5,
                minimum_rsi: 0.01,
            },
        )
    }
}

impl Default for RothermelStyleFuelModel {
    fn default() -> Self {
        Self::new()
    }
}

impl FuelModel for RothermelStyleFuelModel {
    fn compute(
        &self,
        fuel_type: &str,
        sample: &GridSample,
        moisture: f64,
        overrides: &FuelOverrides,
    ) -> Result<FbpOutputs, EngineError> {
        let params = self.fuels.get(fuel_type).ok_or_else(|| EngineError::FireTypeUnknown {
            fuel_type: fuel_type.to_string(),
        })?;

        if !sample.is_burnable() {
            return Ok(FbpOutputs::default());
        }

        let moisture_factor = (1.0 - (moisture / 100.0).clamp(0.0, 1.0)).max(0.0);
        let wind = overrides.get("wind_speed").copied().unwrap_or(sample.wind_speed);
        let wind_factor = 1.0 + params.wind_coefficient * wind;
        let slope_factor = 1.0 + params.slope_coefficient * sample.slope;

        let roseq = params.base_ros * moisture_factor * wind_factor * slope_factor;
        let rsi = roseq;

        if rsi < params.minimum_rsi {
            return Ok(FbpOutputs {
                raz: sample.wind_direction.to_radians(),
                ..FbpOutputs::default()
            });
        }

        // Length-to-breadth ratio grows with wind and is 1 (a circle) at zero
        // wind, so a calm ignition spreads isotropically rather than the
        // head/flank/back split below being constant regardless of wind.
        let lb = 1.0 + params.wind_coefficient * wind;
        let ros = roseq;
        let bros = roseq / (lb * lb);
        let fros = (ros * bros).sqrt();
        let sfc = params.fuel_load * moisture_factor;
        let cfb = (wind_factor - 1.0).clamp(0.0, params.max_cfb);
        let cfc = cfb * params.fuel_load * 0.5;
        let tfc = sfc + cfc;
        // Byram's fire intensity: I = H * w * r, using a fixed heat yield.
        const HEAT_YIELD_KJ_PER_KG: f64 = 18_000.0;
        let fi = HEAT_YIELD_KJ_PER_KG * tfc * (ros / 60.0);

        Ok(FbpOutputs {
            rsi,
            roseq,
            ros,
            bros,
            fros,
            raz: sample.wind_direction.to_radians(),
            sfc,
            cfb,
            cfc,
            tfc,
            fi,
        })
    }

    fn flame_length(&self, tree_height: f64, cfb: f64, fi: f64) -> f64 {
        // Byram's flame length approximation (m, fi in kW/m), with a small
        // crown-involvement bump bounded by tree height.
        let base = 0.0775 * fi.max(0.0).powf(0.46);
        base + cfb * tree_height * 0.1
    }

    fn tree_height(&self, fuel_type: &str) -> Result<f64, EngineError> {
        self.fuels
            .get(fuel_type)
            .map(|p| p.tree_height)
            .ok_or_else(|| EngineError::FireTypeUnknown {
                fuel_type: fuel_type.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::sampler::GridSample;

    fn sample(wind: f64) -> GridSample {
        GridSample {
            fuel_type: "grass".into(),
            slope: 0.0,
            aspect: 0.0,
            elevation: 0.0,
            wind_speed: wind,
            wind_direction: 0.0,
            gust_speed: None,
            temperature: 20.0,
            relative_humidity: 40.0,
            precipitation: 0.0,
            fwi: 10.0,
        }
    }

    #[test]
    fn unknown_fuel_type_errors() {
        let model = RothermelStyleFuelModel::new().with_default_grass();
        let err = model
            .compute("swamp", &sample(0.0), 10.0, &FuelOverrides::new())
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::FireTypeUnknown {
                fuel_type: "swamp".into()
            }
        );
    }

    #[test]
    fn non_burnable_sample_yields_zero_outputs() {
        let model = RothermelStyleFuelModel::new().with_default_grass();
        let mut s = sample(10.0);
        s.fuel_type = "water".into();
        let out = model.compute("grass", &s, 10.0, &FuelOverrides::new()).unwrap();
        assert_eq!(out, FbpOutputs::default());
    }

    #[test]
    fn higher_wind_increases_rate_of_spread() {
        let model = RothermelStyleFuelModel::new().with_default_grass();
        let calm = model.compute("grass", &sample(0.0), 10.0, &FuelOverrides::new()).unwrap();
        let windy = model.compute("grass", &sample(20.0), 10.0, &FuelOverrides::new()).unwrap();
        assert!(windy.ros > calm.ros);
    }

    #[test]
    fn zero_wind_is_isotropic() {
        let model = RothermelStyleFuelModel::new().with_default_grass();
        let out = model.compute("grass", &sample(0.0), 10.0, &FuelOverrides::new()).unwrap();
        assert!((out.ros - out.bros).abs() < 1e-9);
        assert!((out.ros - out.fros).abs() < 1e-9);
    }

    #[test]
    fn wind_orders_head_flank_back() {
        let model = RothermelStyleFuelModel::new().with_default_grass();
        let out = model.compute("grass", &sample(20.0), 10.0, &FuelOverrides::new()).unwrap();
        assert!(out.ros > out.fros);
        assert!(out.fros > out.bros);
    }

    #[test]
    fn tree_height_reports_registered_fuel() {
        let model = RothermelStyleFuelModel::new().with_default_grass();
        assert_eq!(model.tree_height("grass").unwrap(), 0.5);
        assert!(model.tree_height("swamp").is_err());
    }

    #[test]
    fn flame_length_grows_with_intensity() {
        let model = RothermelStyleFuelModel::new();
        let small = model.flame_length(10.0, 0.0, 100.0);
        let large = model.flame_length(10.0, 0.0, 5000.0);
        assert!(large > small);
    }
}
