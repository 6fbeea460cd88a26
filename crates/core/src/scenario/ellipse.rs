//! [`EllipseModel`]: converts scalar FBP outputs into a per-vertex elliptical
//! growth vector, per §4.5.

use crate::core_types::fire_point::FbpScalars;
use crate::core_types::vec2::{compass_to_cartesian_radians, Vec2};
use crate::scenario::config::ConfigFlags;
use crate::scenario::percentile::{scaled_rsi, PercentileTable};

/// Per-call inputs the ellipse model needs beyond the raw [`FbpScalars`].
#[derive(Debug, Clone, Copy)]
pub struct EllipseInputs<'a> {
    pub fuel_class_guid: &'a str,
    pub fire_description: &'a str,
    pub growth_percentile: f64,
}

/// Produces the 2-D growth vector (m/min) for one vertex from its sampled
/// [`FbpScalars`] and the active [`ConfigFlags`].
pub struct EllipseModel<'a> {
    pub flags: ConfigFlags,
    pub percentile_table: &'a PercentileTable,
}

impl<'a> EllipseModel<'a> {
    #[must_use]
    pub fn new(flags: ConfigFlags, percentile_table: &'a PercentileTable) -> Self {
        EllipseModel { flags, percentile_table }
    }

    /// Build the growth vector. `fbp` is mutated in place: `rsi` is replaced
    /// by the percentile-scaled value (§4.14) and, with `WIND`/`TOPOGRAPHY`
    /// off, the wind/slope-derived components are zeroed before the vector
    /// is derived, matching the order in §4.5.
    #[must_use]
    pub fn compute(&self, fbp: &mut FbpScalars, inputs: EllipseInputs<'_>) -> Vec2 {
        fbp.rsi = scaled_rsi(
            fbp.rsi,
            self.percentile_table,
            inputs.fuel_class_guid,
            inputs.fire_description,
            inputs.growth_percentile,
            self.flags.ignitions_percentile_enable,
        );

        if !self.flags.wind {
            // WSV (wind speed vector) contribution is the spread between ROS
            // and the isotropic equilibrium; with wind off the front must
            // grow uniformly in every direction.
            fbp.bros = fbp.roseq;
            fbp.fros = fbp.roseq;
            fbp.ros = fbp.roseq;
        }
        if !self.flags.topography {
            // No slope-derived skew: same treatment, collapse to the
            // equilibrium rate in every direction.
            fbp.bros = fbp.roseq;
            fbp.fros = fbp.roseq;
        }

        let cartesian_raz = compass_to_cartesian_radians(fbp.raz);
        let head = Vec2::new(cartesian_raz.cos(), cartesian_raz.sin()) * fbp.ros;
        head
    }

    /// The growth vector's magnitude at an arbitrary azimuth (Cartesian
    /// radians), used by the Propagator to sample the ellipse at a
    /// vertex-local outward-normal direction rather than only at `RAZ`.
    ///
    /// Models the standard FBP length-to-breadth ellipse: head/back/flank
    /// rates define an ellipse whose major axis is aligned with `RAZ`; the
    /// radius at angle `theta` (measured from the head direction) follows
    /// `r(theta) = (ros * bros) / (bros + (ros - bros) * cos(theta))` for
    /// the forward half and a matching back-rate form for the rear half.
    #[must_use]
    pub fn radius_at_azimuth(fbp: &FbpScalars, azimuth_cartesian: f64) -> f64 {
        let head_cartesian = compass_to_cartesian_radians(fbp.raz);
        let theta = crate::core_types::vec2::normalize_radians(azimuth_cartesian - head_cartesian);
        let (ros, bros) = (fbp.ros.max(0.0), fbp.bros.max(0.0));
        if ros <= 0.0 {
            return 0.0;
        }
        let c = (ros + bros) / 2.0;
        let a = (ros - bros) / 2.0;
        let b = (ros * bros).sqrt();
        if b <= 0.0 {
            return 0.0;
        }
        // Ellipse centered at `a` offset from the ignition focus, major
        // semi-axis `c`, minor semi-axis `b`: distance from the focus to the
        // boundary at angle `theta` from the major axis.
        let denom = c - a * theta.cos();
        if denom.abs() < 1e-9 {
            return ros.max(bros);
        }
        (b * b) / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fbp(ros: f64, bros: f64, fros: f64, raz: f64) -> FbpScalars {
        FbpScalars {
            rsi: ros,
            roseq: ros,
            ros,
            bros,
            fros,
            raz,
            ..FbpScalars::default()
        }
    }

    #[test]
    fn wind_off_collapses_to_isotropic_equilibrium() {
        let table = PercentileTable::new();
        let flags = ConfigFlags {
            wind: false,
            ..ConfigFlags::default()
        };
        let model = EllipseModel::new(flags, &table);
        let mut f = fbp(5.0, 1.0, 2.0, 0.0);
        model.compute(&mut f, EllipseInputs {
            fuel_class_guid: "grass",
            fire_description: "default",
            growth_percentile: 50.0,
        });
        assert_eq!(f.ros, f.roseq);
        assert_eq!(f.bros, f.roseq);
        assert_eq!(f.fros, f.roseq);
    }

    #[test]
    fn growth_vector_points_toward_raz_cartesian_azimuth() {
        let table = PercentileTable::new();
        let model = EllipseModel::new(ConfigFlags::default(), &table);
        let mut f = fbp(5.0, 1.0, 2.0, 0.0); // compass north
        let v = model.compute(&mut f, EllipseInputs {
            fuel_class_guid: "grass",
            fire_description: "default",
            growth_percentile: 50.0,
        });
        // Compass north maps to Cartesian +y.
        assert!(v.y > 0.0);
        assert!(v.x.abs() < 1e-9);
        assert!((v.norm() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn radius_at_head_azimuth_equals_ros() {
        let f = fbp(5.0, 1.0, 2.0, 0.0);
        let head_cartesian = compass_to_cartesian_radians(0.0);
        let r = EllipseModel::radius_at_azimuth(&f, head_cartesian);
        assert!((r - 5.0).abs() < 1e-6);
    }

    #[test]
    fn radius_at_back_azimuth_equals_bros() {
        let f = fbp(5.0, 1.0, 2.0, 0.0);
        let head_cartesian = compass_to_cartesian_radians(0.0);
        let back_cartesian = head_cartesian + std::f64::consts::PI;
        let r = EllipseModel::radius_at_azimuth(&f, back_cartesian);
        assert!((r - 1.0).abs() < 1e-6);
    }

    #[test]
    fn percentile_scaling_applied_when_enabled() {
        let mut table = PercentileTable::new();
        table.insert("grass", "default", 2.0);
        let flags = ConfigFlags {
            ignitions_percentile_enable: true,
            ..ConfigFlags::default()
        };
        let model = EllipseModel::new(flags, &table);
        let mut f = fbp(5.0, 5.0, 5.0, 0.0);
        model.compute(&mut f, EllipseInputs {
            fuel_class_guid: "grass",
            fire_description: "default",
            growth_percentile: 100.0,
        });
        assert!(f.rsi > 5.0);
    }
}
