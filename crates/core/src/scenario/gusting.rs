//! [`GustingModel`]: deterministic blending of steady and gust wind, per §4.12.

use serde::{Deserialize, Serialize};

/// Where within each hourly period the gusting fraction is concentrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GustBias {
    StartOfPeriod,
    CenterOfPeriod,
    EndOfPeriod,
}

/// Gusting mode: `Off` always returns the steady wind speed; `Average`
/// blends steady and gust wind deterministically per §4.12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GustMode {
    Off,
    Average,
}

/// Configuration for [`GustingModel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GustingModel {
    pub mode: GustMode,
    pub gusts_per_hour: u32,
    /// Fraction of each hourly period spent gusting, in `[0, 1]`.
    pub percent_gusting: f64,
    pub bias: GustBias,
}

impl Default for GustingModel {
    fn default() -> Self {
        GustingModel {
            mode: GustMode::Off,
            gusts_per_hour: 0,
            percent_gusting: 0.0,
            bias: GustBias::CenterOfPeriod,
        }
    }
}

const SECONDS_PER_HOUR: f64 = 3600.0;

impl GustingModel {
    /// The effective wind speed at time `t` (seconds), blending `ws`
    /// (steady) and `gust` (gust) so that, across one hourly period, the
    /// fraction of the period spent at `gust` equals `percent_gusting`.
    #[must_use]
    pub fn apply_gusting(&self, t: i64, ws: f64, gust: f64) -> f64 {
        if self.mode == GustMode::Off || self.gusts_per_hour == 0 || self.percent_gusting <= 0.0 {
            return ws;
        }
        if self.is_gusting_at(t) {
            gust
        } else {
            ws
        }
    }

    /// The next time at or after `from_t` at which the gusting state
    /// changes (gust starts or ends), used by the Scheduler to align Δt to
    /// gust boundaries so no sub-step straddles a transition.
    #[must_use]
    pub fn next_event_time(&self, from_t: i64) -> i64 {
        if self.mode == GustMode::Off || self.gusts_per_hour == 0 {
            return i64::MAX;
        }
        let period = SECONDS_PER_HOUR / f64::from(self.gusts_per_hour);
        let (gust_start, gust_len) = self.gust_window(period);
        let phase = (from_t as f64).rem_euclid(period);
        let gust_end = gust_start + gust_len;
        let next_phase = if phase < gust_start {
            gust_start
        } else if phase < gust_end {
            gust_end
        } else {
            gust_start + period
        };
        from_t + (next_phase - phase).ceil() as i64
    }

    fn is_gusting_at(&self, t: i64) -> bool {
        let period = SECONDS_PER_HOUR / f64::from(self.gusts_per_hour);
        let (gust_start, gust_len) = self.gust_window(period);
        let phase = (t as f64).rem_euclid(period);
        phase >= gust_start && phase < gust_start + gust_len
    }

    /// `(start_offset, length)` of the gust window within one period, given
    /// this model's bias and `percent_gusting`.
    fn gust_window(&self, period: f64) -> (f64, f64) {
        let length = period * self.percent_gusting.clamp(0.0, 1.0);
        let start = match self.bias {
            GustBias::StartOfPeriod => 0.0,
            GustBias::CenterOfPeriod => (period - length) / 2.0,
            GustBias::EndOfPeriod => period - length,
        };
        (start, length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(bias: GustBias, percent: f64) -> GustingModel {
        GustingModel {
            mode: GustMode::Average,
            gusts_per_hour: 1,
            percent_gusting: percent,
            bias,
        }
    }

    #[test]
    fn off_mode_always_returns_steady_speed() {
        let m = GustingModel::default();
        assert_eq!(m.apply_gusting(1800, 10.0, 40.0), 10.0);
    }

    #[test]
    fn center_bias_gusts_around_the_midpoint_of_the_hour() {
        let m = model(GustBias::CenterOfPeriod, 0.5);
        assert_eq!(m.apply_gusting(1800, 10.0, 40.0), 40.0);
        assert_eq!(m.apply_gusting(100, 10.0, 40.0), 10.0);
    }

    #[test]
    fn fraction_of_hour_gusting_matches_percent_gusting() {
        let m = model(GustBias::CenterOfPeriod, 0.25);
        let mut gusting_seconds = 0;
        for t in 0..3600 {
            if m.apply_gusting(t, 10.0, 40.0) == 40.0 {
                gusting_seconds += 1;
            }
        }
        assert_eq!(gusting_seconds, 900);
    }

    #[test]
    fn next_event_time_lands_on_a_transition() {
        let m = model(GustBias::CenterOfPeriod, 0.5);
        let next = m.next_event_time(0);
        let before = m.apply_gusting(next - 1, 10.0, 40.0);
        let at = m.apply_gusting(next, 10.0, 40.0);
        assert_ne!(before, at);
    }
}
