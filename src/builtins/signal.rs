//! `HYSTERESIS`, `FILTER`, and the pure `SCALE` mapper
//! (`st_builtin_signal.cpp`).

/// Schmitt-trigger style comparator: once high, stays high until the
/// input drops below `low`; once low, stays low until it rises above
/// `high`. Holds state in the dead band between the two thresholds.
#[derive(Debug, Clone, Copy, Default)]
pub struct HysteresisState {
    pub q: bool,
}

impl HysteresisState {
    pub fn step(&mut self, input: f64, low: f64, high: f64) -> bool {
        if input > high {
            self.q = true;
        } else if input < low {
            self.q = false;
        }
        self.q
    }
}

/// First-order IIR low-pass filter. `tau <= 0` is a passthrough (and
/// re-primes `out_prev` so the next real filtering starts from the last
/// raw input rather than an initial 0.0); `dt <= 0` falls back to the
/// original's default 10.0 ms tick, since a zero or negative tick makes
/// the exponential-smoothing coefficient undefined.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterState {
    out_prev: f32,
    primed: bool,
}

impl FilterState {
    pub fn step(&mut self, input: f32, tau_ms: f32, dt_ms: f32) -> f32 {
        if tau_ms <= 0.0 {
            self.out_prev = input;
            self.primed = true;
            return input;
        }
        let dt_ms = if dt_ms <= 0.0 { 10.0 } else { dt_ms };
        if !self.primed {
            self.out_prev = input;
            self.primed = true;
        }
        let alpha = dt_ms / (tau_ms + dt_ms);
        let out = self.out_prev + alpha * (input - self.out_prev);
        self.out_prev = out;
        out
    }
}

/// Linear map of `val` from `[in_min, in_max]` to `[out_min, out_max]`,
/// input clamped to `[in_min, in_max]` first; a degenerate (zero-width)
/// input range returns `out_min` rather than dividing by zero (§8: "SCALE
/// with in_max = in_min returns out_min").
pub fn scale(val: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    if (in_max - in_min).abs() < f64::EPSILON {
        return out_min;
    }
    let clamped = val.clamp(in_min.min(in_max), in_min.max(in_max));
    out_min + (clamped - in_min) / (in_max - in_min) * (out_max - out_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hysteresis_holds_in_the_dead_band() {
        let mut h = HysteresisState::default();
        assert!(h.step(12.0, 5.0, 10.0));
        assert!(h.step(7.0, 5.0, 10.0));
        assert!(!h.step(3.0, 5.0, 10.0));
        assert!(!h.step(7.0, 5.0, 10.0));
    }

    #[test]
    fn filter_approaches_a_step_input_exponentially() {
        let mut f = FilterState::default();
        let first = f.step(10.0, 100.0, 10.0);
        let second = f.step(10.0, 100.0, 10.0);
        assert!(first > 0.0 && first < 10.0);
        assert!(second > first && second < 10.0);
    }

    #[test]
    fn filter_tau_zero_is_a_passthrough() {
        let mut f = FilterState::default();
        assert_eq!(f.step(3.0, 0.0, 10.0), 3.0);
        assert_eq!(f.step(9.0, 0.0, 10.0), 9.0);
    }

    #[test]
    fn scale_maps_and_clamps_input() {
        assert_eq!(scale(50.0, 0.0, 100.0, 0.0, 10.0), 5.0);
        assert_eq!(scale(-10.0, 0.0, 100.0, 0.0, 10.0), 0.0);
        assert_eq!(scale(150.0, 0.0, 100.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn scale_degenerate_input_range_returns_out_min() {
        assert_eq!(scale(5.0, 3.0, 3.0, 2.0, 10.0), 2.0);
    }
}
