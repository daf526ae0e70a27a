//! `R_TRIG`/`F_TRIG` edge detectors (`st_builtin_edge.cpp`).

#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeState {
    last_state: bool,
}

impl EdgeState {
    /// `true` for exactly one cycle when `signal` transitions false→true.
    pub fn step_rising(&mut self, signal: bool) -> bool {
        let triggered = signal && !self.last_state;
        self.last_state = signal;
        triggered
    }

    /// `true` for exactly one cycle when `signal` transitions true→false.
    pub fn step_falling(&mut self, signal: bool) -> bool {
        let triggered = !signal && self.last_state;
        self.last_state = signal;
        triggered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rising_edge_fires_once_per_transition() {
        let mut e = EdgeState::default();
        assert!(!e.step_rising(false));
        assert!(e.step_rising(true));
        assert!(!e.step_rising(true));
        assert!(!e.step_rising(false));
        assert!(e.step_rising(true));
    }

    #[test]
    fn falling_edge_fires_once_per_transition() {
        let mut e = EdgeState::default();
        e.step_falling(true);
        assert!(!e.step_falling(true));
        assert!(e.step_falling(false));
        assert!(!e.step_falling(false));
    }
}
