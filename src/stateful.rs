//! Fixed-capacity storage for stateful function-block instances (spec
//! §3/§4.5, grounded on `include/st_stateful.h`'s per-family arrays).
//!
//! Every pool is a plain fixed-size array, never resized: a program that
//! needs a ninth `TON` in the same program fails to compile rather than
//! growing a pool at runtime.

use crate::builtins::counters::CounterState;
use crate::builtins::edge::EdgeState;
use crate::builtins::latch::LatchState;
use crate::builtins::signal::{FilterState, HysteresisState};
use crate::builtins::timers::{BlinkState, TimerState};
use crate::consts::MAX_INSTANCES_PER_POOL;

/// Per-program-slot state for every stateful builtin instance the compiler
/// allocated, plus the cycle time (in milliseconds) `FILTER` needs as its
/// `DT` input.
#[derive(Debug, Clone)]
pub struct StatefulStorage {
    pub timers: [TimerState; MAX_INSTANCES_PER_POOL],
    pub blinks: [BlinkState; MAX_INSTANCES_PER_POOL],
    pub edges: [EdgeState; MAX_INSTANCES_PER_POOL],
    pub counters: [CounterState; MAX_INSTANCES_PER_POOL],
    pub latches: [LatchState; MAX_INSTANCES_PER_POOL],
    pub hysteresis: [HysteresisState; MAX_INSTANCES_PER_POOL],
    pub filters: [FilterState; MAX_INSTANCES_PER_POOL],
    pub cycle_time_ms: u32,
}

impl Default for StatefulStorage {
    fn default() -> Self {
        StatefulStorage {
            timers: [TimerState::default(); MAX_INSTANCES_PER_POOL],
            blinks: [BlinkState::default(); MAX_INSTANCES_PER_POOL],
            edges: [EdgeState::default(); MAX_INSTANCES_PER_POOL],
            counters: [CounterState::default(); MAX_INSTANCES_PER_POOL],
            latches: [LatchState::default(); MAX_INSTANCES_PER_POOL],
            hysteresis: [HysteresisState::default(); MAX_INSTANCES_PER_POOL],
            filters: [FilterState::default(); MAX_INSTANCES_PER_POOL],
            cycle_time_ms: crate::consts::DEFAULT_EXECUTION_INTERVAL_MS,
        }
    }
}

impl StatefulStorage {
    pub fn new(cycle_time_ms: u32) -> Self {
        StatefulStorage { cycle_time_ms, ..Default::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instances_start_at_their_default_state() {
        let storage = StatefulStorage::new(10);
        assert_eq!(storage.counters[0].cv(), 0);
        assert_eq!(storage.cycle_time_ms, 10);
    }
}
