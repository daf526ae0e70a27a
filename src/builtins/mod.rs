//! Built-in function dispatch table.
//!
//! Pure functions (`math`, `convert`) take their operands straight off the
//! VM stack and push a single result. Stateful function blocks (`timers`,
//! `edge`, `counters`, `latch`, `signal`) each own a small per-instance
//! state struct drawn from [`crate::stateful::StatefulStorage`]'s fixed
//! pools. Engine builtins (`modbus`, `persist`) additionally need a
//! [`crate::collaborators`] handle threaded in via
//! [`crate::engine::CallContext`] rather than a process-wide global, which
//! is the one place this port deliberately diverges from the C original.

pub mod convert;
pub mod counters;
pub mod edge;
pub mod latch;
pub mod math;
pub mod modbus;
pub mod persist;
pub mod signal;
pub mod timers;

/// Which fixed-capacity instance pool a stateful builtin draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    Timer,
    Blink,
    Edge,
    Counter,
    Latch,
    Hysteresis,
    Filter,
}

/// Static metadata the compiler needs to validate and encode a call, and
/// the VM needs to dispatch it.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub id: u16,
    pub name: &'static str,
    pub arity: usize,
    pub stateful: bool,
    pub pool: Pool,
}

macro_rules! descriptors {
    ($($id:expr => $name:literal, $arity:expr, $stateful:expr, $pool:expr;)*) => {
        const DESCRIPTORS: &[Descriptor] = &[
            $(Descriptor { id: $id, name: $name, arity: $arity, stateful: $stateful, pool: $pool }),*
        ];
    };
}

// Ids are stable once assigned: they are encoded directly into bytecode
// images and must not be renumbered across releases.
descriptors! {
    // Pure math, arity 1 unless noted.
    0  => "ABS",         1, false, Pool::Timer;
    1  => "SQRT",        1, false, Pool::Timer;
    2  => "SIN",         1, false, Pool::Timer;
    3  => "COS",         1, false, Pool::Timer;
    4  => "TAN",         1, false, Pool::Timer;
    5  => "LN",          1, false, Pool::Timer;
    6  => "LOG",         1, false, Pool::Timer;
    7  => "EXP",         1, false, Pool::Timer;
    8  => "FLOOR",       1, false, Pool::Timer;
    9  => "CEIL",        1, false, Pool::Timer;
    10 => "MIN",         2, false, Pool::Timer;
    11 => "MAX",         2, false, Pool::Timer;
    12 => "POW",         2, false, Pool::Timer;
    14 => "SUM",         2, false, Pool::Timer;
    15 => "ROUND",       1, false, Pool::Timer;
    16 => "TRUNC",       1, false, Pool::Timer;
    // SCALE(val, in_min, in_max, out_min, out_max): linear map of val
    // from [in_min, in_max] to [out_min, out_max], clamping val first and
    // returning out_min on a degenerate (zero-width) input range (§4.5,
    // §8). Its arity of 5 is one past MAX_CALL_ARGS; the parser special-
    // cases this one builtin's call rather than raising the cap every ST
    // call obeys (documented in DESIGN.md).
    13 => "SCALE",       5, false, Pool::Timer;

    // Conversions, arity 1, one descriptor per named source/destination
    // pair exposed in ST source (no generic "convert to X" builtin).
    20 => "INT_TO_REAL",  1, false, Pool::Timer;
    21 => "REAL_TO_INT",  1, false, Pool::Timer;
    22 => "BOOL_TO_INT",  1, false, Pool::Timer;
    23 => "INT_TO_BOOL",  1, false, Pool::Timer;
    24 => "DWORD_TO_INT", 1, false, Pool::Timer;
    25 => "INT_TO_DWORD", 1, false, Pool::Timer;

    // Stateful function blocks.
    40 => "R_TRIG",      1, true,  Pool::Edge;
    41 => "F_TRIG",      1, true,  Pool::Edge;
    42 => "TON",         2, true,  Pool::Timer;
    43 => "TOF",         2, true,  Pool::Timer;
    44 => "TP",          2, true,  Pool::Timer;
    45 => "CTU",         3, true,  Pool::Counter;
    46 => "CTD",         3, true,  Pool::Counter;
    47 => "CTUD",        4, true,  Pool::Counter;
    48 => "SR",          2, true,  Pool::Latch;
    49 => "RS",          2, true,  Pool::Latch;
    50 => "HYSTERESIS",  3, true,  Pool::Hysteresis;
    51 => "BLINK",       3, true,  Pool::Blink;
    52 => "FILTER",      2, true,  Pool::Filter;

    // Engine builtins (Modbus, persistence) — not instance-pooled; they
    // reach the injected collaborators through the call context instead.
    60 => "MB_READ_COIL",     2, false, Pool::Timer;
    61 => "MB_READ_HOLDING",  2, false, Pool::Timer;
    62 => "MB_WRITE_COIL",    3, false, Pool::Timer;
    63 => "MB_WRITE_HOLDING", 3, false, Pool::Timer;
    70 => "SAVE",             1, false, Pool::Timer;
    71 => "LOAD",             1, false, Pool::Timer;
}

pub fn lookup(name: &str) -> Option<Descriptor> {
    DESCRIPTORS.iter().find(|d| d.name.eq_ignore_ascii_case(name)).copied()
}

pub fn by_id(id: u16) -> Option<Descriptor> {
    DESCRIPTORS.iter().find(|d| d.id == id).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup("ton").unwrap().id, lookup("TON").unwrap().id);
    }

    #[test]
    fn all_ids_are_unique() {
        let mut ids: Vec<u16> = DESCRIPTORS.iter().map(|d| d.id).collect();
        ids.sort_unstable();
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(ids, deduped);
    }
}
