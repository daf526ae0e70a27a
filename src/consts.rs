//! Fixed-capacity limits for the ST execution core.
//!
//! Everything here is a compile-time constant so that out-of-bounds access
//! is a bug, not a runtime possibility that needs to be designed around.

/// Maximum number of variable declarations in a single program.
pub const MAX_VARIABLES: usize = 32;

/// Maximum number of comma-separated arguments in an ordinary function
/// call (§3).
pub const MAX_CALL_ARGS: usize = 4;

/// Upper bound on any single built-in's arity, including `SCALE`'s 5
/// (`in, in_min, in_max, out_min, out_max`), the one built-in spec.md
/// itself defines one argument past `MAX_CALL_ARGS`. Used to size the
/// VM's scratch argument buffer; ordinary ST calls are still capped at
/// `MAX_CALL_ARGS` by the parser.
pub const MAX_BUILTIN_ARITY: usize = 5;

/// Maximum number of branches in a single `CASE` statement.
pub const MAX_CASE_BRANCHES: usize = 16;

/// Maximum identifier length, in significant characters. Longer identifiers
/// are truncated, not rejected.
pub const MAX_IDENT_LEN: usize = 63;

/// Maximum lexeme length stored on a token.
pub const MAX_LEXEME_LEN: usize = 256;

/// Maximum source size accepted by `upload`, in bytes.
pub const MAX_SOURCE_BYTES: usize = 5000;

/// Capacity of the bytecode instruction buffer a single program compiles into.
pub const MAX_INSTRUCTIONS: usize = 1024;

/// Maximum depth of the VM's value stack.
pub const MAX_STACK_DEPTH: usize = 64;

/// Number of program slots the engine manages.
pub const MAX_PROGRAMS: usize = 4;

/// Maximum number of bindings per program.
pub const MAX_BINDINGS_PER_PROGRAM: usize = MAX_VARIABLES;

/// Number of instances per stateful-block pool (timers, edges, counters,
/// latches, hysteresis, blink, filter).
pub const MAX_INSTANCES_PER_POOL: usize = 8;

/// Lower bound of `execution_interval_ms`.
pub const MIN_EXECUTION_INTERVAL_MS: u32 = 1;

/// Upper bound of `execution_interval_ms`.
pub const MAX_EXECUTION_INTERVAL_MS: u32 = 60_000;

/// Default execution interval, in milliseconds.
pub const DEFAULT_EXECUTION_INTERVAL_MS: u32 = 10;

/// Default cap on remote (Modbus) calls issued by a single program in a
/// single cycle.
pub const DEFAULT_MAX_REQUESTS_PER_CYCLE: u8 = 5;

/// Minimum number of milliseconds between successive `SAVE()` calls.
pub const SAVE_RATE_LIMIT_MS: u32 = 5_000;

/// Valid Modbus slave id range, inclusive.
pub const SLAVE_ID_RANGE: std::ops::RangeInclusive<u8> = 1..=247;

/// Bound on the `last_error` message stored per program slot.
pub const MAX_ERROR_MESSAGE_LEN: usize = 128;

/// VM instructions budgeted per millisecond of cycle time when the engine
/// derives a cycle's `max_steps` from `execution_interval_ms`. At the
/// default 10 ms interval this yields a 10,000-step budget.
pub const STEP_BUDGET_PER_MS: u32 = 1_000;
