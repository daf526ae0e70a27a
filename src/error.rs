//! Error taxonomy for the ST execution core.
//!
//! Three classes: compile-time (lexer/parser/compiler, surfaced
//! once at `upload`), runtime (produced by the VM, handled by the VM itself
//! rather than propagated — see [`crate::vm::RunOutcome`]), and external
//! (produced by collaborators, surfaced as built-in return values plus an
//! error code). [`EngineError`] unifies what actually crosses the `Engine`
//! public API boundary.

use thiserror::Error;

/// A single compile-time diagnostic: the parser/compiler stop at the first
/// one rather than accumulating a diagnostics list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Compile error at line {line}: {message}")]
pub struct CompileError {
    pub message: String,
    pub line: u32,
}

impl CompileError {
    pub fn new(message: impl Into<String>, line: u32) -> Self {
        CompileError { message: message.into(), line }
    }
}

/// Errors the VM can raise while stepping a program. Stack over/underflow,
/// division by zero, an out-of-range jump, an unknown opcode, and an
/// out-of-range variable index are fatal for the cycle; step-budget
/// exhaustion is handled separately as a non-fatal overrun
/// and is therefore *not* a variant here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("stack overflow")]
    StackOverflow,
    #[error("stack underflow")]
    StackUnderflow,
    #[error("division by zero")]
    DivisionByZero,
    #[error("jump target {target} out of range (0..={max})")]
    InvalidJump { target: u32, max: u32 },
    #[error("unknown opcode {0:#x}")]
    UnknownOpcode(u8),
    #[error("variable index {index} out of range (< {count})")]
    InvalidVariableIndex { index: u16, count: u16 },
    #[error("built-in call failed: {0}")]
    BuiltinFailure(String),
}

/// Errors raised when registering or resolving a register binding, and
/// (via [`BindingError::UnknownVariable`]'s `Display`) the text the
/// compiler reuses for an undeclared-variable reference (spec.md's worked
/// scenario 6 fixes the exact wording, "Unknown variable: y").
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
    #[error("program slot {0} has no compiled program")]
    NotCompiled(usize),
    #[error("binding address {address} out of range for this source kind")]
    AddressOutOfRange { address: u32 },
    #[error("word count must be 1 or 2, got {0}")]
    InvalidWordCount(u8),
    #[error("source kind is read-only and cannot be used for an output or bidirectional binding")]
    ReadOnlySource,
    #[error("program slot already has the maximum of {0} bindings")]
    TooManyBindings(usize),
}

/// Errors surfaced at the `Engine` public API boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Binding(#[from] BindingError),
    #[error("program slot index {0} out of range (< {1})")]
    SlotOutOfRange(usize, usize),
    #[error("execution_interval_ms {0} out of range [1, 60000]")]
    InvalidInterval(u32),
    #[error("source too large: {0} bytes (max {1})")]
    SourceTooLarge(usize, usize),
    #[error("invalid bytecode image: {0}")]
    InvalidBytecode(String),
}
