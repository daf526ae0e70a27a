//! A Structured Text (IEC 61131-3 subset) front end and deterministic,
//! fixed-capacity bytecode VM for an embedded PLC controller.
//!
//! [`parser::parse`] turns source text into an [`ast::Program`];
//! [`compiler::compile`] lowers that into a [`bytecode::Program`];
//! [`vm::Vm`] executes one compiled program for one cycle; [`engine::Engine`]
//! owns a fixed number of program slots, ticks them on a schedule, and
//! synchronises their variables with external registers through the
//! [`collaborators`] traits a host application implements.
//!
//! ```ignore
//! use st_vm::prelude::*;
//!
//! let config = EngineConfig::default();
//! let mut engine = Engine::new(config, registers, clock, NoopModbus, NoopPersistence)?;
//! engine.upload(0, "VAR x: INT; END_VAR x := x + 1;")?;
//! engine.set_enabled(0, true)?;
//! engine.tick(now_ms);
//! ```

pub mod ast;
pub mod builtins;
pub mod bytecode;
pub mod collaborators;
pub mod compiler;
pub mod consts;
pub mod engine;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod stateful;
pub mod token;
pub mod value;
pub mod vm;

/// The types a host application typically needs in scope.
pub mod prelude {
    pub use crate::collaborators::{
        CallContext, Clock, ModbusError, ModbusMaster, NoopModbus, NoopPersistence, PersistError, Persistence,
        RegisterFile,
    };
    pub use crate::engine::{
        BindingDirection, BindingSpec, Engine, EngineConfig, ExecutionStats, SlotSnapshot, SourceKind,
    };
    pub use crate::error::{BindingError, CompileError, EngineError, RuntimeError};
    pub use crate::value::{DataType, Value};
}
