//! The program-slot orchestrator: the only part of this
//! crate a host application drives directly. `Engine` owns a fixed number of
//! [`ProgramSlot`]s, ticks them on a schedule, and synchronises their
//! variables with external registers through the injected collaborators.

use tracing::{debug, warn};

use crate::bytecode::{Instruction, Opcode, Program};
use crate::collaborators::{CallContext, Clock, ModbusMaster, Persistence, RegisterFile};
use crate::compiler;
use crate::consts::{
    MAX_BINDINGS_PER_PROGRAM, MAX_ERROR_MESSAGE_LEN, MAX_EXECUTION_INTERVAL_MS, MAX_PROGRAMS,
    MAX_SOURCE_BYTES, MIN_EXECUTION_INTERVAL_MS, STEP_BUDGET_PER_MS,
};
use crate::error::{BindingError, EngineError};
use crate::parser;
use crate::stateful::StatefulStorage;
use crate::value::{DataType, Value};
use crate::vm::{RunOutcome, Vm};

/// Construction-time engine configuration (spec §6.1: `engine_new(config)`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub execution_interval_ms: u32,
    pub max_requests_per_cycle: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            execution_interval_ms: crate::consts::DEFAULT_EXECUTION_INTERVAL_MS,
            max_requests_per_cycle: crate::consts::DEFAULT_MAX_REQUESTS_PER_CYCLE,
        }
    }
}

impl EngineConfig {
    pub fn new(execution_interval_ms: u32, max_requests_per_cycle: u8) -> Result<Self, EngineError> {
        let config = EngineConfig { execution_interval_ms, max_requests_per_cycle };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), EngineError> {
        if !(MIN_EXECUTION_INTERVAL_MS..=MAX_EXECUTION_INTERVAL_MS).contains(&self.execution_interval_ms) {
            return Err(EngineError::InvalidInterval(self.execution_interval_ms));
        }
        Ok(())
    }

    /// Instructions a single cycle may execute before it counts as an
    /// overrun, scaled from the configured interval.
    fn step_budget(&self) -> u32 {
        self.execution_interval_ms.saturating_mul(STEP_BUDGET_PER_MS)
    }
}

/// Which direction a binding moves data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingDirection {
    Input,
    Output,
    Bidirectional,
}

impl BindingDirection {
    fn reads(&self) -> bool {
        matches!(self, BindingDirection::Input | BindingDirection::Bidirectional)
    }

    fn writes(&self) -> bool {
        matches!(self, BindingDirection::Output | BindingDirection::Bidirectional)
    }
}

/// Which external register space a binding addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    HoldingRegister,
    InputRegister,
    Coil,
    DiscreteInput,
}

impl SourceKind {
    /// Input registers and discrete inputs are read-only in every Modbus
    /// implementation; an output or bidirectional binding against either is
    /// rejected at `bind` time rather than silently dropping the write.
    fn supports_write(&self) -> bool {
        matches!(self, SourceKind::HoldingRegister | SourceKind::Coil)
    }
}

/// The register address, width, and kind a binding reads/writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingSpec {
    pub source_kind: SourceKind,
    pub address: u16,
    pub word_count: u8,
}

/// One program variable's link to an external register. Keyed by variable
/// *name*, not a precomputed index: a binding survives a program re-upload
/// whose variable table shifted indices, and is simply unresolvable (skipped
/// with a warning, not an error) if the new program dropped that variable
/// (open question not addressed by spec.md; resolved here, see DESIGN.md).
#[derive(Debug, Clone, PartialEq)]
struct Binding {
    var_name: String,
    direction: BindingDirection,
    spec: BindingSpec,
}

/// Running totals for one program slot.
///
/// Durations are milliseconds, not the microseconds spec.md's field names
/// suggest: the only injected collaborator is [`Clock::now_ms`], which
/// cannot resolve sub-millisecond cycles, so this port measures at the
/// precision it actually has rather than fabricating false precision
/// (documented in DESIGN.md).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionStats {
    pub execution_count: u64,
    pub error_count: u64,
    pub overrun_count: u64,
    pub last_execution_ms: u32,
    pub min_execution_ms: u32,
    pub max_execution_ms: u32,
    pub total_execution_ms: u64,
    pub last_error: Option<String>,
}

impl ExecutionStats {
    fn record(&mut self, elapsed_ms: u32) {
        self.execution_count += 1;
        self.last_execution_ms = elapsed_ms;
        self.total_execution_ms += elapsed_ms as u64;
        self.min_execution_ms = if self.execution_count == 1 { elapsed_ms } else { self.min_execution_ms.min(elapsed_ms) };
        self.max_execution_ms = self.max_execution_ms.max(elapsed_ms);
    }
}

/// One of the engine's fixed program containers.
#[derive(Debug, Clone, Default)]
struct ProgramSlot {
    source: Option<String>,
    program: Option<Program>,
    vars: Vec<Value>,
    storage: StatefulStorage,
    bindings: Vec<Binding>,
    enabled: bool,
    stats: ExecutionStats,
}

impl ProgramSlot {
    fn is_runnable(&self) -> bool {
        self.enabled && self.program.is_some()
    }
}

/// A read-only view of one slot, returned by [`Engine::snapshot`] for
/// HTTP/CLI display.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSnapshot {
    pub source: Option<String>,
    pub enabled: bool,
    pub compiled: bool,
    pub variables: Vec<(String, Value)>,
    pub stats: ExecutionStats,
}

/// Orchestrates up to [`MAX_PROGRAMS`] compiled ST programs against a set of
/// external collaborators. Generic over the four
/// collaborator traits so a host picks concrete register/clock/modbus/
/// persistence implementations (or the provided no-op stand-ins) without
/// this crate depending on any of them directly.
pub struct Engine<R: RegisterFile, C: Clock, M: ModbusMaster, P: Persistence> {
    config: EngineConfig,
    registers: R,
    clock: C,
    modbus: M,
    persistence: P,
    slots: Vec<ProgramSlot>,
    global_enabled: bool,
    last_tick_ms: Option<u32>,
    last_save_ms: Option<u32>,
}

impl<R: RegisterFile, C: Clock, M: ModbusMaster, P: Persistence> Engine<R, C, M, P> {
    pub fn new(config: EngineConfig, registers: R, clock: C, modbus: M, persistence: P) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Engine {
            config,
            registers,
            clock,
            modbus,
            persistence,
            slots: (0..MAX_PROGRAMS).map(|_| ProgramSlot::default()).collect(),
            global_enabled: true,
            last_tick_ms: None,
            last_save_ms: None,
        })
    }

    fn slot_mut(&mut self, slot: usize) -> Result<&mut ProgramSlot, EngineError> {
        self.slots.get_mut(slot).ok_or(EngineError::SlotOutOfRange(slot, MAX_PROGRAMS))
    }

    fn slot(&self, slot: usize) -> Result<&ProgramSlot, EngineError> {
        self.slots.get(slot).ok_or(EngineError::SlotOutOfRange(slot, MAX_PROGRAMS))
    }

    /// Direct access to the backing register file, for a host that drives
    /// I/O through the same handle it passed into [`Engine::new`].
    pub fn registers(&self) -> &R {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.registers
    }

    /// Lexes, parses, and compiles `source` into `slot`. On success installs
    /// the bytecode, (re)initialises stateful storage and the variable
    /// array, and runs the compiled initializer prologue once. On failure
    /// the previous program, if any, is left installed and runnable (spec
    /// §6.1, §8 scenario 6) and the compile error is returned.
    pub fn upload(&mut self, slot: usize, source: &str) -> Result<(), EngineError> {
        if source.len() > MAX_SOURCE_BYTES {
            return Err(EngineError::SourceTooLarge(source.len(), MAX_SOURCE_BYTES));
        }
        self.slot(slot)?; // bounds-check before doing any compile work

        let program = compile_source(source)?;
        program.validate()?;

        let mut vars: Vec<Value> = program.variables.iter().map(|v| Value::zero(v.data_type)).collect();
        let mut storage = StatefulStorage::new(self.config.execution_interval_ms);
        self.run_initializer(&program, &mut vars, &mut storage)?;

        debug!(slot, name = %program.name, vars = program.variables.len(), "program compiled and installed");

        let entry = self.slot_mut(slot)?;
        entry.source = Some(source.to_string());
        entry.program = Some(program);
        entry.vars = vars;
        entry.storage = storage;
        entry.stats = ExecutionStats::default();
        Ok(())
    }

    /// Runs `program.instructions[..body_start]` — the once-only variable
    /// initializer the compiler emits ahead of the cyclic body — against a
    /// throwaway sub-program so the cyclic body is not also executed (spec
    /// §4.3 "Finalisation").
    fn run_initializer(&mut self, program: &Program, vars: &mut [Value], storage: &mut StatefulStorage) -> Result<(), EngineError> {
        if program.body_start == 0 {
            return Ok(());
        }
        let mut instructions: Vec<Instruction> = program.instructions[..program.body_start as usize].to_vec();
        instructions.push(Instruction::simple(Opcode::Halt));
        let init_program = Program {
            name: program.name.clone(),
            variables: program.variables.clone(),
            instructions,
            body_start: 0,
        };

        let now_ms = self.clock.now_ms();
        let mut last_save_ms = self.last_save_ms;
        let mut ctx = CallContext {
            modbus: &mut self.modbus,
            persistence: &mut self.persistence,
            now_ms,
            max_requests_per_cycle: self.config.max_requests_per_cycle,
            request_count: 0,
            last_mb_error: 0,
            last_save_ms: &mut last_save_ms,
        };
        self.last_save_ms = last_save_ms;

        let mut vm = Vm::new(&init_program);
        match vm.run(0, 0, vars, storage, &mut ctx) {
            RunOutcome::Halted => Ok(()),
            RunOutcome::Overran => Ok(()),
            RunOutcome::Errored(err) => Err(EngineError::InvalidBytecode(format!("initializer failed: {err}"))),
        }
    }

    /// Enables or disables a single slot. Disabling resets its stateful
    /// storage and variable array.
    pub fn set_enabled(&mut self, slot: usize, enabled: bool) -> Result<(), EngineError> {
        let interval = self.config.execution_interval_ms;
        let entry = self.slot_mut(slot)?;
        let was_enabled = entry.enabled;
        entry.enabled = enabled;
        if was_enabled && !enabled {
            if let Some(program) = &entry.program {
                entry.vars = program.variables.iter().map(|v| Value::zero(v.data_type)).collect();
            }
            entry.storage = StatefulStorage::new(interval);
        }
        Ok(())
    }

    pub fn global_enable(&mut self, enabled: bool) {
        self.global_enabled = enabled;
    }

    /// Binds a program variable to an external register, replacing any
    /// existing binding for the same `(slot, var_name, direction)` (spec
    /// §6.1). Validates the address is reachable through the injected
    /// [`RegisterFile`] and that `word_count` and the source kind/direction
    /// combination make sense before installing the binding.
    pub fn bind(&mut self, slot: usize, var_name: &str, spec: BindingSpec, direction: BindingDirection) -> Result<(), EngineError> {
        if spec.word_count != 1 && spec.word_count != 2 {
            return Err(BindingError::InvalidWordCount(spec.word_count).into());
        }
        if direction.writes() && !spec.source_kind.supports_write() {
            return Err(BindingError::ReadOnlySource.into());
        }
        self.probe_address(spec)?;

        let entry = self.slot_mut(slot)?;
        let Some(program) = &entry.program else {
            return Err(BindingError::NotCompiled(slot).into());
        };
        if program.variable_index(var_name).is_none() {
            return Err(BindingError::UnknownVariable(var_name.to_string()).into());
        }
        if entry.bindings.len() >= MAX_BINDINGS_PER_PROGRAM
            && !entry.bindings.iter().any(|b| b.var_name == var_name && b.direction == direction)
        {
            return Err(BindingError::TooManyBindings(MAX_BINDINGS_PER_PROGRAM).into());
        }

        entry.bindings.retain(|b| !(b.var_name == var_name && b.direction == direction));
        entry.bindings.push(Binding { var_name: var_name.to_string(), direction, spec });
        Ok(())
    }

    /// Confirms `spec.address` (and its second word, if `word_count == 2`)
    /// is reachable through the register file, by attempting the matching
    /// read — the collaborator interface has no separate "is this address
    /// valid" probe, so a read doubles as the range check.
    fn probe_address(&self, spec: BindingSpec) -> Result<(), EngineError> {
        let ok = match spec.source_kind {
            SourceKind::HoldingRegister => {
                self.registers.read_holding(spec.address).is_some()
                    && (spec.word_count == 1 || self.registers.read_holding(spec.address.wrapping_add(1)).is_some())
            }
            SourceKind::InputRegister => {
                self.registers.read_input(spec.address).is_some()
                    && (spec.word_count == 1 || self.registers.read_input(spec.address.wrapping_add(1)).is_some())
            }
            SourceKind::Coil => spec.word_count == 1 && self.registers.read_coil(spec.address).is_some(),
            SourceKind::DiscreteInput => spec.word_count == 1 && self.registers.read_discrete_input(spec.address).is_some(),
        };
        if ok {
            Ok(())
        } else {
            Err(BindingError::AddressOutOfRange { address: spec.address as u32 }.into())
        }
    }

    /// Clears a slot's source, bytecode, stateful storage, and bindings
    ///.
    pub fn delete(&mut self, slot: usize) -> Result<(), EngineError> {
        let entry = self.slot_mut(slot)?;
        *entry = ProgramSlot::default();
        Ok(())
    }

    /// Drives one scheduler tick. A no-op if globally disabled
    /// or if `execution_interval_ms` has not elapsed since the previous
    /// tick, using wrap-safe subtraction against the free-running clock.
    pub fn tick(&mut self, now_ms: u32) {
        if !self.global_enabled {
            return;
        }
        if let Some(last) = self.last_tick_ms {
            if now_ms.wrapping_sub(last) < self.config.execution_interval_ms {
                return;
            }
        }
        self.last_tick_ms = Some(now_ms);

        for slot in 0..self.slots.len() {
            self.tick_slot(slot, now_ms);
        }
    }

    fn tick_slot(&mut self, slot: usize, now_ms: u32) {
        if !self.slots[slot].is_runnable() {
            return;
        }

        self.apply_input_bindings(slot);

        let max_steps = self.config.step_budget();
        let mut last_save_ms = self.last_save_ms;
        let outcome = {
            let entry = &mut self.slots[slot];
            let Some(program) = &entry.program else { return };
            let mut ctx = CallContext {
                modbus: &mut self.modbus,
                persistence: &mut self.persistence,
                now_ms,
                max_requests_per_cycle: self.config.max_requests_per_cycle,
                request_count: 0,
                last_mb_error: 0,
                last_save_ms: &mut last_save_ms,
            };
            let mut vm = Vm::new(program);
            vm.run(program.body_start, max_steps, &mut entry.vars, &mut entry.storage, &mut ctx)
        };
        self.last_save_ms = last_save_ms;

        self.apply_output_bindings(slot);

        // The only clock available is `now_ms` itself; with no independent
        // "cycle finished" reading there is nothing to subtract it from, so
        // per-cycle duration is always reported as 0 (see DESIGN.md).
        let elapsed_ms = 0;
        let entry = &mut self.slots[slot];
        match &outcome {
            RunOutcome::Halted => entry.stats.record(elapsed_ms),
            RunOutcome::Overran => {
                entry.stats.record(elapsed_ms);
                entry.stats.overrun_count += 1;
                warn!(slot, "program exceeded its step budget and was halted mid-cycle");
            }
            RunOutcome::Errored(err) => {
                entry.stats.record(elapsed_ms);
                entry.stats.error_count += 1;
                let mut message = err.to_string();
                message.truncate(MAX_ERROR_MESSAGE_LEN);
                entry.stats.last_error = Some(message);
                warn!(slot, error = %err, "program halted on a fatal runtime error");
            }
        }
    }

    fn apply_input_bindings(&mut self, slot: usize) {
        let bindings = self.slots[slot].bindings.clone();
        for binding in &bindings {
            if !binding.direction.reads() {
                continue;
            }
            let Some(raw) = self.read_register(binding.spec) else {
                warn!(slot, var = %binding.var_name, "input binding address no longer readable, skipping");
                continue;
            };
            let entry = &mut self.slots[slot];
            let Some(program) = &entry.program else { continue };
            let Some(idx) = program.variable_index(&binding.var_name) else {
                warn!(slot, var = %binding.var_name, "bound variable no longer exists, skipping");
                continue;
            };
            let data_type = program.variables[idx].data_type;
            entry.vars[idx] = decode_register_value(data_type, raw);
        }
    }

    fn apply_output_bindings(&mut self, slot: usize) {
        let bindings = self.slots[slot].bindings.clone();
        for binding in &bindings {
            if !binding.direction.writes() {
                continue;
            }
            let entry = &self.slots[slot];
            let Some(program) = &entry.program else { continue };
            let Some(idx) = program.variable_index(&binding.var_name) else {
                warn!(slot, var = %binding.var_name, "bound variable no longer exists, skipping");
                continue;
            };
            let value = entry.vars[idx];
            self.write_register(binding.spec, value);
        }
    }

    fn read_register(&self, spec: BindingSpec) -> Option<u32> {
        match spec.source_kind {
            SourceKind::HoldingRegister => {
                let high = self.registers.read_holding(spec.address)?;
                if spec.word_count == 1 {
                    Some(high as u32)
                } else {
                    let low = self.registers.read_holding(spec.address.wrapping_add(1))?;
                    Some(((high as u32) << 16) | low as u32)
                }
            }
            SourceKind::InputRegister => {
                let high = self.registers.read_input(spec.address)?;
                if spec.word_count == 1 {
                    Some(high as u32)
                } else {
                    let low = self.registers.read_input(spec.address.wrapping_add(1))?;
                    Some(((high as u32) << 16) | low as u32)
                }
            }
            SourceKind::Coil => self.registers.read_coil(spec.address).map(|b| b as u32),
            SourceKind::DiscreteInput => self.registers.read_discrete_input(spec.address).map(|b| b as u32),
        }
    }

    fn write_register(&mut self, spec: BindingSpec, value: Value) {
        let raw = encode_register_value(value);
        match spec.source_kind {
            SourceKind::HoldingRegister => {
                if spec.word_count == 1 {
                    self.registers.write_holding(spec.address, raw as u16);
                } else {
                    self.registers.write_holding(spec.address, (raw >> 16) as u16);
                    self.registers.write_holding(spec.address.wrapping_add(1), raw as u16);
                }
            }
            SourceKind::Coil => self.registers.write_coil(spec.address, raw != 0),
            SourceKind::InputRegister | SourceKind::DiscreteInput => {
                // Rejected at bind() time; unreachable for an installed binding.
            }
        }
    }

    /// A read-only view of one slot for HTTP/CLI display.
    pub fn snapshot(&self, slot: usize) -> Result<SlotSnapshot, EngineError> {
        let entry = self.slot(slot)?;
        let variables = match &entry.program {
            Some(program) => program
                .variables
                .iter()
                .zip(&entry.vars)
                .filter(|(v, _)| !v.hidden)
                .map(|(v, value)| (v.name.clone(), *value))
                .collect(),
            None => Vec::new(),
        };
        Ok(SlotSnapshot {
            source: entry.source.clone(),
            enabled: entry.enabled,
            compiled: entry.program.is_some(),
            variables,
            stats: entry.stats.clone(),
        })
    }
}

fn compile_source(source: &str) -> Result<Program, EngineError> {
    let ast = parser::parse(source).map_err(EngineError::Compile)?;
    compiler::compile(&ast).map_err(EngineError::Compile)
}

fn decode_register_value(data_type: DataType, raw: u32) -> Value {
    match data_type {
        DataType::Bool => Value::Bool(raw != 0),
        DataType::Int => Value::Int(raw as u16 as i16),
        DataType::Dint => Value::Dint(raw as i32),
        DataType::Dword => Value::Dword(raw),
        DataType::Real => Value::Real(f32::from_bits(raw)),
    }
}

fn encode_register_value(value: Value) -> u32 {
    match value {
        Value::Bool(b) => b as u32,
        Value::Int(i) => i as u16 as u32,
        Value::Dint(i) => i as u32,
        Value::Dword(d) => d,
        Value::Real(f) => f.to_bits(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{NoopModbus, NoopPersistence};

    #[derive(Default)]
    struct TestRegisters {
        holding: [u16; 16],
        coils: [bool; 16],
    }

    impl RegisterFile for TestRegisters {
        fn read_holding(&self, address: u16) -> Option<u16> {
            self.holding.get(address as usize).copied()
        }
        fn write_holding(&mut self, address: u16, value: u16) {
            if let Some(slot) = self.holding.get_mut(address as usize) {
                *slot = value;
            }
        }
        fn read_input(&self, _address: u16) -> Option<u16> {
            Some(0)
        }
        fn read_coil(&self, address: u16) -> Option<bool> {
            self.coils.get(address as usize).copied()
        }
        fn write_coil(&mut self, address: u16, value: bool) {
            if let Some(slot) = self.coils.get_mut(address as usize) {
                *slot = value;
            }
        }
        fn read_discrete_input(&self, _address: u16) -> Option<bool> {
            Some(false)
        }
    }

    #[derive(Clone, Copy, Default)]
    struct TestClock {
        now: u32,
    }

    impl Clock for TestClock {
        fn now_ms(&self) -> u32 {
            self.now
        }
    }

    fn test_engine() -> Engine<TestRegisters, TestClock, NoopModbus, NoopPersistence> {
        let config = EngineConfig::new(10, 5).unwrap();
        Engine::new(config, TestRegisters::default(), TestClock::default(), NoopModbus, NoopPersistence).unwrap()
    }

    #[test]
    fn upload_then_tick_runs_the_program_to_halt() {
        let mut engine = test_engine();
        engine.upload(0, "VAR x: INT; END_VAR x := 1 + 2;").unwrap();
        engine.set_enabled(0, true).unwrap();
        engine.tick(0);
        let snap = engine.snapshot(0).unwrap();
        let (_, x) = snap.variables.iter().find(|(n, _)| n == "x").unwrap();
        assert_eq!(*x, Value::Int(3));
        assert_eq!(snap.stats.execution_count, 1);
    }

    #[test]
    fn a_failed_upload_leaves_the_previous_program_installed() {
        let mut engine = test_engine();
        engine.upload(0, "VAR x: INT; END_VAR x := 1;").unwrap();
        engine.set_enabled(0, true).unwrap();
        let err = engine.upload(0, "VAR x: INT; END_VAR y := 1;").unwrap_err();
        assert!(matches!(err, EngineError::Compile(_)));
        let snap = engine.snapshot(0).unwrap();
        assert!(snap.compiled);
    }

    #[test]
    fn tick_before_the_interval_elapses_is_a_no_op() {
        let mut engine = test_engine();
        engine.upload(0, "VAR x: INT; END_VAR x := x + 1;").unwrap();
        engine.set_enabled(0, true).unwrap();
        engine.tick(0);
        engine.tick(5); // interval is 10ms
        let snap = engine.snapshot(0).unwrap();
        assert_eq!(snap.stats.execution_count, 1);
    }

    #[test]
    fn binding_an_input_register_feeds_the_program() {
        let mut engine = test_engine();
        engine.upload(0, "VAR in_val: INT; out_val: INT; END_VAR out_val := in_val;").unwrap();
        engine.registers.write_holding(0, 42);
        engine
            .bind(0, "in_val", BindingSpec { source_kind: SourceKind::HoldingRegister, address: 0, word_count: 1 }, BindingDirection::Input)
            .unwrap();
        engine
            .bind(0, "out_val", BindingSpec { source_kind: SourceKind::HoldingRegister, address: 1, word_count: 1 }, BindingDirection::Output)
            .unwrap();
        engine.set_enabled(0, true).unwrap();
        engine.tick(0);
        assert_eq!(engine.registers.read_holding(1), Some(42));
    }

    #[test]
    fn binding_a_read_only_source_kind_for_output_is_rejected() {
        let mut engine = test_engine();
        engine.upload(0, "VAR out_val: INT; END_VAR out_val := 1;").unwrap();
        let err = engine
            .bind(0, "out_val", BindingSpec { source_kind: SourceKind::InputRegister, address: 0, word_count: 1 }, BindingDirection::Output)
            .unwrap_err();
        assert!(matches!(err, EngineError::Binding(_)));
    }

    #[test]
    fn invalid_interval_is_rejected_at_construction() {
        assert!(EngineConfig::new(0, 5).is_err());
        assert!(EngineConfig::new(70_000, 5).is_err());
    }

    #[test]
    fn overrun_increments_overrun_count_not_error_count() {
        let mut engine = test_engine();
        engine.upload(0, "VAR x: DINT; END_VAR WHILE TRUE DO x := x + 1; END_WHILE;").unwrap();
        engine.set_enabled(0, true).unwrap();
        engine.tick(0);
        let snap = engine.snapshot(0).unwrap();
        assert_eq!(snap.stats.overrun_count, 1);
        assert_eq!(snap.stats.error_count, 0);
    }
}
