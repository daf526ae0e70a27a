//! End-to-end scenarios driving the engine the way a host application
//! would: upload a program, bind it to a fake register file, tick it, and
//! inspect the resulting snapshot.

use pretty_assertions::assert_eq;
use st_vm::prelude::*;

#[derive(Default)]
struct FakeRegisters {
    holding: [u16; 32],
    coils: [bool; 32],
    discrete: [bool; 32],
}

impl RegisterFile for FakeRegisters {
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
    fn read_discrete_input(&self, address: u16) -> Option<bool> {
        self.discrete.get(address as usize).copied()
    }
}

#[derive(Default, Clone, Copy)]
struct FakeClock;

impl Clock for FakeClock {
    fn now_ms(&self) -> u32 {
        0
    }
}

type TestEngine = Engine<FakeRegisters, FakeClock, NoopModbus, NoopPersistence>;

fn new_engine(interval_ms: u32) -> TestEngine {
    let config = EngineConfig::new(interval_ms, 5).unwrap();
    Engine::new(config, FakeRegisters::default(), FakeClock, NoopModbus, NoopPersistence).unwrap()
}

fn bind_bool_coil(engine: &mut TestEngine, slot: usize, var: &str, address: u16, direction: BindingDirection) {
    engine
        .bind(slot, var, BindingSpec { source_kind: SourceKind::Coil, address, word_count: 1 }, direction)
        .unwrap();
}

fn read_var(engine: &TestEngine, slot: usize, name: &str) -> Value {
    let snap = engine.snapshot(slot).unwrap();
    snap.variables.into_iter().find(|(n, _)| n == name).map(|(_, v)| v).unwrap()
}

/// A counter reaching its preset on the seventh pulse.
#[test]
fn counter_reaches_preset_on_the_expected_pulse() {
    let mut engine = new_engine(10);
    engine
        .upload(
            0,
            "VAR pulse: BOOL; reset: BOOL; done: BOOL; END_VAR \
             done := CTU(pulse, reset, 3);",
        )
        .unwrap();
    engine.set_enabled(0, true).unwrap();
    bind_bool_coil(&mut engine, 0, "pulse", 0, BindingDirection::Input);
    bind_bool_coil(&mut engine, 0, "done", 1, BindingDirection::Output);

    let pulses = [false, true, true, false, true, false, true];
    let expected_done = [false, false, false, false, false, false, true];

    for (i, (&pulse, &expect)) in pulses.iter().zip(expected_done.iter()).enumerate() {
        engine.registers_mut().coils[0] = pulse;
        engine.tick(i as u32 * 10);
        let done = read_var(&engine, 0, "done");
        assert_eq!(done, Value::Bool(expect), "pulse #{i}: done should be {expect}");
    }
}

/// On-delay timer: output stays false until `PT` has elapsed with input held.
#[test]
fn on_delay_timer_rises_after_preset_time() {
    let mut engine = new_engine(100);
    engine.upload(0, "VAR run: BOOL; lamp: BOOL; END_VAR lamp := TON(run, 1000);").unwrap();
    engine.set_enabled(0, true).unwrap();
    bind_bool_coil(&mut engine, 0, "run", 0, BindingDirection::Input);
    bind_bool_coil(&mut engine, 0, "lamp", 1, BindingDirection::Output);
    engine.registers_mut().coils[0] = true;

    for t in (0..=900).step_by(100) {
        engine.tick(t);
        let lamp = read_var(&engine, 0, "lamp");
        assert_eq!(lamp, Value::Bool(false), "lamp should still be off at t={t}");
    }
    engine.tick(1000);
    assert_eq!(read_var(&engine, 0, "lamp"), Value::Bool(true));
}

/// Hysteresis band: the output only flips once a reading crosses clear of
/// the band, and holds its last state while inside it.
#[test]
fn hysteresis_band_holds_state_between_its_thresholds() {
    let mut engine = new_engine(10);
    engine
        .upload(0, "VAR temp: REAL; heat: BOOL; END_VAR heat := HYSTERESIS(temp, 22.0, 18.0);")
        .unwrap();
    engine.set_enabled(0, true).unwrap();
    engine
        .bind(0, "temp", BindingSpec { source_kind: SourceKind::HoldingRegister, address: 0, word_count: 2 }, BindingDirection::Input)
        .unwrap();

    let readings = [17.0_f32, 19.0, 21.0, 22.5, 21.0, 19.0, 17.0, 19.0];
    let expected = [false, false, false, true, true, true, false, false];

    for (i, (&temp, &expect)) in readings.iter().zip(expected.iter()).enumerate() {
        let bits = temp.to_bits();
        engine.registers_mut().holding[0] = (bits >> 16) as u16;
        engine.registers_mut().holding[1] = bits as u16;
        engine.tick(i as u32 * 10);
        assert_eq!(read_var(&engine, 0, "heat"), Value::Bool(expect), "reading #{i} ({temp})");
    }
}

/// Nested IF/ELSE picks the innermost matching branch.
#[test]
fn nested_if_picks_the_innermost_matching_branch() {
    let mut engine = new_engine(10);
    engine
        .upload(
            0,
            "VAR x: INT; result: INT; END_VAR \
             x := 15; \
             IF x > 10 THEN \
                 IF x > 20 THEN result := 2; ELSE result := 1; END_IF; \
             ELSE \
                 result := 0; \
             END_IF;",
        )
        .unwrap();
    engine.set_enabled(0, true).unwrap();
    engine.tick(0);
    assert_eq!(read_var(&engine, 0, "result"), Value::Int(1));
}

/// A runaway loop is halted at the step budget, counted as an overrun, and
/// never counted as a fatal error.
#[test]
fn runaway_loop_is_stopped_by_the_step_budget() {
    let mut engine = new_engine(10); // 10ms * 1000 steps/ms = 10,000 step budget
    engine.upload(0, "VAR x: DINT; END_VAR WHILE TRUE DO x := x + 1; END_WHILE;").unwrap();
    engine.set_enabled(0, true).unwrap();
    engine.tick(0);

    let snap = engine.snapshot(0).unwrap();
    assert_eq!(snap.stats.overrun_count, 1);
    assert_eq!(snap.stats.error_count, 0);
    let (_, x) = snap.variables.iter().find(|(n, _)| n == "x").unwrap();
    // Each iteration costs 7 instructions (PushBool, JmpIfFalse, PushVar,
    // PushInt, Add, PopVar, Jmp); the budget only counts instructions, not
    // iterations, so it cuts off mid-iteration: 10_000 / 7 = 1428 whole
    // iterations (9_996 steps), then 4 more steps (PushBool, JmpIfFalse,
    // PushVar, PushInt) before the budget is exhausted mid-`Add`.
    assert_eq!(*x, Value::Dint(1_428));
}

/// A compile error during upload leaves the previously installed program
/// running, with the offending variable name in the error message.
#[test]
fn compile_error_leaves_the_previous_program_installed() {
    let mut engine = new_engine(10);
    engine.upload(0, "VAR x: INT; END_VAR x := 1;").unwrap();
    engine.set_enabled(0, true).unwrap();

    let err = engine.upload(0, "VAR x: INT; END_VAR y := 1;").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Unknown variable: y"), "error should mention the unknown variable: {message}");

    engine.tick(0);
    let snap = engine.snapshot(0).unwrap();
    assert!(snap.compiled);
    assert_eq!(read_var(&engine, 0, "x"), Value::Int(1));
}
