//! Property-based coverage of the universal invariants in spec §8:
//! clamped promotion never panics or escapes the destination type's
//! representable range, and the packed instruction encoding round-trips
//! for any opcode/immediate pair.

use quickcheck_macros::quickcheck;
use st_vm::bytecode::{Instruction, Opcode};
use st_vm::value::{Value, ValueKind};

#[quickcheck]
fn clamped_int_stays_within_i16_range(x: f64) -> bool {
    match Value::from_f64_clamped(x, ValueKind::Int) {
        Value::Int(_) => true,
        _ => false,
    }
}

#[quickcheck]
fn clamped_dword_never_goes_negative(x: f64) -> bool {
    match Value::from_f64_clamped(x, ValueKind::Dword) {
        Value::Dword(d) => {
            if x.is_finite() && x < 0.0 {
                d == 0
            } else {
                true
            }
        }
        _ => false,
    }
}

#[quickcheck]
fn nan_clamps_to_zero_not_a_panic(kind_idx: u8) -> bool {
    let kinds = [ValueKind::Bool, ValueKind::Int, ValueKind::Dint, ValueKind::Dword, ValueKind::Real];
    let kind = kinds[(kind_idx as usize) % kinds.len()];
    let v = Value::from_f64_clamped(f64::NAN, kind);
    matches!(v, Value::Bool(false) | Value::Int(0) | Value::Dint(0) | Value::Dword(0)) || matches!(v, Value::Real(r) if r.is_nan())
}

#[quickcheck]
fn instruction_round_trips_for_any_push_int(imm: i32) -> bool {
    let instr = Instruction::with_imm(Opcode::PushInt, imm);
    Instruction::from_bytes(instr.to_bytes()) == Some(instr)
}

#[quickcheck]
fn call_builtin_packing_round_trips(builtin_id: u16, instance_id: u16) -> bool {
    let instr = Instruction::call_builtin(builtin_id, instance_id);
    instr.builtin_id() == builtin_id && instr.instance_id() == instance_id
}
