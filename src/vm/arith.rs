//! Binary/unary opcode evaluation, split out from the dispatch loop the
//! same way the teacher keeps its ALU helpers apart from its main fetch
//! loop.

use crate::bytecode::Opcode;
use crate::error::RuntimeError;
use crate::value::Value;

/// Evaluates a binary arithmetic, bitwise, or comparison opcode. Operands
/// promote to their widest shared [`crate::value::ValueKind`]; integer-only
/// opcodes (`Mod`, `Shl`, `Shr`) instead widen through `i64` regardless of
/// tag.
pub fn apply_binary(op: Opcode, a: Value, b: Value) -> Result<Value, RuntimeError> {
    use Opcode::*;
    let kind = Value::widest_kind(&a, &b);
    match op {
        Add => Ok(Value::from_f64_clamped(a.as_f64() + b.as_f64(), kind)),
        Sub => Ok(Value::from_f64_clamped(a.as_f64() - b.as_f64(), kind)),
        Mul => Ok(Value::from_f64_clamped(a.as_f64() * b.as_f64(), kind)),
        Div => {
            if b.as_f64() == 0.0 {
                Err(RuntimeError::DivisionByZero)
            } else {
                Ok(Value::from_f64_clamped(a.as_f64() / b.as_f64(), kind))
            }
        }
        Mod => {
            let divisor = b.as_i64();
            if divisor == 0 {
                Err(RuntimeError::DivisionByZero)
            } else {
                Ok(Value::from_f64_clamped((a.as_i64() % divisor) as f64, kind))
            }
        }
        Shl => Ok(Value::from_f64_clamped(((a.as_i64() as i32) << (b.as_i64() & 31)) as f64, kind)),
        Shr => Ok(Value::from_f64_clamped(((a.as_i64() as i32) >> (b.as_i64() & 31)) as f64, kind)),
        And => Ok(Value::Bool(a.as_bool() && b.as_bool())),
        Or => Ok(Value::Bool(a.as_bool() || b.as_bool())),
        Xor => Ok(Value::Bool(a.as_bool() ^ b.as_bool())),
        Eq => Ok(Value::Bool(a.as_f64() == b.as_f64())),
        Ne => Ok(Value::Bool(a.as_f64() != b.as_f64())),
        Lt => Ok(Value::Bool(a.as_f64() < b.as_f64())),
        Gt => Ok(Value::Bool(a.as_f64() > b.as_f64())),
        Le => Ok(Value::Bool(a.as_f64() <= b.as_f64())),
        Ge => Ok(Value::Bool(a.as_f64() >= b.as_f64())),
        other => Err(RuntimeError::UnknownOpcode(other as u8)),
    }
}

pub fn apply_unary(op: Opcode, a: Value) -> Result<Value, RuntimeError> {
    match op {
        Opcode::Not => Ok(Value::Bool(!a.as_bool())),
        Opcode::Neg => Ok(Value::from_f64_clamped(-a.as_f64(), crate::value::ValueKind::from(&a))),
        other => Err(RuntimeError::UnknownOpcode(other as u8)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        assert_eq!(apply_binary(Opcode::Div, Value::Int(1), Value::Int(0)), Err(RuntimeError::DivisionByZero));
    }

    #[test]
    fn add_promotes_to_the_widest_operand() {
        assert_eq!(apply_binary(Opcode::Add, Value::Int(1), Value::Real(2.5)).unwrap(), Value::Real(3.5));
    }

    #[test]
    fn mod_is_integer_only_regardless_of_operand_tag() {
        assert_eq!(apply_binary(Opcode::Mod, Value::Dint(7), Value::Dint(3)).unwrap(), Value::Dint(1));
    }
}
