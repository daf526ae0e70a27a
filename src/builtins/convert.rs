//! Explicit type conversion builtins, named for the fixed source/destination
//! pair each one names in ST source (§4.5): there is no generic "convert to
//! whatever type" builtin, only the six pairs the language surface exposes.
//! Conversions clamp rather than wrap, matching
//! [`crate::value::Value::from_f64_clamped`].

use crate::value::{Value, ValueKind};

pub fn int_to_real(a: Value) -> Value {
    Value::Real(a.as_f64() as f32)
}

pub fn real_to_int(a: Value) -> Value {
    Value::from_f64_clamped(a.as_f64().round(), ValueKind::Int)
}

pub fn bool_to_int(a: Value) -> Value {
    Value::Int(a.as_bool() as i16)
}

pub fn int_to_bool(a: Value) -> Value {
    Value::Bool(a.as_bool())
}

pub fn dword_to_int(a: Value) -> Value {
    Value::from_f64_clamped(a.as_f64(), ValueKind::Int)
}

pub fn int_to_dword(a: Value) -> Value {
    Value::from_f64_clamped(a.as_f64(), ValueKind::Dword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_to_int_rounds_and_clamps() {
        assert_eq!(real_to_int(Value::Real(2.6)), Value::Int(3));
        assert_eq!(real_to_int(Value::Real(1e9)), Value::Int(i16::MAX));
    }

    #[test]
    fn bool_to_int_is_zero_or_one() {
        assert_eq!(bool_to_int(Value::Bool(true)), Value::Int(1));
        assert_eq!(bool_to_int(Value::Bool(false)), Value::Int(0));
    }

    #[test]
    fn int_to_dword_clamps_a_negative_value_to_zero() {
        assert_eq!(int_to_dword(Value::Int(-5)), Value::Dword(0));
    }

    #[test]
    fn dword_to_int_clamps_an_oversized_value() {
        assert_eq!(dword_to_int(Value::Dword(100_000)), Value::Int(i16::MAX));
    }
}
