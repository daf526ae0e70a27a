//! Pure arithmetic builtins. All operate in `f64` internally and convert
//! back to the widest operand type, mirroring the VM's own arithmetic
//! promotion rule.

use crate::value::{Value, ValueKind};

pub fn abs(a: Value) -> Value {
    Value::from_f64_clamped(a.as_f64().abs(), ValueKind::from(&a))
}

pub fn sqrt(a: Value) -> Value {
    Value::Real(a.as_f64().sqrt() as f32)
}

pub fn sin(a: Value) -> Value {
    Value::Real(a.as_f64().sin() as f32)
}

pub fn cos(a: Value) -> Value {
    Value::Real(a.as_f64().cos() as f32)
}

pub fn tan(a: Value) -> Value {
    Value::Real(a.as_f64().tan() as f32)
}

pub fn ln(a: Value) -> Value {
    Value::Real(a.as_f64().ln() as f32)
}

pub fn log(a: Value) -> Value {
    Value::Real(a.as_f64().log10() as f32)
}

pub fn exp(a: Value) -> Value {
    Value::Real(a.as_f64().exp() as f32)
}

pub fn floor(a: Value) -> Value {
    Value::from_f64_clamped(a.as_f64().floor(), ValueKind::Dint)
}

pub fn ceil(a: Value) -> Value {
    Value::from_f64_clamped(a.as_f64().ceil(), ValueKind::Dint)
}

pub fn min(a: Value, b: Value) -> Value {
    let kind = Value::widest_kind(&a, &b);
    if a.as_f64() <= b.as_f64() {
        Value::from_f64_clamped(a.as_f64(), kind)
    } else {
        Value::from_f64_clamped(b.as_f64(), kind)
    }
}

pub fn max(a: Value, b: Value) -> Value {
    let kind = Value::widest_kind(&a, &b);
    if a.as_f64() >= b.as_f64() {
        Value::from_f64_clamped(a.as_f64(), kind)
    } else {
        Value::from_f64_clamped(b.as_f64(), kind)
    }
}

pub fn pow(a: Value, b: Value) -> Value {
    Value::Real(a.as_f64().powf(b.as_f64()) as f32)
}

pub fn sum(a: Value, b: Value) -> Value {
    let kind = Value::widest_kind(&a, &b);
    Value::from_f64_clamped(a.as_f64() + b.as_f64(), kind)
}

pub fn round(a: Value) -> Value {
    Value::from_f64_clamped(a.as_f64().round(), ValueKind::Dint)
}

pub fn trunc(a: Value) -> Value {
    Value::from_f64_clamped(a.as_f64().trunc(), ValueKind::Dint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abs_preserves_the_operand_type() {
        assert_eq!(abs(Value::Dint(-7)), Value::Dint(7));
    }

    #[test]
    fn min_max_pick_the_wider_result_type() {
        assert_eq!(min(Value::Int(3), Value::Dint(2)), Value::Dint(2));
        assert_eq!(max(Value::Int(3), Value::Dint(2)), Value::Dint(3));
    }

    #[test]
    fn round_rounds_half_away_from_zero() {
        assert_eq!(round(Value::Real(2.5)), Value::Dint(3));
        assert_eq!(round(Value::Real(-2.5)), Value::Dint(-3));
    }

    #[test]
    fn trunc_drops_the_fractional_part() {
        assert_eq!(trunc(Value::Real(2.9)), Value::Dint(2));
        assert_eq!(trunc(Value::Real(-2.9)), Value::Dint(-2));
    }

    #[test]
    fn sum_widens_to_the_wider_operand() {
        assert_eq!(sum(Value::Int(3), Value::Dint(2)), Value::Dint(5));
    }
}
