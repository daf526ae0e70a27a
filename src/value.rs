//! The [`Value`] tagged union and the elementary data types it carries.

use core::fmt;

use strum::EnumDiscriminants;

/// An elementary ST data type, tagging a [`Value`] or a variable declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    /// `BOOL`
    Bool,
    /// `INT` — 16-bit signed.
    Int,
    /// `DINT` — 32-bit signed.
    Dint,
    /// `DWORD` — 32-bit unsigned.
    Dword,
    /// `REAL` — IEEE-754 binary32.
    Real,
}

/// A runtime value carried on the VM stack or stored in a variable slot.
///
/// Arithmetic opcodes operate on whichever tag is present; conversions
/// between tags are explicit, performed only by the conversion built-ins
/// (§4.5) or by [`Value::promote_with`] during binary arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(ValueKind))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// `BOOL`
    Bool(bool),
    /// `INT`
    Int(i16),
    /// `DINT`
    Dint(i32),
    /// `DWORD`
    Dword(u32),
    /// `REAL`
    Real(f32),
}

impl Default for Value {
    fn default() -> Self {
        Value::Bool(false)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Dint(i) => write!(f, "{i}"),
            Value::Dword(d) => write!(f, "{d}"),
            Value::Real(r) => write!(f, "{r}"),
        }
    }
}

impl Value {
    /// The data type this value is tagged with.
    pub const fn data_type(&self) -> DataType {
        match self {
            Value::Bool(_) => DataType::Bool,
            Value::Int(_) => DataType::Int,
            Value::Dint(_) => DataType::Dint,
            Value::Dword(_) => DataType::Dword,
            Value::Real(_) => DataType::Real,
        }
    }

    /// The zero/default value for a declared type, used to initialise
    /// variable slots that have no explicit initial value.
    pub const fn zero(ty: DataType) -> Self {
        match ty {
            DataType::Bool => Value::Bool(false),
            DataType::Int => Value::Int(0),
            DataType::Dint => Value::Dint(0),
            DataType::Dword => Value::Dword(0),
            DataType::Real => Value::Real(0.0),
        }
    }

    /// Interprets the value as a boolean for logical opcodes and stateful
    /// block inputs: any non-zero numeric value is true.
    pub fn as_bool(&self) -> bool {
        match *self {
            Value::Bool(b) => b,
            Value::Int(i) => i != 0,
            Value::Dint(i) => i != 0,
            Value::Dword(d) => d != 0,
            Value::Real(r) => r != 0.0,
        }
    }

    /// Widens the value to `f64` for arithmetic that needs a common
    /// representation (real promotion, comparisons across tags).
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Bool(b) => b as u8 as f64,
            Value::Int(i) => i as f64,
            Value::Dint(i) => i as f64,
            Value::Dword(d) => d as f64,
            Value::Real(r) => r as f64,
        }
    }

    /// Widens the value to `i64`, used by integer-only opcodes (shifts,
    /// modulo) on whichever integer tag is present.
    pub fn as_i64(&self) -> i64 {
        match *self {
            Value::Bool(b) => b as i64,
            Value::Int(i) => i as i64,
            Value::Dint(i) => i as i64,
            Value::Dword(d) => d as i64,
            Value::Real(r) => r as i64,
        }
    }

    /// Ranks tags from narrowest to widest so binary arithmetic can promote
    /// to whichever operand's tag is widest.
    const fn rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Int(_) => 1,
            Value::Dint(_) => 2,
            Value::Dword(_) => 3,
            Value::Real(_) => 4,
        }
    }

    /// Returns the tag that a binary arithmetic opcode should produce given
    /// its two operand tags: the widest of the two.
    pub fn widest_kind(a: &Value, b: &Value) -> ValueKind {
        if a.rank() >= b.rank() {
            a.data_type_as_kind()
        } else {
            b.data_type_as_kind()
        }
    }

    fn data_type_as_kind(&self) -> ValueKind {
        ValueKind::from(self)
    }

    /// Re-tags a widened numeric result (`f64`) into the requested kind,
    /// clamping to the destination's representable range rather than
    /// wrapping.
    pub fn from_f64_clamped(x: f64, kind: ValueKind) -> Value {
        match kind {
            ValueKind::Bool => Value::Bool(x != 0.0),
            ValueKind::Int => Value::Int(clamp_to_i16(x)),
            ValueKind::Dint => Value::Dint(clamp_to_i32(x)),
            ValueKind::Dword => Value::Dword(clamp_to_u32(x)),
            ValueKind::Real => Value::Real(x as f32),
        }
    }
}

fn clamp_to_i16(x: f64) -> i16 {
    if x.is_nan() {
        0
    } else {
        x.clamp(i16::MIN as f64, i16::MAX as f64) as i16
    }
}

fn clamp_to_i32(x: f64) -> i32 {
    if x.is_nan() {
        0
    } else {
        x.clamp(i32::MIN as f64, i32::MAX as f64) as i32
    }
}

fn clamp_to_u32(x: f64) -> u32 {
    if x.is_nan() || x < 0.0 {
        0
    } else {
        x.clamp(0.0, u32::MAX as f64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_bool_treats_any_nonzero_numeric_as_true() {
        assert!(Value::Int(1).as_bool());
        assert!(!Value::Int(0).as_bool());
        assert!(Value::Real(-0.5).as_bool());
        assert!(!Value::Real(0.0).as_bool());
    }

    #[test]
    fn widest_kind_prefers_the_wider_operand() {
        assert_eq!(Value::widest_kind(&Value::Int(1), &Value::Real(2.0)), ValueKind::Real);
        assert_eq!(Value::widest_kind(&Value::Dword(1), &Value::Int(2)), ValueKind::Dword);
    }

    #[test]
    fn from_f64_clamped_saturates_rather_than_wraps() {
        assert_eq!(Value::from_f64_clamped(1e9, ValueKind::Int), Value::Int(i16::MAX));
        assert_eq!(Value::from_f64_clamped(-1.0, ValueKind::Dword), Value::Dword(0));
    }
}
