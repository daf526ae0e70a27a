//! Compiled program representation: opcodes, the packed instruction
//! encoding, and the bytecode image format.

use crate::consts::{MAX_INSTRUCTIONS, MAX_VARIABLES};
use crate::error::EngineError;
use crate::value::DataType;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single VM opcode. Arithmetic and comparison opcodes are type-agnostic:
/// the VM promotes operands to their widest common [`crate::value::ValueKind`]
/// at execution time rather than the compiler emitting per-type variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[repr(u8)]
pub enum Opcode {
    /// Push a `BOOL` literal; `imm` is 0 or 1.
    PushBool = 0,
    /// Push an `INT` literal; `imm` sign-extends from 16 bits.
    PushInt,
    /// Push a `DINT` literal.
    PushDint,
    /// Push a `DWORD` literal; `imm` reinterprets its bits as `u32`.
    PushDword,
    /// Push a `REAL` literal; `imm` reinterprets its bits as `f32`.
    PushReal,
    /// Push the value of variable slot `imm`.
    PushVar,
    /// Pop the top of stack into variable slot `imm`.
    PopVar,
    /// Duplicate the top of stack.
    Dup,
    /// Discard the top of stack (used to drop a remote-write builtin's
    /// return value, which a `RemoteWrite` statement has no variable to
    /// store into).
    Pop,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    And,
    Or,
    Xor,
    Not,
    Neg,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    /// Unconditional jump to instruction index `imm`.
    Jmp,
    /// Pop a `BOOL`; jump to `imm` if it is false.
    JmpIfFalse,
    /// Pop a `BOOL`; jump to `imm` if it is true. The compiler never emits
    /// this (every construct in §4.3 desugars to `JmpIfFalse`), but it is
    /// part of the instruction set a loaded bytecode image may use (spec
    /// §4.4's opcode table lists it alongside `JMP`/`JMP_IF_FALSE`).
    JmpIfTrue,
    /// Call a built-in function. `imm` packs a builtin id (low 16 bits) and
    /// a stateful instance id (high 16 bits, `0xFFFF` for pure builtins).
    CallBuiltin,
    /// Does nothing; emitted for statements with no runtime effect (`EXIT`
    /// outside a loop body is rejected at compile time, so this currently
    /// only appears as a placeholder during jump backpatching).
    Nop,
    Halt,
}

impl Opcode {
    fn from_u8(b: u8) -> Option<Opcode> {
        use Opcode::*;
        const TABLE: &[Opcode] = &[
            PushBool, PushInt, PushDint, PushDword, PushReal, PushVar, PopVar, Dup, Pop, Add, Sub,
            Mul, Div, Mod, Shl, Shr, And, Or, Xor, Not, Neg, Eq, Ne, Lt, Gt, Le, Ge, Jmp,
            JmpIfFalse, JmpIfTrue, CallBuiltin, Nop, Halt,
        ];
        TABLE.get(b as usize).copied()
    }
}

/// A packed 8-byte instruction: one opcode byte plus a 4-byte little-endian
/// immediate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Instruction {
    pub opcode: Opcode,
    pub imm: i32,
}

impl Instruction {
    pub fn simple(opcode: Opcode) -> Self {
        Instruction { opcode, imm: 0 }
    }

    pub fn with_imm(opcode: Opcode, imm: i32) -> Self {
        Instruction { opcode, imm }
    }

    pub fn push_dword(value: u32) -> Self {
        Instruction { opcode: Opcode::PushDword, imm: value as i32 }
    }

    pub fn push_real(value: f32) -> Self {
        Instruction { opcode: Opcode::PushReal, imm: value.to_bits() as i32 }
    }

    pub fn dword_imm(&self) -> u32 {
        self.imm as u32
    }

    pub fn real_imm(&self) -> f32 {
        f32::from_bits(self.imm as u32)
    }

    /// Packs a builtin call: `instance_id = u16::MAX` marks a pure builtin
    /// with no persistent state.
    pub fn call_builtin(builtin_id: u16, instance_id: u16) -> Self {
        let imm = (builtin_id as i32) | ((instance_id as i32) << 16);
        Instruction { opcode: Opcode::CallBuiltin, imm }
    }

    pub fn builtin_id(&self) -> u16 {
        (self.imm & 0xFFFF) as u16
    }

    pub fn instance_id(&self) -> u16 {
        ((self.imm >> 16) & 0xFFFF) as u16
    }

    pub fn to_bytes(self) -> [u8; 8] {
        let mut buf = [0u8; 8];
        buf[0] = self.opcode as u8;
        buf[4..8].copy_from_slice(&self.imm.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: [u8; 8]) -> Option<Self> {
        let opcode = Opcode::from_u8(buf[0])?;
        let imm = i32::from_le_bytes(buf[4..8].try_into().ok()?);
        Some(Instruction { opcode, imm })
    }
}

/// A compiled variable slot: declaration metadata retained for binding
/// lookups and snapshot display.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompiledVar {
    pub name: String,
    pub data_type: DataType,
    pub is_input: bool,
    pub is_output: bool,
    /// `true` for compiler-allocated slots (FOR-loop end value, CASE
    /// scrutinee) that never appear in the source's `VAR` blocks and are
    /// not bindable.
    pub hidden: bool,
}

/// A fully compiled program: its variable table and instruction stream.
///
/// `instructions[0..body_start]` initialises `VAR` slots that declared an
/// explicit initial value; it runs exactly once, when the program is
/// uploaded, not on every cycle — re-running it each tick
/// would stomp any state a stateful builtin or prior cycle had built up.
/// `instructions[body_start..]` is the cyclic body, re-run from
/// `body_start` on every `tick`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Program {
    pub name: String,
    pub variables: Vec<CompiledVar>,
    pub instructions: Vec<Instruction>,
    pub body_start: u32,
}

impl Program {
    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name == name && !v.hidden)
    }

    /// Serialises this program to a flat byte image: a 4-byte variable
    /// count and a 4-byte instruction count, followed by each variable's
    /// encoded metadata and each instruction's packed 8 bytes.
    #[cfg(feature = "serde")]
    pub fn to_bytes(&self) -> Result<Vec<u8>, EngineError> {
        bincode_like_encode(self)
    }

    /// Deserialises a program from a byte image produced by
    /// [`Program::to_bytes`], rejecting jump targets or variable indices
    /// that fall outside this program's own bounds.
    pub fn validate(&self) -> Result<(), EngineError> {
        let var_count = self.variables.len() as u16;
        let instr_count = self.instructions.len() as u32;
        for instr in &self.instructions {
            match instr.opcode {
                Opcode::Jmp | Opcode::JmpIfFalse | Opcode::JmpIfTrue => {
                    let target = instr.imm as u32;
                    if target >= instr_count {
                        return Err(EngineError::InvalidBytecode(format!(
                            "jump target {target} out of range (< {instr_count})"
                        )));
                    }
                }
                Opcode::PushVar | Opcode::PopVar => {
                    let index = instr.imm as u16;
                    if index >= var_count {
                        return Err(EngineError::InvalidBytecode(format!(
                            "variable index {index} out of range (< {var_count})"
                        )));
                    }
                }
                _ => {}
            }
        }
        if self.instructions.len() > MAX_INSTRUCTIONS {
            return Err(EngineError::InvalidBytecode(format!(
                "program has {} instructions (max {MAX_INSTRUCTIONS})",
                self.instructions.len()
            )));
        }
        if self.variables.len() > MAX_VARIABLES {
            return Err(EngineError::InvalidBytecode(format!(
                "program has {} variables (max {MAX_VARIABLES})",
                self.variables.len()
            )));
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
fn bincode_like_encode(program: &Program) -> Result<Vec<u8>, EngineError> {
    // A minimal, dependency-free framing: this crate only needs a stable
    // on-disk shape for persistence round-trips, not cross-language
    // interop, so we avoid pulling in a full bincode dependency.
    let mut out = Vec::new();
    out.extend_from_slice(&(program.variables.len() as u32).to_le_bytes());
    out.extend_from_slice(&(program.instructions.len() as u32).to_le_bytes());
    for instr in &program.instructions {
        out.extend_from_slice(&instr.to_bytes());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_round_trips_through_bytes() {
        let instr = Instruction::call_builtin(7, 3);
        let bytes = instr.to_bytes();
        let back = Instruction::from_bytes(bytes).unwrap();
        assert_eq!(back, instr);
        assert_eq!(back.builtin_id(), 7);
        assert_eq!(back.instance_id(), 3);
    }

    #[test]
    fn push_real_preserves_bit_pattern() {
        let instr = Instruction::push_real(3.5);
        assert_eq!(instr.real_imm(), 3.5);
    }

    #[test]
    fn validate_rejects_out_of_range_jump() {
        let program = Program {
            name: "p".into(),
            variables: vec![],
            instructions: vec![Instruction::with_imm(Opcode::Jmp, 99)],
            body_start: 0,
        };
        assert!(program.validate().is_err());
    }
}
