//! Jump-target validation, split out from the fetch/dispatch loop the same
//! way arithmetic lives in [`super::arith`].

use crate::error::RuntimeError;

/// Validates and returns a jump target as a program counter. A well-formed
/// program always ends with an explicit `HALT`, so every reachable target
/// must address a real instruction; this mirrors the stricter bound
/// [`crate::bytecode::Program::validate`] already enforces at upload time,
/// rather than reserving `instr_count` itself as an implicit end-of-program
/// marker.
pub fn jump_target(imm: i32, instr_count: u32) -> Result<u32, RuntimeError> {
    if imm < 0 {
        return Err(RuntimeError::InvalidJump { target: imm as u32, max: instr_count });
    }
    let target = imm as u32;
    if target >= instr_count {
        return Err(RuntimeError::InvalidJump { target, max: instr_count });
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_equal_to_instruction_count_is_rejected() {
        assert!(jump_target(5, 5).is_err());
    }

    #[test]
    fn target_within_range_is_accepted() {
        assert_eq!(jump_target(4, 5), Ok(4));
    }

    #[test]
    fn negative_target_is_rejected() {
        assert!(jump_target(-1, 5).is_err());
    }
}
