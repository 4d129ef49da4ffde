//! Instruction Representation
//!
//! Pairs an opcode with its operand. Opcodes that need an operand carry it in
//! the variant, so a decoded instruction is always complete.
//! This layer contains no execution semantics.

use std::fmt;

use super::opcode::OpCode;
use crate::error::{SimError, SimResult};

/// Decoded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Push(i64),
    Print,
    Mult,
    Call(i64),
    Ret,
    Stop,
}

impl Instruction {
    /// Decode a textual opcode and optional operand
    pub fn decode(opcode: &str, operand: Option<i64>) -> SimResult<Self> {
        Self::from_parts(opcode.parse()?, operand)
    }

    /// Build from an opcode and optional operand.
    ///
    /// Operands given to opcodes that ignore them are dropped.
    pub fn from_parts(opcode: OpCode, operand: Option<i64>) -> SimResult<Self> {
        let required = || operand.ok_or(SimError::MissingOperand(opcode));
        Ok(match opcode {
            OpCode::Push => Instruction::Push(required()?),
            OpCode::Print => Instruction::Print,
            OpCode::Mult => Instruction::Mult,
            OpCode::Call => Instruction::Call(required()?),
            OpCode::Ret => Instruction::Ret,
            OpCode::Stop => Instruction::Stop,
        })
    }

    pub fn opcode(&self) -> OpCode {
        match self {
            Instruction::Push(_) => OpCode::Push,
            Instruction::Print => OpCode::Print,
            Instruction::Mult => OpCode::Mult,
            Instruction::Call(_) => OpCode::Call,
            Instruction::Ret => OpCode::Ret,
            Instruction::Stop => OpCode::Stop,
        }
    }

    pub fn operand(&self) -> Option<i64> {
        match self {
            Instruction::Push(value) | Instruction::Call(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand() {
            Some(operand) => write!(f, "{} {}", self.opcode(), operand),
            None => write!(f, "{}", self.opcode()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_requires_operand_for_push_and_call() {
        assert_eq!(Instruction::decode("push", Some(3)), Ok(Instruction::Push(3)));
        assert_eq!(
            Instruction::decode("CALL", None),
            Err(SimError::MissingOperand(OpCode::Call))
        );
    }

    #[test]
    fn decode_drops_ignored_operand() {
        let instr = Instruction::decode("print", Some(9)).expect("decode failed");
        assert_eq!(instr, Instruction::Print);
        assert_eq!(instr.operand(), None);
    }

    #[test]
    fn zero_operand_is_kept() {
        let instr = Instruction::decode("PUSH", Some(0)).expect("decode failed");
        assert_eq!(instr.operand(), Some(0));
        assert_eq!(instr.to_string(), "PUSH 0");
    }
}
