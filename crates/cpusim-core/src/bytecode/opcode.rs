//! Opcode Definitions
//!
//! Defines the closed instruction vocabulary of the simulated computer.
//! This file contains no execution semantics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Instruction opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpCode {
    /// Push the operand onto the operand stack
    Push,
    /// Pop the operand stack and emit the value
    Print,
    /// Pop two values, push their product
    Mult,
    /// Jump to the operand address, remembering the next address
    Call,
    /// Jump back to the remembered address
    Ret,
    /// Halt execution
    Stop,
}

impl OpCode {
    pub const ALL: [OpCode; 6] = [
        OpCode::Push,
        OpCode::Print,
        OpCode::Mult,
        OpCode::Call,
        OpCode::Ret,
        OpCode::Stop,
    ];

    /// Case-insensitive lookup by mnemonic
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(name.trim()))
    }

    /// Canonical mnemonic (lowercase)
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            OpCode::Push => "push",
            OpCode::Print => "print",
            OpCode::Mult => "mult",
            OpCode::Call => "call",
            OpCode::Ret => "ret",
            OpCode::Stop => "stop",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mnemonic().to_ascii_uppercase())
    }
}

impl FromStr for OpCode {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| SimError::UnknownInstruction(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(OpCode::from_name("PUSH"), Some(OpCode::Push));
        assert_eq!(OpCode::from_name("mult"), Some(OpCode::Mult));
        assert_eq!(OpCode::from_name("Ret"), Some(OpCode::Ret));
        assert_eq!(OpCode::from_name("jump"), None);
    }

    #[test]
    fn from_str_reports_unknown_name() {
        let err = "halt".parse::<OpCode>().unwrap_err();
        assert_eq!(err, SimError::UnknownInstruction("halt".to_string()));
    }
}
