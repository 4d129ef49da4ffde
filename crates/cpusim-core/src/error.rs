//! Simulator Error Types
//!
//! Defines all core error conditions produced by the computer simulator.
//! Errors are deterministic and scoped strictly to build and run concerns.

use thiserror::Error;

use crate::bytecode::opcode::OpCode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    // Build errors
    #[error("cannot set address to {address}: computer only supports addresses up to {capacity}")]
    InvalidAddress { address: usize, capacity: usize },

    #[error("unknown instruction: {0:?}")]
    UnknownInstruction(String),

    #[error("instruction {0} requires an operand")]
    MissingOperand(OpCode),

    // Execution errors
    #[error("stack underflow")]
    StackUnderflow,

    #[error("unknown address {address}: computer only supports addresses up to {capacity}")]
    UnknownAddress { address: i64, capacity: usize },

    #[error("arithmetic overflow: {lhs} * {rhs}")]
    ArithmeticOverflow { lhs: i64, rhs: i64 },

    // Text program loading
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub type SimResult<T> = Result<T, SimError>;
