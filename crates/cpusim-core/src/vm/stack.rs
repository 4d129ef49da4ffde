//! Operand Stack Implementation
//!
//! Scratch LIFO memory used while a program runs.
//! No execution semantics.

use crate::error::{SimError, SimResult};

/// Operand stack ("memory")
#[derive(Debug, Default)]
pub struct OperandStack {
    values: Vec<i64>,
}

impl OperandStack {
    /// Create an empty stack
    pub fn new() -> Self {
        OperandStack { values: Vec::new() }
    }

    /// Push value onto stack
    pub fn push(&mut self, value: i64) {
        self.values.push(value);
    }

    /// Pop value from stack
    pub fn pop(&mut self) -> SimResult<i64> {
        self.values.pop().ok_or(SimError::StackUnderflow)
    }

    /// Peek at top of stack without removing
    pub fn peek(&self) -> SimResult<i64> {
        self.values.last().copied().ok_or(SimError::StackUnderflow)
    }

    /// Get current stack size
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Check if stack is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
