//! Executor
//!
//! Fetch-decode-execute loop over a program store. The executor borrows the
//! store read-only and drives the computer's registers; the operand stack and
//! the output buffer live only as long as one run.

use std::mem;

use tracing::{debug, trace};

use crate::bytecode::instruction::Instruction;
use crate::error::{SimError, SimResult};

use super::program::ProgramStore;
use super::stack::OperandStack;

/// Program counter and the single-slot return register
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    pub program_counter: usize,
    /// Overwritten by every CALL; one level of call/return only
    pub return_register: usize,
}

/// Execution state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecState {
    Running,
    Halted(Vec<i64>),
    Failed(SimError),
}

/// Control flow after one instruction
enum Flow {
    Next,
    Jumped,
    Stop,
}

#[derive(Debug)]
pub struct Executor<'a> {
    program: &'a ProgramStore,
    registers: &'a mut Registers,
    stack: OperandStack,
    output: Vec<i64>,
    state: ExecState,
}

impl<'a> Executor<'a> {
    pub fn new(program: &'a ProgramStore, registers: &'a mut Registers) -> Self {
        Executor {
            program,
            registers,
            stack: OperandStack::new(),
            output: Vec::new(),
            state: ExecState::Running,
        }
    }

    /// Execute until halt or error
    pub fn run(mut self) -> SimResult<Vec<i64>> {
        loop {
            self.step();
            match mem::replace(&mut self.state, ExecState::Running) {
                ExecState::Running => {}
                ExecState::Halted(output) => return Ok(output),
                ExecState::Failed(err) => return Err(err),
            }
        }
    }

    /// Execute a single instruction. No-op once halted or failed.
    pub fn step(&mut self) -> &ExecState {
        if self.state != ExecState::Running {
            return &self.state;
        }

        let pc = self.registers.program_counter;
        if pc > self.program.capacity() {
            debug!(pc, outputs = self.output.len(), "halted past last address");
            self.state = ExecState::Halted(mem::take(&mut self.output));
            return &self.state;
        }

        // Empty slots fall through to the next address
        let flow = match self.program.get(pc) {
            Some(instruction) => {
                trace!(pc, %instruction, depth = self.stack.size(), "exec");
                self.dispatch(instruction)
            }
            None => Ok(Flow::Next),
        };

        match flow {
            Ok(Flow::Next) => self.registers.program_counter += 1,
            Ok(Flow::Jumped) => {}
            Ok(Flow::Stop) => {
                debug!(pc, outputs = self.output.len(), "halted on STOP");
                self.state = ExecState::Halted(mem::take(&mut self.output));
            }
            Err(err) => {
                debug!(pc, error = %err, "execution failed");
                self.state = ExecState::Failed(err);
            }
        }
        &self.state
    }

    fn dispatch(&mut self, instruction: Instruction) -> SimResult<Flow> {
        match instruction {
            Instruction::Push(value) => {
                self.stack.push(value);
                Ok(Flow::Next)
            }
            Instruction::Print => {
                let value = self.stack.pop()?;
                self.output.push(value);
                Ok(Flow::Next)
            }
            Instruction::Mult => {
                let lhs = self.stack.pop()?;
                let rhs = self.stack.pop()?;
                let product = lhs
                    .checked_mul(rhs)
                    .ok_or(SimError::ArithmeticOverflow { lhs, rhs })?;
                self.stack.push(product);
                Ok(Flow::Next)
            }
            Instruction::Call(target) => {
                let capacity = self.program.capacity();
                let address = usize::try_from(target)
                    .ok()
                    .filter(|address| *address <= capacity)
                    .ok_or(SimError::UnknownAddress {
                        address: target,
                        capacity,
                    })?;
                self.registers.return_register = self.registers.program_counter + 1;
                self.registers.program_counter = address;
                Ok(Flow::Jumped)
            }
            Instruction::Ret => {
                self.registers.program_counter = self.registers.return_register;
                Ok(Flow::Jumped)
            }
            Instruction::Stop => Ok(Flow::Stop),
        }
    }
}
