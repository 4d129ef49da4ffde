//! Computer Facade
//!
//! Binds a program store, a program counter and a return register into one
//! unit and exposes the build / run / introspect operations.
//!
//! Only one CALL/RET level is representable: the return register is a single
//! slot overwritten by every CALL, not a call stack.

use serde::Serialize;
use tracing::{debug, warn};

use crate::bytecode::instruction::Instruction;
use crate::bytecode::opcode::OpCode;
use crate::config::{OpcodePolicy, SimConfig};
use crate::error::SimResult;
use crate::vm::executor::{Executor, Registers};
use crate::vm::program::ProgramStore;

/// Read-only view of a computer's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugSnapshot {
    pub program_counter: usize,
    /// Non-empty slots as `(address, (opcode, operand))`, ascending by address
    pub program_stack: Vec<(usize, (OpCode, Option<i64>))>,
    pub program_stack_size: usize,
    pub program_stack_pointer: usize,
}

/// Simulated computer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Computer {
    program: ProgramStore,
    registers: Registers,
    policy: OpcodePolicy,
}

impl Computer {
    /// Empty computer addressing `0..=capacity`
    pub fn new(capacity: usize) -> Self {
        Computer {
            program: ProgramStore::new(capacity),
            registers: Registers::default(),
            policy: OpcodePolicy::Lenient,
        }
    }

    pub fn with_config(config: &SimConfig) -> Self {
        Computer {
            policy: config.opcode_policy,
            ..Computer::new(config.default_capacity)
        }
    }

    /// Rebuild a computer from persisted parts
    pub fn from_parts(
        capacity: usize,
        registers: Registers,
        pointer: usize,
        entries: impl IntoIterator<Item = (usize, Instruction)>,
    ) -> SimResult<Self> {
        let mut computer = Computer::new(capacity);
        for (address, instruction) in entries {
            computer.program.place(address, instruction)?;
        }
        computer.program.restore_pointer(pointer)?;
        computer.registers = registers;
        Ok(computer)
    }

    pub fn capacity(&self) -> usize {
        self.program.capacity()
    }

    pub fn program_counter(&self) -> usize {
        self.registers.program_counter
    }

    pub fn registers(&self) -> Registers {
        self.registers
    }

    pub fn program(&self) -> &ProgramStore {
        &self.program
    }

    pub fn set_policy(&mut self, policy: OpcodePolicy) {
        self.policy = policy;
    }

    /// Move the write pointer. Fails without side effects past `capacity`.
    pub fn set_address(&mut self, address: usize) -> SimResult<&mut Self> {
        self.program.set_pointer(address)?;
        debug!(address, "write pointer moved");
        Ok(self)
    }

    /// Insert at the write pointer, ignoring anything that does not decode.
    pub fn insert(&mut self, opcode: &str, operand: Option<i64>) -> &mut Self {
        if let Err(err) = self.try_insert(opcode, operand) {
            warn!(opcode, ?operand, error = %err, "instruction ignored");
        }
        self
    }

    /// Insert at the write pointer, failing on unknown or incomplete
    /// instructions. The pointer only advances on success.
    pub fn try_insert(&mut self, opcode: &str, operand: Option<i64>) -> SimResult<&mut Self> {
        let instruction = Instruction::decode(opcode, operand)?;
        self.insert_instruction(instruction)
    }

    /// Insert following the configured opcode policy
    pub fn insert_with_policy(
        &mut self,
        opcode: &str,
        operand: Option<i64>,
    ) -> SimResult<&mut Self> {
        match self.policy {
            OpcodePolicy::Lenient => Ok(self.insert(opcode, operand)),
            OpcodePolicy::Strict => self.try_insert(opcode, operand),
        }
    }

    pub fn insert_instruction(&mut self, instruction: Instruction) -> SimResult<&mut Self> {
        let address = self.program.pointer();
        self.program.insert(instruction)?;
        debug!(address, %instruction, "instruction inserted");
        Ok(self)
    }

    /// Run from the current program counter and return the printed values.
    ///
    /// Registers are restored afterwards whether the run halts or fails, so
    /// repeated runs of an unchanged program are identical.
    pub fn execute(&mut self) -> SimResult<Vec<i64>> {
        let saved = self.registers;
        let result = Executor::new(&self.program, &mut self.registers).run();
        self.registers = saved;
        result
    }

    pub fn debug(&self) -> DebugSnapshot {
        DebugSnapshot {
            program_counter: self.registers.program_counter,
            program_stack: self
                .program
                .entries()
                .map(|(address, instr)| (address, (instr.opcode(), instr.operand())))
                .collect(),
            program_stack_size: self.program.capacity(),
            program_stack_pointer: self.program.pointer(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    #[test]
    fn new_computer_starts_clean() {
        let computer = Computer::new(8);
        assert_eq!(computer.capacity(), 8);
        assert_eq!(computer.registers(), Registers::default());
        assert!(computer.debug().program_stack.is_empty());
    }

    #[test]
    fn instances_do_not_share_state() {
        let mut first = Computer::new(4);
        let second = Computer::new(4);
        first.insert("PUSH", Some(1));
        assert_eq!(first.debug().program_stack.len(), 1);
        assert!(second.debug().program_stack.is_empty());
    }

    #[test]
    fn unknown_opcode_is_ignored_by_insert() {
        let mut computer = Computer::new(4);
        computer.insert("JUMP", Some(1)).insert("push", Some(2));
        let snapshot = computer.debug();
        assert_eq!(snapshot.program_stack, vec![(0, (OpCode::Push, Some(2)))]);
        assert_eq!(snapshot.program_stack_pointer, 1);
    }

    #[test]
    fn try_insert_rejects_unknown_and_incomplete() {
        let mut computer = Computer::new(4);
        assert!(matches!(
            computer.try_insert("JUMP", None),
            Err(SimError::UnknownInstruction(_))
        ));
        assert!(matches!(
            computer.try_insert("PUSH", None),
            Err(SimError::MissingOperand(OpCode::Push))
        ));
        assert_eq!(computer.program().pointer(), 0);
    }

    #[test]
    fn strict_config_rejects_through_policy() {
        let mut computer = Computer::with_config(&SimConfig::new().with_capacity(4).strict());
        assert!(computer.insert_with_policy("nope", None).is_err());

        let mut lenient = Computer::with_config(&SimConfig::new());
        assert_eq!(lenient.capacity(), 100);
        assert!(lenient.insert_with_policy("nope", None).is_ok());
    }

    #[test]
    fn set_address_failure_leaves_pointer() {
        let mut computer = Computer::new(3);
        computer.set_address(2).unwrap();
        assert!(computer.set_address(4).is_err());
        assert_eq!(computer.debug().program_stack_pointer, 2);
    }

    #[test]
    fn pointer_may_rest_one_past_capacity() {
        let mut computer = Computer::new(2);
        computer.set_address(2).unwrap().insert("STOP", None);
        assert_eq!(computer.debug().program_stack_pointer, 3);

        computer.insert("PRINT", None);
        assert_eq!(computer.debug().program_stack.len(), 1);
        assert!(matches!(
            computer.try_insert("PRINT", None),
            Err(SimError::InvalidAddress { address: 3, capacity: 2 })
        ));
        assert!(computer.set_address(3).is_err());

        computer.set_address(0).unwrap().insert("PRINT", None);
        assert_eq!(computer.debug().program_stack_pointer, 1);
    }

    #[test]
    fn execute_restores_registers_on_failure() {
        let mut computer = Computer::new(5);
        computer.insert("PUSH", Some(2)).insert("CALL", Some(4));
        computer.set_address(4).unwrap().insert("MULT", None);
        assert_eq!(computer.execute(), Err(SimError::StackUnderflow));
        assert_eq!(computer.registers(), Registers::default());
    }

    #[test]
    fn from_parts_rejects_out_of_range_entry() {
        let err = Computer::from_parts(2, Registers::default(), 0, [(3, Instruction::Stop)])
            .unwrap_err();
        assert_eq!(err, SimError::InvalidAddress { address: 3, capacity: 2 });
    }
}
