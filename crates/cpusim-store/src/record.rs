//! Persisted computer records
//!
//! JSON objects only have string keys, so program addresses come back as
//! strings and operands written by other tools may be strings too. Both are
//! normalized to integers when a record is turned back into a `Computer`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cpusim_core::vm::Registers;
use cpusim_core::{Computer, Instruction, OpCode};

use crate::{StoreError, StoreResult};

/// Largest `stack_size` a record may carry. Matches the CLI's `u16` capacity.
pub const MAX_CAPACITY: usize = u16::MAX as usize;

/// Operand as found in storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredOperand {
    Int(i64),
    Text(String),
}

impl StoredOperand {
    fn normalize(&self) -> StoreResult<i64> {
        match self {
            StoredOperand::Int(value) => Ok(*value),
            StoredOperand::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| StoreError::InvalidRecord(format!("invalid operand {:?}", text))),
        }
    }
}

/// One program slot: `(opcode, operand)`, both null for an empty slot
pub type SlotRecord = (Option<String>, Option<StoredOperand>);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramStackRecord {
    pub data: BTreeMap<String, SlotRecord>,
    pub stack_pointer: usize,
    pub stack_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputerRecord {
    pub id: String,
    pub program_counter: usize,
    pub program_stack: ProgramStackRecord,
}

impl ComputerRecord {
    pub fn from_computer(id: impl Into<String>, computer: &Computer) -> Self {
        let snapshot = computer.debug();
        let data = snapshot
            .program_stack
            .into_iter()
            .map(|(address, (opcode, operand))| {
                (
                    address.to_string(),
                    (Some(opcode.mnemonic().to_string()), operand.map(StoredOperand::Int)),
                )
            })
            .collect();

        ComputerRecord {
            id: id.into(),
            program_counter: snapshot.program_counter,
            program_stack: ProgramStackRecord {
                data,
                stack_pointer: snapshot.program_stack_pointer,
                stack_size: snapshot.program_stack_size,
            },
        }
    }

    /// Rebuild the computer, normalizing string addresses and operands.
    pub fn into_computer(&self) -> StoreResult<Computer> {
        let stack = &self.program_stack;
        if stack.stack_size > MAX_CAPACITY {
            return Err(StoreError::InvalidRecord(format!(
                "stack size {} exceeds {}",
                stack.stack_size, MAX_CAPACITY
            )));
        }
        let mut entries = Vec::with_capacity(stack.data.len());

        for (key, (opcode, operand)) in &stack.data {
            let address: usize = key
                .trim()
                .parse()
                .map_err(|_| StoreError::InvalidRecord(format!("invalid address {:?}", key)))?;

            let Some(name) = opcode else {
                continue;
            };
            let opcode = OpCode::from_name(name)
                .ok_or_else(|| StoreError::InvalidRecord(format!("unknown opcode {:?}", name)))?;
            let operand = operand.as_ref().map(StoredOperand::normalize).transpose()?;
            let instruction = Instruction::from_parts(opcode, operand)?;
            entries.push((address, instruction));
        }

        let registers = Registers {
            program_counter: self.program_counter,
            return_register: 0,
        };
        Ok(Computer::from_parts(stack.stack_size, registers, stack.stack_pointer, entries)?)
    }
}
