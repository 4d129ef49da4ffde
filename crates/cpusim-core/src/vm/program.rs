//! Program Store
//!
//! Address-indexed instruction table with a write cursor.
//! Addresses run from 0 to `capacity` inclusive.

use crate::bytecode::instruction::Instruction;
use crate::error::{SimError, SimResult};

/// Program storage (index-based)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramStore {
    slots: Vec<Option<Instruction>>,
    capacity: usize,
    pointer: usize,
}

impl ProgramStore {
    /// Allocate `capacity + 1` empty slots
    pub fn new(capacity: usize) -> Self {
        ProgramStore {
            slots: vec![None; capacity.saturating_add(1)],
            capacity,
            pointer: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Address the next `insert` writes to
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Move the write cursor
    pub fn set_pointer(&mut self, address: usize) -> SimResult<()> {
        self.check_address(address)?;
        self.pointer = address;
        Ok(())
    }

    /// Write at the cursor, then advance it.
    ///
    /// The cursor may end one past `capacity` after filling the last slot;
    /// a further insert fails until the cursor is moved back.
    pub fn insert(&mut self, instruction: Instruction) -> SimResult<()> {
        self.place(self.pointer, instruction)?;
        self.pointer += 1;
        Ok(())
    }

    /// Write at an explicit address without touching the cursor
    pub fn place(&mut self, address: usize, instruction: Instruction) -> SimResult<()> {
        self.check_address(address)?;
        self.slots[address] = Some(instruction);
        Ok(())
    }

    /// Instruction at `address`, `None` for empty or out of range slots
    pub fn get(&self, address: usize) -> Option<Instruction> {
        self.slots.get(address).copied().flatten()
    }

    /// Non-empty slots in ascending address order
    pub fn entries(&self) -> impl Iterator<Item = (usize, Instruction)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(address, slot)| slot.map(|instr| (address, instr)))
    }

    /// Restore a persisted cursor, which may sit one past `capacity`
    pub fn restore_pointer(&mut self, pointer: usize) -> SimResult<()> {
        if pointer > self.capacity.saturating_add(1) {
            return Err(SimError::InvalidAddress {
                address: pointer,
                capacity: self.capacity,
            });
        }
        self.pointer = pointer;
        Ok(())
    }

    fn check_address(&self, address: usize) -> SimResult<()> {
        if address > self.capacity {
            return Err(SimError::InvalidAddress {
                address,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}
