//! Simulator Configuration
//!
//! Defines construction defaults for a simulated computer.
//! Configuration specifies policy only; enforcement is handled by the computer.

/// How `insert` treats an opcode it cannot decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpcodePolicy {
    /// Drop the instruction and leave the write pointer where it is
    #[default]
    Lenient,
    /// Reject the instruction with an error
    Strict,
}

/// Computer configuration
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Highest addressable slot of the program store
    pub default_capacity: usize,

    /// Handling of unknown or incomplete instructions on insert
    pub opcode_policy: OpcodePolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            default_capacity: 100,
            opcode_policy: OpcodePolicy::Lenient,
        }
    }
}

impl SimConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.default_capacity = capacity;
        self
    }

    pub fn strict(mut self) -> Self {
        self.opcode_policy = OpcodePolicy::Strict;
        self
    }
}
