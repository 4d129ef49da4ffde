//! Computer Simulator - Core Library
//!
//! Public API surface for the simulator core: a bounded program store, an
//! operand stack and a fetch-decode-execute loop over six opcodes.

pub mod error;
pub mod config;
pub mod bytecode;
pub mod vm;
pub mod computer;
pub mod loader;

// Re-export commonly used types
pub use error::{SimError, SimResult};
pub use config::{OpcodePolicy, SimConfig};
pub use bytecode::{Instruction, OpCode};
pub use computer::{Computer, DebugSnapshot};
pub use loader::ProgramLoader;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn chained_build_and_run() {
		let mut computer = Computer::new(10);
		computer
			.insert("PUSH", Some(6))
			.insert("PUSH", Some(7))
			.insert("MULT", None)
			.insert("PRINT", None)
			.insert("STOP", None);
		computer.set_address(0).expect("set_address failed");
		assert_eq!(computer.execute(), Ok(vec![42]));
	}

	#[test]
	fn print_on_empty_stack_underflows() {
		let mut computer = Computer::new(2);
		computer.insert("PRINT", None);
		assert_eq!(computer.execute(), Err(SimError::StackUnderflow));
	}

	#[test]
	fn empty_program_halts_with_no_output() {
		let mut computer = Computer::new(0);
		assert_eq!(computer.execute(), Ok(vec![]));
	}

	#[test]
	fn loaded_listing_executes() {
		let source = "PUSH 3\nPUSH 0\nMULT\nPRINT\nSTOP\n";
		let mut computer = ProgramLoader::load(source, 8).expect("load failed");
		assert_eq!(computer.execute(), Ok(vec![0]));
	}
}
