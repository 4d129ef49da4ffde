//! Text Program Loader
//!
//! Loads a line-oriented program listing into a computer.
//!
//! ```text
//! @50          # move the write pointer
//! MULT
//! PRINT
//! RET
//! @0
//! PUSH 1009
//! ```
//!
//! Loading is strict: every line must decode. The write pointer is moved back
//! to address 0 once the listing is loaded.

use crate::bytecode::instruction::Instruction;
use crate::computer::Computer;
use crate::error::{SimError, SimResult};

/// Comment marker
const COMMENT: char = '#';

/// Address directive prefix
const ADDRESS: char = '@';

/// Program listing loader
pub struct ProgramLoader;

impl ProgramLoader {
    /// Load a listing into a fresh computer
    pub fn load(source: &str, capacity: usize) -> SimResult<Computer> {
        let mut computer = Computer::new(capacity);
        Self::load_into(&mut computer, source)?;
        Ok(computer)
    }

    /// Load a listing into an existing computer
    pub fn load_into(computer: &mut Computer, source: &str) -> SimResult<()> {
        for (index, raw) in source.lines().enumerate() {
            let line = index + 1;
            let text = match raw.split_once(COMMENT) {
                Some((code, _)) => code.trim(),
                None => raw.trim(),
            };
            if text.is_empty() {
                continue;
            }

            if let Some(address) = text.strip_prefix(ADDRESS) {
                let address = Self::read_address(address, line)?;
                computer.set_address(address).map_err(|e| Self::at(line, e))?;
                continue;
            }

            let instruction = Self::read_instruction(text, line)?;
            computer
                .insert_instruction(instruction)
                .map_err(|e| Self::at(line, e))?;
        }

        computer.set_address(0)?;
        Ok(())
    }

    fn read_address(text: &str, line: usize) -> SimResult<usize> {
        text.trim().parse().map_err(|_| SimError::Parse {
            line,
            message: format!("invalid address {:?}", text.trim()),
        })
    }

    fn read_instruction(text: &str, line: usize) -> SimResult<Instruction> {
        let mut tokens = text.split_whitespace();
        let name = tokens.next().unwrap_or_default();
        let operand = match tokens.next() {
            Some(token) => Some(token.parse::<i64>().map_err(|_| SimError::Parse {
                line,
                message: format!("invalid operand {:?}", token),
            })?),
            None => None,
        };
        if let Some(extra) = tokens.next() {
            return Err(SimError::Parse {
                line,
                message: format!("unexpected token {:?}", extra),
            });
        }
        Instruction::decode(name, operand).map_err(|e| Self::at(line, e))
    }

    /// Attach a line number to a build error
    fn at(line: usize, err: SimError) -> SimError {
        SimError::Parse {
            line,
            message: err.to_string(),
        }
    }
}
