pub mod executor;
pub mod program;
pub mod stack;

pub use executor::{ExecState, Executor, Registers};
pub use program::ProgramStore;
pub use stack::OperandStack;
