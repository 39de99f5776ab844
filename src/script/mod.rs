//! Script structure: opcodes, operations, templates and branch bookkeeping
//!
//! Only structural decode and classification live here. Operand evaluation
//! is not performed.

pub mod conditional_stack;
pub mod opcode;
pub mod operation;
pub mod pattern;
#[allow(clippy::module_inception)]
pub mod script;

pub use conditional_stack::ConditionalStack;
pub use opcode::Opcode;
pub use operation::Operation;
pub use pattern::ScriptPattern;
pub use script::{ParseMode, Script};
