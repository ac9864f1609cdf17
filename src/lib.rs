pub mod error;
pub mod opcode;
pub mod operand;
pub mod program;
pub mod machine;
pub mod quine;
