/// A tape that cannot be loaded into a machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    /// Instructions are (opcode, operand) pairs, so the tape length must be even.
    #[error("malformed program: odd tape length {len}")]
    OddLength { len: usize },
    /// Every opcode and operand is a 3-bit value.
    #[error("malformed program: value {value} at index {index} is outside 0-7")]
    ValueOutOfRange { index: usize, value: u8 },
}

/// Failure to turn puzzle text into registers and a tape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("expected three register values, found {found}")]
    MissingRegisters { found: usize },
    #[error("invalid number '{text}'")]
    InvalidNumber { text: String },
    #[error(transparent)]
    Program(#[from] ProgramError),
}

/// A fatal condition inside a single run of the machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    /// Combo operand 7 is reserved and never resolves to a value.
    #[error("invalid combo operand 7 for opcode {opcode} at pc {pc}")]
    InvalidOperand { pc: usize, opcode: u8 },
    /// A division denominator of 2^n with n < 0.
    #[error("negative shift amount at pc {pc}")]
    NegativeShift { pc: usize },
    #[error("step limit of {limit} exceeded")]
    StepLimitExceeded { limit: u64 },
}

/// Why the quine search produced no seed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("no solution: all {digits}-digit base-8 candidates exhausted")]
    Exhausted { digits: usize },
    #[error("cannot search for a seed reproducing an empty program")]
    EmptyProgram,
}
