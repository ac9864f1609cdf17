/// The eight instructions of the 3-bit machine.
///
/// Each instruction is followed on the tape by a single 3-bit operand. How
/// that operand is read depends on the instruction, see [`OperandKind`].
///
/// | Opcode | Mnemonic | Effect                          |
/// |--------|----------|---------------------------------|
/// | 0      | `adv`    | A = A / 2^combo                 |
/// | 1      | `bxl`    | B = B xor literal               |
/// | 2      | `bst`    | B = combo mod 8                 |
/// | 3      | `jnz`    | if A != 0 { pc = literal }      |
/// | 4      | `bxc`    | B = B xor C (operand ignored)   |
/// | 5      | `out`    | emit combo mod 8                |
/// | 6      | `bdv`    | B = A / 2^combo                 |
/// | 7      | `cdv`    | C = A / 2^combo                 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Adv,
    Bxl,
    Bst,
    Jnz,
    Bxc,
    Out,
    Bdv,
    Cdv,
}

/// How an instruction interprets its raw operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// Resolved through [`crate::operand::Combo`].
    Combo,
    /// Used verbatim.
    Literal,
    /// Read from the tape but never used.
    Ignored,
}

impl Opcode {
    pub const ALL: [Opcode; 8] = [
        Opcode::Adv,
        Opcode::Bxl,
        Opcode::Bst,
        Opcode::Jnz,
        Opcode::Bxc,
        Opcode::Out,
        Opcode::Bdv,
        Opcode::Cdv,
    ];

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Adv => "adv",
            Opcode::Bxl => "bxl",
            Opcode::Bst => "bst",
            Opcode::Jnz => "jnz",
            Opcode::Bxc => "bxc",
            Opcode::Out => "out",
            Opcode::Bdv => "bdv",
            Opcode::Cdv => "cdv",
        }
    }

    pub fn operand_kind(self) -> OperandKind {
        match self {
            Opcode::Bxl | Opcode::Jnz => OperandKind::Literal,
            Opcode::Bxc => OperandKind::Ignored,
            Opcode::Adv | Opcode::Bst | Opcode::Out | Opcode::Bdv | Opcode::Cdv => {
                OperandKind::Combo
            }
        }
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> u8 {
        op as u8
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    /// Decode a 3-bit opcode. Values above 7 are handed back unchanged.
    fn try_from(value: u8) -> Result<Self, u8> {
        Opcode::ALL.get(value as usize).copied().ok_or(value)
    }
}
