use num_bigint::BigInt;

use crate::error::{ParseError, ProgramError};
use crate::machine::Registers;
use crate::opcode::{Opcode, OperandKind};
use crate::operand::Combo;

/// A validated instruction tape.
///
/// The tape doubles as the target output of the quine search, so the raw
/// 3-bit words are kept as-is rather than pre-decoded. Construction checks
/// that the length is even and every word is in 0-7; after that, fetching
/// an opcode can never fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    words: Vec<u8>,
}

impl Program {
    pub fn new(words: Vec<u8>) -> Result<Self, ProgramError> {
        if words.len() % 2 != 0 {
            return Err(ProgramError::OddLength { len: words.len() });
        }
        if let Some((index, &value)) = words.iter().enumerate().find(|&(_, &w)| w > 7) {
            return Err(ProgramError::ValueOutOfRange { index, value });
        }
        Ok(Self { words })
    }

    pub fn words(&self) -> &[u8] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The instruction starting at `pc`, or `None` past the end of the tape.
    pub fn fetch(&self, pc: usize) -> Option<(Opcode, u8)> {
        let opcode = *self.words.get(pc)?;
        let operand = *self.words.get(pc + 1)?;
        // Words were range-checked in `new`.
        let opcode = Opcode::try_from(opcode).ok()?;
        Some((opcode, operand))
    }

    /// Iterate over `(pc, opcode, raw operand)` for every instruction pair.
    pub fn instructions(&self) -> impl Iterator<Item = (usize, Opcode, u8)> + '_ {
        (0..self.words.len())
            .step_by(2)
            .filter_map(move |pc| self.fetch(pc).map(|(op, operand)| (pc, op, operand)))
    }

    /// Pretty-print a disassembly of the tape for human inspection.
    pub fn disassemble(&self) -> String {
        use std::fmt::Write;
        let mut out = String::new();
        for (pc, op, operand) in self.instructions() {
            let rendered = match op.operand_kind() {
                OperandKind::Combo => Combo::decode(operand).describe(),
                OperandKind::Literal => operand.to_string(),
                OperandKind::Ignored => String::new(),
            };
            let effect = match op {
                Opcode::Adv => format!("A = A >> {rendered}"),
                Opcode::Bxl => format!("B = B ^ {rendered}"),
                Opcode::Bst => format!("B = {rendered} % 8"),
                Opcode::Jnz => format!("if A != 0 goto {rendered}"),
                Opcode::Bxc => "B = B ^ C".to_string(),
                Opcode::Out => format!("out {rendered} % 8"),
                Opcode::Bdv => format!("B = A >> {rendered}"),
                Opcode::Cdv => format!("C = A >> {rendered}"),
            };
            let _ = writeln!(
                out,
                "{pc:02}: [{} {operand}]  {} {rendered:<10} ; {effect}",
                u8::from(op),
                op.mnemonic()
            );
        }
        out
    }
}

/// Register seeds and tape read from puzzle text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    pub registers: Registers,
    pub program: Program,
}

impl Puzzle {
    /// Extract every run of ASCII digits, in order. Anything else delimits.
    ///
    /// The first three numbers seed A, B and C; the rest form the tape.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let numbers: Vec<&str> = input
            .split(|ch: char| !ch.is_ascii_digit())
            .filter(|s| !s.is_empty())
            .collect();
        if numbers.len() < 3 {
            return Err(ParseError::MissingRegisters { found: numbers.len() });
        }

        let register = |text: &str| {
            text.parse::<BigInt>().map_err(|_| ParseError::InvalidNumber {
                text: text.to_string(),
            })
        };
        let registers = Registers::new(register(numbers[0])?, register(numbers[1])?, register(numbers[2])?);

        let words = numbers[3..]
            .iter()
            .map(|text| {
                text.parse::<u8>().map_err(|_| ParseError::InvalidNumber {
                    text: text.to_string(),
                })
            })
            .collect::<Result<Vec<u8>, _>>()?;
        let program = Program::new(words)?;

        Ok(Self { registers, program })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Register A: 729\nRegister B: 0\nRegister C: 0\n\nProgram: 0,1,5,4,3,0\n";

    #[test]
    fn test_program_rejects_odd_length() {
        assert_eq!(Program::new(vec![0, 1, 5]), Err(ProgramError::OddLength { len: 3 }));
    }

    #[test]
    fn test_program_rejects_out_of_range_word() {
        assert_eq!(
            Program::new(vec![0, 1, 8, 0]),
            Err(ProgramError::ValueOutOfRange { index: 2, value: 8 })
        );
    }

    #[test]
    fn test_program_accepts_empty_and_reserved_operand() {
        assert!(Program::new(vec![]).unwrap().is_empty());
        // Operand 7 is only invalid when resolved as a combo operand at run time.
        assert!(Program::new(vec![5, 7]).is_ok());
    }

    #[test]
    fn test_fetch_past_end() {
        let program = Program::new(vec![0, 3, 5, 4]).unwrap();
        assert_eq!(program.fetch(0), Some((Opcode::Adv, 3)));
        assert_eq!(program.fetch(2), Some((Opcode::Out, 4)));
        assert_eq!(program.fetch(4), None);
        // A jump to an odd target reads the pair straddling two instructions.
        assert_eq!(program.fetch(1), Some((Opcode::Jnz, 5)));
        assert_eq!(program.fetch(3), None);
    }

    #[test]
    fn test_instructions_iterates_pairs() {
        let program = Program::new(vec![0, 1, 5, 4, 3, 0]).unwrap();
        let instrs: Vec<_> = program.instructions().collect();
        assert_eq!(
            instrs,
            vec![(0, Opcode::Adv, 1), (2, Opcode::Out, 4), (4, Opcode::Jnz, 0)]
        );
    }

    #[test]
    fn test_disassemble() {
        let program = Program::new(vec![0, 3, 4, 1, 5, 7, 3, 0]).unwrap();
        let text = program.disassemble();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("00: [0 3]  adv 3"));
        assert!(lines[0].ends_with("; A = A >> 3"));
        assert!(lines[1].ends_with("; B = B ^ C"));
        assert!(lines[2].contains("<reserved>"));
        assert!(lines[3].ends_with("; if A != 0 goto 0"));
    }

    #[test]
    fn test_parse_sample() {
        let puzzle = Puzzle::parse(SAMPLE).unwrap();
        assert_eq!(puzzle.registers.a, BigInt::from(729));
        assert_eq!(puzzle.registers.b, BigInt::from(0));
        assert_eq!(puzzle.registers.c, BigInt::from(0));
        assert_eq!(puzzle.program.words(), &[0, 1, 5, 4, 3, 0]);
    }

    #[test]
    fn test_parse_large_register() {
        let puzzle = Puzzle::parse("A: 123456789012345678901234567890 B: 1 C: 2 P: 5,4").unwrap();
        assert_eq!(
            puzzle.registers.a,
            "123456789012345678901234567890".parse::<BigInt>().unwrap()
        );
        assert_eq!(puzzle.program.words(), &[5, 4]);
    }

    #[test]
    fn test_parse_missing_registers() {
        assert_eq!(
            Puzzle::parse("Register A: 1\nRegister B: 2\n"),
            Err(ParseError::MissingRegisters { found: 2 })
        );
    }

    #[test]
    fn test_parse_malformed_tape() {
        assert_eq!(
            Puzzle::parse("1 2 3 Program: 0,9"),
            Err(ParseError::Program(ProgramError::ValueOutOfRange { index: 1, value: 9 }))
        );
        assert_eq!(
            Puzzle::parse("1 2 3 Program: 0,1,2"),
            Err(ParseError::Program(ProgramError::OddLength { len: 3 }))
        );
        assert_eq!(
            Puzzle::parse("1 2 3 Program: 0,300"),
            Err(ParseError::InvalidNumber { text: "300".to_string() })
        );
    }
}
