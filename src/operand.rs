use num_bigint::BigInt;

use crate::error::ExecError;
use crate::machine::Registers;

/// A decoded combo operand.
///
/// Raw values 0-3 are small constants, 4-6 name a register, and 7 is
/// reserved. Decoding is total; only [`Combo::resolve`] can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combo {
    Literal(u8),
    A,
    B,
    C,
    Reserved,
}

impl Combo {
    pub fn decode(raw: u8) -> Self {
        match raw {
            0..=3 => Combo::Literal(raw),
            4 => Combo::A,
            5 => Combo::B,
            6 => Combo::C,
            _ => Combo::Reserved,
        }
    }

    /// The operand's value against the live register contents.
    ///
    /// `pc` and `opcode` only annotate the error.
    pub fn resolve(self, registers: &Registers, pc: usize, opcode: u8) -> Result<BigInt, ExecError> {
        match self {
            Combo::Literal(v) => Ok(BigInt::from(v)),
            Combo::A => Ok(registers.a.clone()),
            Combo::B => Ok(registers.b.clone()),
            Combo::C => Ok(registers.c.clone()),
            Combo::Reserved => Err(ExecError::InvalidOperand { pc, opcode }),
        }
    }

    /// Short form used by the disassembler.
    pub fn describe(self) -> String {
        match self {
            Combo::Literal(v) => v.to_string(),
            Combo::A => "A".to_string(),
            Combo::B => "B".to_string(),
            Combo::C => "C".to_string(),
            Combo::Reserved => "<reserved>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regs() -> Registers {
        Registers::new(BigInt::from(10), BigInt::from(20), BigInt::from(30))
    }

    #[test]
    fn test_decode_all_raw_values() {
        assert_eq!(Combo::decode(0), Combo::Literal(0));
        assert_eq!(Combo::decode(3), Combo::Literal(3));
        assert_eq!(Combo::decode(4), Combo::A);
        assert_eq!(Combo::decode(5), Combo::B);
        assert_eq!(Combo::decode(6), Combo::C);
        assert_eq!(Combo::decode(7), Combo::Reserved);
    }

    #[test]
    fn test_resolve_literals_and_registers() {
        let r = regs();
        for v in 0..=3u8 {
            assert_eq!(Combo::decode(v).resolve(&r, 0, 5), Ok(BigInt::from(v)));
        }
        assert_eq!(Combo::A.resolve(&r, 0, 5), Ok(BigInt::from(10)));
        assert_eq!(Combo::B.resolve(&r, 0, 5), Ok(BigInt::from(20)));
        assert_eq!(Combo::C.resolve(&r, 0, 5), Ok(BigInt::from(30)));
    }

    #[test]
    fn test_resolve_reserved_fails() {
        let err = Combo::Reserved.resolve(&regs(), 4, 2).unwrap_err();
        assert_eq!(err, ExecError::InvalidOperand { pc: 4, opcode: 2 });
    }
}
