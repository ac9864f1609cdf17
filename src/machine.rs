use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::error::ExecError;
use crate::opcode::Opcode;
use crate::operand::Combo;
use crate::program::Program;

/// The three general-purpose registers.
///
/// Registers are unbounded: division and XOR of large seeds must neither
/// wrap nor saturate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Registers {
    pub a: BigInt,
    pub b: BigInt,
    pub c: BigInt,
}

impl Registers {
    pub fn new(a: BigInt, b: BigInt, c: BigInt) -> Self {
        Self { a, b, c }
    }

    /// Registers for a fresh run: A holds `seed`, B and C are zero.
    pub fn seeded(seed: BigInt) -> Self {
        Self {
            a: seed,
            ..Default::default()
        }
    }
}

/// Result of executing a single instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Halted,
}

/// The 3-bit register machine.
///
/// State:
/// - three unbounded registers A, B, C
/// - `pc`: index of the next opcode on the tape, starts at 0
/// - `output`: every value emitted by `out`, each in 0-7
///
/// The machine halts when `pc` no longer addresses a complete
/// (opcode, operand) pair. There is no built-in instruction limit; callers
/// that may feed a non-terminating seed use [`Machine::run_with_limit`].
pub struct Machine {
    registers: Registers,
    program: Program,
    pc: usize,
    output: Vec<u8>,
}

impl Machine {
    pub fn new(registers: Registers, program: Program) -> Self {
        Self {
            registers,
            program,
            pc: 0,
            output: Vec::new(),
        }
    }

    /// Rewind for a new run with A = `seed` and B = C = 0. The tape is kept.
    pub fn reset(&mut self, seed: BigInt) {
        self.registers = Registers::seeded(seed);
        self.pc = 0;
        self.output.clear();
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// The output joined with commas, e.g. `4,6,3,5`.
    pub fn render_output(&self) -> String {
        self.output
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn is_halted(&self) -> bool {
        self.program.fetch(self.pc).is_none()
    }

    /// Execute one instruction.
    pub fn step(&mut self) -> Result<Step, ExecError> {
        let Some((op, operand)) = self.program.fetch(self.pc) else {
            return Ok(Step::Halted);
        };
        let pc = self.pc;
        tracing::trace!(pc, op = op.mnemonic(), operand, "step");

        match op {
            Opcode::Adv => {
                let n = self.combo(op, operand)?;
                self.registers.a = shift_right(&self.registers.a, &n, pc)?;
            }
            Opcode::Bxl => {
                self.registers.b = &self.registers.b ^ &BigInt::from(operand);
            }
            Opcode::Bst => {
                let v = self.combo(op, operand)?;
                self.registers.b = BigInt::from(low_three_bits(&v));
            }
            Opcode::Jnz => {
                if !self.registers.a.is_zero() {
                    self.pc = operand as usize;
                    return Ok(Step::Continue);
                }
            }
            Opcode::Bxc => {
                self.registers.b = &self.registers.b ^ &self.registers.c;
            }
            Opcode::Out => {
                let v = self.combo(op, operand)?;
                self.output.push(low_three_bits(&v));
            }
            Opcode::Bdv => {
                let n = self.combo(op, operand)?;
                self.registers.b = shift_right(&self.registers.a, &n, pc)?;
            }
            Opcode::Cdv => {
                let n = self.combo(op, operand)?;
                self.registers.c = shift_right(&self.registers.a, &n, pc)?;
            }
        }

        self.pc += 2;
        Ok(Step::Continue)
    }

    /// Run until the machine halts. Returns the number of instructions executed.
    ///
    /// Does not return for a program that never halts.
    pub fn run(&mut self) -> Result<u64, ExecError> {
        let mut steps = 0;
        while self.step()? == Step::Continue {
            steps += 1;
        }
        Ok(steps)
    }

    /// Like [`Machine::run`], but give up once `limit` instructions have
    /// executed without halting.
    pub fn run_with_limit(&mut self, limit: u64) -> Result<u64, ExecError> {
        let mut steps = 0;
        while !self.is_halted() {
            if steps == limit {
                return Err(ExecError::StepLimitExceeded { limit });
            }
            self.step()?;
            steps += 1;
        }
        Ok(steps)
    }

    fn combo(&self, op: Opcode, operand: u8) -> Result<BigInt, ExecError> {
        Combo::decode(operand).resolve(&self.registers, self.pc, u8::from(op))
    }
}

/// `value / 2^n`, truncated toward zero.
///
/// Shifts wider than `value` yield zero without materialising `2^n`.
fn shift_right(value: &BigInt, n: &BigInt, pc: usize) -> Result<BigInt, ExecError> {
    if n.is_negative() {
        return Err(ExecError::NegativeShift { pc });
    }
    let bits = value.bits();
    match n.to_u64() {
        Some(n) if n < bits => Ok(BigInt::from_biguint(value.sign(), value.magnitude() >> n)),
        _ => Ok(BigInt::zero()),
    }
}

/// `value mod 8`, always in 0-7 (floored, so negative values wrap upward).
fn low_three_bits(value: &BigInt) -> u8 {
    (value & &BigInt::from(7u8)).to_u8().unwrap_or_default()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn tape() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(0u8..8, 0..16).prop_map(|mut w| {
            if w.len() % 2 == 1 {
                w.pop();
            }
            w
        })
    }

    proptest! {
        #[test]
        fn runs_are_deterministic(words in tape(), seed in any::<u64>()) {
            let program = Program::new(words).unwrap();
            let mut m = Machine::new(Registers::default(), program);

            m.reset(BigInt::from(seed));
            let first = m.run_with_limit(4096);
            let first_output = m.output().to_vec();
            let first_registers = m.registers().clone();

            m.reset(BigInt::from(seed));
            let second = m.run_with_limit(4096);
            prop_assert_eq!(first, second);
            prop_assert_eq!(m.output(), &first_output[..]);
            prop_assert_eq!(m.registers(), &first_registers);
        }

        #[test]
        fn output_is_three_bit(words in tape(), seed in any::<u64>()) {
            let program = Program::new(words).unwrap();
            let mut m = Machine::new(Registers::seeded(BigInt::from(seed)), program);
            let _ = m.run_with_limit(4096);
            prop_assert!(m.output().iter().all(|&v| v < 8));
        }

        #[test]
        fn adv_is_floor_division(a in any::<u64>(), n in 0u8..4) {
            let program = Program::new(vec![0, n]).unwrap();
            let mut m = Machine::new(Registers::seeded(BigInt::from(a)), program);
            m.run().unwrap();
            prop_assert_eq!(&m.registers().a, &BigInt::from(a >> n));
        }

        #[test]
        fn respects_step_limit(words in tape(), seed in any::<u64>(), limit in 0u64..256) {
            let program = Program::new(words).unwrap();
            let mut m = Machine::new(Registers::seeded(BigInt::from(seed)), program);
            if let Ok(steps) = m.run_with_limit(limit) {
                prop_assert!(steps <= limit);
                prop_assert!(m.is_halted());
            }
        }
    }
}
