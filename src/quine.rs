use num_bigint::BigInt;
use num_traits::Zero;

use crate::error::SearchError;
use crate::machine::{Machine, Registers};
use crate::program::Program;

/// Configuration for a quine search.
#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    /// Maximum instructions per candidate run. A candidate that exceeds it is
    /// rejected. `None` runs every candidate to completion.
    pub step_limit: Option<u64>,
}

/// A seed that makes the machine print its own tape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub seed: BigInt,
    /// Number of machine runs performed to find `seed`.
    pub candidates_run: u64,
}

/// One level of the digit search: the base-8 digit being chosen at
/// `position` (0 = most significant) and the next value to try there.
struct Frame {
    position: usize,
    next_digit: u8,
}

/// Digit-wise backtracking search for a self-reproducing seed of register A.
///
/// The search assumes the tape has the shape of a loop that, on every pass,
/// emits one value computed from the low bits of A (and possibly bits above
/// them), then shifts A right by three bits until A is zero. For such tapes:
///
/// - a seed with `k` base-8 digits produces `k` outputs, so candidates have
///   exactly `len(tape)` digits (the leading digit is never 0);
/// - the most significant digit decides the *last* output, the next digit
///   the one before it, and so on. Digits below the one being chosen are
///   held at zero and cannot disturb the tail already matched.
///
/// A candidate is accepted at `position` when the last `position + 1`
/// outputs equal the last `position + 1` tape words. Digits are tried in
/// ascending order and the first full match is returned, which is the
/// smallest seed under this assumption. Tapes that do not follow this shape
/// may be reported as exhausted even though a seed exists, or yield a
/// seed that is not the smallest.
pub struct QuineSearch {
    machine: Machine,
    target: Vec<u8>,
    config: SearchConfig,
    candidates_run: u64,
}

impl QuineSearch {
    pub fn new(program: &Program, config: SearchConfig) -> Self {
        Self {
            machine: Machine::new(Registers::default(), program.clone()),
            target: program.words().to_vec(),
            config,
            candidates_run: 0,
        }
    }

    pub fn find(&mut self) -> Result<SearchOutcome, SearchError> {
        let width = self.target.len();
        if width == 0 {
            return Err(SearchError::EmptyProgram);
        }

        // Invariant: every digit below the top frame's position is zero.
        let mut digits = vec![0u8; width];
        let mut stack = vec![Frame {
            position: 0,
            next_digit: 1,
        }];

        while let Some(frame) = stack.last_mut() {
            let position = frame.position;
            if frame.next_digit > 7 {
                digits[position] = 0;
                stack.pop();
                continue;
            }
            digits[position] = frame.next_digit;
            frame.next_digit += 1;

            let seed = seed_from_digits(&digits);
            if !self.run_candidate(seed.clone()) || !self.tail_matches(position) {
                continue;
            }

            if position + 1 == width {
                if self.machine.output() == &self.target[..] {
                    tracing::info!(%seed, candidates = self.candidates_run, "quine found");
                    return Ok(SearchOutcome {
                        seed,
                        candidates_run: self.candidates_run,
                    });
                }
                continue;
            }

            tracing::debug!(position, digit = digits[position], "digit accepted");
            stack.push(Frame {
                position: position + 1,
                next_digit: 0,
            });
        }

        tracing::warn!(digits = width, candidates = self.candidates_run, "search exhausted");
        Err(SearchError::Exhausted { digits: width })
    }

    /// Reset and run the machine. Returns false if the run failed.
    fn run_candidate(&mut self, seed: BigInt) -> bool {
        self.candidates_run += 1;
        self.machine.reset(seed);
        let result = match self.config.step_limit {
            Some(limit) => self.machine.run_with_limit(limit),
            None => self.machine.run(),
        };
        match result {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(%err, "candidate rejected");
                false
            }
        }
    }

    /// Whether the last `position + 1` outputs equal the last `position + 1`
    /// tape words. Too few outputs is a mismatch.
    fn tail_matches(&self, position: usize) -> bool {
        let output = self.machine.output();
        let needed = position + 1;
        output.len() >= needed
            && output[output.len() - needed..] == self.target[self.target.len() - needed..]
    }
}

/// Read `digits` as a base-8 number, most significant first.
fn seed_from_digits(digits: &[u8]) -> BigInt {
    digits
        .iter()
        .fold(BigInt::zero(), |acc, &d| (acc << 3u32) + BigInt::from(d))
}

/// Find the smallest self-reproducing seed with no step limit.
pub fn find_quine(program: &Program) -> Result<BigInt, SearchError> {
    QuineSearch::new(program, SearchConfig::default())
        .find()
        .map(|outcome| outcome.seed)
}
