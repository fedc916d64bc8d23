//! Number sequences shared by pull-based streams and push generators.
//!
//! Both paths step the same [`Sequence`], so a stream read and a generator
//! run of the same kind always agree value for value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::primes::next_prime_at_or_after;

/// Which sequence to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceKind {
    Fibonacci,
    Squares,
    Primes,
}

impl SequenceKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 3] = [Self::Fibonacci, Self::Squares, Self::Primes];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fibonacci => "fibonacci",
            Self::Squares => "squares",
            Self::Primes => "primes",
        }
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resumable generator state for one sequence.
///
/// Fibonacci and squares wrap on `u32` overflow. Primes end once the
/// `u32` prime range is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sequence {
    Fibonacci { prev: u32, curr: u32 },
    Squares { index: u32 },
    Primes { next_candidate: Option<u32>, produced: u32 },
}

impl Sequence {
    /// Fresh state for `kind`.
    #[must_use]
    pub const fn start(kind: SequenceKind) -> Self {
        match kind {
            SequenceKind::Fibonacci => Self::Fibonacci { prev: 0, curr: 1 },
            SequenceKind::Squares => Self::Squares { index: 1 },
            SequenceKind::Primes => Self::Primes {
                next_candidate: Some(2),
                produced: 0,
            },
        }
    }

    #[must_use]
    pub const fn kind(&self) -> SequenceKind {
        match self {
            Self::Fibonacci { .. } => SequenceKind::Fibonacci,
            Self::Squares { .. } => SequenceKind::Squares,
            Self::Primes { .. } => SequenceKind::Primes,
        }
    }

    /// Produce the next value and advance.
    pub fn step(&mut self) -> Option<u32> {
        match self {
            Self::Fibonacci { prev, curr } => {
                let value = *curr;
                (*prev, *curr) = (*curr, prev.wrapping_add(*curr));
                Some(value)
            }
            Self::Squares { index } => {
                let value = index.wrapping_mul(*index);
                *index = index.wrapping_add(1);
                Some(value)
            }
            Self::Primes {
                next_candidate,
                produced,
            } => {
                let prime = next_prime_at_or_after((*next_candidate)?)?;
                *next_candidate = prime.checked_add(1);
                *produced = produced.saturating_add(1);
                Some(prime)
            }
        }
    }
}

impl Iterator for Sequence {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        self.step()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(kind: SequenceKind, n: usize) -> Vec<u32> {
        Sequence::start(kind).take(n).collect()
    }

    #[test]
    fn test_fibonacci() {
        assert_eq!(
            first(SequenceKind::Fibonacci, 10),
            [1, 1, 2, 3, 5, 8, 13, 21, 34, 55]
        );
    }

    #[test]
    fn test_squares() {
        assert_eq!(first(SequenceKind::Squares, 5), [1, 4, 9, 16, 25]);
    }

    #[test]
    fn test_primes() {
        assert_eq!(first(SequenceKind::Primes, 5), [2, 3, 5, 7, 11]);
    }

    #[test]
    fn test_primes_counts_produced() {
        let mut seq = Sequence::start(SequenceKind::Primes);
        seq.by_ref().take(4).for_each(drop);
        assert_eq!(
            seq,
            Sequence::Primes {
                next_candidate: Some(8),
                produced: 4
            }
        );
    }

    #[test]
    fn test_primes_end_at_top_of_range() {
        let mut seq = Sequence::Primes {
            next_candidate: Some(4_294_967_290),
            produced: 0,
        };
        assert_eq!(seq.next(), Some(crate::primes::LARGEST_U32_PRIME));
        assert_eq!(seq.next(), None);
        assert_eq!(seq.next(), None);
    }

    #[test]
    fn test_fibonacci_wraps() {
        // F(47) is the last term below 2^32.
        let values = first(SequenceKind::Fibonacci, 48);
        assert_eq!(values[46], 2_971_215_073);
        assert_eq!(values[47], 2_971_215_073u32.wrapping_add(1_836_311_903));
    }

    #[test]
    fn test_kind_round_trips() {
        for kind in SequenceKind::ALL {
            assert_eq!(Sequence::start(kind).kind(), kind);
        }
    }
}
