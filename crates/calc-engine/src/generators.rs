//! Bounded push generators.
//!
//! A generator steps a fresh [`Sequence`] and hands each value to a
//! [`NumberSink`] until `max_count` values were produced, the sink asks to
//! stop, or the sequence runs out. `on_done` fires exactly once either way.

use calc_core::{NumberSink, Sequence, SequenceKind};

/// How a generator run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOutcome {
    /// Values handed to the sink, including the one it refused.
    pub emitted: u32,
    /// Whether the sink requested early termination.
    pub cancelled: bool,
}

/// Push up to `max_count` values of `kind` into `sink`.
pub fn generate<S: NumberSink>(kind: SequenceKind, max_count: u32, mut sink: S) -> GenerateOutcome {
    let mut outcome = GenerateOutcome {
        emitted: 0,
        cancelled: false,
    };

    let mut sequence = Sequence::start(kind);
    while outcome.emitted < max_count {
        let Some(value) = sequence.step() else {
            break;
        };
        outcome.emitted += 1;
        if !sink.on_number(value) {
            outcome.cancelled = true;
            break;
        }
    }
    sink.on_done();

    tracing::debug!(
        %kind,
        max_count,
        emitted = outcome.emitted,
        cancelled = outcome.cancelled,
        "generator finished"
    );
    outcome
}

/// Push up to `max_count` fibonacci numbers.
pub fn generate_fibonacci<S: NumberSink>(max_count: u32, sink: S) -> GenerateOutcome {
    generate(SequenceKind::Fibonacci, max_count, sink)
}

/// Push up to `max_count` squares.
pub fn generate_squares<S: NumberSink>(max_count: u32, sink: S) -> GenerateOutcome {
    generate(SequenceKind::Squares, max_count, sink)
}

/// Push up to `max_count` primes.
pub fn generate_primes<S: NumberSink>(max_count: u32, sink: S) -> GenerateOutcome {
    generate(SequenceKind::Primes, max_count, sink)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{CollectSink, FnSink};

    #[test]
    fn test_generate_fibonacci() {
        let mut sink = CollectSink::new();
        let outcome = generate_fibonacci(10, &mut sink);
        assert_eq!(sink.values, [1, 1, 2, 3, 5, 8, 13, 21, 34, 55]);
        assert_eq!(sink.done_calls, 1);
        assert_eq!(
            outcome,
            GenerateOutcome {
                emitted: 10,
                cancelled: false
            }
        );
    }

    #[test]
    fn test_generate_squares_and_primes() {
        let mut squares = CollectSink::new();
        generate_squares(5, &mut squares);
        assert_eq!(squares.values, [1, 4, 9, 16, 25]);

        let mut primes = CollectSink::new();
        generate_primes(5, &mut primes);
        assert_eq!(primes.values, [2, 3, 5, 7, 11]);
        assert_eq!(primes.done_calls, 1);
    }

    #[test]
    fn test_zero_count_only_signals_done() {
        for kind in SequenceKind::ALL {
            let mut sink = CollectSink::new();
            let outcome = generate(kind, 0, &mut sink);
            assert!(sink.values.is_empty());
            assert_eq!(sink.done_calls, 1);
            assert_eq!(outcome.emitted, 0);
        }
    }

    #[test]
    fn test_sink_cancellation() {
        let mut sink = CollectSink::stop_after(3);
        let outcome = generate_primes(100, &mut sink);
        assert_eq!(sink.values, [2, 3, 5]);
        assert_eq!(sink.done_calls, 1);
        assert!(outcome.cancelled);
        assert_eq!(outcome.emitted, 3);
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        let mut done = 0;
        generate_squares(
            3,
            FnSink::new(
                |v| {
                    seen.push(v);
                    true
                },
                || done += 1,
            ),
        );
        assert_eq!(seen, [1, 4, 9]);
        assert_eq!(done, 1);
    }

    proptest! {
        #[test]
        fn cancel_on_kth_call_stops_immediately(max in 0u32..50, k in 1usize..60) {
            for kind in SequenceKind::ALL {
                let mut sink = CollectSink::stop_after(k);
                generate(kind, max, &mut sink);
                let expected = k.min(max as usize);
                prop_assert_eq!(sink.values.len(), expected);
                prop_assert_eq!(sink.done_calls, 1);
            }
        }

        #[test]
        fn push_path_matches_sequence(max in 0u32..80) {
            for kind in SequenceKind::ALL {
                let mut sink = CollectSink::new();
                generate(kind, max, &mut sink);
                let pulled: Vec<u32> = Sequence::start(kind).take(max as usize).collect();
                prop_assert_eq!(&sink.values, &pulled);
            }
        }
    }
}
