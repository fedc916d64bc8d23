//! Stock [`NumberSink`] implementations.

use calc_core::NumberSink;

/// Sink that stores every value, optionally cancelling after a limit.
#[derive(Debug, Default, Clone)]
pub struct CollectSink {
    /// Values received so far, in order.
    pub values: Vec<u32>,
    /// Number of `on_done` calls observed.
    pub done_calls: u32,
    stop_after: Option<usize>,
}

impl CollectSink {
    /// Collect everything the generator produces.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `false` from the `n`-th `on_number` call.
    #[must_use]
    pub fn stop_after(n: usize) -> Self {
        Self {
            stop_after: Some(n),
            ..Self::default()
        }
    }
}

impl NumberSink for CollectSink {
    fn on_number(&mut self, value: u32) -> bool {
        self.values.push(value);
        self.stop_after.is_none_or(|n| self.values.len() < n)
    }

    fn on_done(&mut self) {
        self.done_calls += 1;
    }
}

/// Sink built from a pair of closures.
pub struct FnSink<N, D> {
    on_number: N,
    on_done: D,
}

impl<N, D> FnSink<N, D>
where
    N: FnMut(u32) -> bool,
    D: FnMut(),
{
    /// Create a sink from callbacks.
    #[must_use]
    pub const fn new(on_number: N, on_done: D) -> Self {
        Self { on_number, on_done }
    }
}

impl<N, D> NumberSink for FnSink<N, D>
where
    N: FnMut(u32) -> bool,
    D: FnMut(),
{
    fn on_number(&mut self, value: u32) -> bool {
        (self.on_number)(value)
    }

    fn on_done(&mut self) {
        (self.on_done)();
    }
}
