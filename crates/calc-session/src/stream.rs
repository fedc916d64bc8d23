//! Resumable number streams.

use calc_core::{CalcError, Handle, Sequence, SequenceKind};

use crate::table::HandleTable;

/// Observable state of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Uninitialized,
    Fibonacci,
    Squares,
    Primes,
    Stopped,
}

impl From<SequenceKind> for StreamKind {
    fn from(kind: SequenceKind) -> Self {
        match kind {
            SequenceKind::Fibonacci => Self::Fibonacci,
            SequenceKind::Squares => Self::Squares,
            SequenceKind::Primes => Self::Primes,
        }
    }
}

/// Cursor over one sequence. Nothing is computed until a read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Stream {
    #[default]
    Uninitialized,
    Active(Sequence),
    Stopped,
}

impl Stream {
    #[must_use]
    pub fn kind(&self) -> StreamKind {
        match self {
            Self::Uninitialized => StreamKind::Uninitialized,
            Self::Active(seq) => seq.kind().into(),
            Self::Stopped => StreamKind::Stopped,
        }
    }

    /// Up to `count` further values; none unless a sequence is active.
    pub fn read(&mut self, count: u32) -> Vec<u32> {
        match self {
            Self::Active(seq) => seq
                .by_ref()
                .take(usize::try_from(count).unwrap_or(usize::MAX))
                .collect(),
            Self::Uninitialized | Self::Stopped => Vec::new(),
        }
    }
}

/// Owns every live [`Stream`].
pub struct StreamManager {
    streams: HandleTable<Stream>,
}

impl Default for StreamManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            streams: HandleTable::new("streams"),
        }
    }

    /// Allocate an uninitialized stream.
    ///
    /// # Errors
    /// Returns `HandlesExhausted` if no handle is left.
    pub fn create(&self) -> Result<Handle, CalcError> {
        self.streams.create(Stream::default())
    }

    /// Switch the stream to `kind`, restarting from its first value.
    ///
    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn start(&self, handle: Handle, kind: SequenceKind) -> Result<(), CalcError> {
        self.streams
            .with_mut(handle, |s| *s = Stream::Active(Sequence::start(kind)))?;
        tracing::debug!(%handle, %kind, "stream started");
        Ok(())
    }

    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn start_fibonacci(&self, handle: Handle) -> Result<(), CalcError> {
        self.start(handle, SequenceKind::Fibonacci)
    }

    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn start_squares(&self, handle: Handle) -> Result<(), CalcError> {
        self.start(handle, SequenceKind::Squares)
    }

    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn start_primes(&self, handle: Handle) -> Result<(), CalcError> {
        self.start(handle, SequenceKind::Primes)
    }

    /// Read the next `count` values.
    ///
    /// Returns fewer only when the stream is not active or the sequence ran
    /// out of `u32` values.
    ///
    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn read(&self, handle: Handle, count: u32) -> Result<Vec<u32>, CalcError> {
        let values = self.streams.with_mut(handle, |s| s.read(count))?;
        tracing::debug!(%handle, count, produced = values.len(), "stream read");
        Ok(values)
    }

    /// Stop the stream; later reads yield nothing.
    ///
    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn stop(&self, handle: Handle) -> Result<(), CalcError> {
        self.streams.with_mut(handle, |s| *s = Stream::Stopped)?;
        tracing::debug!(%handle, "stream stopped");
        Ok(())
    }

    /// Current state of the stream.
    ///
    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn kind(&self, handle: Handle) -> Result<StreamKind, CalcError> {
        self.streams.with(handle, Stream::kind)
    }

    /// Drop the stream; the handle becomes invalid.
    ///
    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn destroy(&self, handle: Handle) -> Result<(), CalcError> {
        self.streams.destroy(handle).map(drop)
    }

    /// Number of live streams.
    #[must_use]
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_read_each_kind() {
        let streams = StreamManager::new();
        let h = streams.create().unwrap();

        streams.start_fibonacci(h).unwrap();
        assert_eq!(streams.read(h, 5).unwrap(), [1, 1, 2, 3, 5]);
        assert_eq!(streams.read(h, 5).unwrap(), [8, 13, 21, 34, 55]);
        streams.stop(h).unwrap();

        streams.start_squares(h).unwrap();
        assert_eq!(streams.read(h, 4).unwrap(), [1, 4, 9, 16]);
        streams.stop(h).unwrap();

        streams.start_primes(h).unwrap();
        assert_eq!(streams.read(h, 5).unwrap(), [2, 3, 5, 7, 11]);
    }

    #[test]
    fn test_uninitialized_and_stopped_read_nothing() {
        let streams = StreamManager::new();
        let h = streams.create().unwrap();
        assert_eq!(streams.kind(h), Ok(StreamKind::Uninitialized));
        assert!(streams.read(h, 10).unwrap().is_empty());

        streams.start_squares(h).unwrap();
        assert_eq!(streams.kind(h), Ok(StreamKind::Squares));
        streams.stop(h).unwrap();
        assert_eq!(streams.kind(h), Ok(StreamKind::Stopped));
        assert!(streams.read(h, u32::MAX).unwrap().is_empty());
    }

    #[test]
    fn test_restart_resets_state() {
        let streams = StreamManager::new();
        let h = streams.create().unwrap();
        streams.start_fibonacci(h).unwrap();
        streams.read(h, 7).unwrap();
        streams.start_fibonacci(h).unwrap();
        assert_eq!(streams.read(h, 3).unwrap(), [1, 1, 2]);
    }

    #[test]
    fn test_zero_count_read() {
        let streams = StreamManager::new();
        let h = streams.create().unwrap();
        streams.start_primes(h).unwrap();
        assert!(streams.read(h, 0).unwrap().is_empty());
        assert_eq!(streams.read(h, 1).unwrap(), [2]);
    }

    #[test]
    fn test_primes_stream_ends_at_top_of_range() {
        let mut stream = Stream::Active(Sequence::Primes {
            next_candidate: Some(4_294_967_280),
            produced: 0,
        });
        assert_eq!(stream.read(10), [4_294_967_291]);
        assert!(stream.read(10).is_empty());
    }

    #[test]
    fn test_destroyed_stream_is_not_found() {
        let streams = StreamManager::new();
        let h = streams.create().unwrap();
        streams.destroy(h).unwrap();

        let missing = Err(CalcError::HandleNotFound(h));
        assert_eq!(streams.start_primes(h), missing);
        assert_eq!(streams.read(h, 1), Err(CalcError::HandleNotFound(h)));
        assert_eq!(streams.stop(h), missing);
        assert_eq!(streams.destroy(h), missing);
        assert!(streams.is_empty());
    }

    fn kind() -> impl Strategy<Value = SequenceKind> {
        prop_oneof![
            Just(SequenceKind::Fibonacci),
            Just(SequenceKind::Squares),
            Just(SequenceKind::Primes),
        ]
    }

    proptest! {
        #[test]
        fn split_reads_match_single_read(kind in kind(), a in 0u32..50, b in 0u32..50) {
            let streams = StreamManager::new();
            let split = streams.create().unwrap();
            let whole = streams.create().unwrap();
            streams.start(split, kind).unwrap();
            streams.start(whole, kind).unwrap();

            let mut values = streams.read(split, a).unwrap();
            values.extend(streams.read(split, b).unwrap());
            prop_assert_eq!(values, streams.read(whole, a + b).unwrap());
        }
    }
}
