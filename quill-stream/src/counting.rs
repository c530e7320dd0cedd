use crate::stream::SourceStream;
use quill_common::Position;
use std::cell::Cell;
use std::rc::Rc;

/// Shared handle onto the number of characters a [`CountingStream`] has read.
#[derive(Debug, Clone, Default)]
pub struct ReadCounter(Rc<Cell<usize>>);

impl ReadCounter {
    /// Returns the number of character reads observed so far.
    pub fn get(&self) -> usize {
        self.0.get()
    }

    /// Resets the counter to zero.
    pub fn reset(&self) {
        self.0.set(0);
    }

    fn bump(&self) {
        self.0.set(self.0.get() + 1);
    }
}

/// A stream wrapper that counts every character read from the inner stream.
///
/// Seeking does not count. Replaying an already parsed block only seeks,
/// so the counter tells a host (or a test) whether the source was parsed again.
#[derive(Debug)]
pub struct CountingStream<S> {
    inner: S,
    reads: ReadCounter,
}

impl<S: SourceStream> CountingStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            reads: ReadCounter::default(),
        }
    }

    /// Returns a handle that keeps observing the counter after the stream
    /// has been moved into a template.
    pub fn reads(&self) -> ReadCounter {
        self.reads.clone()
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: SourceStream> SourceStream for CountingStream<S> {
    fn pointer(&self) -> usize {
        self.inner.pointer()
    }

    fn set_pointer_at(&mut self, pointer: usize) -> bool {
        self.inner.set_pointer_at(pointer)
    }

    fn current_char(&self) -> Option<char> {
        self.reads.bump();
        self.inner.current_char()
    }

    fn increment_pointer(&mut self) -> bool {
        self.inner.increment_pointer()
    }

    fn position(&self) -> Position {
        self.inner.position()
    }

    fn has_ended(&self) -> bool {
        self.inner.has_ended()
    }
}
