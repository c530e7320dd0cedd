use quill_common::{Checkpoint, Position};

/// A pointer-addressable character source.
///
/// Implementations only provide the primitive operations: reading the
/// current character, stepping forward one character and seeking to an
/// absolute pointer. Everything else (atomic matching, scanning, nested
/// block discovery) is built on top of these in [`crate::StreamExt`].
///
/// Pointers are opaque offsets. A pointer obtained from [`pointer`] can always
/// be passed back to [`set_pointer_at`].
///
/// [`pointer`]: SourceStream::pointer
/// [`set_pointer_at`]: SourceStream::set_pointer_at
pub trait SourceStream {
    /// Returns the current read pointer.
    fn pointer(&self) -> usize;

    /// Seeks to an absolute pointer. Returns false and leaves the stream
    /// untouched if the pointer is not addressable.
    fn set_pointer_at(&mut self, pointer: usize) -> bool;

    /// Returns the character under the pointer, `None` at the end of the stream.
    fn current_char(&self) -> Option<char>;

    /// Steps past the current character. Returns false at the end of the stream.
    fn increment_pointer(&mut self) -> bool;

    /// Returns the line/column location of the pointer.
    fn position(&self) -> Position;

    /// Returns true once every character has been consumed.
    fn has_ended(&self) -> bool {
        self.current_char().is_none()
    }

    /// Creates a checkpoint of the current location.
    fn checkpoint(&self) -> Checkpoint {
        Checkpoint::new(self.pointer(), self.position())
    }

    /// Rolls the stream back to a checkpoint.
    fn restore(&mut self, checkpoint: Checkpoint) {
        self.set_pointer_at(checkpoint.pointer());
    }
}

impl<S: SourceStream + ?Sized> SourceStream for Box<S> {
    fn pointer(&self) -> usize {
        (**self).pointer()
    }

    fn set_pointer_at(&mut self, pointer: usize) -> bool {
        (**self).set_pointer_at(pointer)
    }

    fn current_char(&self) -> Option<char> {
        (**self).current_char()
    }

    fn increment_pointer(&mut self) -> bool {
        (**self).increment_pointer()
    }

    fn position(&self) -> Position {
        (**self).position()
    }

    fn has_ended(&self) -> bool {
        (**self).has_ended()
    }
}
