use crate::stream::SourceStream;
use quill_common::Position;
use std::sync::Arc;

/// An in-memory [`SourceStream`] over a shared text buffer.
///
/// Pointers are byte offsets that always sit on a character boundary.
/// Line starts are indexed once at construction so that [`position`]
/// stays cheap after arbitrary seeks.
///
/// [`position`]: SourceStream::position
#[derive(Debug, Clone)]
pub struct TextSourceStream {
    buffer: Arc<str>,
    pointer: usize,
    line_starts: Vec<usize>,
}

impl TextSourceStream {
    /// Creates a stream from the given text.
    pub fn new<S: Into<String>>(input: S) -> Self {
        let owned = input.into();
        Self::with_arc(Arc::<str>::from(owned))
    }

    /// Creates a stream over an existing shared buffer.
    pub fn with_arc(buffer: Arc<str>) -> Self {
        let line_starts = std::iter::once(0)
            .chain(buffer.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            buffer,
            pointer: 0,
            line_starts,
        }
    }

    /// Returns the full source text.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Returns the length of the source in bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if the source is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the input from the pointer to the end.
    pub fn remaining(&self) -> &str {
        &self.buffer[self.pointer..]
    }
}

impl SourceStream for TextSourceStream {
    fn pointer(&self) -> usize {
        self.pointer
    }

    fn set_pointer_at(&mut self, pointer: usize) -> bool {
        if pointer > self.buffer.len() || !self.buffer.is_char_boundary(pointer) {
            return false;
        }
        self.pointer = pointer;
        true
    }

    fn current_char(&self) -> Option<char> {
        self.buffer[self.pointer..].chars().next()
    }

    fn increment_pointer(&mut self) -> bool {
        match self.current_char() {
            Some(ch) => {
                self.pointer += ch.len_utf8();
                true
            }
            None => false,
        }
    }

    fn position(&self) -> Position {
        let line = self.line_starts.partition_point(|&start| start <= self.pointer);
        let line_start = self.line_starts[line - 1];
        let column = self.buffer[line_start..self.pointer].chars().count() + 1;
        Position::at(line, column, self.pointer)
    }

    fn has_ended(&self) -> bool {
        self.pointer >= self.buffer.len()
    }
}
