use crate::Position;

/// A saved stream location used to roll back a failed parse attempt.
///
/// Directive recognizers take a checkpoint before they start consuming input
/// and restore it when the directive does not match, so a failed attempt never
/// leaves the stream partially consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    /// The pointer (byte offset into the source) at this checkpoint.
    pointer: usize,
    /// The line/column location of the pointer.
    position: Position,
}

impl Checkpoint {
    /// Creates a new checkpoint for the given pointer and position.
    pub fn new(pointer: usize, position: Position) -> Self {
        Self { pointer, position }
    }

    /// Returns the pointer stored in this checkpoint.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Returns the position stored in this checkpoint.
    pub fn position(&self) -> Position {
        self.position
    }
}
