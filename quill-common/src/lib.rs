//! Quill Common
//!
//! 提供 quill-stream 和 quill-engine 之间共享的位置与回溯类型。

pub mod checkpoint;
pub mod position;

pub use checkpoint::Checkpoint;
pub use position::Position;
