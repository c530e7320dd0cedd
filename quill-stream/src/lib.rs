pub mod chars;
pub mod counting;
pub mod scan;
pub mod stream;
pub mod text_stream;

pub use counting::{CountingStream, ReadCounter};
pub use quill_common::{Checkpoint, Position};
pub use scan::StreamExt;
pub use stream::SourceStream;
pub use text_stream::TextSourceStream;
