use crate::block::BlockId;
use quill_stream::{SourceStream, TextSourceStream};
use std::collections::HashMap;

/// Resolves `@embed path` to a nested source.
///
/// Called while the requesting block is parsed. Returning `None` makes the
/// directive a reference error.
pub trait EmbeddingManager {
    fn provide_stream(&mut self, requesting: BlockId, path: &str)
        -> Option<Box<dyn SourceStream>>;
}

/// Rejects every path.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEmbeddings;

impl EmbeddingManager for NoEmbeddings {
    fn provide_stream(&mut self, _: BlockId, _: &str) -> Option<Box<dyn SourceStream>> {
        None
    }
}

/// Serves embedded templates from memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEmbeddings {
    sources: HashMap<String, String>,
}

impl InMemoryEmbeddings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.sources.insert(path.into(), text.into());
    }
}

impl EmbeddingManager for InMemoryEmbeddings {
    fn provide_stream(&mut self, _: BlockId, path: &str) -> Option<Box<dyn SourceStream>> {
        self.sources
            .get(path)
            .map(|text| Box::new(TextSourceStream::new(text.as_str())) as Box<dyn SourceStream>)
    }
}
