use crate::block::{BlockId, BlockKind, LazyBlockSlice};
use crate::destination::DestinationStream;
use crate::embedding::EmbeddingManager;
use crate::error::{RenderError, Result};
use crate::node::Node;
use crate::parser::BlockParser;
use crate::placeholder::{PlaceholderEntry, PlaceholderKey, PlaceholderRegistry, DEFAULT_PLACEHOLDERS};
use crate::value::{Primitive, ScopeArena, ScopeId, Value};
use quill_stream::{SourceStream, TextSourceStream};
use std::rc::Rc;
use tracing::{debug, warn};

/// Placeholder invocations and embeds that may be active at once.
pub(crate) const MAX_NESTING_DEPTH: usize = 32;

/// Index of a source in its render session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub(crate) usize);

/// Everything one render owns: the sources, the scope arena, the lazy
/// blocks and the placeholder registry.
pub(crate) struct Session {
    sources: Vec<Box<dyn SourceStream>>,
    blocks: Vec<LazyBlockSlice>,
    pub(crate) scopes: ScopeArena,
    pub(crate) placeholders: PlaceholderRegistry,
    pub(crate) embeddings: Box<dyn EmbeddingManager>,
    depth: usize,
}

impl Session {
    pub(crate) fn new(global_name: &str, embeddings: Box<dyn EmbeddingManager>) -> Self {
        Self {
            sources: Vec::new(),
            blocks: Vec::new(),
            scopes: ScopeArena::new(global_name),
            placeholders: PlaceholderRegistry::new(),
            embeddings,
            depth: 0,
        }
    }

    /// Registers the built-in placeholder bodies. Each one is its own
    /// source with a scope below Global.
    pub(crate) fn seed_default_placeholders(&mut self) {
        for (kind, body) in DEFAULT_PLACEHOLDERS {
            let source = self.add_source(Box::new(TextSourceStream::new(*body)));
            let scope = self
                .scopes
                .create(format!("placeholder {kind}"), Some(ScopeId::GLOBAL));
            let block = self.add_root_block(source, scope, BlockKind::Placeholder);
            self.placeholders.register(
                PlaceholderKey::default_for(*kind),
                PlaceholderEntry::new(block, None),
            );
        }
    }

    pub(crate) fn add_source(&mut self, source: Box<dyn SourceStream>) -> SourceId {
        self.sources.push(source);
        SourceId(self.sources.len() - 1)
    }

    pub(crate) fn source(&self, id: SourceId) -> &dyn SourceStream {
        &*self.sources[id.0]
    }

    pub(crate) fn source_mut(&mut self, id: SourceId) -> &mut dyn SourceStream {
        &mut *self.sources[id.0]
    }

    /// Creates a block spanning `source` from its pointer to its end.
    pub(crate) fn add_root_block(
        &mut self,
        source: SourceId,
        scope: ScopeId,
        kind: BlockKind,
    ) -> BlockId {
        let stream = self.source_mut(source);
        let start = stream.pointer();
        while stream.increment_pointer() {}
        let end = stream.pointer();
        stream.set_pointer_at(start);
        self.add_block(|_| LazyBlockSlice::new(source, start, end - start, end, scope, kind))
    }

    /// Adds the block built by `build`, which receives the id it will get.
    pub(crate) fn add_block<F>(&mut self, build: F) -> BlockId
    where
        F: FnOnce(BlockId) -> LazyBlockSlice,
    {
        let id = BlockId(self.blocks.len());
        self.blocks.push(build(id));
        id
    }

    pub(crate) fn block(&self, id: BlockId) -> &LazyBlockSlice {
        &self.blocks[id.0]
    }

    pub(crate) fn block_mut(&mut self, id: BlockId) -> &mut LazyBlockSlice {
        &mut self.blocks[id.0]
    }

    /// Sum of the parse counts of every block.
    pub(crate) fn parse_count(&self) -> usize {
        self.blocks.iter().map(LazyBlockSlice::parse_count).sum()
    }

    fn seek(&mut self, source: SourceId, pointer: usize) -> Result<()> {
        let stream = self.source_mut(source);
        if stream.set_pointer_at(pointer) {
            Ok(())
        } else {
            Err(RenderError::parse(
                format!("cannot seek to offset {pointer}"),
                stream.position(),
            ))
        }
    }

    /// Returns the nodes of `block`, parsing its range on first use.
    pub(crate) fn prepare(&mut self, block: BlockId) -> Result<Rc<[Node]>> {
        if let Some(nodes) = self.block(block).nodes() {
            return Ok(nodes);
        }
        let (source, start) = {
            let slice = self.block(block);
            (slice.source, slice.start_pointer)
        };
        self.seek(source, start)?;
        let nodes: Rc<[Node]> = BlockParser::new(self, block).parse_all().into();
        debug!(
            block = block.index(),
            kind = ?self.block(block).kind,
            nodes = nodes.len(),
            "block prepared"
        );
        self.block_mut(block).set_parsed(Rc::clone(&nodes));
        Ok(nodes)
    }

    /// Replays the nodes of `block`, stopping once its break target is
    /// flagged.
    pub(crate) fn execute(
        &mut self,
        block: BlockId,
        destination: &mut dyn DestinationStream,
    ) -> Result<()> {
        let nodes = self.prepare(block)?;
        let (source, start, end, break_target) = {
            let slice = self.block(block);
            (
                slice.source,
                slice.start_pointer,
                slice.block_end_pointer,
                slice.break_target,
            )
        };
        self.seek(source, start)?;
        for node in nodes.iter() {
            if break_target.is_some_and(|target| self.block(target).has_broken) {
                break;
            }
            node.generate(self, block, destination)?;
        }
        self.seek(source, end)
    }

    /// Clears the scope of `block` and runs it.
    pub(crate) fn execute_cleared(
        &mut self,
        block: BlockId,
        destination: &mut dyn DestinationStream,
    ) -> Result<()> {
        let scope = self.block(block).scope;
        self.scopes.remove_all(scope);
        self.execute(block, destination)
    }

    /// Writes a value. Strings are written as is; every other kind goes
    /// through the default placeholder of its kind.
    pub(crate) fn write_value(
        &mut self,
        value: Value,
        destination: &mut dyn DestinationStream,
    ) -> Result<()> {
        if let Value::Primitive(Primitive::String(text)) = &value {
            destination.write(text);
            return Ok(());
        }
        let key = PlaceholderKey::default_for(value.kind().name());
        if self.placeholders.get(&key).is_some() {
            return self.invoke_placeholder(&key, Some(value), destination);
        }
        warn!(kind = %value.kind(), "no placeholder for value kind, writing it natively");
        destination.write(&self.scopes.display(&value));
        Ok(())
    }

    /// Runs a placeholder body in its own scope with the argument bound to
    /// the declared parameter.
    pub(crate) fn invoke_placeholder(
        &mut self,
        key: &PlaceholderKey,
        argument: Option<Value>,
        destination: &mut dyn DestinationStream,
    ) -> Result<()> {
        let entry = self
            .placeholders
            .get(key)
            .cloned()
            .ok_or_else(|| RenderError::reference(format!("placeholder `{key}` is not defined")))?;
        debug!(placeholder = %key, "placeholder invoked");
        let scope = self.block(entry.body()).scope;
        self.scopes.remove_all(scope);
        if let Some(argument) = argument {
            self.scopes.put(scope, entry.parameter(), argument);
        }
        self.execute_nested(entry.body(), destination, || format!("placeholder `{key}`"))
    }

    /// Runs a placeholder body or an embedded block, failing once
    /// [`MAX_NESTING_DEPTH`] of them are already running.
    pub(crate) fn execute_nested<F>(
        &mut self,
        block: BlockId,
        destination: &mut dyn DestinationStream,
        describe: F,
    ) -> Result<()>
    where
        F: FnOnce() -> String,
    {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(RenderError::reference(format!(
                "{} nests deeper than {MAX_NESTING_DEPTH} levels",
                describe()
            )));
        }
        self.depth += 1;
        let result = self.execute(block, destination);
        self.depth -= 1;
        result
    }
}
