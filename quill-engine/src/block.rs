use crate::node::Node;
use crate::session::SourceId;
use crate::value::ScopeId;
use std::fmt;
use std::rc::Rc;

/// Index of a [`LazyBlockSlice`] in its render session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub(crate) usize);

impl BlockId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a block was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// The whole template.
    Root,
    /// The body of a `@for`.
    ForBody,
    /// One branch of an `@if` chain.
    Branch,
    /// A placeholder body, user defined or built in.
    Placeholder,
    /// A source pulled in by `@embed`.
    Embedded,
}

/// Parse state of a block. Moves from `Unparsed` to `Parsed` exactly once.
#[derive(Debug)]
pub(crate) enum BlockBody {
    Unparsed,
    Parsed(Rc<[Node]>),
}

/// A delimited range of a source whose parse result is cached.
///
/// The range is `[start_pointer, start_pointer + length)`; execution leaves
/// the stream at `block_end_pointer`, which is past the closing directive.
#[derive(Debug)]
pub(crate) struct LazyBlockSlice {
    pub source: SourceId,
    pub start_pointer: usize,
    pub length: usize,
    pub block_end_pointer: usize,
    pub scope: ScopeId,
    pub kind: BlockKind,
    /// The loop body whose broken flag stops replay of this block.
    pub break_target: Option<BlockId>,
    /// Set by `@breakfor`, reset when the loop starts.
    pub has_broken: bool,
    body: BlockBody,
    parse_count: usize,
}

impl LazyBlockSlice {
    pub fn new(
        source: SourceId,
        start_pointer: usize,
        length: usize,
        block_end_pointer: usize,
        scope: ScopeId,
        kind: BlockKind,
    ) -> Self {
        Self {
            source,
            start_pointer,
            length,
            block_end_pointer,
            scope,
            kind,
            break_target: None,
            has_broken: false,
            body: BlockBody::Unparsed,
            parse_count: 0,
        }
    }

    /// The cached nodes, if the block was prepared.
    pub fn nodes(&self) -> Option<Rc<[Node]>> {
        match &self.body {
            BlockBody::Parsed(nodes) => Some(Rc::clone(nodes)),
            BlockBody::Unparsed => None,
        }
    }

    pub fn set_parsed(&mut self, nodes: Rc<[Node]>) {
        self.body = BlockBody::Parsed(nodes);
        self.parse_count += 1;
    }

    /// How many times the range went through the parser. Never more than one.
    pub fn parse_count(&self) -> usize {
        self.parse_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_parses_once() {
        let mut slice = LazyBlockSlice::new(
            SourceId(0),
            3,
            10,
            20,
            ScopeId::GLOBAL,
            BlockKind::ForBody,
        );
        assert!(slice.nodes().is_none());
        slice.set_parsed(Rc::from(vec![Node::Text("x".to_string())]));
        assert_eq!(slice.nodes().map(|nodes| nodes.len()), Some(1));
        assert_eq!(slice.parse_count(), 1);
    }
}
