//! Directive parsing.
//!
//! A [`BlockParser`] turns the text range of one lazy block into nodes by
//! trying each [`DirectiveRule`] of [`RULES`] in order at the pointer. The
//! first rule that recognises its directive wins. A `@` no rule accepts is
//! literal text.

pub mod condition;
pub mod expression;
mod for_loop;
mod literal;
pub mod path;
mod placeholder;
mod rules;

use crate::block::{BlockId, BlockKind, LazyBlockSlice};
use crate::error::{RenderError, Result};
use crate::node::Node;
use crate::session::{Session, SourceId};
use crate::value::ScopeId;
use quill_stream::{chars, SourceStream, StreamExt};
use tracing::trace;

/// A recogniser for one family of directives.
///
/// `try_parse` returns `Ok(None)` when the input at the pointer is not its
/// directive; the parser then rolls the stream back and tries the next rule.
/// Once a rule has committed to a directive, malformed input is an error.
pub(crate) trait DirectiveRule {
    fn name(&self) -> &'static str;

    fn try_parse(&self, parser: &mut BlockParser<'_>) -> Result<Option<Node>>;
}

/// The recogniser chain. The order is part of the grammar: `@var ` must be
/// tried as a declaration before `@var(` is tried as a read.
pub(crate) const RULES: &[&dyn DirectiveRule] = &[
    &rules::RawTextRule,
    &rules::DeclarationRule,
    &for_loop::ForLoopRule,
    &placeholder::PlaceholderRule,
    &rules::VariableReadRule,
    &rules::NestedRule,
];

/// Text range of a block body found by [`BlockParser::scan_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockRange {
    pub start: usize,
    pub length: usize,
}

/// Parses the range of one block.
pub(crate) struct BlockParser<'s> {
    session: &'s mut Session,
    block: BlockId,
    source: SourceId,
    scope: ScopeId,
    end: usize,
    break_target: Option<BlockId>,
}

impl<'s> BlockParser<'s> {
    /// The stream of `block` must already be at its start pointer.
    pub(crate) fn new(session: &'s mut Session, block: BlockId) -> Self {
        let slice = session.block(block);
        let (source, scope, end, break_target) = (
            slice.source,
            slice.scope,
            slice.start_pointer + slice.length,
            slice.break_target,
        );
        Self {
            session,
            block,
            source,
            scope,
            end,
            break_target,
        }
    }

    pub(crate) fn stream(&mut self) -> &mut dyn SourceStream {
        self.session.source_mut(self.source)
    }

    pub(crate) fn session(&mut self) -> &mut Session {
        self.session
    }

    pub(crate) fn block(&self) -> BlockId {
        self.block
    }

    pub(crate) fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Pointer one past the last character of the range.
    pub(crate) fn end(&self) -> usize {
        self.end
    }

    /// The loop body `@breakfor` refers to, if the block is inside a loop.
    pub(crate) fn break_target(&self) -> Option<BlockId> {
        self.break_target
    }

    fn at_end(&mut self) -> bool {
        let end = self.end;
        let stream = self.stream();
        stream.pointer() >= end || stream.has_ended()
    }

    /// Parses the whole range. A parse error ends the list with an error
    /// node; the nodes before it stay usable.
    pub(crate) fn parse_all(mut self) -> Vec<Node> {
        let mut nodes: Vec<Node> = Vec::new();
        while !self.at_end() {
            match self.next_node() {
                Ok(Node::Text(text)) => match nodes.last_mut() {
                    Some(Node::Text(previous)) => previous.push_str(&text),
                    _ => nodes.push(Node::Text(text)),
                },
                Ok(node) => nodes.push(node),
                Err(err) => {
                    nodes.push(Node::Error(err));
                    break;
                }
            }
        }
        nodes
    }

    fn next_node(&mut self) -> Result<Node> {
        for rule in RULES {
            let checkpoint = self.stream().checkpoint();
            if let Some(node) = rule.try_parse(self)? {
                trace!(rule = rule.name(), block = self.block.index(), "directive recognised");
                return Ok(node);
            }
            self.stream().restore(checkpoint);
        }
        let stream = self.stream();
        let ch = stream
            .current_char()
            .ok_or_else(|| parse_error(stream, "unexpected end of input"))?;
        stream.increment_pointer();
        Ok(Node::Text(ch.to_string()))
    }

    /// Finds the end of a block body that starts at the pointer.
    ///
    /// `skip` opens a nested block of the same kind, `candidates` are the
    /// separators and terminator (last) that may end this body. One space or
    /// newline right before the candidate is not part of the body. The
    /// candidate itself is consumed; the index of the one found is returned.
    pub(crate) fn scan_block(
        &mut self,
        skip: &str,
        candidates: &[&str],
    ) -> Result<(BlockRange, usize)> {
        let end = self.end;
        let stream = self.stream();
        let start = stream.pointer();
        let terminator = candidates.last().copied().unwrap_or_default();
        let found = stream.increment_until_directive_with_skip(skip, candidates);
        let found = match found {
            Some(found) if stream.pointer() < end => found,
            _ => {
                return Err(parse_error(
                    stream,
                    format!("missing `{terminator}` for the block starting here"),
                ))
            }
        };
        let mut length = stream.pointer() - start;
        if length > 0 && (stream.preceded_by(' ') || stream.preceded_by('\n')) {
            length -= 1;
        }
        stream.increment_str(candidates[found]);
        Ok((BlockRange { start, length }, found))
    }

    /// Registers a lazy block for a body found by [`scan_block`](Self::scan_block).
    /// The pointer must be right after the body's closing directive.
    pub(crate) fn new_child_block(
        &mut self,
        range: BlockRange,
        kind: BlockKind,
        scope: ScopeId,
        break_target: Option<BlockId>,
    ) -> BlockId {
        let block_end_pointer = self.stream().pointer();
        let source = self.source;
        self.session.add_block(|id| {
            let mut slice =
                LazyBlockSlice::new(source, range.start, range.length, block_end_pointer, scope, kind);
            slice.break_target = match kind {
                BlockKind::ForBody => Some(id),
                _ => break_target,
            };
            slice
        })
    }

    /// Creates a scope whose parent is the scope of the block being parsed.
    pub(crate) fn child_scope(&mut self, name: impl Into<String>) -> ScopeId {
        let parent = self.scope;
        self.session.scopes.create(name, Some(parent))
    }
}

pub(crate) fn parse_error<S: SourceStream + ?Sized>(
    stream: &S,
    message: impl Into<String>,
) -> RenderError {
    RenderError::parse(message, stream.position())
}

/// Skips spaces and requires `ch`.
pub(crate) fn expect<S: SourceStream + ?Sized>(stream: &mut S, ch: char) -> Result<()> {
    stream.escape_spaces();
    if stream.increment(ch) {
        Ok(())
    } else {
        Err(parse_error(stream, format!("expected `{ch}`")))
    }
}

/// An identifier, or `None` if none starts at the pointer.
pub(crate) fn parse_name<S: SourceStream + ?Sized>(stream: &mut S) -> Option<String> {
    stream
        .current_char()
        .is_some_and(chars::is_name_start)
        .then(|| stream.parse_text_while(chars::is_name_char))
}

/// Like [`parse_name`] but the name is mandatory.
pub(crate) fn require_name<S: SourceStream + ?Sized>(stream: &mut S, what: &str) -> Result<String> {
    stream.escape_spaces();
    parse_name(stream).ok_or_else(|| parse_error(stream, format!("expected {what}")))
}
