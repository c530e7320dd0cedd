use crate::block::BlockKind;
use crate::error::{RenderError, Result};
use crate::node::{IfChain, Node};
use crate::parser::condition::{parse_condition, Condition};
use crate::parser::expression::require_expression;
use crate::parser::path::parse_reference_directive;
use crate::parser::{expect, parse_error, require_name, BlockParser, DirectiveRule};
use quill_stream::StreamExt;

/// Block terminators that can only appear where a block ends.
const TERMINATORS: &[&str] = &[
    "@endfor",
    "@elseif(",
    "@else",
    "@endif",
    "@end_define_placeholder",
];

/// Text up to the next `@` or the end of the block.
pub(crate) struct RawTextRule;

impl DirectiveRule for RawTextRule {
    fn name(&self) -> &'static str {
        "text"
    }

    fn try_parse(&self, parser: &mut BlockParser<'_>) -> Result<Option<Node>> {
        let end = parser.end();
        let stream = parser.stream();
        let mut text = String::new();
        while stream.pointer() < end {
            match stream.current_char() {
                Some('@') | None => break,
                Some(ch) => {
                    text.push(ch);
                    stream.increment_pointer();
                }
            }
        }
        Ok((!text.is_empty()).then_some(Node::Text(text)))
    }
}

/// `@var name = expr`, `@const name = expr` and `@set_var name = expr`.
pub(crate) struct DeclarationRule;

enum Declaration {
    Var,
    Const,
    Set,
}

impl DirectiveRule for DeclarationRule {
    fn name(&self) -> &'static str {
        "declaration"
    }

    fn try_parse(&self, parser: &mut BlockParser<'_>) -> Result<Option<Node>> {
        let stream = parser.stream();
        let declaration = if stream.increment_str("@var ") {
            Declaration::Var
        } else if stream.increment_str("@const ") {
            Declaration::Const
        } else if stream.increment_str("@set_var ") {
            Declaration::Set
        } else {
            return Ok(None);
        };
        let name = require_name(stream, "a variable name")?;
        expect(stream, '=')?;
        stream.escape_spaces();
        let value = require_expression(stream, "a value")?;
        stream.increment_directive_break();
        Ok(Some(match declaration {
            Declaration::Var => Node::Declare {
                name,
                value,
                constant: false,
            },
            Declaration::Const => Node::Declare {
                name,
                value,
                constant: true,
            },
            Declaration::Set => Node::Assign { name, value },
        }))
    }
}

/// `@var(path)` and `@const(path)`.
pub(crate) struct VariableReadRule;

impl DirectiveRule for VariableReadRule {
    fn name(&self) -> &'static str {
        "read"
    }

    fn try_parse(&self, parser: &mut BlockParser<'_>) -> Result<Option<Node>> {
        Ok(parse_reference_directive(parser.stream())?.map(|(path, _)| Node::Read(path)))
    }
}

/// `@breakfor`, `@if(...)` chains, `@embed path`, and stray terminators.
pub(crate) struct NestedRule;

impl DirectiveRule for NestedRule {
    fn name(&self) -> &'static str {
        "nested"
    }

    fn try_parse(&self, parser: &mut BlockParser<'_>) -> Result<Option<Node>> {
        if parser.stream().increment_str("@breakfor") {
            return parse_break(parser).map(Some);
        }
        if parser.stream().increment_str("@if(") {
            return parse_if_chain(parser).map(Some);
        }
        if parser.stream().increment_str("@embed ") {
            return parse_embed(parser).map(Some);
        }
        let stream = parser.stream();
        if let Some(terminator) = TERMINATORS.iter().find(|t| stream.matches_directive(t)) {
            return Err(parse_error(
                stream,
                format!("`{terminator}` without a matching opening directive"),
            ));
        }
        Ok(None)
    }
}

fn parse_break(parser: &mut BlockParser<'_>) -> Result<Node> {
    let Some(target) = parser.break_target() else {
        return Err(parse_error(parser.stream(), "`@breakfor` outside of a loop"));
    };
    parser.stream().increment_directive_break();
    Ok(Node::Break { target })
}

fn parse_branch_condition(parser: &mut BlockParser<'_>) -> Result<Condition> {
    let stream = parser.stream();
    stream.escape_spaces();
    let condition =
        parse_condition(stream)?.ok_or_else(|| parse_error(stream, "expected a condition"))?;
    expect(stream, ')')?;
    stream.increment_directive_break();
    Ok(condition)
}

/// Parses the rest of `@if(cond) ... [@elseif(cond) ...]* [@else ...] @endif`.
fn parse_if_chain(parser: &mut BlockParser<'_>) -> Result<Node> {
    let mut branches = Vec::new();
    let mut otherwise = None;
    let mut pending = Some(parse_branch_condition(parser)?);
    loop {
        let (range, found) = parser.scan_block("@if(", &["@elseif(", "@else", "@endif"])?;
        let scope = parser.child_scope("if");
        let break_target = parser.break_target();
        let block = parser.new_child_block(range, BlockKind::Branch, scope, break_target);
        match pending.take() {
            Some(condition) => branches.push((condition, block)),
            None => otherwise = Some(block),
        }
        match found {
            0 if otherwise.is_none() => pending = Some(parse_branch_condition(parser)?),
            1 if otherwise.is_none() => {
                parser.stream().increment_directive_break();
            }
            0 | 1 => {
                return Err(parse_error(
                    parser.stream(),
                    "`@elseif` and `@else` cannot follow `@else`",
                ))
            }
            _ => break,
        }
    }
    Ok(Node::If(IfChain {
        branches,
        otherwise,
    }))
}

fn parse_embed(parser: &mut BlockParser<'_>) -> Result<Node> {
    let stream = parser.stream();
    stream.escape_spaces();
    let path = stream.parse_text_while(|c| !c.is_whitespace());
    if path.is_empty() {
        return Err(parse_error(stream, "expected a path after `@embed`"));
    }
    stream.increment_directive_break();

    let requesting = parser.block();
    let scope = parser.scope();
    let break_target = parser.break_target();
    let session = parser.session();
    let embedded = session
        .embeddings
        .provide_stream(requesting, &path)
        .ok_or_else(|| RenderError::reference(format!("cannot embed `{path}`")))?;
    let source = session.add_source(embedded);
    let block = session.add_root_block(source, scope, BlockKind::Embedded);
    session.block_mut(block).break_target = break_target;
    Ok(Node::Embed { block })
}
