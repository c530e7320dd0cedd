use crate::block::BlockKind;
use crate::error::Result;
use crate::node::Node;
use crate::parser::expression::require_expression;
use crate::parser::{expect, parse_error, require_name, BlockParser, DirectiveRule};
use crate::placeholder::PlaceholderKey;
use quill_stream::StreamExt;

/// `@define_placeholder(...)`, `@placeholder(...)` and `@use_placeholder(...)`.
pub(crate) struct PlaceholderRule;

impl DirectiveRule for PlaceholderRule {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn try_parse(&self, parser: &mut BlockParser<'_>) -> Result<Option<Node>> {
        let stream = parser.stream();
        if stream.increment_str("@define_placeholder(") {
            parse_definition(parser).map(Some)
        } else if stream.increment_str("@placeholder(") {
            let name = require_name(stream, "a placeholder name")?;
            stream.escape_spaces();
            let argument = if stream.increment(',') {
                stream.escape_spaces();
                Some(require_expression(stream, "a placeholder argument")?)
            } else {
                None
            };
            expect(stream, ')')?;
            Ok(Some(Node::InvokePlaceholder {
                key: PlaceholderKey::default_for(name),
                argument,
            }))
        } else if stream.increment_str("@use_placeholder(") {
            let name = require_name(stream, "a placeholder name")?;
            stream.escape_spaces();
            let definition = if stream.increment(',') {
                require_name(stream, "a definition name")?
            } else {
                name.clone()
            };
            expect(stream, ')')?;
            Ok(Some(Node::InvokePlaceholder {
                key: PlaceholderKey::new(name, definition),
                argument: None,
            }))
        } else {
            Ok(None)
        }
    }
}

/// `name[, definition][, parameter]) body @end_define_placeholder`
fn parse_definition(parser: &mut BlockParser<'_>) -> Result<Node> {
    let stream = parser.stream();
    let mut names = vec![require_name(stream, "a placeholder name")?];
    loop {
        stream.escape_spaces();
        if !stream.increment(',') {
            break;
        }
        if names.len() == 3 {
            return Err(parse_error(
                stream,
                "a placeholder takes a name, a definition and a parameter at most",
            ));
        }
        names.push(require_name(stream, "a name")?);
    }
    expect(stream, ')')?;
    stream.increment_directive_break();

    let mut names = names.into_iter();
    let name = names.next().unwrap_or_default();
    let definition = names.next().unwrap_or_else(|| name.clone());
    let parameter = names.next();

    let (range, _) = parser.scan_block("@define_placeholder(", &["@end_define_placeholder"])?;
    parser.stream().increment_directive_break();
    let scope = parser.child_scope(format!("placeholder {name}"));
    let body = parser.new_child_block(range, BlockKind::Placeholder, scope, None);
    Ok(Node::DefinePlaceholder {
        key: PlaceholderKey::new(name, definition),
        parameter,
        body,
    })
}
