use crate::block::BlockKind;
use crate::error::Result;
use crate::node::{ForLoop, ForLoopKind, Node};
use crate::operator::ArithmeticOperator;
use crate::parser::condition::{parse_condition, parse_condition_type, Condition};
use crate::parser::expression::{require_expression, Expression};
use crate::parser::{expect, parse_error, parse_name, BlockParser, DirectiveRule};
use crate::value::Primitive;
use quill_stream::{SourceStream, StreamExt};

/// `@for(...) body @endfor` in its three forms.
///
/// The header decides the form: `name[, index]:` starts an iterable loop,
/// `name =` a numbered loop, anything else is a condition.
pub(crate) struct ForLoopRule;

impl DirectiveRule for ForLoopRule {
    fn name(&self) -> &'static str {
        "for"
    }

    fn try_parse(&self, parser: &mut BlockParser<'_>) -> Result<Option<Node>> {
        let stream = parser.stream();
        if !stream.increment_str("@for(") {
            return Ok(None);
        }
        stream.escape_spaces();
        let kind = if let Some(kind) = stream.attempt(parse_iterable_header)? {
            kind
        } else if let Some(kind) = stream.attempt(parse_numbered_header)? {
            kind
        } else {
            let condition: Condition = parse_condition(stream)?
                .ok_or_else(|| parse_error(stream, "expected a loop condition"))?;
            ForLoopKind::Conditional(condition)
        };
        expect(stream, ')')?;
        stream.increment_directive_break();

        let (range, _) = parser.scan_block("@for(", &["@endfor"])?;
        let scope = parser.child_scope("for");
        let body = parser.new_child_block(range, BlockKind::ForBody, scope, None);
        Ok(Some(Node::ForLoop(ForLoop { kind, body })))
    }
}

/// `element[, index]: iterable`
fn parse_iterable_header<S: SourceStream + ?Sized>(stream: &mut S) -> Result<Option<ForLoopKind>> {
    let Some(element) = parse_name(stream) else {
        return Ok(None);
    };
    stream.escape_spaces();
    let index = if stream.increment(',') {
        stream.escape_spaces();
        let Some(index) = parse_name(stream) else {
            return Ok(None);
        };
        stream.escape_spaces();
        Some(index)
    } else {
        None
    };
    if !stream.increment(':') {
        return Ok(None);
    }
    stream.escape_spaces();
    let iterable = require_expression(stream, "a list to iterate over")?;
    Ok(Some(ForLoopKind::Iterable {
        element,
        index,
        iterable,
    }))
}

/// `name = init; name cmp bound; name op step`, where the step part may
/// also be `name++` or `name--`.
fn parse_numbered_header<S: SourceStream + ?Sized>(stream: &mut S) -> Result<Option<ForLoopKind>> {
    let Some(name) = parse_name(stream) else {
        return Ok(None);
    };
    stream.escape_spaces();
    if !stream.increment('=') || stream.current_char() == Some('=') {
        return Ok(None);
    }
    stream.escape_spaces();
    let init = require_expression(stream, "a start value")?;
    expect(stream, ';')?;

    expect_loop_variable(stream, &name)?;
    stream.escape_spaces();
    let condition = parse_condition_type(stream)
        .ok_or_else(|| parse_error(stream, "expected a comparison operator"))?;
    stream.escape_spaces();
    let bound = require_expression(stream, "a loop bound")?;
    expect(stream, ';')?;

    expect_loop_variable(stream, &name)?;
    stream.escape_spaces();
    let (operator, step) = if stream.increment_str("++") {
        (ArithmeticOperator::Plus, Expression::Literal(Primitive::Int(1)))
    } else if stream.increment_str("--") {
        (ArithmeticOperator::Minus, Expression::Literal(Primitive::Int(1)))
    } else {
        let operator = stream
            .current_char()
            .and_then(ArithmeticOperator::from_char)
            .ok_or_else(|| parse_error(stream, "expected a step operator"))?;
        stream.increment_pointer();
        stream.escape_spaces();
        (operator, require_expression(stream, "a step value")?)
    };
    Ok(Some(ForLoopKind::Numbered {
        name,
        init,
        condition,
        bound,
        operator,
        step,
    }))
}

fn expect_loop_variable<S: SourceStream + ?Sized>(stream: &mut S, name: &str) -> Result<()> {
    stream.escape_spaces();
    match parse_name(stream) {
        Some(found) if found == name => Ok(()),
        _ => Err(parse_error(
            stream,
            format!("expected the loop variable `{name}`"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use crate::{render, RenderError};

    #[test]
    fn test_numbered_header_forms() {
        assert_eq!(render("@for(i = 0; i < 3; i++)@var(i)@endfor").unwrap(), "012");
        assert_eq!(render("@for(i = 3; i > 0; i--)@var(i)@endfor").unwrap(), "321");
        assert_eq!(render("@for(i = 1; i <= 8; i * 2)@var(i)@endfor").unwrap(), "1248");
    }

    #[test]
    fn test_loop_variable_must_match() {
        assert!(matches!(
            render("@for(i = 0; j < 3; i + 1)x@endfor"),
            Err(RenderError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_endfor() {
        assert!(matches!(
            render("@for(i = 0; i < 3; i + 1)x"),
            Err(RenderError::Parse { .. })
        ));
    }

    #[test]
    fn test_iterable_with_index() {
        let output = render("@for(x, n: @list(\"a\", \"b\"))@var(n)=@var(x) @endfor").unwrap();
        assert_eq!(output, "0=a1=b");
    }
}
