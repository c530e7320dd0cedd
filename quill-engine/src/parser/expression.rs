//! Arithmetic expressions.
//!
//! Operands are literals, `@var(...)`/`@const(...)` references, bare paths
//! and `@list(...)`/`@mutable_list(...)` literals. Operators are converted
//! with a shunting-yard pass into postfix order and then folded into a
//! binary tree.

use crate::error::Result;
use crate::operator::ArithmeticOperator;
use crate::parser::literal::{parse_boolean, parse_char_literal, parse_number, parse_string_literal};
use crate::parser::parse_error;
use crate::parser::path::{parse_path, parse_reference_directive, ModelPath};
use crate::value::{ListValue, Primitive, ScopeArena, ScopeId, Value};
use quill_stream::{SourceStream, StreamExt};

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Primitive),
    Reference(ModelPath),
    List {
        mutable: bool,
        items: Vec<Expression>,
    },
    Binary {
        left: Box<Expression>,
        operator: ArithmeticOperator,
        right: Box<Expression>,
    },
}

impl Expression {
    pub fn evaluate(&self, scopes: &mut ScopeArena, scope: ScopeId) -> Result<Value> {
        match self {
            Expression::Literal(primitive) => Ok(Value::Primitive(primitive.clone())),
            Expression::Reference(path) => path.resolve(scopes, scope),
            Expression::List { mutable, items } => {
                let items = items
                    .iter()
                    .map(|item| item.evaluate(scopes, scope))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::List(if *mutable {
                    ListValue::new_mutable(items)
                } else {
                    ListValue::new(items)
                }))
            }
            Expression::Binary {
                left,
                operator,
                right,
            } => {
                let context = format!("operator `{operator}`");
                let left = left.evaluate(scopes, scope)?.into_primitive(&context)?;
                let right = right.evaluate(scopes, scope)?.into_primitive(&context)?;
                left.operate(*operator, &right).map(Value::Primitive)
            }
        }
    }
}

enum StackEntry {
    Operator(ArithmeticOperator),
    /// An open parenthesis.
    Boundary,
}

enum OutputItem {
    Operand(Expression),
    Operator(ArithmeticOperator),
}

/// Parses an expression. Returns `None` without consuming input if no
/// operand starts at the pointer. Trailing spaces that are not followed by
/// an operator are left unconsumed.
pub(crate) fn parse_expression<S: SourceStream + ?Sized>(
    stream: &mut S,
) -> Result<Option<Expression>> {
    let start = stream.checkpoint();
    let mut output: Vec<OutputItem> = Vec::new();
    let mut stack: Vec<StackEntry> = Vec::new();
    let mut open = 0usize;

    loop {
        stream.escape_spaces();
        if stream.increment('(') {
            stack.push(StackEntry::Boundary);
            open += 1;
            continue;
        }
        match parse_operand(stream)? {
            Some(operand) => output.push(OutputItem::Operand(operand)),
            None if output.is_empty() && open == 0 => {
                stream.restore(start);
                return Ok(None);
            }
            None => return Err(parse_error(stream, "expected a value")),
        }

        while open > 0 {
            let checkpoint = stream.checkpoint();
            stream.escape_spaces();
            if !stream.increment(')') {
                stream.restore(checkpoint);
                break;
            }
            while let Some(entry) = stack.pop() {
                match entry {
                    StackEntry::Boundary => break,
                    StackEntry::Operator(operator) => output.push(OutputItem::Operator(operator)),
                }
            }
            open -= 1;
        }

        let checkpoint = stream.checkpoint();
        stream.escape_spaces();
        let Some(operator) = stream.current_char().and_then(ArithmeticOperator::from_char) else {
            stream.restore(checkpoint);
            break;
        };
        stream.increment_pointer();
        while let Some(&StackEntry::Operator(top)) = stack.last() {
            if top.precedence() > operator.precedence() {
                break;
            }
            output.push(OutputItem::Operator(top));
            stack.pop();
        }
        stack.push(StackEntry::Operator(operator));
    }

    if open > 0 {
        return Err(parse_error(stream, "expected `)` to close the expression"));
    }
    while let Some(entry) = stack.pop() {
        if let StackEntry::Operator(operator) = entry {
            output.push(OutputItem::Operator(operator));
        }
    }
    fold(output)
        .map(Some)
        .ok_or_else(|| parse_error(stream, "malformed expression"))
}

/// Combines the postfix sequence into a tree: each operator takes the two
/// most recent operands.
fn fold(output: Vec<OutputItem>) -> Option<Expression> {
    let mut operands: Vec<Expression> = Vec::new();
    for item in output {
        match item {
            OutputItem::Operand(operand) => operands.push(operand),
            OutputItem::Operator(operator) => {
                let right = operands.pop()?;
                let left = operands.pop()?;
                operands.push(Expression::Binary {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                });
            }
        }
    }
    if operands.len() == 1 {
        operands.pop()
    } else {
        None
    }
}

fn parse_operand<S: SourceStream + ?Sized>(stream: &mut S) -> Result<Option<Expression>> {
    if stream.current_char() == Some('@') {
        if let Some((path, _)) = parse_reference_directive(stream)? {
            return Ok(Some(Expression::Reference(path)));
        }
        for (opener, mutable) in [("@list(", false), ("@mutable_list(", true)] {
            if stream.increment_str(opener) {
                let items = parse_arguments(stream)?;
                return Ok(Some(Expression::List { mutable, items }));
            }
        }
        return Ok(None);
    }
    if let Some(text) = parse_string_literal(stream)? {
        return Ok(Some(Expression::Literal(Primitive::String(text))));
    }
    if let Some(ch) = parse_char_literal(stream)? {
        return Ok(Some(Expression::Literal(Primitive::Char(ch))));
    }
    if let Some(number) = parse_number(stream) {
        return Ok(Some(Expression::Literal(number)));
    }
    if let Some(flag) = parse_boolean(stream) {
        return Ok(Some(Expression::Literal(Primitive::Boolean(flag))));
    }
    Ok(parse_path(stream)?.map(Expression::Reference))
}

/// Parses `a, b, c)` after the opening parenthesis of a call.
pub(crate) fn parse_arguments<S: SourceStream + ?Sized>(
    stream: &mut S,
) -> Result<Vec<Expression>> {
    let mut arguments = Vec::new();
    stream.escape_spaces();
    if stream.increment(')') {
        return Ok(arguments);
    }
    loop {
        let argument =
            parse_expression(stream)?.ok_or_else(|| parse_error(stream, "expected an argument"))?;
        arguments.push(argument);
        stream.escape_spaces();
        if stream.increment(',') {
            continue;
        }
        if stream.increment(')') {
            return Ok(arguments);
        }
        return Err(parse_error(stream, "expected `,` or `)` after an argument"));
    }
}

/// Like [`parse_expression`] but the expression is mandatory.
pub(crate) fn require_expression<S: SourceStream + ?Sized>(
    stream: &mut S,
    what: &str,
) -> Result<Expression> {
    parse_expression(stream)?
        .ok_or_else(|| parse_error(stream, format!("expected {what}")))
}

impl From<Primitive> for Expression {
    fn from(primitive: Primitive) -> Self {
        Expression::Literal(primitive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use quill_stream::TextSourceStream;

    fn eval(text: &str) -> Result<Value> {
        let mut stream = TextSourceStream::new(text);
        let expression = parse_expression(&mut stream)?.expect("expression");
        let mut scopes = ScopeArena::new("Global");
        let global = scopes.global();
        expression.evaluate(&mut scopes, global)
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2 + 3 * 4"), Ok(Value::from(14)));
        assert_eq!(eval("2 * 3 + 4"), Ok(Value::from(10)));
        assert_eq!(eval("10 - 4 % 3"), Ok(Value::from(9)));
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(eval("10 - 4 - 3"), Ok(Value::from(3)));
        assert_eq!(eval("64 / 4 / 2"), Ok(Value::from(8)));
    }

    #[test]
    fn test_parentheses() {
        assert_eq!(eval("(2 + 3) * 4"), Ok(Value::from(20)));
        assert_eq!(eval("2 * (3 + (4 - 1))"), Ok(Value::from(12)));
    }

    #[test]
    fn test_promotion_through_tree() {
        assert_eq!(eval("1 + 2.5"), Ok(Value::from(3.5)));
        assert_eq!(eval("\"total: \" + 4"), Ok(Value::from("total: 4")));
    }

    #[test]
    fn test_stops_before_text() {
        let mut stream = TextSourceStream::new("1 + 2 apples");
        let expression = parse_expression(&mut stream).unwrap();
        assert!(expression.is_some());
        assert_eq!(stream.current_char(), Some(' '));
    }

    #[test]
    fn test_leaves_unmatched_parenthesis() {
        let mut stream = TextSourceStream::new("3 * 4)");
        parse_expression(&mut stream).unwrap();
        assert_eq!(stream.current_char(), Some(')'));
    }

    #[test]
    fn test_missing_operand() {
        let mut stream = TextSourceStream::new("1 + )");
        assert!(matches!(
            parse_expression(&mut stream),
            Err(RenderError::Parse { .. })
        ));
    }

    #[test]
    fn test_arithmetic_on_boolean_fails() {
        assert!(matches!(eval("true + 1"), Err(RenderError::Type(_))));
    }

    #[test]
    fn test_list_literal() {
        let value = eval("@list(1, 2, 3)").unwrap();
        assert_eq!(value.as_list().map(|list| list.len()), Some(3));
        assert!(eval("@mutable_list()").unwrap().as_list().unwrap().is_mutable());
    }
}
