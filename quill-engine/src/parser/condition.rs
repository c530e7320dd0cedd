use crate::error::{RenderError, Result};
use crate::operator::ConditionType;
use crate::parser::expression::{parse_expression, require_expression, Expression};
use crate::value::{ScopeArena, ScopeId, Value};
use quill_stream::{SourceStream, StreamExt};

/// The test of `@for(condition)` and `@if(condition)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        left: Expression,
        condition: ConditionType,
        right: Expression,
    },
    /// A lone expression that must evaluate to a boolean.
    Value(Expression),
}

impl Condition {
    pub fn evaluate(&self, scopes: &mut ScopeArena, scope: ScopeId) -> Result<bool> {
        match self {
            Condition::Compare {
                left,
                condition,
                right,
            } => {
                let left = left.evaluate(scopes, scope)?;
                let right = right.evaluate(scopes, scope)?;
                compare_values(scopes, &left, *condition, &right)
            }
            Condition::Value(expression) => {
                let value = expression.evaluate(scopes, scope)?;
                value.as_bool().ok_or_else(|| {
                    RenderError::type_error(format!(
                        "condition must be a boolean, found {}",
                        value.kind()
                    ))
                })
            }
        }
    }
}

/// Compares two values of any kind.
///
/// Primitives follow their numeric or equality rules. Objects, lists and
/// functions only support `==` and `!=`.
pub fn compare_values(
    scopes: &ScopeArena,
    left: &Value,
    condition: ConditionType,
    right: &Value,
) -> Result<bool> {
    if let (Value::Primitive(a), Value::Primitive(b)) = (left, right) {
        return a.compare(condition, b);
    }
    if !condition.is_equality() {
        return Err(RenderError::type_error(format!(
            "cannot compare {} with {} using `{condition}`",
            left.kind(),
            right.kind()
        )));
    }
    let ordering = match (left, right) {
        (Value::Object(a), Value::Object(b)) => scopes.compare_objects(*a, *b),
        _ if left == right => std::cmp::Ordering::Equal,
        _ => std::cmp::Ordering::Less,
    };
    Ok(condition.verify(ordering))
}

pub(crate) fn parse_condition_type<S: SourceStream + ?Sized>(
    stream: &mut S,
) -> Option<ConditionType> {
    ConditionType::PARSE_ORDER
        .into_iter()
        .find(|condition| stream.increment_str(condition.symbol()))
}

/// Parses `left <op> right` or a lone expression. Returns `None` if no
/// expression starts at the pointer.
pub(crate) fn parse_condition<S: SourceStream + ?Sized>(
    stream: &mut S,
) -> Result<Option<Condition>> {
    let Some(left) = parse_expression(stream)? else {
        return Ok(None);
    };
    let checkpoint = stream.checkpoint();
    stream.escape_spaces();
    let Some(condition) = parse_condition_type(stream) else {
        stream.restore(checkpoint);
        return Ok(Some(Condition::Value(left)));
    };
    stream.escape_spaces();
    let right = require_expression(stream, "a value after the comparison")?;
    Ok(Some(Condition::Compare {
        left,
        condition,
        right,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_stream::TextSourceStream;

    fn check(text: &str, scopes: &mut ScopeArena) -> Result<bool> {
        let mut stream = TextSourceStream::new(text);
        let condition = parse_condition(&mut stream)?.expect("condition");
        let global = scopes.global();
        condition.evaluate(scopes, global)
    }

    #[test]
    fn test_numeric_comparisons() {
        let mut scopes = ScopeArena::new("Global");
        assert_eq!(check("1 < 2", &mut scopes), Ok(true));
        assert_eq!(check("2 <= 2", &mut scopes), Ok(true));
        assert_eq!(check("3 >= 4", &mut scopes), Ok(false));
        assert_eq!(check("2 + 2 == 4", &mut scopes), Ok(true));
        assert_eq!(check("1 != 1.0", &mut scopes), Ok(false));
    }

    #[test]
    fn test_boolean_condition() {
        let mut scopes = ScopeArena::new("Global");
        let global = scopes.global();
        scopes.put(global, "flag", Value::from(true));
        assert_eq!(check("flag", &mut scopes), Ok(true));
        assert_eq!(check("flag == false", &mut scopes), Ok(false));
        assert!(matches!(check("flag > true", &mut scopes), Err(RenderError::Type(_))));
        assert!(matches!(check("5", &mut scopes), Err(RenderError::Type(_))));
    }

    #[test]
    fn test_object_equality() {
        let mut scopes = ScopeArena::new("Global");
        let global = scopes.global();
        scopes.object_mut(global).put_object("a", |a| {
            a.put_value("x", 1);
        });
        scopes.object_mut(global).put_object("b", |b| {
            b.put_value("x", 1);
        });
        scopes.object_mut(global).put_object("empty", |_| {});
        assert_eq!(check("a == b", &mut scopes), Ok(true));
        assert_eq!(check("empty == empty", &mut scopes), Ok(false));
        assert!(matches!(check("a < b", &mut scopes), Err(RenderError::Type(_))));
    }

    #[test]
    fn test_missing_right_side() {
        let mut scopes = ScopeArena::new("Global");
        assert!(matches!(
            check("1 == )", &mut scopes),
            Err(RenderError::Parse { .. })
        ));
    }
}
