use crate::error::{RenderError, Result};
use crate::parser::expression::{parse_arguments, parse_expression, Expression};
use crate::parser::{expect, parse_error};
use crate::value::{bound_member, Invocation, ScopeArena, ScopeId, Value};
use quill_stream::{chars, SourceStream, StreamExt};

/// One step of a [`ModelPath`].
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// `name`
    Property(String),
    /// `name(args)`, or `[index]` which calls `get`.
    Call {
        name: String,
        arguments: Vec<Expression>,
        /// `@name(...)`: the result is not written.
        invoke_only: bool,
        /// Produced by `[...]` rather than an explicit call.
        indexed: bool,
    },
}

/// A dotted reference such as `user.address.city` or `items.get(0).name`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPath {
    segments: Vec<PathSegment>,
}

impl ModelPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// True when the last segment is an invoke-only call.
    pub fn is_invoke_only(&self) -> bool {
        matches!(
            self.segments.last(),
            Some(PathSegment::Call {
                invoke_only: true,
                ..
            })
        )
    }

    /// Resolves the segments left to right. The first segment is looked up
    /// through the scope chain; every later one against the previous value.
    pub fn resolve(&self, scopes: &mut ScopeArena, scope: ScopeId) -> Result<Value> {
        let mut current: Option<Value> = None;
        for segment in &self.segments {
            let value = match segment {
                PathSegment::Property(name) => lookup(scopes, scope, current.as_ref(), name)
                    .ok_or_else(|| undefined(name, current.as_ref()))?,
                PathSegment::Call {
                    name,
                    arguments,
                    indexed,
                    ..
                } => {
                    let function = match lookup(scopes, scope, current.as_ref(), name) {
                        Some(Value::Function(function)) => function,
                        Some(other) => {
                            return Err(RenderError::type_error(format!(
                                "`{name}` is a {}, not a function",
                                other.kind()
                            )))
                        }
                        None if *indexed => {
                            let kind = current.as_ref().map_or("scope", |v| v.kind().name());
                            return Err(RenderError::type_error(format!(
                                "cannot index a value of kind {kind}"
                            )));
                        }
                        None => return Err(undefined(name, current.as_ref())),
                    };
                    let arguments = arguments
                        .iter()
                        .map(|argument| argument.evaluate(scopes, scope))
                        .collect::<Result<Vec<_>>>()?;
                    function.invoke(Invocation {
                        receiver: current.as_ref(),
                        arguments: &arguments,
                        scopes: &mut *scopes,
                    })?
                }
            };
            current = Some(value);
        }
        current.ok_or_else(|| RenderError::reference("empty reference path"))
    }
}

fn lookup(
    scopes: &ScopeArena,
    scope: ScopeId,
    receiver: Option<&Value>,
    name: &str,
) -> Option<Value> {
    match receiver {
        None => scopes.lookup(scope, name),
        Some(Value::Object(object)) => scopes
            .get(*object, name)
            .cloned()
            .or_else(|| bound_member(&Value::Object(*object), name)),
        Some(value) => bound_member(value, name),
    }
}

fn undefined(name: &str, receiver: Option<&Value>) -> RenderError {
    match receiver {
        None => RenderError::reference(format!("`{name}` is not defined")),
        Some(value) => RenderError::reference(format!(
            "`{name}` is not a member of {}",
            value.kind()
        )),
    }
}

/// Parses a path. Returns `None` without consuming anything when the input
/// does not start with a name.
pub(crate) fn parse_path<S: SourceStream + ?Sized>(stream: &mut S) -> Result<Option<ModelPath>> {
    let start = stream.checkpoint();
    let mut segments = Vec::new();
    loop {
        let invoke_only = stream.increment('@');
        if !stream.current_char().is_some_and(chars::is_name_start) {
            if segments.is_empty() && !invoke_only {
                stream.restore(start);
                return Ok(None);
            }
            return Err(parse_error(stream, "expected a property name"));
        }
        let name = stream.parse_text_while(chars::is_name_char);
        if stream.increment('(') {
            let arguments = parse_arguments(stream)?;
            segments.push(PathSegment::Call {
                name,
                arguments,
                invoke_only,
                indexed: false,
            });
        } else {
            segments.push(PathSegment::Property(name));
        }

        while stream.increment('[') {
            stream.escape_spaces();
            let index = parse_expression(stream)?
                .ok_or_else(|| parse_error(stream, "expected an index expression"))?;
            expect(stream, ']')?;
            segments.push(PathSegment::Call {
                name: "get".to_string(),
                arguments: vec![index],
                invoke_only: false,
                indexed: true,
            });
        }

        let dot = stream.checkpoint();
        if !stream.increment('.') {
            break;
        }
        if !stream
            .current_char()
            .is_some_and(|c| c == '@' || chars::is_name_start(c))
        {
            stream.restore(dot);
            break;
        }
    }
    Ok(Some(ModelPath::new(segments)))
}

/// `@var(path)` or `@const(path)`. The flag is true for `@const`.
pub(crate) fn parse_reference_directive<S: SourceStream + ?Sized>(
    stream: &mut S,
) -> Result<Option<(ModelPath, bool)>> {
    let constant = if stream.increment_str("@var(") {
        false
    } else if stream.increment_str("@const(") {
        true
    } else {
        return Ok(None);
    };
    stream.escape_spaces();
    let path = parse_path(stream)?.ok_or_else(|| parse_error(stream, "expected a reference"))?;
    expect(stream, ')')?;
    Ok(Some((path, constant)))
}
