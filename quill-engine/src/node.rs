//! Parsed directives and their execution.

use crate::block::BlockId;
use crate::destination::DestinationStream;
use crate::error::{RenderError, Result};
use crate::operator::{ArithmeticOperator, ConditionType};
use crate::parser::condition::Condition;
use crate::parser::expression::Expression;
use crate::parser::path::ModelPath;
use crate::placeholder::{PlaceholderEntry, PlaceholderKey};
use crate::session::Session;
use crate::value::{Primitive, ScopeId, Value};
use tracing::{debug, trace};

#[derive(Debug)]
pub(crate) enum Node {
    Text(String),
    /// `@var(path)` or `@const(path)`.
    Read(ModelPath),
    /// `@var name = expr` or `@const name = expr`.
    Declare {
        name: String,
        value: Expression,
        constant: bool,
    },
    /// `@set_var name = expr`.
    Assign { name: String, value: Expression },
    ForLoop(ForLoop),
    Break { target: BlockId },
    If(IfChain),
    DefinePlaceholder {
        key: PlaceholderKey,
        parameter: Option<String>,
        body: BlockId,
    },
    /// `@placeholder(...)` and `@use_placeholder(...)`.
    InvokePlaceholder {
        key: PlaceholderKey,
        argument: Option<Expression>,
    },
    Embed { block: BlockId },
    /// A parse failure, raised again every time the block runs.
    Error(RenderError),
}

#[derive(Debug)]
pub(crate) struct ForLoop {
    pub kind: ForLoopKind,
    pub body: BlockId,
}

#[derive(Debug)]
pub(crate) enum ForLoopKind {
    /// `@for(condition)`
    Conditional(Condition),
    /// `@for(name = init; name cmp bound; name op step)`
    Numbered {
        name: String,
        init: Expression,
        condition: ConditionType,
        bound: Expression,
        operator: ArithmeticOperator,
        step: Expression,
    },
    /// `@for(element[, index]: iterable)`
    Iterable {
        element: String,
        index: Option<String>,
        iterable: Expression,
    },
}

#[derive(Debug)]
pub(crate) struct IfChain {
    pub branches: Vec<(Condition, BlockId)>,
    pub otherwise: Option<BlockId>,
}

impl Node {
    /// Executes the node as part of `block`.
    pub(crate) fn generate(
        &self,
        session: &mut Session,
        block: BlockId,
        destination: &mut dyn DestinationStream,
    ) -> Result<()> {
        let scope = session.block(block).scope;
        match self {
            Node::Text(text) => {
                destination.write(text);
                Ok(())
            }
            Node::Read(path) => {
                let value = path.resolve(&mut session.scopes, scope)?;
                if path.is_invoke_only() {
                    return Ok(());
                }
                session.write_value(value, destination)
            }
            Node::Declare {
                name,
                value,
                constant,
            } => {
                let value = value.evaluate(&mut session.scopes, scope)?;
                trace!(name = name.as_str(), constant, "declaration");
                if session.scopes.insert(scope, name, value) {
                    Ok(())
                } else {
                    Err(RenderError::reference(format!(
                        "`{name}` is already declared in {}",
                        session.scopes.name(scope)
                    )))
                }
            }
            Node::Assign { name, value } => {
                let value = value.evaluate(&mut session.scopes, scope)?;
                if session.scopes.assign(scope, name, value) {
                    Ok(())
                } else {
                    Err(RenderError::reference(format!(
                        "cannot assign to `{name}`: it is not declared"
                    )))
                }
            }
            Node::ForLoop(for_loop) => for_loop.generate(session, scope, destination),
            Node::Break { target } => {
                session.block_mut(*target).has_broken = true;
                Ok(())
            }
            Node::If(chain) => chain.generate(session, scope, destination),
            Node::DefinePlaceholder {
                key,
                parameter,
                body,
            } => {
                debug!(placeholder = %key, "placeholder registered");
                session.placeholders.register(
                    key.clone(),
                    PlaceholderEntry::new(*body, parameter.clone()),
                );
                Ok(())
            }
            Node::InvokePlaceholder { key, argument } => {
                let argument = argument
                    .as_ref()
                    .map(|argument| argument.evaluate(&mut session.scopes, scope))
                    .transpose()?;
                session.invoke_placeholder(key, argument, destination)
            }
            Node::Embed { block } => {
                session.execute_nested(*block, destination, || format!("embedded block {block}"))
            }
            Node::Error(err) => Err(err.clone()),
        }
    }
}

impl ForLoop {
    fn generate(
        &self,
        session: &mut Session,
        scope: ScopeId,
        destination: &mut dyn DestinationStream,
    ) -> Result<()> {
        session.block_mut(self.body).has_broken = false;
        let result = self.iterate(session, scope, destination);
        let loop_scope = session.block(self.body).scope;
        session.scopes.remove_all(loop_scope);
        result
    }

    /// Runs the iterations. The loop scope is cleared before each one and
    /// the broken flag is checked right after.
    fn iterate(
        &self,
        session: &mut Session,
        scope: ScopeId,
        destination: &mut dyn DestinationStream,
    ) -> Result<()> {
        let body = self.body;
        let loop_scope = session.block(body).scope;
        match &self.kind {
            ForLoopKind::Conditional(condition) => loop {
                session.scopes.remove_all(loop_scope);
                if session.block(body).has_broken
                    || !condition.evaluate(&mut session.scopes, loop_scope)?
                {
                    return Ok(());
                }
                session.execute(body, destination)?;
            },
            ForLoopKind::Numbered {
                name,
                init,
                condition,
                bound,
                operator,
                step,
            } => {
                let mut counter = evaluate_int(session, scope, init, "loop start")?;
                let bound = Primitive::Int(evaluate_int(session, scope, bound, "loop bound")?);
                let step = Primitive::Int(evaluate_int(session, scope, step, "loop step")?);
                loop {
                    session.scopes.remove_all(loop_scope);
                    if session.block(body).has_broken
                        || !Primitive::Int(counter).compare(*condition, &bound)?
                    {
                        return Ok(());
                    }
                    session
                        .scopes
                        .put(loop_scope, name.as_str(), Value::from(counter));
                    session.execute(body, destination)?;
                    counter = match Primitive::Int(counter).operate(*operator, &step)? {
                        Primitive::Int(next) => next,
                        other => {
                            return Err(RenderError::type_error(format!(
                                "loop counter `{name}` became a {}",
                                other.kind()
                            )))
                        }
                    };
                }
            }
            ForLoopKind::Iterable {
                element,
                index,
                iterable,
            } => {
                let list = match iterable.evaluate(&mut session.scopes, scope)? {
                    Value::List(list) => list,
                    other => {
                        return Err(RenderError::type_error(format!(
                            "cannot iterate over a {}",
                            other.kind()
                        )))
                    }
                };
                let size = list.len();
                for position in 0..size {
                    session.scopes.remove_all(loop_scope);
                    if session.block(body).has_broken {
                        break;
                    }
                    let item = list.get(position).ok_or_else(|| {
                        RenderError::reference(format!(
                            "list element {position} is missing during iteration"
                        ))
                    })?;
                    session.scopes.put(loop_scope, element.as_str(), item);
                    if let Some(index) = index {
                        session
                            .scopes
                            .put(loop_scope, index.as_str(), Value::from(position as i32));
                    }
                    session.execute(body, destination)?;
                }
                Ok(())
            }
        }
    }
}

impl IfChain {
    fn generate(
        &self,
        session: &mut Session,
        scope: ScopeId,
        destination: &mut dyn DestinationStream,
    ) -> Result<()> {
        for (condition, block) in &self.branches {
            if condition.evaluate(&mut session.scopes, scope)? {
                return session.execute_cleared(*block, destination);
            }
        }
        match self.otherwise {
            Some(block) => session.execute_cleared(block, destination),
            None => Ok(()),
        }
    }
}

fn evaluate_int(
    session: &mut Session,
    scope: ScopeId,
    expression: &Expression,
    what: &str,
) -> Result<i32> {
    let value = expression.evaluate(&mut session.scopes, scope)?;
    value.as_int().ok_or_else(|| {
        RenderError::type_error(format!("{what} must be an int, found {}", value.kind()))
    })
}
