use crate::error::{RenderError, Result};
use crate::value::{ScopeArena, Value};

/// Everything a function sees when it is called from a template.
pub struct Invocation<'a> {
    /// The value the function was reached through (`list` in `list.size()`),
    /// `None` for functions called by bare name.
    pub receiver: Option<&'a Value>,
    /// Evaluated arguments, in call order.
    pub arguments: &'a [Value],
    /// The render's scopes, for functions that read or create objects.
    pub scopes: &'a mut ScopeArena,
}

/// A callable value.
///
/// Hosts register functions in a scope; the engine also hands out bound
/// built-in members (`list.size`) through this trait.
pub trait TemplateFunction {
    fn name(&self) -> &str;

    fn invoke(&self, invocation: Invocation<'_>) -> Result<Value>;

    /// Text written when the function value itself is printed.
    fn signature(&self) -> String {
        format!("{}()", self.name())
    }
}

/// A host function backed by a closure.
pub struct NativeFunction<F> {
    name: String,
    arity: Option<usize>,
    body: F,
}

impl<F> NativeFunction<F>
where
    F: Fn(&[Value]) -> Result<Value>,
{
    /// A function accepting any number of arguments.
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            arity: None,
            body,
        }
    }

    /// A function that fails with an arity error unless called with exactly
    /// `arity` arguments.
    pub fn with_arity(name: impl Into<String>, arity: usize, body: F) -> Self {
        Self {
            name: name.into(),
            arity: Some(arity),
            body,
        }
    }
}

impl<F> TemplateFunction for NativeFunction<F>
where
    F: Fn(&[Value]) -> Result<Value>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, invocation: Invocation<'_>) -> Result<Value> {
        if let Some(arity) = self.arity {
            if invocation.arguments.len() != arity {
                return Err(RenderError::arity(
                    &self.name,
                    arity,
                    invocation.arguments.len(),
                ));
            }
        }
        (self.body)(invocation.arguments)
    }

    fn signature(&self) -> String {
        match self.arity {
            Some(arity) => format!("{}({arity})", self.name),
            None => format!("{}(...)", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_function_arity() {
        let mut scopes = ScopeArena::new("Global");
        let double = NativeFunction::with_arity("double", 1, |args: &[Value]| {
            Ok(Value::from(args[0].as_int().unwrap_or_default() * 2))
        });

        let args = [Value::from(21)];
        let result = double.invoke(Invocation {
            receiver: None,
            arguments: &args,
            scopes: &mut scopes,
        });
        assert_eq!(result, Ok(Value::from(42)));

        let result = double.invoke(Invocation {
            receiver: None,
            arguments: &[],
            scopes: &mut scopes,
        });
        assert!(matches!(result, Err(RenderError::Arity { found: 0, .. })));
        assert_eq!(double.signature(), "double(1)");
    }
}
