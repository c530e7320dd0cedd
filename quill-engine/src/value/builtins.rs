use crate::error::{RenderError, Result};
use crate::value::{Invocation, Primitive, ScopeArena, TemplateFunction, Value, ValueKind};
use std::rc::Rc;

/// Members every value kind answers without being declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinMethod {
    GetType,
    ToString,
    ToInt,
    ToLong,
    ToDouble,
    ToChar,
    Size,
    Get,
    Contains,
    IndexOf,
    JoinToString,
    Add,
    Remove,
}

impl BuiltinMethod {
    pub fn name(self) -> &'static str {
        match self {
            BuiltinMethod::GetType => "getType",
            BuiltinMethod::ToString => "toString",
            BuiltinMethod::ToInt => "toInt",
            BuiltinMethod::ToLong => "toLong",
            BuiltinMethod::ToDouble => "toDouble",
            BuiltinMethod::ToChar => "toChar",
            BuiltinMethod::Size => "size",
            BuiltinMethod::Get => "get",
            BuiltinMethod::Contains => "contains",
            BuiltinMethod::IndexOf => "indexOf",
            BuiltinMethod::JoinToString => "joinToString",
            BuiltinMethod::Add => "add",
            BuiltinMethod::Remove => "remove",
        }
    }

    /// Finds `name` in the member table of `kind`.
    pub fn lookup(kind: ValueKind, name: &str) -> Option<Self> {
        use BuiltinMethod as M;
        use ValueKind as K;
        let method = match name {
            "getType" => M::GetType,
            "toString" => M::ToString,
            "toInt" => M::ToInt,
            "toLong" => M::ToLong,
            "toDouble" => M::ToDouble,
            "toChar" => M::ToChar,
            "size" => M::Size,
            "get" => M::Get,
            "contains" => M::Contains,
            "indexOf" => M::IndexOf,
            "joinToString" => M::JoinToString,
            "add" => M::Add,
            "remove" => M::Remove,
            _ => return None,
        };
        let supported = match method {
            M::GetType | M::ToString => true,
            M::ToInt => matches!(kind, K::Int | K::Long | K::Double | K::Char | K::String),
            M::ToLong => matches!(kind, K::Int | K::Long | K::Double),
            M::ToDouble => matches!(kind, K::Int | K::Long | K::Double | K::String),
            M::ToChar => kind == K::Int,
            M::Size | M::Get => matches!(kind, K::String | K::List | K::MutableList),
            M::Contains => matches!(kind, K::String | K::List | K::MutableList | K::Object),
            M::IndexOf | M::JoinToString => matches!(kind, K::List | K::MutableList),
            M::Add | M::Remove => kind == K::MutableList,
        };
        supported.then_some(method)
    }

    /// Runs the member against `receiver`. The receiver's kind must be one
    /// that [`lookup`](BuiltinMethod::lookup) accepted.
    pub fn invoke(self, receiver: &Value, arguments: &[Value], scopes: &ScopeArena) -> Result<Value> {
        use BuiltinMethod as M;
        match self {
            M::GetType => {
                self.expect_arity(arguments, 0)?;
                Ok(Value::string(receiver.kind().name()))
            }
            M::ToString => {
                self.expect_arity(arguments, 0)?;
                Ok(Value::string(scopes.display(receiver)))
            }
            M::ToInt => {
                self.expect_arity(arguments, 0)?;
                let converted = match receiver.as_primitive() {
                    Some(Primitive::Int(n)) => *n,
                    Some(Primitive::Long(n)) => *n as i32,
                    Some(Primitive::Double(d)) => *d as i32,
                    Some(Primitive::Char(c)) => u32::from(*c) as i32,
                    Some(Primitive::String(s)) => s.trim().parse().map_err(|_| {
                        RenderError::type_error(format!("`{s}` is not an int"))
                    })?,
                    _ => return Err(self.unsupported(receiver)),
                };
                Ok(Value::from(converted))
            }
            M::ToLong => {
                self.expect_arity(arguments, 0)?;
                let converted = match receiver.as_primitive() {
                    Some(Primitive::Int(n)) => i64::from(*n),
                    Some(Primitive::Long(n)) => *n,
                    Some(Primitive::Double(d)) => *d as i64,
                    _ => return Err(self.unsupported(receiver)),
                };
                Ok(Value::from(converted))
            }
            M::ToDouble => {
                self.expect_arity(arguments, 0)?;
                let converted = match receiver.as_primitive() {
                    Some(Primitive::Int(n)) => f64::from(*n),
                    Some(Primitive::Long(n)) => *n as f64,
                    Some(Primitive::Double(d)) => *d,
                    Some(Primitive::String(s)) => s.trim().parse().map_err(|_| {
                        RenderError::type_error(format!("`{s}` is not a double"))
                    })?,
                    _ => return Err(self.unsupported(receiver)),
                };
                Ok(Value::from(converted))
            }
            M::ToChar => {
                self.expect_arity(arguments, 0)?;
                let code = receiver.as_int().ok_or_else(|| self.unsupported(receiver))?;
                u32::try_from(code)
                    .ok()
                    .and_then(char::from_u32)
                    .map(Value::from)
                    .ok_or_else(|| {
                        RenderError::type_error(format!("{code} is not a valid character code"))
                    })
            }
            M::Size => {
                self.expect_arity(arguments, 0)?;
                let size = match receiver {
                    Value::Primitive(Primitive::String(s)) => s.chars().count(),
                    Value::List(list) => list.len(),
                    _ => return Err(self.unsupported(receiver)),
                };
                Ok(Value::from(size as i32))
            }
            M::Get => {
                self.expect_arity(arguments, 1)?;
                let index = index_argument(&arguments[0])?;
                let element = match receiver {
                    Value::Primitive(Primitive::String(s)) => s.chars().nth(index).map(Value::from),
                    Value::List(list) => list.get(index),
                    _ => return Err(self.unsupported(receiver)),
                };
                element.ok_or_else(|| {
                    RenderError::reference(format!("index {index} is out of bounds"))
                })
            }
            M::Contains => {
                if arguments.is_empty() {
                    return Err(RenderError::arity(self.name(), "at least 1", 0));
                }
                let contained = match receiver {
                    Value::Primitive(Primitive::String(s)) => {
                        let mut all = true;
                        for argument in arguments {
                            let needle = match argument.as_primitive() {
                                Some(Primitive::String(needle)) => needle.clone(),
                                Some(Primitive::Char(c)) => c.to_string(),
                                _ => {
                                    return Err(RenderError::type_error(format!(
                                        "a string cannot contain a {}",
                                        argument.kind()
                                    )))
                                }
                            };
                            all &= s.contains(needle.as_str());
                        }
                        all
                    }
                    Value::List(list) => arguments.iter().all(|argument| list.contains(argument)),
                    Value::Object(object) => arguments.iter().all(|argument| {
                        argument
                            .as_str()
                            .is_some_and(|key| scopes.contains(*object, key))
                    }),
                    _ => return Err(self.unsupported(receiver)),
                };
                Ok(Value::from(contained))
            }
            M::IndexOf => {
                self.expect_arity(arguments, 1)?;
                let list = receiver.as_list().ok_or_else(|| self.unsupported(receiver))?;
                let index = list.index_of(&arguments[0]).map_or(-1, |i| i as i32);
                Ok(Value::from(index))
            }
            M::JoinToString => {
                if arguments.len() > 1 {
                    return Err(RenderError::arity(self.name(), "0 or 1", arguments.len()));
                }
                let separator = match arguments.first() {
                    None => ",",
                    Some(argument) => argument.as_str().ok_or_else(|| {
                        RenderError::type_error("joinToString expects a string separator")
                    })?,
                };
                let list = receiver.as_list().ok_or_else(|| self.unsupported(receiver))?;
                let joined = list
                    .to_vec()
                    .iter()
                    .map(|item| scopes.display(item))
                    .collect::<Vec<_>>()
                    .join(separator);
                Ok(Value::string(joined))
            }
            M::Add => {
                self.expect_arity(arguments, 1)?;
                let list = receiver.as_list().ok_or_else(|| self.unsupported(receiver))?;
                list.push(arguments[0].clone())?;
                Ok(Value::from(true))
            }
            M::Remove => {
                self.expect_arity(arguments, 1)?;
                let list = receiver.as_list().ok_or_else(|| self.unsupported(receiver))?;
                Ok(Value::from(list.remove(&arguments[0])?))
            }
        }
    }

    fn expect_arity(self, arguments: &[Value], expected: usize) -> Result<()> {
        if arguments.len() == expected {
            Ok(())
        } else {
            Err(RenderError::arity(self.name(), expected, arguments.len()))
        }
    }

    fn unsupported(self, receiver: &Value) -> RenderError {
        RenderError::type_error(format!(
            "`{}` is not defined for {}",
            self.name(),
            receiver.kind()
        ))
    }
}

fn index_argument(argument: &Value) -> Result<usize> {
    match argument.as_int() {
        Some(index) => usize::try_from(index)
            .map_err(|_| RenderError::reference(format!("index {index} is out of bounds"))),
        None => Err(RenderError::type_error(format!(
            "index must be an int, found {}",
            argument.kind()
        ))),
    }
}

/// A built-in member captured together with its receiver, so that
/// `list.size` without parentheses is a function value.
struct BoundMethod {
    receiver: Value,
    method: BuiltinMethod,
}

impl TemplateFunction for BoundMethod {
    fn name(&self) -> &str {
        self.method.name()
    }

    fn invoke(&self, invocation: Invocation<'_>) -> Result<Value> {
        self.method
            .invoke(&self.receiver, invocation.arguments, invocation.scopes)
    }
}

/// Looks `name` up in the member table of the receiver's kind.
pub(crate) fn bound_member(receiver: &Value, name: &str) -> Option<Value> {
    let method = BuiltinMethod::lookup(receiver.kind(), name)?;
    Some(Value::Function(Rc::new(BoundMethod {
        receiver: receiver.clone(),
        method,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(method: BuiltinMethod, receiver: Value, arguments: &[Value]) -> Result<Value> {
        let scopes = ScopeArena::new("Global");
        method.invoke(&receiver, arguments, &scopes)
    }

    #[test]
    fn test_member_tables_per_kind() {
        assert_eq!(
            BuiltinMethod::lookup(ValueKind::List, "joinToString"),
            Some(BuiltinMethod::JoinToString)
        );
        assert_eq!(BuiltinMethod::lookup(ValueKind::List, "add"), None);
        assert_eq!(
            BuiltinMethod::lookup(ValueKind::MutableList, "add"),
            Some(BuiltinMethod::Add)
        );
        assert_eq!(BuiltinMethod::lookup(ValueKind::Boolean, "toInt"), None);
        assert_eq!(BuiltinMethod::lookup(ValueKind::Object, "size"), None);
        assert_eq!(BuiltinMethod::lookup(ValueKind::Int, "nothing"), None);
    }

    #[test]
    fn test_list_members() {
        let list = Value::list([Value::from(10), Value::from(20), Value::from(30)]);
        assert_eq!(
            call(BuiltinMethod::Get, list.clone(), &[Value::from(1)]),
            Ok(Value::from(20))
        );
        assert_eq!(call(BuiltinMethod::Size, list.clone(), &[]), Ok(Value::from(3)));
        assert_eq!(
            call(
                BuiltinMethod::Contains,
                list.clone(),
                &[Value::from(10), Value::from(30)]
            ),
            Ok(Value::from(true))
        );
        assert_eq!(
            call(BuiltinMethod::IndexOf, list.clone(), &[Value::from(40)]),
            Ok(Value::from(-1))
        );
        assert_eq!(
            call(BuiltinMethod::JoinToString, list.clone(), &[Value::from(" | ")]),
            Ok(Value::from("10 | 20 | 30"))
        );
        assert!(matches!(
            call(BuiltinMethod::IndexOf, list.clone(), &[]),
            Err(RenderError::Arity { .. })
        ));
        assert!(matches!(
            call(BuiltinMethod::Get, list, &[Value::from(3)]),
            Err(RenderError::Reference(_))
        ));
    }

    #[test]
    fn test_string_members() {
        let text = Value::from("0ishere");
        assert_eq!(
            call(BuiltinMethod::Get, text.clone(), &[Value::from(2)]),
            Ok(Value::from('s'))
        );
        assert_eq!(call(BuiltinMethod::Size, text.clone(), &[]), Ok(Value::from(7)));
        assert_eq!(
            call(BuiltinMethod::Contains, text, &[Value::from("here")]),
            Ok(Value::from(true))
        );
        assert_eq!(
            call(BuiltinMethod::ToInt, Value::from("42"), &[]),
            Ok(Value::from(42))
        );
    }

    #[test]
    fn test_numeric_conversions() {
        assert_eq!(
            call(BuiltinMethod::ToDouble, Value::from(3), &[]),
            Ok(Value::from(3.0))
        );
        assert_eq!(
            call(BuiltinMethod::ToString, Value::from(2.5), &[]),
            Ok(Value::from("2.5"))
        );
        assert_eq!(
            call(BuiltinMethod::ToChar, Value::from(65), &[]),
            Ok(Value::from('A'))
        );
        assert_eq!(
            call(BuiltinMethod::GetType, Value::from(1i64), &[]),
            Ok(Value::from("long"))
        );
    }
}
