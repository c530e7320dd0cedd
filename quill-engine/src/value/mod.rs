//! Runtime values and the scope model they live in.

mod builtins;
mod function;
mod primitive;
mod scope;

pub use builtins::BuiltinMethod;
pub use function::{Invocation, NativeFunction, TemplateFunction};
pub use primitive::Primitive;
pub use scope::{ObjectMut, ScopeArena, ScopeId};

pub(crate) use builtins::bound_member;

use crate::error::{RenderError, Result};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Runtime kind of a value. Its name selects the built-in member table and
/// the placeholder used to write the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Long,
    Double,
    Char,
    Boolean,
    String,
    List,
    MutableList,
    Object,
    Function,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Int => "int",
            ValueKind::Long => "long",
            ValueKind::Double => "double",
            ValueKind::Char => "char",
            ValueKind::Boolean => "boolean",
            ValueKind::String => "string",
            ValueKind::List => "list",
            ValueKind::MutableList => "mutable_list",
            ValueKind::Object => "object",
            ValueKind::Function => "function",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value bound in a scope or produced by an expression.
#[derive(Clone)]
pub enum Value {
    Primitive(Primitive),
    List(ListValue),
    /// An object is a scope in the render's arena.
    Object(ScopeId),
    Function(Rc<dyn TemplateFunction>),
}

impl Value {
    pub fn string(text: impl Into<String>) -> Self {
        Value::Primitive(Primitive::String(text.into()))
    }

    /// An immutable list.
    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::List(ListValue::new(items.into_iter().collect()))
    }

    /// A list that supports `add` and `remove`.
    pub fn mutable_list<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::List(ListValue::new_mutable(items.into_iter().collect()))
    }

    pub fn function(function: impl TemplateFunction + 'static) -> Self {
        Value::Function(Rc::new(function))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Primitive(primitive) => primitive.kind(),
            Value::List(list) if list.is_mutable() => ValueKind::MutableList,
            Value::List(_) => ValueKind::List,
            Value::Object(_) => ValueKind::Object,
            Value::Function(_) => ValueKind::Function,
        }
    }

    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            Value::Primitive(primitive) => Some(primitive),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Primitive(Primitive::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Primitive(Primitive::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Primitive(Primitive::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListValue> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<ScopeId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Requires a primitive operand, as arithmetic does.
    pub(crate) fn into_primitive(self, context: &str) -> Result<Primitive> {
        match self {
            Value::Primitive(primitive) => Ok(primitive),
            other => Err(RenderError::type_error(format!(
                "{context} expects a primitive value, found {}",
                other.kind()
            ))),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Primitive(a), Value::Primitive(b)) => a == b,
            (Value::List(a), Value::List(b)) => a.ptr_eq(b) || a.to_vec() == b.to_vec(),
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => {
                Rc::as_ptr(a).cast::<()>() == Rc::as_ptr(b).cast::<()>()
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Primitive(primitive) => write!(f, "{primitive:?}"),
            Value::List(list) => f.debug_list().entries(list.to_vec()).finish(),
            Value::Object(id) => write!(f, "Object({})", id.index()),
            Value::Function(function) => write!(f, "Function({})", function.signature()),
        }
    }
}

impl From<Primitive> for Value {
    fn from(primitive: Primitive) -> Self {
        Value::Primitive(primitive)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Primitive(Primitive::Int(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Primitive(Primitive::Long(n))
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Primitive(Primitive::Double(d))
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Primitive(Primitive::Char(c))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Primitive(Primitive::Boolean(b))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<ListValue> for Value {
    fn from(list: ListValue) -> Self {
        Value::List(list)
    }
}

/// A shared list. Clones refer to the same storage, so a loop body that
/// appends through one handle is visible through every other.
#[derive(Debug, Clone)]
pub struct ListValue {
    items: Rc<RefCell<Vec<Value>>>,
    mutable: bool,
}

impl ListValue {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items: Rc::new(RefCell::new(items)),
            mutable: false,
        }
    }

    pub fn new_mutable(items: Vec<Value>) -> Self {
        Self {
            items: Rc::new(RefCell::new(items)),
            mutable: true,
        }
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.borrow().get(index).cloned()
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.items.borrow().iter().any(|item| item == value)
    }

    pub fn index_of(&self, value: &Value) -> Option<usize> {
        self.items.borrow().iter().position(|item| item == value)
    }

    pub fn push(&self, value: Value) -> Result<()> {
        self.ensure_mutable("add")?;
        self.items.borrow_mut().push(value);
        Ok(())
    }

    /// Removes the first element equal to `value`.
    pub fn remove(&self, value: &Value) -> Result<bool> {
        self.ensure_mutable("remove")?;
        let mut items = self.items.borrow_mut();
        match items.iter().position(|item| item == value) {
            Some(index) => {
                items.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn ptr_eq(&self, other: &ListValue) -> bool {
        Rc::ptr_eq(&self.items, &other.items)
    }

    fn ensure_mutable(&self, operation: &str) -> Result<()> {
        if self.mutable {
            Ok(())
        } else {
            Err(RenderError::type_error(format!(
                "`{operation}` requires a mutable_list"
            )))
        }
    }
}
