use crate::error::Result;
use crate::value::{bound_member, NativeFunction, Value};
use indexmap::IndexMap;
use std::cmp::Ordering;

/// Index of a scope in a [`ScopeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

impl ScopeId {
    /// The render-wide Global scope.
    pub const GLOBAL: ScopeId = ScopeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Scope {
    name: String,
    container: IndexMap<String, Value>,
    parent: Option<ScopeId>,
}

/// Arena holding every scope and object of one render session.
///
/// Scopes refer to their parent by index. Nothing is freed before the
/// arena is dropped; loop and placeholder scopes are cleared and reused
/// instead of being recreated.
#[derive(Debug)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    /// Creates an arena holding only the Global scope.
    pub fn new(global_name: impl Into<String>) -> Self {
        Self {
            scopes: vec![Scope {
                name: global_name.into(),
                container: IndexMap::new(),
                parent: None,
            }],
        }
    }

    pub fn global(&self) -> ScopeId {
        ScopeId::GLOBAL
    }

    /// Creates an empty scope delegating lookups to `parent`.
    pub fn create(&mut self, name: impl Into<String>, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            name: name.into(),
            container: IndexMap::new(),
            parent,
        });
        id
    }

    pub fn name(&self, id: ScopeId) -> &str {
        &self.scopes[id.0].name
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.scopes[id.0].parent
    }

    /// Number of own entries.
    pub fn len(&self, id: ScopeId) -> usize {
        self.scopes[id.0].container.len()
    }

    pub fn is_empty(&self, id: ScopeId) -> bool {
        self.scopes[id.0].container.is_empty()
    }

    pub fn keys(&self, id: ScopeId) -> impl Iterator<Item = &str> {
        self.scopes[id.0].container.keys().map(String::as_str)
    }

    /// Own entry only, no delegation.
    pub fn get(&self, id: ScopeId, key: &str) -> Option<&Value> {
        self.scopes[id.0].container.get(key)
    }

    pub fn contains(&self, id: ScopeId, key: &str) -> bool {
        self.scopes[id.0].container.contains_key(key)
    }

    /// Resolves a bare name: own entries, then the built-in object members,
    /// then the parent chain.
    pub fn lookup(&self, id: ScopeId, key: &str) -> Option<Value> {
        let mut current = Some(id);
        while let Some(scope) = current {
            if let Some(value) = self.get(scope, key) {
                return Some(value.clone());
            }
            if let Some(member) = bound_member(&Value::Object(scope), key) {
                return Some(member);
            }
            current = self.parent(scope);
        }
        None
    }

    /// Unconditional upsert.
    pub fn put(&mut self, id: ScopeId, key: impl Into<String>, value: Value) {
        self.scopes[id.0].container.insert(key.into(), value);
    }

    /// Adds a new entry. Returns false and changes nothing if `key` exists.
    pub fn insert(&mut self, id: ScopeId, key: &str, value: Value) -> bool {
        let container = &mut self.scopes[id.0].container;
        if container.contains_key(key) {
            return false;
        }
        container.insert(key.to_string(), value);
        true
    }

    /// Replaces an existing entry. Returns false and changes nothing if `key`
    /// is missing.
    pub fn set(&mut self, id: ScopeId, key: &str, value: Value) -> bool {
        match self.scopes[id.0].container.get_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Sets `key` in the nearest scope of the chain that already binds it.
    pub fn assign(&mut self, id: ScopeId, key: &str, value: Value) -> bool {
        let mut current = Some(id);
        while let Some(scope) = current {
            if self.contains(scope, key) {
                return self.set(scope, key, value);
            }
            current = self.parent(scope);
        }
        false
    }

    pub fn remove_key(&mut self, id: ScopeId, key: &str) -> Option<Value> {
        self.scopes[id.0].container.shift_remove(key)
    }

    /// Clears this scope's own entries. Parents are untouched.
    pub fn remove_all(&mut self, id: ScopeId) {
        self.scopes[id.0].container.clear();
    }

    /// Moves the value bound to `old` under `new`. A named object value
    /// takes the new name too.
    pub fn rename(&mut self, id: ScopeId, old: &str, new: &str) -> bool {
        let container = &mut self.scopes[id.0].container;
        if container.contains_key(new) {
            return false;
        }
        let Some(value) = container.shift_remove(old) else {
            return false;
        };
        if let Value::Object(object) = &value {
            self.scopes[object.0].name = new.to_string();
        }
        self.scopes[id.0].container.insert(new.to_string(), value);
        true
    }

    /// Creates an object named `key` as an entry of `id` and returns it.
    pub fn put_object(&mut self, id: ScopeId, key: &str) -> ScopeId {
        let object = self.create(key, Some(id));
        self.put(id, key, Value::Object(object));
        object
    }

    /// Mutable view of a scope for host-side population.
    pub fn object_mut(&mut self, id: ScopeId) -> ObjectMut<'_> {
        ObjectMut { arena: self, id }
    }

    /// Object comparison.
    ///
    /// Two empty objects never compare equal. Any inequality is reported as
    /// `Less`; objects have no finer ordering.
    pub fn compare_objects(&self, a: ScopeId, b: ScopeId) -> Ordering {
        let left = &self.scopes[a.0].container;
        let right = &self.scopes[b.0].container;
        if left.is_empty() && right.is_empty() {
            return Ordering::Less;
        }
        if left.len() != right.len() || left != right {
            return Ordering::Less;
        }
        Ordering::Equal
    }

    /// Default text of a value.
    pub fn display(&self, value: &Value) -> String {
        match value {
            Value::Primitive(primitive) => primitive.to_string(),
            Value::List(list) => list
                .to_vec()
                .iter()
                .map(|item| self.display(item))
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(id) => self.stringify_object(*id),
            Value::Function(function) => function.signature(),
        }
    }

    /// `{}` for an empty object, otherwise one `\n\tkey : value` line per
    /// entry followed by `\n}`. Nested objects are indented one more tab.
    pub fn stringify_object(&self, id: ScopeId) -> String {
        let container = &self.scopes[id.0].container;
        if container.is_empty() {
            return "{}".to_string();
        }
        let mut out = String::from("{");
        for (key, value) in container {
            if *value == Value::Object(id) {
                continue;
            }
            out.push_str("\n\t");
            out.push_str(key);
            out.push_str(" : ");
            match value {
                Value::Object(inner) => {
                    out.push_str(&self.stringify_object(*inner).replace('\n', "\n\t"))
                }
                other => out.push_str(&self.display(other)),
            }
        }
        out.push_str("\n}");
        out
    }
}

/// Builder-style access to one scope, used by hosts to fill the model.
pub struct ObjectMut<'a> {
    arena: &'a mut ScopeArena,
    id: ScopeId,
}

impl<'a> ObjectMut<'a> {
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Upserts a value.
    pub fn put_value(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.arena.put(self.id, key, value.into());
        self
    }

    /// Adds a value only if `key` is not bound yet.
    pub fn insert_value(&mut self, key: &str, value: impl Into<Value>) -> bool {
        self.arena.insert(self.id, key, value.into())
    }

    pub fn put_list<I>(&mut self, key: &str, items: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let list = Value::list(items.into_iter().map(Into::into));
        self.put_value(key, list)
    }

    pub fn put_mutable_list<I>(&mut self, key: &str, items: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let list = Value::mutable_list(items.into_iter().map(Into::into));
        self.put_value(key, list)
    }

    /// Creates a nested object and lets `fill` populate it.
    pub fn put_object<F>(&mut self, key: &str, fill: F) -> ScopeId
    where
        F: FnOnce(&mut ObjectMut<'_>),
    {
        let object = self.arena.put_object(self.id, key);
        fill(&mut self.arena.object_mut(object));
        object
    }

    /// Registers a host function accepting any number of arguments.
    pub fn put_function<F>(&mut self, name: &str, body: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        self.put_value(name, Value::function(NativeFunction::new(name, body)))
    }

    /// Registers a host function with a fixed argument count.
    pub fn put_function_with_arity<F>(&mut self, name: &str, arity: usize, body: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        self.put_value(
            name,
            Value::function(NativeFunction::with_arity(name, arity, body)),
        )
    }

    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        self.arena.rename(self.id, old, new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_set_asymmetry() {
        let mut arena = ScopeArena::new("Global");
        let global = arena.global();
        assert!(arena.insert(global, "a", Value::from(1)));
        assert!(!arena.insert(global, "a", Value::from(2)));
        assert_eq!(arena.get(global, "a"), Some(&Value::from(1)));

        assert!(!arena.set(global, "b", Value::from(3)));
        assert!(arena.get(global, "b").is_none());
        assert!(arena.set(global, "a", Value::from(4)));
        assert_eq!(arena.get(global, "a"), Some(&Value::from(4)));
    }

    #[test]
    fn test_lookup_delegates_to_parent() {
        let mut arena = ScopeArena::new("Global");
        let global = arena.global();
        arena.put(global, "outer", Value::from("o"));
        let child = arena.create("child", Some(global));
        arena.put(child, "inner", Value::from("i"));

        assert_eq!(arena.lookup(child, "outer"), Some(Value::from("o")));
        assert_eq!(arena.lookup(child, "inner"), Some(Value::from("i")));
        assert_eq!(arena.lookup(global, "inner"), None);
    }

    #[test]
    fn test_assign_through_child_scope() {
        let mut arena = ScopeArena::new("Global");
        let global = arena.global();
        arena.put(global, "count", Value::from(0));
        let child = arena.create("loop", Some(global));

        assert!(arena.assign(child, "count", Value::from(1)));
        assert!(!arena.contains(child, "count"));
        assert_eq!(arena.get(global, "count"), Some(&Value::from(1)));
        assert!(!arena.assign(child, "missing", Value::from(1)));
    }

    #[test]
    fn test_remove_all_keeps_parent() {
        let mut arena = ScopeArena::new("Global");
        let global = arena.global();
        arena.put(global, "kept", Value::from(true));
        let child = arena.create("loop", Some(global));
        arena.put(child, "local", Value::from(1));

        arena.remove_all(child);
        assert!(arena.is_empty(child));
        assert!(arena.contains(global, "kept"));
    }

    #[test]
    fn test_rename_updates_object_name() {
        let mut arena = ScopeArena::new("Global");
        let global = arena.global();
        let object = arena.put_object(global, "before");
        assert!(arena.rename(global, "before", "after"));
        assert_eq!(arena.name(object), "after");
        assert_eq!(arena.get(global, "after"), Some(&Value::Object(object)));
        assert!(!arena.rename(global, "before", "again"));
    }

    #[test]
    fn test_empty_objects_are_not_equal() {
        let mut arena = ScopeArena::new("Global");
        let a = arena.create("a", None);
        let b = arena.create("b", None);
        assert_eq!(arena.compare_objects(a, b), Ordering::Less);
        assert_eq!(arena.compare_objects(a, a), Ordering::Less);

        arena.put(a, "x", Value::from(1));
        arena.put(b, "x", Value::from(1));
        assert_eq!(arena.compare_objects(a, b), Ordering::Equal);

        arena.put(b, "y", Value::from(2));
        assert_eq!(arena.compare_objects(a, b), Ordering::Less);
    }

    #[test]
    fn test_stringify_object() {
        let mut arena = ScopeArena::new("Global");
        let global = arena.global();
        assert_eq!(arena.stringify_object(global), "{}");

        let mut model = arena.object_mut(global);
        model.put_value("name", "quill");
        model.put_list("numbers", [1, 2]);
        model.put_object("inner", |inner| {
            inner.put_value("flag", true);
        });

        assert_eq!(
            arena.stringify_object(global),
            "{\n\tname : quill\n\tnumbers : 1,2\n\tinner : {\n\t\tflag : true\n\t}\n}"
        );
    }
}
