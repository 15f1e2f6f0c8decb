//! Symbol tables and scope environment for the Quill type checker.
//!
//! Symbol tables are persistent (structural-sharing) maps: extending a
//! child scope never mutates the parent, so sibling scopes cannot see
//! each other's bindings. An [`Environment`] bundles the three tables —
//! variables, functions, types — with the current lookup [`Context`].
//!
//! [`prelude`] builds the seed environment with the built-in type and
//! function bindings.

#![deny(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::must_use_candidate)]

use std::fmt;

use quill_types::{Param, Type};
use rpds::HashTrieMap;

/// A persistent mapping from identifier to `T`.
///
/// `insert` replaces the map behind the table with an extended version
/// sharing most of its structure with the old one; clones of the table
/// taken before the insert are unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable<T> {
    scope: HashTrieMap<String, T>,
}

impl<T> Default for SymbolTable<T> {
    fn default() -> Self {
        SymbolTable { scope: HashTrieMap::new() }
    }
}

impl<T> SymbolTable<T> {
    /// An empty table.
    pub fn new() -> Self {
        SymbolTable { scope: HashTrieMap::new() }
    }

    /// Look up a name.
    pub fn lookup(&self, name: &str) -> Option<&T> {
        self.scope.get(name)
    }

    /// Bind a name, shadowing any previous binding.
    pub fn insert(&mut self, name: impl Into<String>, value: T) {
        self.scope = self.scope.insert(name.into(), value);
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.scope.size()
    }

    /// True when no names are bound.
    pub fn is_empty(&self) -> bool {
        self.scope.size() == 0
    }

    /// Iterate over the bindings in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &T)> {
        self.scope.iter()
    }
}

impl<T: fmt::Display> fmt::Display for SymbolTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "symtab[")?;
        for (i, (name, value)) in self.scope.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name} -> {value}")?;
        }
        write!(f, "]")
    }
}

/// Which symbol table an identifier resolves in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Context {
    /// Variable references
    Var,
    /// Function references (the default at top level)
    #[default]
    Fn,
    /// Type references
    Type,
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Var => write!(f, "<VAR>"),
            Context::Fn => write!(f, "<FN>"),
            Context::Type => write!(f, "<TYPE>"),
        }
    }
}

/// A lexical scope: the context tag plus the three symbol tables.
///
/// Environments are passed by value down the checker; a child extends
/// its own copy and the parent stays untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Environment {
    /// Current lookup context
    pub context: Context,
    /// Variable bindings
    pub vars: SymbolTable<Type>,
    /// Function bindings
    pub fns: SymbolTable<Type>,
    /// Type bindings
    pub types: SymbolTable<Type>,
}

impl Environment {
    /// An empty environment in `fn` context.
    pub fn new() -> Self {
        Environment::default()
    }

    /// A copy of this environment with a different context tag.
    pub fn with_context(&self, context: Context) -> Self {
        let mut env = self.clone();
        env.context = context;
        env
    }

    /// Look up a name in the table selected by the current context.
    pub fn lookup(&self, name: &str) -> Option<&Type> {
        match self.context {
            Context::Var => self.vars.lookup(name),
            Context::Fn => self.fns.lookup(name),
            Context::Type => self.types.lookup(name),
        }
    }
}

/// The seed environment: built-in types and functions.
pub fn prelude() -> Environment {
    let mut env = Environment::new();
    env.context = Context::Fn;

    env.types.insert("i8", Type::int(true, 8));
    env.types.insert("i16", Type::int(true, 16));
    env.types.insert("i32", Type::int(true, 32));
    env.types.insert("i64", Type::int(true, 64));
    env.types.insert("u8", Type::int(false, 8));
    env.types.insert("u16", Type::int(false, 16));
    env.types.insert("u32", Type::int(false, 32));
    env.types.insert("u64", Type::int(false, 64));
    env.types.insert("f32", Type::float(32));
    env.types.insert("f64", Type::float(64));

    env.types.insert("byte", Type::int(true, 8));
    env.types.insert("short", Type::int(true, 16));
    env.types.insert("int", Type::int(true, 32));
    env.types.insert("long", Type::int(true, 64));

    env.types.insert("ubyte", Type::int(false, 8));
    env.types.insert("ushort", Type::int(false, 16));
    env.types.insert("uint", Type::int(false, 32));
    env.types.insert("ulong", Type::int(false, 64));

    env.types.insert("ptr", Type::ptr(Type::void()));
    env.types.insert("array", Type::array(Type::void(), vec![]));
    env.types.insert("dynarr", Type::dynarr(Type::void()));
    env.types.insert("bool", Type::boolean());
    env.types.insert("char", Type::character());
    env.types.insert(
        "slice",
        Type::new(quill_types::TypeValue::Slice {
            value: Type::void(),
            begin: 0,
            end: 0,
            stride: 0,
        }),
    );
    env.types.insert("variant", Type::new(quill_types::TypeValue::Variant(vec![])));
    env.types.insert("fn", Type::function(Type::void(), vec![]));
    env.types.insert("tuple", Type::new(quill_types::TypeValue::Tuple(vec![])));
    env.types.insert("strlit", Type::strlit(0));
    env.types.insert("UNKNOWN", Type::unknown());
    env.types.insert("void", Type::void());
    env.types.insert("string", Type::string());

    env.fns.insert(
        "print",
        Type::function(
            Type::void(),
            vec![Param { name: "value".to_string(), ty: Type::unknown() }],
        ),
    );

    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_and_lookup() {
        let mut table = SymbolTable::new();
        assert!(table.is_empty());
        table.insert("x", Type::int(true, 32));
        assert_eq!(table.lookup("x"), Some(&Type::int(true, 32)));
        assert_eq!(table.lookup("y"), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_child_scope_does_not_mutate_parent() {
        let mut parent = SymbolTable::new();
        parent.insert("x", Type::int(true, 32));

        let mut child = parent.clone();
        child.insert("x", Type::boolean());
        child.insert("y", Type::void());

        assert_eq!(parent.lookup("x"), Some(&Type::int(true, 32)));
        assert_eq!(parent.lookup("y"), None);
        assert_eq!(child.lookup("x"), Some(&Type::boolean()));
    }

    #[test]
    fn test_context_selects_table() {
        let mut env = Environment::new();
        env.vars.insert("n", Type::int(true, 64));
        env.fns.insert("n", Type::function(Type::void(), vec![]));
        env.types.insert("n", Type::boolean());

        assert_eq!(env.with_context(Context::Var).lookup("n"), Some(&Type::int(true, 64)));
        assert_eq!(env.with_context(Context::Type).lookup("n"), Some(&Type::boolean()));
        assert!(matches!(
            env.with_context(Context::Fn).lookup("n").map(Type::value),
            Some(quill_types::TypeValue::Function(_))
        ));
    }

    #[test]
    fn test_prelude_bindings() {
        let env = prelude();
        assert_eq!(env.context, Context::Fn);
        assert_eq!(env.types.lookup("int"), Some(&Type::int(true, 32)));
        assert_eq!(env.types.lookup("ulong"), Some(&Type::int(false, 64)));
        assert_eq!(env.types.lookup("f32"), Some(&Type::float(32)));
        assert!(env.types.lookup("ptr").is_some());
        assert!(env.types.lookup("strlit").is_some());
        assert!(env.fns.lookup("print").is_some());
        assert!(env.vars.lookup("print").is_none());
    }
}
