use indexmap::IndexMap;

use crate::value::Value;

/// A single name→Value context. Keys are stored lowercased; inserting a
/// same-named value overwrites the previous binding.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: IndexMap<String, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: Value) {
        self.bindings.insert(value.name().to_string(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(&name.to_lowercase())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(&name.to_lowercase())
    }
}

/// The stack of scopes, global at the bottom. Lookup walks local-first;
/// absence is failure, never a default. Pushes and pops are strictly
/// paired around procedure invocations.
#[derive(Debug)]
pub struct ScopeChain {
    scopes: Vec<Scope>,
}

impl ScopeChain {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new()],
        }
    }

    pub fn push(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    pub fn pop(&mut self) {
        // The global scope at the bottom is never popped.
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|scope| scope.contains(name))
    }

    /// Resolve a name, most-local scope first.
    pub fn resolve(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Bind into the global scope, the chain's tail. This is what `make`
    /// writes to, even from inside a procedure.
    pub fn define_global(&mut self, value: Value) {
        self.scopes[0].insert(value);
    }
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_resolve() {
        let mut chain = ScopeChain::new();
        chain.define_global(Value::double("x", 42.0));
        assert_eq!(chain.resolve("x"), Some(&Value::double("x", 42.0)));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut chain = ScopeChain::new();
        chain.define_global(Value::double("Side", 10.0));
        assert!(chain.contains("SIDE"));
        assert_eq!(chain.resolve("side").and_then(Value::as_double), Some(10.0));
    }

    #[test]
    fn test_local_shadows_global() {
        let mut chain = ScopeChain::new();
        chain.define_global(Value::double("x", 1.0));

        let mut local = Scope::new();
        local.insert(Value::double("x", 2.0));
        chain.push(local);
        assert_eq!(chain.resolve("x").and_then(Value::as_double), Some(2.0));

        chain.pop();
        assert_eq!(chain.resolve("x").and_then(Value::as_double), Some(1.0));
    }

    #[test]
    fn test_absence_is_failure() {
        let chain = ScopeChain::new();
        assert_eq!(chain.resolve("nothing"), None);
    }

    #[test]
    fn test_global_scope_survives_pop() {
        let mut chain = ScopeChain::new();
        chain.pop();
        assert_eq!(chain.depth(), 1);
    }

    #[test]
    fn test_insert_overwrites_same_name() {
        let mut chain = ScopeChain::new();
        chain.define_global(Value::double("x", 1.0));
        chain.define_global(Value::text("X", "two"));
        assert_eq!(chain.resolve("x").and_then(|v| v.as_text().map(String::from)), Some("two".into()));
    }

    #[test]
    fn test_make_writes_global_through_local() {
        let mut chain = ScopeChain::new();
        chain.push(Scope::new());
        chain.define_global(Value::double("g", 5.0));
        chain.pop();
        assert_eq!(chain.resolve("g").and_then(Value::as_double), Some(5.0));
    }
}
