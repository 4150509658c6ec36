use crate::object::Object;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a scope. Closures, `let` blocks and call frames all
/// alias scopes through this handle; a scope lives as long as its
/// longest-lived holder.
pub type ScopeRef = Rc<RefCell<Scope>>;

/// One lexical binding table plus an optional link to the enclosing scope.
/// Lookup walks outward through the chain; insertion only ever touches the
/// receiving table.
#[derive(Debug)]
pub struct Scope {
    store: HashMap<String, Object>,
    outer: Option<ScopeRef>,
}

impl Scope {
    pub fn new(outer: Option<ScopeRef>) -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            store: HashMap::new(),
            outer,
        }))
    }

    /// Resolves a name against this scope chain, innermost first. The
    /// returned object is a copy of the binding, not a live cell.
    pub fn get(&self, name: &str) -> Option<Object> {
        match self.store.get(name) {
            Some(obj) => Some(obj.clone()),
            None => match &self.outer {
                Some(outer) => outer.borrow().get(name),
                None => None,
            },
        }
    }

    /// Binds a name in this table. A later insert for the same name wins.
    pub fn insert(&mut self, name: String, obj: Object) {
        self.store.insert(name, obj);
    }
}

#[cfg(test)]
mod tests {
    use super::Scope;
    use crate::object::Object;

    #[test]
    fn test_lookup_walks_outward() {
        let outer = Scope::new(None);
        outer
            .borrow_mut()
            .insert("foo".to_string(), Object::Boolean(true));

        let inner = Scope::new(Some(outer.clone()));
        assert_eq!(inner.borrow().get("foo"), Some(Object::Boolean(true)));
        assert_eq!(inner.borrow().get("bar"), None);
    }

    #[test]
    fn test_shadowing_does_not_touch_outer() {
        let outer = Scope::new(None);
        outer
            .borrow_mut()
            .insert("foo".to_string(), Object::Boolean(true));

        let inner = Scope::new(Some(outer.clone()));
        inner.borrow_mut().insert("foo".to_string(), Object::Nil);

        assert_eq!(inner.borrow().get("foo"), Some(Object::Nil));
        assert_eq!(outer.borrow().get("foo"), Some(Object::Boolean(true)));
    }

    #[test]
    fn test_last_insert_wins() {
        let sc = Scope::new(None);
        sc.borrow_mut()
            .insert("x".to_string(), Object::Double(1.0));
        sc.borrow_mut()
            .insert("x".to_string(), Object::Double(2.0));
        assert_eq!(sc.borrow().get("x"), Some(Object::Double(2.0)));
    }

    #[test]
    fn test_shared_handle_sees_later_inserts() {
        let sc = Scope::new(None);
        let alias = sc.clone();
        sc.borrow_mut()
            .insert("x".to_string(), Object::Double(1.0));
        assert_eq!(alias.borrow().get("x"), Some(Object::Double(1.0)));
    }
}
