use std::rc::Rc;
use std::cell::RefCell;
use std::collections::HashMap;

pub use crate::value::Value;

/// The single, flat name-to-value mapping of a session.
///
/// Cloning an `Environment` yields another handle to the same mapping.
/// There are no nested scopes: `set`, `defn` and the parameter bindings
/// of a function call all write into this one table, so parameters stay
/// bound after the call returns.
///
/// Handles are `!Send` and `!Sync`. An interpreter must stay on the
/// thread that created it; use one interpreter per thread.
#[derive(Clone)]
pub struct Environment
{
    inner: Rc<RefCell<HashMap<String, Value>>>
}

impl Environment
{
    pub fn new() -> Self
    {
        Self{ inner: Rc::new(RefCell::new(HashMap::new())) }
    }

    pub fn members(&self) -> Vec<String>
    {
        self.inner.borrow().keys().cloned().collect()
    }

    pub fn find(&self, name: &str) -> Option<Value>
    {
        self.inner.borrow().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool
    {
        self.inner.borrow().contains_key(name)
    }

    /// Bind or rebind `name`.
    pub fn define(&self, name: &str, value: Value)
    {
        self.inner.borrow_mut().insert(name.to_owned(), value);
    }

    /// Copy every binding of `rhs` into this environment.
    pub fn merge(&self, rhs: &Environment)
    {
        if Rc::ptr_eq(&self.inner, &rhs.inner)
        {
            return;
        }
        for (name, value) in rhs.inner.borrow().iter()
        {
            self.define(name, value.clone());
        }
    }
}

impl Default for Environment
{
    fn default() -> Self
    {
        Self::new()
    }
}
