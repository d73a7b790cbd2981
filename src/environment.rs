use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{LoxError, Result};
use crate::value::Value;

/// One scope frame: a name→value map plus an optional link to the enclosing
/// frame.  Frames are reference-shared; a closure keeps whatever chain was
/// active at its declaration alive.
#[derive(Debug)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Bind a fresh name in this frame.  Binding a name twice in the same
    /// frame is a runtime error; shadowing requires a nested frame.
    pub fn define(&mut self, name: &str, value: Value, line: usize) -> Result<()> {
        if self.values.contains_key(name) {
            return Err(LoxError::Runtime {
                message: format!("Attempted to redeclare variable '{}'.", name),
                line,
            });
        }

        self.values.insert(name.to_string(), value);

        Ok(())
    }

    pub fn get(&self, name: &str, line: usize) -> Result<Value> {
        if let Some(value) = self.values.get(name) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name, line)
        } else {
            Err(undefined(name, line))
        }
    }

    pub fn assign(&mut self, name: &str, value: Value, line: usize) -> Result<()> {
        if self.values.contains_key(name) {
            self.values.insert(name.to_string(), value);
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value, line)
        } else {
            Err(undefined(name, line))
        }
    }

    /// Read from the frame exactly `depth` links up the chain.  No
    /// fallthrough: the resolver has already proven which frame binds the
    /// name, so a miss here means the side table is stale.
    pub fn get_at(
        env: &Rc<RefCell<Environment>>,
        depth: usize,
        name: &str,
        line: usize,
    ) -> Result<Value> {
        let ancestor: Rc<RefCell<Environment>> = Environment::ancestor(env, depth, name, line)?;

        let value: Option<Value> = ancestor.borrow().values.get(name).cloned();

        value.ok_or_else(|| undefined(name, line))
    }

    /// Overwrite in the frame exactly `depth` links up the chain.
    pub fn assign_at(
        env: &Rc<RefCell<Environment>>,
        depth: usize,
        name: &str,
        value: Value,
        line: usize,
    ) -> Result<()> {
        let ancestor: Rc<RefCell<Environment>> = Environment::ancestor(env, depth, name, line)?;

        ancestor.borrow_mut().values.insert(name.to_string(), value);

        Ok(())
    }

    fn ancestor(
        env: &Rc<RefCell<Environment>>,
        depth: usize,
        name: &str,
        line: usize,
    ) -> Result<Rc<RefCell<Environment>>> {
        let mut current: Rc<RefCell<Environment>> = Rc::clone(env);

        for _ in 0..depth {
            let enclosing: Option<Rc<RefCell<Environment>>> =
                current.borrow().enclosing.as_ref().map(Rc::clone);

            match enclosing {
                Some(parent) => current = parent,

                None => return Err(undefined(name, line)),
            }
        }

        Ok(current)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

fn undefined(name: &str, line: usize) -> LoxError {
    LoxError::Runtime {
        message: format!("Undefined variable '{}'.", name),
        line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_then_get() {
        let mut env = Environment::new();
        env.define("a", Value::Number(1.0), 1).unwrap();

        assert_eq!(env.get("a", 1).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn redeclaration_in_same_frame_is_an_error() {
        let mut env = Environment::new();
        env.define("a", Value::Number(1.0), 1).unwrap();

        let err = env.define("a", Value::Number(2.0), 2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Attempted to redeclare variable 'a'.\n[line 2]"
        );
    }

    #[test]
    fn get_delegates_to_enclosing() {
        let globals = Rc::new(RefCell::new(Environment::new()));
        globals
            .borrow_mut()
            .define("a", Value::String(String::from("outer")), 1)
            .unwrap();

        let inner = Environment::with_enclosing(Rc::clone(&globals));
        assert_eq!(
            inner.get("a", 2).unwrap(),
            Value::String(String::from("outer"))
        );
    }

    #[test]
    fn assign_updates_the_defining_frame() {
        let globals = Rc::new(RefCell::new(Environment::new()));
        globals
            .borrow_mut()
            .define("a", Value::Number(1.0), 1)
            .unwrap();

        let mut inner = Environment::with_enclosing(Rc::clone(&globals));
        inner.assign("a", Value::Number(2.0), 2).unwrap();

        assert_eq!(globals.borrow().get("a", 3).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn get_undefined_reports_name() {
        let env = Environment::new();
        let err = env.get("missing", 4).unwrap_err();

        assert_eq!(err.to_string(), "Undefined variable 'missing'.\n[line 4]");
    }

    #[test]
    fn get_at_walks_exactly_depth_links() {
        let globals = Rc::new(RefCell::new(Environment::new()));
        globals
            .borrow_mut()
            .define("a", Value::Number(1.0), 1)
            .unwrap();

        let middle = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
            &globals,
        ))));
        middle
            .borrow_mut()
            .define("a", Value::Number(2.0), 1)
            .unwrap();

        let inner = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
            &middle,
        ))));

        assert_eq!(
            Environment::get_at(&inner, 1, "a", 1).unwrap(),
            Value::Number(2.0)
        );
        assert_eq!(
            Environment::get_at(&inner, 2, "a", 1).unwrap(),
            Value::Number(1.0)
        );
    }

    #[test]
    fn assign_at_overwrites_existing_binding() {
        let globals = Rc::new(RefCell::new(Environment::new()));
        globals
            .borrow_mut()
            .define("a", Value::Number(1.0), 1)
            .unwrap();

        let inner = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
            &globals,
        ))));

        Environment::assign_at(&inner, 1, "a", Value::Number(5.0), 2).unwrap();

        assert_eq!(globals.borrow().get("a", 3).unwrap(), Value::Number(5.0));
    }
}
