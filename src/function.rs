use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use log::debug;

use crate::environment::Environment;
use crate::error::Result;
use crate::interpreter::{Flow, Interpreter};
use crate::stmt::Stmt;
use crate::token::Token;
use crate::value::Value;

/// A user-declared function together with the environment that was active at
/// its declaration.  Calls execute the body against a fresh frame enclosed by
/// that captured environment, never the caller's.
pub struct LoxFunction {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Rc<Vec<Stmt>>,
    pub closure: Rc<RefCell<Environment>>,
}

impl LoxFunction {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        debug!(
            "Calling fn {} with {} argument(s)",
            self.name.lexeme,
            arguments.len()
        );

        let mut frame: Environment = Environment::with_enclosing(Rc::clone(&self.closure));

        for (param, argument) in self.params.iter().zip(arguments) {
            frame.define(&param.lexeme, argument, param.line)?;
        }

        match interpreter.execute_block(&self.body, Rc::new(RefCell::new(frame)))? {
            Flow::Return(value) => Ok(value),

            Flow::Normal => Ok(Value::Nil),
        }
    }
}

// Closures can reach back to environments that contain this very function, so
// Debug must not descend into the captured scope.
impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxFunction")
            .field("name", &self.name.lexeme)
            .field("arity", &self.params.len())
            .finish()
    }
}
