use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::expr::{Expr, ExprId};
use crate::function::LoxFunction;
use crate::stmt::Stmt;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Outcome of executing one statement.  `Return` unwinds through blocks and
/// loops until the innermost function call catches it.
pub enum Flow {
    Normal,
    Return(Value),
}

/// Tree-walk evaluator.
///
/// Generic over its output sink so `print` is capturable in tests; the binary
/// wires it to stdout.  Holds the global frame, the current-environment
/// cursor, and the resolver's binding-depth side table.
pub struct Interpreter<W: Write> {
    output: W,
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<ExprId, usize>,
}

impl<W: Write> Interpreter<W> {
    pub fn new(output: W) -> Self {
        let globals: Rc<RefCell<Environment>> = Rc::new(RefCell::new(Environment::new()));

        globals
            .borrow_mut()
            .define(
                "clock",
                Value::NativeFunction {
                    name: String::from("clock"),
                    arity: 0,
                    func: clock_native,
                },
                0,
            )
            .expect("fresh globals hold no bindings");

        Interpreter {
            output,
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
        }
    }

    /// Record a resolved local: `id` binds `depth` frames above the
    /// environment active when the expression is evaluated.  Called by the
    /// resolver; absent ids are globals.
    pub fn note_local(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// The resolver side table, keyed by expression id.
    pub fn locals(&self) -> &HashMap<ExprId, usize> {
        &self.locals
    }

    /// Consume the interpreter and hand back its output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        for statement in statements {
            self.execute(statement)?;
        }

        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;

                writeln!(self.output, "{}", value)?;

                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value: Value = if let Some(expr) = initializer {
                    self.evaluate(expr)?
                } else {
                    Value::Nil
                };

                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, value, name.line)?;

                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let enclosed = Environment::with_enclosing(Rc::clone(&self.environment));

                self.execute_block(statements, Rc::new(RefCell::new(enclosed)))
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }

                Ok(Flow::Normal)
            }

            Stmt::Function { name, params, body } => {
                // The closure is the environment active right here, at the
                // declaration, not at any later call site.
                let function = LoxFunction {
                    name: name.clone(),
                    params: params.clone(),
                    body: Rc::clone(body),
                    closure: Rc::clone(&self.environment),
                };

                self.environment.borrow_mut().define(
                    &name.lexeme,
                    Value::Function(Rc::new(function)),
                    name.line,
                )?;

                Ok(Flow::Normal)
            }

            Stmt::Return { keyword: _, value } => {
                let value: Value = if let Some(expr) = value {
                    self.evaluate(expr)?
                } else {
                    Value::Nil
                };

                Ok(Flow::Return(value))
            }
        }
    }

    /// Run `statements` against `environment`, restoring the previous
    /// environment on every exit path: normal completion, an unwinding
    /// `return`, or a runtime error.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<Flow> {
        let previous: Rc<RefCell<Environment>> = Rc::clone(&self.environment);

        self.environment = environment;

        for statement in statements {
            match self.execute(statement) {
                Ok(Flow::Normal) => {}

                other => {
                    self.environment = previous;
                    return other;
                }
            }
        }

        self.environment = previous;

        Ok(Flow::Normal)
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(token) => evaluate_literal(token),

            Expr::Grouping(expr) => self.evaluate(expr),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => self.evaluate_logical(left, operator, right),

            Expr::Variable { id, name } => match self.locals.get(id) {
                Some(&depth) => Environment::get_at(&self.environment, depth, &name.lexeme, name.line),

                None => self.globals.borrow().get(&name.lexeme, name.line),
            },

            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&depth) => Environment::assign_at(
                        &self.environment,
                        depth,
                        &name.lexeme,
                        value.clone(),
                        name.line,
                    )?,

                    None => self
                        .globals
                        .borrow_mut()
                        .assign(&name.lexeme, value.clone(), name.line)?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => self.evaluate_call(callee, paren, arguments),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        let value: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match value {
                Value::Number(n) => Ok(Value::Number(-n)),

                _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
            },

            TokenType::BANG => Ok(Value::Bool(!is_truthy(&value))),

            _ => Err(LoxError::runtime(operator, "Invalid unary operator.")),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left_val: Value = self.evaluate(left)?;
        let right_val: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::PLUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

                // Any string/string or string/number mix concatenates the
                // stringified operands.
                (left @ Value::String(_), right @ (Value::String(_) | Value::Number(_)))
                | (left @ Value::Number(_), right @ Value::String(_)) => {
                    Ok(Value::String(format!("{}{}", left, right)))
                }

                _ => Err(LoxError::runtime(
                    operator,
                    "Operands must be numbers or strings.",
                )),
            },

            TokenType::MINUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),

                _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::STAR => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),

                _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::SLASH => {
                let dividend: f64 = match left_val {
                    Value::Number(n) => n,

                    _ => return Err(LoxError::runtime(operator, "Operand must be a number.")),
                };

                match right_val {
                    Value::Number(divisor) if divisor != 0.0 => {
                        Ok(Value::Number(dividend / divisor))
                    }

                    _ => Err(LoxError::runtime(
                        operator,
                        "Dominominator must be a non-zero number.",
                    )),
                }
            }

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(is_equal(operator, &left_val, &right_val)?)),

            TokenType::BANG_EQUAL => Ok(Value::Bool(!is_equal(operator, &left_val, &right_val)?)),

            TokenType::LESS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),

                _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::LESS_EQUAL => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),

                _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::GREATER => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a > b)),

                _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::GREATER_EQUAL => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a >= b)),

                _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
            },

            _ => Err(LoxError::runtime(operator, "Invalid binary operator.")),
        }
    }

    fn evaluate_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left_val: Value = self.evaluate(left)?;

        match operator.token_type {
            // Short circuit: the deciding operand is returned unmodified.
            TokenType::OR => {
                if is_truthy(&left_val) {
                    Ok(left_val)
                } else {
                    self.evaluate(right)
                }
            }

            TokenType::AND => {
                if !is_truthy(&left_val) {
                    Ok(left_val)
                } else {
                    self.evaluate(right)
                }
            }

            _ => Err(LoxError::runtime(operator, "Invalid logical operator.")),
        }
    }

    fn evaluate_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr]) -> Result<Value> {
        let callee_val: Value = self.evaluate(callee)?;

        let mut arg_values: Vec<Value> = Vec::with_capacity(arguments.len());

        for argument in arguments {
            arg_values.push(self.evaluate(argument)?);
        }

        match callee_val {
            Value::NativeFunction { arity, func, .. } => {
                if arg_values.len() != arity {
                    return Err(LoxError::runtime(
                        paren,
                        format!(
                            "Expected {} arguments but got {}.",
                            arity,
                            arg_values.len()
                        ),
                    ));
                }

                func(&arg_values)
            }

            Value::Function(function) => {
                if arg_values.len() != function.arity() {
                    return Err(LoxError::runtime(
                        paren,
                        format!(
                            "Expected {} arguments but got {}.",
                            function.arity(),
                            arg_values.len()
                        ),
                    ));
                }

                function.call(self, arg_values)
            }

            _ => Err(LoxError::runtime(
                paren,
                "Can only call functions and classes.",
            )),
        }
    }
}

fn evaluate_literal(token: &Token) -> Result<Value> {
    match &token.token_type {
        TokenType::NUMBER(n) => Ok(Value::Number(*n)),

        TokenType::STRING(s) => Ok(Value::String(s.clone())),

        TokenType::TRUE => Ok(Value::Bool(true)),

        TokenType::FALSE => Ok(Value::Bool(false)),

        TokenType::NIL => Ok(Value::Nil),

        _ => Err(LoxError::runtime(token, "Invalid literal.")),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,

        Value::Bool(b) => *b,

        _ => true,
    }
}

fn is_equal(operator: &Token, left: &Value, right: &Value) -> Result<bool> {
    match (left, right) {
        // Callables have no value equality in the language; everything else
        // defers to `Value`'s `PartialEq` (no coercion, nil equals only nil).
        (Value::Function(_) | Value::NativeFunction { .. }, _)
        | (_, Value::Function(_) | Value::NativeFunction { .. }) => Err(LoxError::runtime(
            operator,
            "Cannot compare function values.",
        )),

        _ => Ok(left == right),
    }
}

fn clock_native(_args: &[Value]) -> Result<Value> {
    let timestamp: f64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| LoxError::Runtime {
            message: format!("Clock error: {}", e),
            line: 0,
        })?
        .as_secs_f64();

    Ok(Value::Number(timestamp))
}
