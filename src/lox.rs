//! Driver: wires scanner, parser, resolver and interpreter together and maps
//! diagnostics to process behavior.
//!
//! File mode exits 65 when any compile-time diagnostic fired and 70 after a
//! runtime error.  The REPL clears the compile-error flag after every line
//! and survives runtime errors, so one bad line never ends the session.

use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;
use std::process;

use log::info;

use crate::error::{LoxError, Result};
use crate::expr::ExprId;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::stmt::Stmt;
use crate::token::Token;

pub struct Lox<W: Write> {
    pub had_error: bool,
    pub had_runtime_error: bool,
    interpreter: Interpreter<W>,
    next_expr_id: ExprId,
}

impl<W: Write> Lox<W> {
    pub fn new(output: W) -> Self {
        Lox {
            had_error: false,
            had_runtime_error: false,
            interpreter: Interpreter::new(output),
            next_expr_id: 0,
        }
    }

    pub fn run_file(&mut self, path: &Path) -> Result<()> {
        let bytes: Vec<u8> = fs::read(path)?;
        let source: String = String::from_utf8(bytes)?;

        info!("Running file {} ({} bytes)", path.display(), source.len());

        self.run(source);

        if self.had_error {
            process::exit(65);
        }
        if self.had_runtime_error {
            process::exit(70);
        }

        Ok(())
    }

    pub fn run_prompt(&mut self) -> Result<()> {
        let stdin = io::stdin();

        loop {
            print!("> ");
            io::stdout().flush()?;

            let mut line = String::new();
            let nbytes: usize = stdin.read_line(&mut line)?;
            if nbytes == 0 {
                break;
            }

            self.run(line);

            // A bad line must not poison the session.
            self.had_error = false;
        }

        Ok(())
    }

    /// One full pipeline pass over `source`.  Compile-time diagnostics stop
    /// the run before evaluation; a runtime error aborts evaluation only.
    pub fn run(&mut self, source: String) {
        let scanner: Scanner = Scanner::new(source.into_bytes());

        let mut tokens: Vec<Token> = Vec::new();
        for item in scanner {
            match item {
                Ok(token) => tokens.push(token),

                Err(err) => self.report(&err),
            }
        }

        let mut parser: Parser = Parser::new(tokens, self.next_expr_id);
        let (statements, errors): (Vec<Stmt>, Vec<LoxError>) = parser.parse();
        self.next_expr_id = parser.next_id();

        for err in &errors {
            self.report(err);
        }
        if self.had_error {
            return;
        }

        let resolve_errors: Vec<LoxError> =
            Resolver::new(&mut self.interpreter).resolve(&statements);

        for err in &resolve_errors {
            self.report(err);
        }
        if self.had_error {
            return;
        }

        if let Err(err) = self.interpreter.interpret(&statements) {
            self.runtime_error(&err);
        }
    }

    fn report(&mut self, err: &LoxError) {
        eprintln!("{}", err);
        self.had_error = true;
    }

    fn runtime_error(&mut self, err: &LoxError) {
        println!("{}", err);
        self.had_runtime_error = true;
    }
}
