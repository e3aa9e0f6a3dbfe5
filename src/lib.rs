//! Rox: a tree‑walking interpreter for an extended Lox.
//!
//! [`Lox`] is the driver: it runs source text through the scanner, parser,
//! resolver and interpreter, and keeps the global scope between runs so a
//! REPL can feed it one line at a time.

pub mod ast_printer;
pub mod class;
pub mod config;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod parser;
pub mod repl;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;
pub mod value;

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use log::{debug, info};

use crate::config::Config;
use crate::error::Reporter;
use crate::expr::Expr;
use crate::interpreter::{Interpreter, Output, RuntimeError};
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::scan_tokens;
use crate::stmt::Stmt;
use crate::value::Value;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Every statement ran (runtime errors may have been reported); carries
    /// the trace.
    Completed(String),

    /// Scanning, parsing or resolving failed; nothing was executed.
    StaticErrors,

    /// The run was stopped by runaway‑error collation or the loop watchdog.
    Halted,
}

/// One interpreter session.
pub struct Lox {
    interpreter: Interpreter,
    reporter: Reporter,
}

impl Lox {
    /// A session printing to stdout.
    pub fn new(config: Config) -> Self {
        let output: Output = Rc::new(RefCell::new(io::stdout()));
        let reporter = Reporter::new(config.echo_diagnostics);

        Self::with_parts(config, reporter, output)
    }

    /// A session writing program output to `output` and diagnostics to
    /// `reporter`.
    pub fn with_parts(config: Config, reporter: Reporter, output: Output) -> Self {
        Self {
            interpreter: Interpreter::new(config, reporter.clone(), output),
            reporter,
        }
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Empty the global scope.
    pub fn clear(&mut self) {
        self.interpreter.clear();
    }

    /// Run `source` as a program.  `None` when it could not run to the end.
    pub fn run(&mut self, source: &str) -> Option<String> {
        match self.execute(source) {
            Status::Completed(trace) => Some(trace),
            Status::StaticErrors | Status::Halted => None,
        }
    }

    /// Run `source` as a program and say how it ended.
    pub fn execute(&mut self, source: &str) -> Status {
        let statements: Vec<Stmt> = match self.front_end(source) {
            Some(statements) => statements,
            None => return Status::StaticErrors,
        };

        match self.interpreter.interpret(&statements) {
            Ok(trace) => {
                info!("Program executed successfully");

                Status::Completed(trace)
            }

            Err(e) => {
                info!("Program halted: {}", e);

                Status::Halted
            }
        }
    }

    /// Scan, parse and resolve.  Diagnostics go to the reporter.
    fn front_end(&mut self, source: &str) -> Option<Vec<Stmt>> {
        let tokens = match scan_tokens(source) {
            Ok(tokens) => tokens,
            Err(errors) => {
                self.reporter.report_all(errors);
                return None;
            }
        };

        let statements: Vec<Stmt> = match Parser::new(&tokens).parse() {
            Ok(statements) => statements,
            Err(errors) => {
                self.reporter.report_all(errors);
                return None;
            }
        };

        debug!("Parsed {} statements", statements.len());

        if let Err(errors) = Resolver::new(&mut self.interpreter).resolve(&statements) {
            self.reporter.report_all(errors);
            return None;
        }

        Some(statements)
    }

    /// Evaluate `source` as a single expression against the session's
    /// globals.  A runtime error is reported and yields `None`.
    pub fn evaluate_expression(&mut self, source: &str) -> Option<Value> {
        let tokens = match scan_tokens(source) {
            Ok(tokens) => tokens,
            Err(errors) => {
                self.reporter.report_all(errors);
                return None;
            }
        };

        let expr: Expr = match Parser::new(&tokens).parse_expression() {
            Ok(expr) => expr,
            Err(errors) => {
                self.reporter.report_all(errors);
                return None;
            }
        };

        match self.interpreter.evaluate(&expr) {
            Ok(value) => Some(value),
            Err(RuntimeError::Raised { token, message }) => {
                self.reporter.report(error::Diagnostic::at(
                    &token,
                    "Runtime Error",
                    message,
                ));
                None
            }
            Err(e) => {
                info!("Evaluation halted: {}", e);
                None
            }
        }
    }
}
