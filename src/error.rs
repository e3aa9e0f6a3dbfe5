//! Centralised error hierarchy for the **Rox interpreter**.
//!
//! Every phase (scanner, parser, resolver, runtime) converts its failure modes
//! into a [`Diagnostic`] and hands it back to the caller, either wrapped in a
//! [`LoxError`] or pushed through the shared [`Reporter`] channel.  No phase
//! mutates global state to signal failure; the driver decides what to do with
//! the diagnostics it receives.
//!
//! The module **does not** decide on exit codes; it only prints when the
//! reporter is configured to echo.

use std::cell::RefCell;
use std::fmt;
use std::io;
use std::rc::Rc;

use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::token::Token;

/// A single reported problem, independent of the phase that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 1‑based line where the problem was detected.
    pub line: usize,

    /// 1‑based column of the offending lexeme.
    pub column: usize,

    /// Category label, e.g. `Syntax Error` or `Runtime Error`.
    pub label: String,

    /// Human‑readable description.
    pub message: String,

    /// The offending source text.
    pub lexeme: String,

    /// Optional collation note (`[12 similar errors have been collated]`).
    pub note: Option<String>,
}

impl Diagnostic {
    pub fn new<L, M>(line: usize, column: usize, label: L, message: M, lexeme: &str) -> Self
    where
        L: Into<String>,
        M: Into<String>,
    {
        Self {
            line,
            column,
            label: label.into(),
            message: message.into(),
            lexeme: lexeme.to_owned(),
            note: None,
        }
    }

    /// Build a diagnostic located at `token`.
    pub fn at<L, M>(token: &Token, label: L, message: M) -> Self
    where
        L: Into<String>,
        M: Into<String>,
    {
        Self::new(token.line, token.column, label, message, &token.lexeme)
    }

    pub fn with_note<S: Into<String>>(mut self, note: S) -> Self {
        self.note = Some(note.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[line {}:{}] {}: {} (at '{}')",
            self.line, self.column, self.label, self.message, self.lexeme
        )?;

        if let Some(note) = &self.note {
            write!(f, "\n  {}", note)?;
        }

        Ok(())
    }
}

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error: bad character, unterminated string.
    #[error("{0}")]
    Lex(Diagnostic),

    /// Syntactic (parser) error.
    #[error("{0}")]
    Parse(Diagnostic),

    /// Static‑analysis failure (redeclaration, illegal `this`/`super`/`return`).
    #[error("{0}")]
    Resolve(Diagnostic),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, column: usize, lexeme: &str, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex(Diagnostic::new(line, column, "Syntax Error", message, lexeme))
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        LoxError::Parse(Diagnostic::at(token, "Parsing Error", message))
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<L: Into<String>, S: Into<String>>(token: &Token, label: L, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", token.line, message);

        LoxError::Resolve(Diagnostic::at(token, label, message))
    }

    /// The diagnostic carried by this error, if it is a language error.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            LoxError::Lex(d) | LoxError::Parse(d) | LoxError::Resolve(d) => {
                Some(d)
            }
            LoxError::Io(_) => None,
        }
    }
}

/// The shared diagnostic channel.
///
/// Cloning a `Reporter` yields a handle onto the *same* list, so a nested
/// `exec` session and its caller report into one place.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    reports: Rc<RefCell<Vec<Diagnostic>>>,
    echo: bool,
}

impl Reporter {
    pub fn new(echo: bool) -> Self {
        Self {
            reports: Rc::default(),
            echo,
        }
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);

        if self.echo {
            eprintln!("{}", diagnostic);
        }

        self.reports.borrow_mut().push(diagnostic);
    }

    /// Report every language error in `errors`; I/O errors are logged only.
    pub fn report_all(&self, errors: Vec<LoxError>) {
        for error in errors {
            match error {
                LoxError::Lex(d) | LoxError::Parse(d) | LoxError::Resolve(d) => {
                    self.report(d)
                }
                LoxError::Io(e) => warn!("I/O error while reporting: {}", e),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.reports.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.borrow().is_empty()
    }

    /// Drain everything reported so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.reports.borrow_mut())
    }

    /// Copy of everything reported so far.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.reports.borrow().clone()
    }
}
