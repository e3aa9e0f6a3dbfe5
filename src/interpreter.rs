//! Tree‑walking evaluator.
//!
//! Statements report their outcome as a [`Flow`]; `return`, `break` and
//! `continue` travel outwards as ordinary values until a function call or a
//! loop consumes them.  Runtime errors travel as [`RuntimeError`] and are
//! caught at every statement boundary, where they are reported (with
//! collation of identical repeats) and execution moves on to the next
//! statement.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::mem;
use std::rc::Rc;
use std::time::Instant;

use log::{debug, info, warn};
use rand::Rng;
use thiserror::Error;

use crate::ast_printer::AstPrinter;
use crate::class::{LoxClass, LoxInstance};
use crate::config::Config;
use crate::environment::{EnvRef, Environment};
use crate::error::{Diagnostic, Reporter};
use crate::expr::{Expr, ExprId, LiteralValue};
use crate::function::{LoxFunction, NativeFunction};
use crate::stmt::Stmt;
use crate::token::{Token, TokenType};
use crate::value::{format_number, Value};
use crate::Lox;

/// Identical runtime errors beyond this count halt the run.
pub const FATAL_REPEATS: usize = 10_000;

/// Largest string or list, in bytes, that `*` repetition may build.
pub const REPEAT_LIMIT: usize = i32::MAX as usize;

/// Where `print` (and introspection) output goes.
pub type Output = Rc<RefCell<dyn Write>>;

#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A recoverable error located at `token`.
    #[error("{message}")]
    Raised { token: Token, message: String },

    /// The run must stop: runaway error repeats or the loop watchdog.
    #[error("{reason}")]
    Halted { reason: String },
}

impl RuntimeError {
    pub fn raised<S: Into<String>>(token: &Token, message: S) -> Self {
        RuntimeError::Raised {
            token: token.clone(),
            message: message.into(),
        }
    }

    /// A `break`/`continue` that found no loop to stop at.
    pub fn outside_loop(keyword: &Token) -> Self {
        Self::raised(
            keyword,
            format!("'{}' used outside of a loop.", keyword.lexeme),
        )
    }
}

/// Convenient alias for interpreter results.
pub type IResult<T> = Result<T, RuntimeError>;

/// How a statement finished.
#[derive(Debug)]
pub enum Flow {
    Normal,
    Return(Value),
    Break(Token),
    Continue(Token),
}

/// Reporting interval for the `count`‑th identical error.
pub fn collation_modulus(count: usize) -> usize {
    match count {
        0..=4 => 1,
        5..=24 => 5,
        25..=99 => 10,
        100..=499 => 100,
        500..=9_999 => 1_000,
        _ => usize::MAX,
    }
}

pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    locals: HashMap<ExprId, usize>,
    reporter: Reporter,
    output: Output,
    config: Config,
    last_error: Option<String>,
    error_repeats: usize,
}

impl Interpreter {
    /// Creates a new Interpreter and defines the native functions.
    pub fn new(config: Config, reporter: Reporter, output: Output) -> Self {
        info!("Initializing Interpreter");

        let globals: EnvRef = Rc::new(RefCell::new(Environment::new()));
        define_natives(&globals);

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            reporter,
            output,
            config,
            last_error: None,
            error_repeats: 0,
        }
    }

    /// Record that the expression `id` refers to a binding `depth` scopes out.
    pub fn note_local(&mut self, id: ExprId, depth: usize) {
        debug!("Resolved {:?} at depth {}", id, depth);

        self.locals.insert(id, depth);
    }

    /// Empty the global scope (natives are re‑registered).
    pub fn clear(&mut self) {
        info!("Clearing global scope");

        self.globals.borrow_mut().clear();
        define_natives(&self.globals);
        self.environment = Rc::clone(&self.globals);
        self.locals.clear();
        self.last_error = None;
        self.error_repeats = 0;
    }

    /// Interprets a list of statements (a "program") and returns its trace:
    /// one line per expression statement (its value) and per `var`
    /// (`var name: value`).
    pub fn interpret(&mut self, statements: &[Stmt]) -> IResult<String> {
        debug!("Interpreting {} statements", statements.len());

        let mut trace: Vec<String> = Vec::new();

        for stmt in statements {
            if let Some(line) = self.trace_statement(stmt)? {
                trace.push(line);
            }
        }

        info!("Interpretation completed successfully");

        Ok(trace.join("\n"))
    }

    fn trace_statement(&mut self, stmt: &Stmt) -> IResult<Option<String>> {
        let outcome: IResult<(Flow, Option<String>)> = match stmt {
            Stmt::Expression(expr) => self
                .evaluate(expr)
                .map(|value| (Flow::Normal, Some(value.to_string()))),

            Stmt::Var { name, .. } => match self.execute_stmt(stmt) {
                Ok(flow) => {
                    let value = self
                        .environment
                        .borrow()
                        .get(&name.lexeme)
                        .unwrap_or(Value::Nil);

                    Ok((flow, Some(format!("var {}: {}", name.lexeme, value))))
                }
                Err(e) => Err(e),
            },

            _ => self.execute_stmt(stmt).map(|flow| (flow, None)),
        };

        match outcome {
            Ok((Flow::Break(keyword), _)) | Ok((Flow::Continue(keyword), _)) => {
                self.handle(RuntimeError::outside_loop(&keyword))?;
                Ok(None)
            }

            Ok((_, line)) => Ok(line),

            Err(e) => {
                self.handle(e)?;
                Ok(None)
            }
        }
    }

    /// Executes a single statement inside an error boundary.
    pub fn execute(&mut self, stmt: &Stmt) -> IResult<Flow> {
        match self.execute_stmt(stmt) {
            Err(e) => {
                self.handle(e)?;
                Ok(Flow::Normal)
            }
            flow => flow,
        }
    }

    /// Report a raised error with collation; halts pass through.
    fn handle(&mut self, error: RuntimeError) -> IResult<()> {
        let (token, message) = match error {
            RuntimeError::Raised { token, message } => (token, message),
            halted => return Err(halted),
        };

        if self.last_error.as_deref() != Some(message.as_str()) {
            self.reporter
                .report(Diagnostic::at(&token, "Runtime Error", message.as_str()));
            self.last_error = Some(message);
            self.error_repeats = 1;

            return Ok(());
        }

        self.error_repeats += 1;
        let count: usize = self.error_repeats;

        if count > FATAL_REPEATS {
            let reason = format!(
                "[{} similar errors have been collated]\nThis is presumably an infinite or very large loop, so interpreting has halted.",
                count
            );

            self.reporter.report(
                Diagnostic::at(&token, "No-Good-Very-Bad Error", message.as_str())
                    .with_note(reason.as_str()),
            );

            return Err(RuntimeError::Halted { reason });
        }

        if count % collation_modulus(count) == 0 {
            self.reporter.report(
                Diagnostic::at(&token, "Runtime Error", message.as_str())
                    .with_note(format!("[{} similar errors have been collated]", count)),
            );
        } else {
            debug!("Collated repeat #{} of '{}'", count, message);
        }

        Ok(())
    }

    /// Run `statements` in `environment`, restoring the current scope on
    /// every exit path.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> IResult<Flow> {
        debug!("Entering block with {} statements", statements.len());

        let previous: EnvRef = std::mem::replace(&mut self.environment, environment);
        let mut result: IResult<Flow> = Ok(Flow::Normal);

        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => {}
                other => {
                    result = other;
                    break;
                }
            }
        }

        self.environment = previous;

        result
    }

    fn execute_stmt(&mut self, stmt: &Stmt) -> IResult<Flow> {
        match stmt {
            Stmt::Assert {
                keyword,
                condition,
                message,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return Ok(Flow::Normal);
                }

                let text = match message {
                    Some(message) => format!("Assertion failed: {}", self.evaluate(message)?),
                    None => "Assertion failed".to_owned(),
                };

                Err(RuntimeError::raised(keyword, text))
            }

            Stmt::Block(statements) => {
                let environment: EnvRef = Environment::child(&self.environment);

                self.execute_block(statements, environment)
            }

            Stmt::Break(keyword) => Ok(Flow::Break(keyword.clone())),

            Stmt::Continue(keyword) => Ok(Flow::Continue(keyword.clone())),

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                debug!("Declaring class '{}'", name.lexeme);

                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Nil);

                let superclass: Option<Rc<LoxClass>> = match superclass {
                    Some(expr) => match self.evaluate(expr)? {
                        Value::Class(class) => Some(class),
                        _ => {
                            let token = match expr {
                                Expr::Variable { name, .. } => name,
                                _ => name,
                            };

                            return Err(RuntimeError::raised(
                                token,
                                "Inherited classes must also be classes.",
                            ));
                        }
                    },
                    None => None,
                };

                let method_scope: EnvRef = match &superclass {
                    Some(class) => {
                        let scope = Environment::child(&self.environment);
                        scope
                            .borrow_mut()
                            .define("super", Value::Class(Rc::clone(class)));
                        scope
                    }
                    None => Rc::clone(&self.environment),
                };

                let methods: HashMap<String, Rc<LoxFunction>> = methods
                    .iter()
                    .map(|decl| {
                        let function = LoxFunction::new(
                            Rc::clone(decl),
                            Rc::clone(&method_scope),
                            decl.name.lexeme == "init",
                        );

                        (decl.name.lexeme.clone(), Rc::new(function))
                    })
                    .collect();

                let class = LoxClass::new(name.lexeme.clone(), superclass, methods);

                self.environment
                    .borrow_mut()
                    .assign(&name.lexeme, Value::Class(Rc::new(class)));

                info!("Class '{}' defined", name.lexeme);

                Ok(Flow::Normal)
            }

            Stmt::Del(names) => {
                for name in names {
                    if !self.environment.borrow_mut().delete(&name.lexeme) {
                        debug!("'{}' was not bound in the current scope", name.lexeme);
                    }
                }

                Ok(Flow::Normal)
            }

            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(Flow::Normal)
            }

            Stmt::Function(decl) => {
                debug!("Defining function '{}'", decl.name.lexeme);

                let function = LoxFunction::new(Rc::clone(decl), Rc::clone(&self.environment), false);

                self.environment
                    .borrow_mut()
                    .define(&decl.name.lexeme, Value::Function(Rc::new(function)));

                Ok(Flow::Normal)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::Print { keyword, values } => {
                let mut rendered: Vec<String> = Vec::with_capacity(values.len());

                for value in values {
                    rendered.push(self.evaluate(value)?.to_string());
                }

                let line: String = rendered.join(",");

                writeln!(self.output.borrow_mut(), "{}", line).map_err(|e| {
                    RuntimeError::raised(keyword, format!("Failed to write output: {}", e))
                })?;

                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                Ok(Flow::Return(value))
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Variable '{}' defined with value: {}", name.lexeme, value);

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(Flow::Normal)
            }

            Stmt::While {
                keyword,
                condition,
                body,
                increment,
            } => {
                let started = Instant::now();

                while self.evaluate(condition)?.is_truthy() {
                    self.check_watchdog(keyword, started)?;

                    match self.execute(body)? {
                        Flow::Break(_) => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue(_) => {}
                    }

                    // the increment is its own statement: a failure is
                    // reported and the loop goes on
                    if let Some(increment) = increment {
                        if let Err(e) = self.evaluate(increment) {
                            self.handle(e)?;
                        }
                    }
                }

                Ok(Flow::Normal)
            }
        }
    }

    fn check_watchdog(&self, keyword: &Token, started: Instant) -> IResult<()> {
        let budget = match self.config.loop_timeout {
            Some(budget) => budget,
            None => return Ok(()),
        };

        if started.elapsed() <= budget {
            return Ok(());
        }

        let reason = format!(
            "A loop lasted longer than the allotted time ({} ms)",
            budget.as_millis()
        );

        warn!("Loop watchdog tripped on line {}", keyword.line);

        self.reporter
            .report(Diagnostic::at(keyword, "Timeout Error", reason.as_str()));

        Err(RuntimeError::Halted { reason })
    }

    // ───────────────────────── expressions ─────────────────────────

    pub fn evaluate(&mut self, expr: &Expr) -> IResult<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::List { elements, .. } => {
                let mut items: Vec<Value> = Vec::with_capacity(elements.len());

                for element in elements {
                    items.push(self.evaluate(element)?);
                }

                Ok(Value::from(items))
            }

            Expr::Unary { operator, right } => self.unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left)?;
                let right: Value = self.evaluate(right)?;

                binary(operator, left, right)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left)?;

                let short_circuits = match operator.token_type {
                    TokenType::OR => left.is_truthy(),
                    _ => !left.is_truthy(),
                };

                if short_circuits {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }

            Expr::Variable { id, name } => self.look_up(*id, name),

            Expr::This { id, keyword } => self.look_up(*id, keyword),

            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value)?;

                let assigned = match self.locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(&self.environment, distance, &name.lexeme, value.clone())
                    }
                    None => self.globals.borrow_mut().assign(&name.lexeme, value.clone()),
                };

                if !assigned {
                    return Err(RuntimeError::raised(
                        name,
                        format!("Undefined variable '{}'.", name.lexeme),
                    ));
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee: Value = self.evaluate(callee)?;

                let mut args: Vec<Value> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.evaluate(argument)?);
                }

                let callable = callee.as_callable().ok_or_else(|| {
                    RuntimeError::raised(paren, "Can only call functions and classes.")
                })?;

                if args.len() != callable.arity() {
                    return Err(RuntimeError::raised(
                        paren,
                        format!(
                            "Expected {} arguments but got {}.",
                            callable.arity(),
                            args.len()
                        ),
                    ));
                }

                callable.call(self, paren, args)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => LoxInstance::get(&instance, name),
                _ => Err(RuntimeError::raised(
                    name,
                    "Only instances have properties.",
                )),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let instance = match self.evaluate(object)? {
                    Value::Instance(instance) => instance,
                    _ => return Err(RuntimeError::raised(name, "Only instances have fields.")),
                };

                let value: Value = self.evaluate(value)?;
                instance.borrow_mut().set(name, value.clone());

                Ok(value)
            }

            Expr::Super {
                id,
                keyword,
                method,
            } => self.super_method(*id, keyword, method),
        }
    }

    fn look_up(&self, id: ExprId, name: &Token) -> IResult<Value> {
        let found = match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, &name.lexeme),
            None => self.globals.borrow().get(&name.lexeme),
        };

        found.ok_or_else(|| {
            RuntimeError::raised(name, format!("Undefined variable '{}'.", name.lexeme))
        })
    }

    fn super_method(&self, id: ExprId, keyword: &Token, method: &Token) -> IResult<Value> {
        let distance: usize = *self
            .locals
            .get(&id)
            .ok_or_else(|| RuntimeError::raised(keyword, "'super' was not resolved."))?;

        let superclass = match Environment::get_at(&self.environment, distance, "super") {
            Some(Value::Class(class)) => class,
            _ => return Err(RuntimeError::raised(keyword, "'super' is not a class here.")),
        };

        let instance = match distance
            .checked_sub(1)
            .and_then(|d| Environment::get_at(&self.environment, d, "this"))
        {
            Some(Value::Instance(instance)) => instance,
            _ => return Err(RuntimeError::raised(keyword, "'this' is not bound here.")),
        };

        match superclass.find_method(&method.lexeme) {
            Some(found) => Ok(Value::Function(Rc::new(found.bind(instance)))),
            None => Err(RuntimeError::raised(
                method,
                format!("Undefined property '{}'.", method.lexeme),
            )),
        }
    }

    fn unary(&mut self, operator: &Token, right: &Expr) -> IResult<Value> {
        if operator.token_type == TokenType::HASH {
            return self.introspect(operator, right);
        }

        let value: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match value {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::raised(
                    operator,
                    "Only numbers have negative values.",
                )),
            },
            TokenType::BANG => Ok(Value::Bool(!value.is_truthy())),
            _ => Ok(Value::Nil),
        }
    }

    /// `#expr`: print an inspection block when enabled.
    fn introspect(&mut self, operator: &Token, operand: &Expr) -> IResult<Value> {
        let value: Value = self.evaluate(operand)?;

        if !self.config.introspection {
            return Ok(Value::Nil);
        }

        let rule = "|------------------------------------";
        let block = format!(
            "{rule}\n| {}: {}\n| evaluated: {}\n{rule}",
            AstPrinter::print(operand),
            value.type_name(),
            value,
            rule = rule
        );

        writeln!(self.output.borrow_mut(), "{}", block).map_err(|e| {
            RuntimeError::raised(operator, format!("Failed to write output: {}", e))
        })?;

        Ok(Value::Bool(true))
    }
}

// ───────────────────────── binary operators ─────────────────────────

fn binary(operator: &Token, left: Value, right: Value) -> IResult<Value> {
    match operator.token_type {
        TokenType::EQUAL_EQUAL => Ok(Value::Bool(left == right)),
        TokenType::BANG_EQUAL => Ok(Value::Bool(left != right)),

        TokenType::GREATER => numbers(operator, &left, &right).map(|(a, b)| Value::Bool(a > b)),
        TokenType::GREATER_EQUAL => {
            numbers(operator, &left, &right).map(|(a, b)| Value::Bool(a >= b))
        }
        TokenType::LESS => numbers(operator, &left, &right).map(|(a, b)| Value::Bool(a < b)),
        TokenType::LESS_EQUAL => {
            numbers(operator, &left, &right).map(|(a, b)| Value::Bool(a <= b))
        }

        TokenType::MINUS => numbers(operator, &left, &right).map(|(a, b)| Value::Number(a - b)),
        TokenType::CARET => {
            numbers(operator, &left, &right).map(|(a, b)| Value::Number(a.powf(b)))
        }

        TokenType::LEFT_SHIFT => numbers(operator, &left, &right)
            .map(|(a, b)| Value::Number((a as i32).wrapping_shl(b as i32 as u32) as f64)),
        TokenType::RIGHT_SHIFT => numbers(operator, &left, &right)
            .map(|(a, b)| Value::Number((a as i32).wrapping_shr(b as i32 as u32) as f64)),

        TokenType::SLASH => {
            let (a, b) = numbers(operator, &left, &right)?;
            if b == 0.0 {
                return Err(arithmetic(operator, "division", "division by zero"));
            }
            Ok(Value::Number(a / b))
        }

        TokenType::PERCENT => {
            let (a, b) = numbers(operator, &left, &right)?;
            if b == 0.0 {
                return Err(arithmetic(operator, "modulus", "modulus by zero"));
            }
            Ok(Value::Number(a % b))
        }

        TokenType::STAR => multiply(operator, left, right),
        TokenType::PLUS => add(operator, left, right),

        _ => Err(RuntimeError::raised(
            operator,
            format!("Unknown binary operator '{}'.", operator.lexeme),
        )),
    }
}

fn numbers(operator: &Token, left: &Value, right: &Value) -> IResult<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(RuntimeError::raised(
            operator,
            format!(
                "Both operands must be numbers (received {} and {}).",
                left.type_name(),
                right.type_name()
            ),
        )),
    }
}

fn arithmetic(operator: &Token, operation: &str, detail: &str) -> RuntimeError {
    RuntimeError::raised(
        operator,
        format!(
            "An error occurred while trying to perform {}: {}.",
            operation, detail
        ),
    )
}

fn repeat_count(operator: &Token, n: f64) -> IResult<usize> {
    if n < 0.0 || n.is_nan() {
        return Err(arithmetic(operator, "repetition", "count must not be negative"));
    }

    if n >= usize::MAX as f64 {
        return Err(arithmetic(operator, "repetition", "count is too large"));
    }

    Ok(n as usize)
}

/// Element count of `len` items repeated `count` times, refused when the
/// result would exceed [`REPEAT_LIMIT`] bytes.
fn repeated_len(operator: &Token, len: usize, item_size: usize, count: usize) -> IResult<usize> {
    len.checked_mul(count)
        .filter(|total| total.saturating_mul(item_size) <= REPEAT_LIMIT)
        .ok_or_else(|| arithmetic(operator, "repetition", "result is too large"))
}

fn multiply(operator: &Token, left: Value, right: Value) -> IResult<Value> {
    match (&left, &right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),

        (Value::String(s), Value::Number(n)) => {
            let count: usize = repeat_count(operator, *n)?;
            repeated_len(operator, s.len(), 1, count)?;

            Ok(Value::String(s.repeat(count)))
        }

        (Value::List(items), Value::Number(n)) => {
            let count: usize = repeat_count(operator, *n)?;
            let total: usize = repeated_len(operator, items.len(), mem::size_of::<Value>(), count)?;

            let repeated: Vec<Value> = items.iter().cloned().cycle().take(total).collect();

            Ok(Value::from(repeated))
        }

        _ => Err(RuntimeError::raised(
            operator,
            format!(
                "Invalid use of '*' operator (received {} and {}).",
                left.type_name(),
                right.type_name()
            ),
        )),
    }
}

fn add(operator: &Token, left: Value, right: Value) -> IResult<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

        (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),

        (Value::String(a), Value::Number(b)) => Ok(Value::String(a + &format_number(b))),

        (Value::Number(a), Value::String(b)) => Ok(Value::String(format_number(a) + &b)),

        (Value::List(items), other) => {
            let mut joined: Vec<Value> = items.to_vec();
            joined.push(other);

            Ok(Value::from(joined))
        }

        (left, right) => Err(RuntimeError::raised(
            operator,
            format!(
                "Operands must be two numbers, two strings, or a string and a number (received {} and {}).",
                left.type_name(),
                right.type_name()
            ),
        )),
    }
}

// ───────────────────────── natives ─────────────────────────

fn define_natives(globals: &EnvRef) {
    debug!("Defining native functions");

    let natives: [NativeFunction; 5] = [
        NativeFunction::new("clock", 0, native_clock),
        NativeFunction::new("random", 0, native_random),
        NativeFunction::new("str", 1, native_str),
        NativeFunction::new("defined", 1, native_defined),
        NativeFunction::new("exec", 1, native_exec),
    ];

    let mut globals = globals.borrow_mut();

    for native in natives {
        let name: String = native.name.clone();
        globals.define(&name, Value::NativeFunction(Rc::new(native)));
    }
}

fn native_clock(_: &mut Interpreter, _: &Token, _: &[Value]) -> Result<Value, String> {
    let millis: i64 = chrono::Utc::now().timestamp_millis();

    Ok(Value::Number(millis as f64 / 1000.0))
}

fn native_random(_: &mut Interpreter, _: &Token, _: &[Value]) -> Result<Value, String> {
    Ok(Value::Number(rand::thread_rng().gen::<f64>()))
}

fn native_str(_: &mut Interpreter, _: &Token, args: &[Value]) -> Result<Value, String> {
    Ok(Value::String(args[0].to_string()))
}

fn native_defined(
    interpreter: &mut Interpreter,
    _: &Token,
    args: &[Value],
) -> Result<Value, String> {
    let name: String = args[0].to_string();

    Ok(Value::Bool(interpreter.environment.borrow().contains(&name)))
}

/// Run `args[0]` as a separate program sharing this session's output and
/// diagnostics.  Failures are reported, never propagated.
fn native_exec(interpreter: &mut Interpreter, paren: &Token, args: &[Value]) -> Result<Value, String> {
    let source: String = args[0].to_string();

    info!("exec: running {} bytes of nested source", source.len());

    let mut session = Lox::with_parts(
        interpreter.config.clone(),
        interpreter.reporter.clone(),
        Rc::clone(&interpreter.output),
    );

    match session.run(&source) {
        Some(trace) => Ok(Value::String(trace)),
        None => {
            interpreter.reporter.report(Diagnostic::at(
                paren,
                "Runtime Error",
                "Previous error occurred in exec statement",
            ));

            Ok(Value::from("null"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collation_schedule_widens() {
        assert_eq!(collation_modulus(1), 1);
        assert_eq!(collation_modulus(4), 1);
        assert_eq!(collation_modulus(5), 5);
        assert_eq!(collation_modulus(24), 5);
        assert_eq!(collation_modulus(25), 10);
        assert_eq!(collation_modulus(99), 10);
        assert_eq!(collation_modulus(100), 100);
        assert_eq!(collation_modulus(499), 100);
        assert_eq!(collation_modulus(500), 1_000);
        assert_eq!(collation_modulus(9_999), 1_000);
    }

    #[test]
    fn repeats_reported_on_schedule() {
        let reported: Vec<usize> = (1..=30)
            .filter(|&count| count == 1 || count % collation_modulus(count) == 0)
            .collect();

        assert_eq!(reported, vec![1, 2, 3, 4, 5, 10, 15, 20, 30]);
    }

    #[test]
    fn identical_errors_are_collated() {
        let sink: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
        let reporter = Reporter::default();
        let mut interpreter = Interpreter::new(Config::default(), reporter.clone(), sink);
        let token = Token::new(TokenType::MINUS, "-", None, 1, 1);

        for _ in 0..30 {
            interpreter
                .handle(RuntimeError::raised(&token, "boom"))
                .expect("collation below the fatal threshold never halts");
        }

        assert_eq!(reporter.len(), 9);

        interpreter
            .handle(RuntimeError::raised(&token, "different"))
            .expect("a new message resets the count");

        assert_eq!(reporter.len(), 10);
        assert_eq!(interpreter.error_repeats, 1);
    }

    #[test]
    fn runaway_repeats_halt() {
        let sink: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
        let mut interpreter = Interpreter::new(Config::default(), Reporter::default(), sink);
        let token = Token::new(TokenType::SLASH, "/", None, 3, 7);

        let mut outcome: IResult<()> = Ok(());
        for _ in 0..=FATAL_REPEATS {
            outcome = interpreter.handle(RuntimeError::raised(&token, "boom"));
            if outcome.is_err() {
                break;
            }
        }

        assert!(matches!(outcome, Err(RuntimeError::Halted { .. })));
    }
}
