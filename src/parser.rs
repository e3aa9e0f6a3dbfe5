/*!
Recursive‑descent parser for Rox.

Definitions
-----------
* **n** = number of tokens (including the sole EOF).

Each token is consumed once via `advance()`; error recovery
(`synchronize()`) only ever moves forward, so parsing is **Θ(n)**.
Call‑stack depth grows with syntactic nesting.

### Error policy

| Kind                         | Behaviour                                          |
|------------------------------|----------------------------------------------------|
| hard (`Err` from a rule)     | recorded, tokens skipped to the next statement     |
| soft (`self.error(..)`)      | recorded, parsing continues in place               |

Soft errors are used where the parser can still build a sensible tree:
invalid assignment targets and over‑long argument/parameter lists.

--------------------------------------------------------------------------------
Grammar (EBNF)
--------------

```text
program        → declaration* EOF ;
declaration    → funDecl | varDecl | statement ;
funDecl        → "fun" function ;
function       → IDENT "(" parameters? ")" block ;
varDecl        → "var" IDENT ( "=" expression )? ";" ;
statement      → assertStmt | delStmt | classDecl | ifStmt | block
               | printStmt | returnStmt | whileStmt | forStmt
               | breakStmt | continueStmt | exprStmt ;
classDecl      → "class" IDENT ( ":" IDENT )? "{" function* "}" ;
assertStmt     → "assert" expression ( "," literal )? ";" ;
delStmt        → "del" IDENT ( "," IDENT )* ";" ;
ifStmt         → "if" condition statement ( "else" statement )? ;
whileStmt      → "while" condition statement ;
condition      → "(" expression ")" | expression /* followed by a block */ ;
forStmt        → "for" "(" ( varDecl | exprStmt | ";" )
                 expression? ";" expression? ")" statement ;
printStmt      → "print" expression ( "," expression )* ";" ;
returnStmt     → "return" expression? ";" ;
breakStmt      → "break" ";"? ;
continueStmt   → "continue" ";"? ;
block          → "{" declaration* "}" ;
exprStmt       → expression ";" ;

expression     → assignment ;
assignment     → ( call "." )? IDENT "=" assignment | ternary ;
ternary        → logic_or ( "?" logic_or ":" ternary )? ;
logic_or       → logic_and ( ( "or" | "||" ) logic_and )* ;
logic_and      → equality ( ( "and" | "&&" ) equality )* ;
equality       → comparison ( ( "!=" | "==" ) comparison )* ;
comparison     → bitshift ( ( ">" | ">=" | "<" | "<=" ) bitshift )* ;
bitshift       → term ( ( "<<" | ">>" ) term )* ;
term           → factor ( ( "-" | "+" ) factor )* ;
factor         → unary ( ( "/" | "*" | "^" | "%" ) unary )* ;
unary          → ( "!" | "not" | "-" | "#" ) unary | call ;
call           → primary ( "(" arguments? ")" | "." IDENT )* ;
arguments      → expression ( "," expression )* ;
primary        → NUMBER | STRING | "true" | "false" | "nil" | "null"
               | "this" | IDENT | "(" expression ")"
               | "[" ( expression ( "," expression )* )? "]"
               | "super" "." IDENT ;
```
*/

use std::rc::Rc;

use crate::error::LoxError;
use crate::expr::{Expr, ExprId, LiteralValue};
use crate::stmt::{FunctionDecl, Stmt};
use crate::token::{Literal, Token, TokenType};

use log::{debug, info};

/// Upper bound on arguments at a call site and on parameters in a declaration.
pub const MAX_ARITY: usize = 255;

type PResult<T> = std::result::Result<T, LoxError>;

/// Top‑level parser over an immutable slice of tokens.
pub struct Parser<'a> {
    tokens: &'a [Token],
    current: usize,
    errors: Vec<LoxError>,
}

impl<'a> Parser<'a> {
    /// Construct a new parser.  `tokens` must end with an `EOF` token.
    pub fn new(tokens: &'a [Token]) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse an entire program.  Every broken statement contributes one
    /// diagnostic; any diagnostic at all makes the result an `Err`.
    pub fn parse(&mut self) -> std::result::Result<Vec<Stmt>, Vec<LoxError>> {
        info!("Beginning parse phase");

        let mut statements: Vec<Stmt> = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.finish(statements)
    }

    /// Parse a single expression (optionally followed by `;`) up to EOF.
    pub fn parse_expression(&mut self) -> std::result::Result<Expr, Vec<LoxError>> {
        info!("Parsing a single expression");

        let parsed = self.expression().and_then(|expr| {
            self.matches(TokenType::SEMICOLON);

            if self.is_at_end() {
                Ok(expr)
            } else {
                Err(LoxError::parse(self.peek(), "Expected end of expression."))
            }
        });

        match parsed {
            Ok(expr) => self.finish(expr),
            Err(e) => {
                self.errors.push(e);
                Err(std::mem::take(&mut self.errors))
            }
        }
    }

    fn finish<T>(&mut self, value: T) -> std::result::Result<T, Vec<LoxError>> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            info!("Parse finished with {} error(s)", self.errors.len());

            Err(std::mem::take(&mut self.errors))
        }
    }

    // ──────────────────────── declaration rules ───────────────────

    fn declaration(&mut self) -> Option<Stmt> {
        debug!("Entering declaration");

        let result = if self.matches(TokenType::VAR) {
            self.var_declaration()
        } else if self.matches(TokenType::FUN) {
            self.function("function").map(Stmt::Function)
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(e) => {
                debug!("Parse debug: {}", e);

                self.errors.push(e);
                self.synchronize();

                None
            }
        }
    }

    fn class_declaration(&mut self) -> PResult<Stmt> {
        let name: Token = self.consume(TokenType::IDENTIFIER, "Expected a class name.")?;

        let superclass: Option<Expr> = if self.matches(TokenType::COLON) {
            let super_name = self.consume(
                TokenType::IDENTIFIER,
                "Expected inherited class name after ':'.",
            )?;

            Some(Expr::variable(super_name))
        } else {
            None
        };

        self.consume(TokenType::LEFT_BRACE, "Expected '{' before class body.")?;

        let mut methods: Vec<Rc<FunctionDecl>> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }

        self.consume(TokenType::RIGHT_BRACE, "Expected '}' after class body.")?;

        Ok(Stmt::Class {
            name,
            superclass,
            methods,
        })
    }

    fn function(&mut self, kind: &str) -> PResult<Rc<FunctionDecl>> {
        let name: Token =
            self.consume(TokenType::IDENTIFIER, &format!("Expected {} name.", kind))?;

        self.consume(
            TokenType::LEFT_PAREN,
            &format!("Expected '(' after {} name.", kind),
        )?;

        let mut params: Vec<Token> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                // reported once per list
                if params.len() == MAX_ARITY {
                    let token = self.peek().clone();
                    self.error(
                        &token,
                        format!("Can't have more than {} parameters.", MAX_ARITY),
                    );
                }

                params.push(self.consume(TokenType::IDENTIFIER, "Expected parameter name.")?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(
            TokenType::RIGHT_PAREN,
            &format!("Expected ')' to close {} parameters.", kind),
        )?;
        self.consume(
            TokenType::LEFT_BRACE,
            &format!("Expected '{{' before {} body.", kind),
        )?;

        let body: Vec<Stmt> = self.block()?;

        Ok(Rc::new(FunctionDecl { name, params, body }))
    }

    fn var_declaration(&mut self) -> PResult<Stmt> {
        let name: Token = self.consume(TokenType::IDENTIFIER, "Expected variable name.")?;

        let initializer: Option<Expr> = if self.matches(TokenType::EQUAL) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenType::SEMICOLON,
            "Expected ';' after variable declaration.",
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    // ───────────────────────── statement rules ────────────────────

    fn statement(&mut self) -> PResult<Stmt> {
        let keyword = self.peek().token_type;

        match keyword {
            TokenType::RETURN | TokenType::BREAK | TokenType::CONTINUE => {
                self.advance();
            }

            TokenType::ASSERT
            | TokenType::DEL
            | TokenType::CLASS
            | TokenType::IF
            | TokenType::WHILE
            | TokenType::FOR
            | TokenType::PRINT
            | TokenType::LEFT_BRACE => {
                self.advance();

                if self.check(TokenType::SEMICOLON) {
                    return Err(LoxError::parse(
                        self.previous(),
                        "Expected an expression before end of statement (received ';').",
                    ));
                }
            }

            TokenType::ELSE => {
                return Err(LoxError::parse(
                    self.peek(),
                    "'else' cannot start a statement.",
                ));
            }

            _ => return self.expression_statement(),
        }

        match keyword {
            TokenType::ASSERT => self.assert_statement(),
            TokenType::DEL => self.del_statement(),
            TokenType::CLASS => self.class_declaration(),
            TokenType::IF => self.if_statement(),
            TokenType::WHILE => self.while_statement(),
            TokenType::FOR => self.for_statement(),
            TokenType::PRINT => self.print_statement(),
            TokenType::LEFT_BRACE => Ok(Stmt::Block(self.block()?)),
            TokenType::RETURN => self.return_statement(),
            TokenType::BREAK => {
                let keyword = self.previous().clone();
                self.matches(TokenType::SEMICOLON);
                Ok(Stmt::Break(keyword))
            }
            _ => {
                let keyword = self.previous().clone();
                self.matches(TokenType::SEMICOLON);
                Ok(Stmt::Continue(keyword))
            }
        }
    }

    fn assert_statement(&mut self) -> PResult<Stmt> {
        let keyword: Token = self.previous().clone();
        let condition: Expr = self.expression()?;

        let message: Option<Expr> = if self.matches(TokenType::COMMA) {
            match self.expression()? {
                literal @ Expr::Literal(_) => Some(literal),
                _ => {
                    return Err(LoxError::parse(
                        self.previous(),
                        "Messages must be runtime constants.",
                    ));
                }
            }
        } else {
            None
        };

        self.consume(TokenType::SEMICOLON, "Expected ';' after assertion.")?;

        Ok(Stmt::Assert {
            keyword,
            condition,
            message,
        })
    }

    fn del_statement(&mut self) -> PResult<Stmt> {
        let mut names: Vec<Token> = Vec::new();

        loop {
            names.push(self.consume(
                TokenType::IDENTIFIER,
                "Tried to delete something that wasn't an identifier.",
            )?);

            if !self.matches(TokenType::COMMA) {
                break;
            }
        }

        self.consume(TokenType::SEMICOLON, "Expected ';' after del statement.")?;

        Ok(Stmt::Del(names))
    }

    /// `"(" expression ")"` or a bare expression that must be followed by a block.
    fn condition(&mut self) -> PResult<Expr> {
        if self.matches(TokenType::LEFT_PAREN) {
            let expr: Expr = self.expression()?;
            self.consume(
                TokenType::RIGHT_PAREN,
                "Expected ')' after parenthesized conditional.",
            )?;

            return Ok(expr);
        }

        let expr: Expr = self.expression()?;

        if !self.check(TokenType::LEFT_BRACE) {
            return Err(LoxError::parse(
                self.peek(),
                "Expected '{' after conditional.",
            ));
        }

        Ok(expr)
    }

    fn if_statement(&mut self) -> PResult<Stmt> {
        let condition: Expr = self.condition()?;

        let then_branch: Box<Stmt> = Box::new(self.statement()?);
        let else_branch: Option<Box<Stmt>> = if self.matches(TokenType::ELSE) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> PResult<Stmt> {
        let keyword: Token = self.previous().clone();
        let condition: Expr = self.condition()?;
        let body: Box<Stmt> = Box::new(self.statement()?);

        Ok(Stmt::While {
            keyword,
            condition,
            body,
            increment: None,
        })
    }

    /// `for` has no node of its own: it becomes
    /// `{ initializer; while (condition) body }` with the increment attached
    /// to the loop so that `continue` still runs it.
    fn for_statement(&mut self) -> PResult<Stmt> {
        let keyword: Token = self.previous().clone();

        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'for'.")?;

        let initializer: Option<Stmt> = if self.matches(TokenType::SEMICOLON) {
            None
        } else if self.matches(TokenType::VAR) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition: Expr = if !self.check(TokenType::SEMICOLON) {
            self.expression()?
        } else {
            Expr::Literal(LiteralValue::True)
        };

        self.consume(TokenType::SEMICOLON, "Expected ';' after loop condition.")?;

        let increment: Option<Expr> = if !self.check(TokenType::RIGHT_PAREN) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after for clauses.")?;

        let body: Stmt = self.statement()?;

        let looped = Stmt::While {
            keyword,
            condition,
            body: Box::new(body),
            increment,
        };

        Ok(match initializer {
            Some(init) => Stmt::Block(vec![init, looped]),
            None => looped,
        })
    }

    fn print_statement(&mut self) -> PResult<Stmt> {
        let keyword: Token = self.previous().clone();
        let mut values: Vec<Expr> = vec![self.expression()?];

        while self.matches(TokenType::COMMA) {
            values.push(self.expression()?);
        }

        self.consume(TokenType::SEMICOLON, "Expected ';' after value.")?;

        Ok(Stmt::Print { keyword, values })
    }

    fn return_statement(&mut self) -> PResult<Stmt> {
        let keyword: Token = self.previous().clone();

        let value: Option<Expr> = if !self.check(TokenType::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenType::SEMICOLON, "Expected ';' after return value.")?;

        Ok(Stmt::Return { keyword, value })
    }

    fn expression_statement(&mut self) -> PResult<Stmt> {
        let expr: Expr = self.expression()?;
        self.consume(TokenType::SEMICOLON, "Expected ';' after expression.")?;

        Ok(Stmt::Expression(expr))
    }

    fn block(&mut self) -> PResult<Vec<Stmt>> {
        let mut statements: Vec<Stmt> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(TokenType::RIGHT_BRACE, "Expected '}' after block.")?;

        Ok(statements)
    }

    // ─────────────────────── expression rules ─────────────────────

    fn expression(&mut self) -> PResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> PResult<Expr> {
        let expr: Expr = self.ternary()?;

        if self.matches(TokenType::EQUAL) {
            let equals: Token = self.previous().clone();
            let value: Expr = self.assignment()?;

            match expr {
                Expr::Variable { name, .. } => {
                    return Ok(Expr::Assign {
                        id: ExprId::fresh(),
                        name,
                        value: Box::new(value),
                    });
                }

                Expr::Get { object, name } => {
                    return Ok(Expr::Set {
                        object,
                        name,
                        value: Box::new(value),
                    });
                }

                other => {
                    self.error(&equals, "Invalid assignment target.");
                    return Ok(other);
                }
            }
        }

        Ok(expr)
    }

    fn ternary(&mut self) -> PResult<Expr> {
        let expr: Expr = self.logical_or()?;

        if self.matches(TokenType::QUESTION) {
            let question: Token = self.previous().clone();
            let then_branch: Expr = self.logical_or()?;

            self.consume(
                TokenType::COLON,
                "Expected the ':' part of the ternary conditional expression.",
            )?;

            let else_branch: Expr = self.ternary()?;

            return Ok(Expr::Ternary {
                condition: Box::new(expr),
                question,
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            });
        }

        Ok(expr)
    }

    fn logical_or(&mut self) -> PResult<Expr> {
        let mut expr: Expr = self.logical_and()?;

        while self.matches(TokenType::OR) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.logical_and()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn logical_and(&mut self) -> PResult<Expr> {
        let mut expr: Expr = self.equality()?;

        while self.matches(TokenType::AND) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.equality()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    /// One left‑associative precedence level: `operand ( op operand )*`.
    fn binary_level(
        &mut self,
        operand: fn(&mut Self) -> PResult<Expr>,
        operators: &[TokenType],
    ) -> PResult<Expr> {
        let mut expr: Expr = operand(self)?;

        while self.matches_any(operators) {
            let operator: Token = self.previous().clone();
            let right: Expr = operand(self)?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> PResult<Expr> {
        self.binary_level(
            Self::comparison,
            &[TokenType::BANG_EQUAL, TokenType::EQUAL_EQUAL],
        )
    }

    fn comparison(&mut self) -> PResult<Expr> {
        self.binary_level(
            Self::bitshift,
            &[
                TokenType::GREATER,
                TokenType::GREATER_EQUAL,
                TokenType::LESS,
                TokenType::LESS_EQUAL,
            ],
        )
    }

    fn bitshift(&mut self) -> PResult<Expr> {
        self.binary_level(Self::term, &[TokenType::LEFT_SHIFT, TokenType::RIGHT_SHIFT])
    }

    fn term(&mut self) -> PResult<Expr> {
        self.binary_level(Self::factor, &[TokenType::MINUS, TokenType::PLUS])
    }

    fn factor(&mut self) -> PResult<Expr> {
        self.binary_level(
            Self::unary,
            &[
                TokenType::SLASH,
                TokenType::STAR,
                TokenType::CARET,
                TokenType::PERCENT,
            ],
        )
    }

    fn unary(&mut self) -> PResult<Expr> {
        if self.matches_any(&[TokenType::BANG, TokenType::MINUS, TokenType::HASH]) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.unary()?;

            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }

        self.call()
    }

    fn call(&mut self) -> PResult<Expr> {
        let mut expr: Expr = self.primary()?;

        loop {
            if self.matches(TokenType::LEFT_PAREN) {
                expr = self.finish_call(expr)?;
            } else if self.matches(TokenType::DOT) {
                let name: Token =
                    self.consume(TokenType::IDENTIFIER, "Expected property name after '.'.")?;

                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> PResult<Expr> {
        let mut arguments: Vec<Expr> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if arguments.len() == MAX_ARITY {
                    let token = self.peek().clone();
                    self.error(
                        &token,
                        format!("Can't have more than {} arguments.", MAX_ARITY),
                    );
                }

                arguments.push(self.expression()?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        let paren: Token = self.consume(TokenType::RIGHT_PAREN, "Expected ')' after arguments.")?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn list(&mut self) -> PResult<Expr> {
        let bracket: Token = self.previous().clone();
        let mut elements: Vec<Expr> = Vec::new();

        if !self.check(TokenType::RIGHT_BRACKET) {
            loop {
                elements.push(self.expression()?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(
            TokenType::RIGHT_BRACKET,
            "Expected ']' after list elements.",
        )?;

        Ok(Expr::List { bracket, elements })
    }

    fn primary(&mut self) -> PResult<Expr> {
        let token: Token = self.peek().clone();

        match token.token_type {
            TokenType::RIGHT_PAREN | TokenType::RIGHT_BRACE | TokenType::RIGHT_BRACKET => {
                Err(LoxError::parse(
                    &token,
                    format!("Unmatched '{}'.", token.lexeme),
                ))
            }

            TokenType::FALSE => {
                self.advance();
                Ok(Expr::Literal(LiteralValue::False))
            }

            TokenType::TRUE => {
                self.advance();
                Ok(Expr::Literal(LiteralValue::True))
            }

            TokenType::NIL => {
                self.advance();
                Ok(Expr::Literal(LiteralValue::Nil))
            }

            TokenType::NUMBER | TokenType::STRING => {
                self.advance();

                let literal = match token.literal {
                    Some(Literal::Number(n)) => LiteralValue::Number(n),
                    Some(Literal::Str(s)) => LiteralValue::Str(s),
                    None => LiteralValue::Nil,
                };

                Ok(Expr::Literal(literal))
            }

            TokenType::SUPER => {
                self.advance();
                self.consume(TokenType::DOT, "Expected '.' after 'super'.")?;
                let method: Token = self.consume(
                    TokenType::IDENTIFIER,
                    "Expected superclass method name after 'super.'.",
                )?;

                Ok(Expr::Super {
                    id: ExprId::fresh(),
                    keyword: token,
                    method,
                })
            }

            TokenType::LEFT_BRACKET => {
                self.advance();
                self.list()
            }

            TokenType::LEFT_PAREN => {
                self.advance();
                let expr: Expr = self.expression()?;
                self.consume(TokenType::RIGHT_PAREN, "Expected ')' after expression.")?;

                Ok(Expr::Grouping(Box::new(expr)))
            }

            TokenType::THIS => {
                self.advance();

                Ok(Expr::This {
                    id: ExprId::fresh(),
                    keyword: token,
                })
            }

            TokenType::IDENTIFIER => {
                self.advance();

                Ok(Expr::variable(token))
            }

            _ => Err(LoxError::parse(&token, "Expected expression.")),
        }
    }

    // ────────────────────── utility helpers ───────────────────────

    /// Record a non‑fatal error; parsing carries on in place.
    fn error<S: Into<String>>(&mut self, token: &Token, message: S) {
        self.errors.push(LoxError::parse(token, message));
    }

    #[inline(always)]
    fn matches(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();

            return true;
        }

        false
    }

    #[inline(always)]
    fn matches_any(&mut self, types: &[TokenType]) -> bool {
        types.iter().any(|&ttype| self.matches(ttype))
    }

    #[inline(always)]
    fn consume(&mut self, ttype: TokenType, message: &str) -> PResult<Token> {
        if self.check(ttype) {
            return Ok(self.advance().clone());
        }

        Err(LoxError::parse(self.peek(), message))
    }

    #[inline(always)]
    fn check(&self, ttype: TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().token_type == ttype
    }

    #[inline(always)]
    fn advance(&mut self) -> &'a Token {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        matches!(self.peek().token_type, TokenType::EOF)
    }

    #[inline(always)]
    fn peek(&self) -> &'a Token {
        &self.tokens[self.current]
    }

    #[inline(always)]
    fn previous(&self) -> &'a Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    /// Discards tokens until it thinks it is at a statement boundary.
    fn synchronize(&mut self) {
        self.advance(); // skip the token that caused the error

        while !self.is_at_end() {
            if matches!(self.previous().token_type, TokenType::SEMICOLON) {
                return;
            }

            match self.peek().token_type {
                TokenType::CLASS
                | TokenType::FUN
                | TokenType::VAR
                | TokenType::FOR
                | TokenType::IF
                | TokenType::WHILE
                | TokenType::PRINT
                | TokenType::RETURN
                | TokenType::ASSERT
                | TokenType::DEL
                | TokenType::BREAK
                | TokenType::CONTINUE => return,
                _ => {}
            }

            self.advance();
        }
    }
}
