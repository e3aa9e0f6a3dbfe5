use std::rc::Rc;

use crate::expr::Expr;
use crate::token::Token;

/// A function or method declaration.  Shared behind an `Rc` so that every
/// closure created from it points at the same body.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `assert condition [, "message"];`
    Assert {
        keyword: Token,
        condition: Expr,
        message: Option<Expr>,
    },

    Block(Vec<Stmt>),

    Break(Token),

    /// `class Name [: Superclass] { methods }`; the superclass is always an
    /// `Expr::Variable`.
    Class {
        name: Token,
        superclass: Option<Expr>,
        methods: Vec<Rc<FunctionDecl>>,
    },

    Continue(Token),

    /// `del a, b;`
    Del(Vec<Token>),

    Expression(Expr),

    Function(Rc<FunctionDecl>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `print a, b;`
    Print { keyword: Token, values: Vec<Expr> },

    Return { keyword: Token, value: Option<Expr> },

    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Also the desugared form of `for`, whose increment runs after every
    /// iteration of the body, including one cut short by `continue`.
    While {
        keyword: Token,
        condition: Expr,
        body: Box<Stmt>,
        increment: Option<Expr>,
    },
}
