//! GS1 Abstract Syntax Tree
//!
//! AST nodes for GS1 language constructs. The tree is read-only during code
//! generation; per-pass state lives in the generator, never on the nodes.

use crate::gs1::lexer::Token;
use std::fmt;

/// GS1 expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Number literal, as written in the source
    Number(String),

    /// String literal (escape codes still unexpanded)
    String(String),

    /// Bare identifier
    Identifier(String),

    /// List literal `{a, b, c}`
    List(Vec<Expr>),

    /// Range `<lo, hi>`, only meaningful as the right side of `in`
    Range {
        low: Box<Expr>,
        high: Box<Expr>,
    },

    /// Parenthesized expression
    Grouped(Box<Expr>),

    /// Unary operation
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    /// Binary operation
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    /// Conditional `c ? a : b`
    Ternary {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },

    /// Function call by name
    Call {
        name: String,
        args: Vec<Expr>,
    },

    /// Index access `target[i]` or `target[i, j]`
    Index {
        target: Box<Expr>,
        indices: Vec<Expr>,
    },

    /// Dotted chain `a.b[1].c()`
    Dotted(Vec<Expr>),
}

impl Expr {
    /// Identifier name, if this is a bare identifier
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expr::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,

    // Comparison
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    In,

    // Logical
    And,
    Or,

    // Assignment
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

impl BinaryOp {
    /// Operator text in the target language
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::In => "in",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Assign => "=",
            BinaryOp::AddAssign => "+=",
            BinaryOp::SubAssign => "-=",
            BinaryOp::MulAssign => "*=",
            BinaryOp::DivAssign => "/=",
        }
    }

    /// Whether the operator yields a boolean
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::Less
                | BinaryOp::Greater
                | BinaryOp::LessEqual
                | BinaryOp::GreaterEqual
                | BinaryOp::In
                | BinaryOp::And
                | BinaryOp::Or
        )
    }

    /// Map a token to its binary operator
    pub fn from_token(token: &Token) -> Option<Self> {
        let op = match token {
            Token::Plus => BinaryOp::Add,
            Token::Minus => BinaryOp::Sub,
            Token::Star => BinaryOp::Mul,
            Token::Slash => BinaryOp::Div,
            Token::Percent => BinaryOp::Mod,
            Token::Caret => BinaryOp::Pow,

            Token::Equal => BinaryOp::Equal,
            Token::NotEqual => BinaryOp::NotEqual,
            Token::Less => BinaryOp::Less,
            Token::Greater => BinaryOp::Greater,
            Token::LessEqual => BinaryOp::LessEqual,
            Token::GreaterEqual => BinaryOp::GreaterEqual,
            Token::In => BinaryOp::In,

            Token::And => BinaryOp::And,
            Token::Or => BinaryOp::Or,

            Token::Assign => BinaryOp::Assign,
            Token::PlusEqual => BinaryOp::AddAssign,
            Token::MinusEqual => BinaryOp::SubAssign,
            Token::StarEqual => BinaryOp::MulAssign,
            Token::SlashEqual => BinaryOp::DivAssign,

            _ => return None,
        };
        Some(op)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

/// GS1 statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Block statement
    Block(Vec<Stmt>),

    /// If statement
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// For loop
    For {
        init: Option<Expr>,
        condition: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
    },

    /// While loop
    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    /// Break statement
    Break,

    /// Continue statement
    Continue,

    /// Return statement
    Return(Option<Expr>),

    /// Command `name args;` or `name(args);`
    Command {
        name: String,
        args: Vec<Expr>,
    },

    /// Function declaration (GS1 functions take no parameters)
    Function {
        name: String,
        body: Box<Stmt>,
    },

    /// Expression statement
    Expr(Expr),

    /// Empty statement
    Empty,
}

/// Script (top-level)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub statements: Vec<Stmt>,
}

impl Script {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::String(s) => write!(f, "\"{}\"", s),
            Expr::Identifier(name) => write!(f, "{}", name),
            Expr::List(items) => write!(f, "{{{}}}", join(items)),
            Expr::Range { low, high } => write!(f, "<{}, {}>", low, high),
            Expr::Grouped(inner) => write!(f, "({})", inner),
            Expr::Unary { op, operand } => match op {
                UnaryOp::Not => write!(f, "!{}", operand),
                UnaryOp::Negate => write!(f, "-{}", operand),
                UnaryOp::PreIncrement => write!(f, "++{}", operand),
                UnaryOp::PreDecrement => write!(f, "--{}", operand),
                UnaryOp::PostIncrement => write!(f, "{}++", operand),
                UnaryOp::PostDecrement => write!(f, "{}--", operand),
            },
            Expr::Binary { left, op, right } => write!(f, "{} {} {}", left, op.symbol(), right),
            Expr::Ternary { condition, then_expr, else_expr } => {
                write!(f, "{} ? {} : {}", condition, then_expr, else_expr)
            }
            Expr::Call { name, args } => write!(f, "{}({})", name, join(args)),
            Expr::Index { target, indices } => write!(f, "{}[{}]", target, join(indices)),
            Expr::Dotted(segments) => {
                let parts: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
                write!(f, "{}", parts.join("."))
            }
        }
    }
}

fn join(items: &[Expr]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
