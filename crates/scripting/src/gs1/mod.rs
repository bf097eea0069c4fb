//! GS1 front end: lexer, syntax tree and parser

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryOp, Expr, Script, Stmt, UnaryOp};
pub use lexer::{Lexer, Token};
pub use parser::{parse, parse_expression, Parsed, Parser};
