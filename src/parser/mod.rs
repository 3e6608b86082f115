//! Type expression parser.
//!
//! Turns the strings found under `type` / `schema` into [`TypeExpr`] trees.
//! Errors are returned as values so the caller can attach them to the
//! declaring node.

mod lexer;
mod type_expr;

pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use type_expr::{TypeExpr, TypeExprError, is_inline_schema, parse_type_expr};
