//! Parser layer tests
//!
//! Tests for the type expression lexer and parser.

mod tests_type_expr;
