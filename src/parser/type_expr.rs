//! Type expressions: the value language of `type` and `schema` facets.
//!
//! ```text
//! union    := postfix ('|' postfix)*
//! postfix  := primary ('[' ']' | '?')*
//! primary  := NAME | '(' union ')'
//! ```
//!
//! Unions bind looser than the array suffix, so `A | B[]` is `A | (B[])`.
//! `T?` is shorthand for `T | nil`. Strings that start with `{` or `<` are
//! inline JSON / XML schemas and are kept as opaque text.

use std::fmt;
use std::sync::Arc;

use text_size::{TextRange, TextSize};
use thiserror::Error;

use crate::base::Name;

use super::lexer::{Token, TokenKind, tokenize};

/// A parsed type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// Reference to a built-in or declared type, resolved later.
    Name(Name),
    /// `X[]`
    Array(Box<TypeExpr>),
    /// `X | Y | ...`, always at least two members.
    Union(Vec<TypeExpr>),
    /// An anonymous declaration written inline, identified by the index its
    /// owner assigned to it.
    Inline(u32),
    /// Inline JSON or XML schema text.
    Schema(Arc<str>),
}

/// A malformed type expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at {})", display_range(.range))]
pub struct TypeExprError {
    pub message: String,
    pub range: TextRange,
}

fn display_range(range: &TextRange) -> String {
    format!("{}..{}", u32::from(range.start()), u32::from(range.end()))
}

impl TypeExprError {
    fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Check whether a type string is an inline JSON or XML schema.
pub fn is_inline_schema(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('<')
}

/// Parse a type expression string.
pub fn parse_type_expr(input: &str) -> Result<TypeExpr, TypeExprError> {
    if is_inline_schema(input) {
        return Ok(TypeExpr::Schema(Arc::from(input)));
    }
    let tokens = tokenize(input);
    let end = TextSize::from(input.len() as u32);
    let mut parser = Parser {
        tokens,
        pos: 0,
        end,
    };
    if parser.tokens.is_empty() {
        return Err(TypeExprError::new(
            "empty type expression",
            TextRange::empty(TextSize::from(0)),
        ));
    }
    let expr = parser.union()?;
    if let Some(token) = parser.peek() {
        return Err(TypeExprError::new(
            format!("unexpected '{}'", token.text),
            token.range,
        ));
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    end: TextSize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eof_range(&self) -> TextRange {
        TextRange::empty(self.end)
    }

    fn union(&mut self) -> Result<TypeExpr, TypeExprError> {
        let mut members = vec![self.postfix()?];
        while self.at(TokenKind::Pipe) {
            self.bump();
            match self.postfix()? {
                // `A | (B | C)` flattens
                TypeExpr::Union(inner) => members.extend(inner),
                other => members.push(other),
            }
        }
        Ok(if members.len() == 1 {
            members.remove(0)
        } else {
            TypeExpr::Union(members)
        })
    }

    fn postfix(&mut self) -> Result<TypeExpr, TypeExprError> {
        let mut expr = self.primary()?;
        loop {
            if self.at(TokenKind::LBracket) {
                self.bump();
                match self.bump() {
                    Some(t) if t.kind == TokenKind::RBracket => {
                        expr = TypeExpr::Array(Box::new(expr));
                    }
                    Some(t) if t.kind == TokenKind::Name => {
                        return Err(TypeExprError::new(
                            format!("array brackets take no type argument, found '{}'", t.text),
                            t.range,
                        ));
                    }
                    Some(t) => {
                        return Err(TypeExprError::new(
                            format!("expected ']', found '{}'", t.text),
                            t.range,
                        ));
                    }
                    None => return Err(TypeExprError::new("expected ']'", self.eof_range())),
                }
            } else if self.at(TokenKind::Question) {
                self.bump();
                expr = TypeExpr::Union(vec![expr, TypeExpr::Name(Name::new_static("nil"))]);
            } else {
                return Ok(expr);
            }
        }
    }

    fn primary(&mut self) -> Result<TypeExpr, TypeExprError> {
        match self.bump() {
            Some(t) if t.kind == TokenKind::Name => Ok(TypeExpr::Name(Name::new(t.text))),
            Some(t) if t.kind == TokenKind::LParen => {
                let inner = self.union()?;
                match self.bump() {
                    Some(close) if close.kind == TokenKind::RParen => Ok(inner),
                    Some(other) => Err(TypeExprError::new(
                        format!("expected ')', found '{}'", other.text),
                        other.range,
                    )),
                    None => Err(TypeExprError::new("unclosed '('", t.range)),
                }
            }
            Some(t) => Err(TypeExprError::new(
                format!("expected a type name, found '{}'", t.text),
                t.range,
            )),
            None => Err(TypeExprError::new(
                "expected a type name",
                self.eof_range(),
            )),
        }
    }
}

impl TypeExpr {
    /// All name references in the expression, left to right.
    pub fn names(&self) -> Vec<&Name> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'s>(&'s self, out: &mut Vec<&'s Name>) {
        match self {
            TypeExpr::Name(n) => out.push(n),
            TypeExpr::Array(inner) => inner.collect_names(out),
            TypeExpr::Union(members) => members.iter().for_each(|m| m.collect_names(out)),
            TypeExpr::Inline(_) | TypeExpr::Schema(_) => {}
        }
    }

    /// Rewrite every name reference.
    pub fn map_names(&self, f: &mut impl FnMut(&Name) -> Name) -> TypeExpr {
        match self {
            TypeExpr::Name(n) => TypeExpr::Name(f(n)),
            TypeExpr::Array(inner) => TypeExpr::Array(Box::new(inner.map_names(f))),
            TypeExpr::Union(members) => {
                TypeExpr::Union(members.iter().map(|m| m.map_names(f)).collect())
            }
            other => other.clone(),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Name(n) => f.write_str(n),
            TypeExpr::Array(inner) => match inner.as_ref() {
                TypeExpr::Union(_) => write!(f, "({inner})[]"),
                _ => write!(f, "{inner}[]"),
            },
            TypeExpr::Union(members) => {
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{m}")?;
                }
                Ok(())
            }
            TypeExpr::Inline(index) => write!(f, "<inline #{index}>"),
            TypeExpr::Schema(text) => f.write_str(text),
        }
    }
}
