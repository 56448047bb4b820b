//! Parser for ungrammar, a small language describing the shape of syntax trees.
//!
//! ```text
//! // comments run to the end of the line
//! Expr = Literal | BinExpr
//! Literal = 'int'
//! BinExpr = lhs:Expr op:('+' | '-') rhs:Expr
//! ```
//!
//! Text is split into [`Token`]s by [`tokenize`] and turned into a [`Grammar`]
//! by [`parse`]. Names of nodes and tokens are interned into dense [`NodeId`]
//! and [`TokenId`] handles, every referenced node must be defined exactly once.

mod error;
mod grammar;
mod lexer;
mod linemap;
mod parser;
mod span;

pub use error::{Error, LexError, ParseError};
pub use grammar::{Grammar, NodeData, NodeId, Rule, TokenData, TokenId};
pub use lexer::{tokenize, tokenize_strict, Lexer, Token, TokenKind};
pub use linemap::{LineMap, LinePos, Offset};
pub use parser::{parse, MAX_NESTING};
pub use span::Span;
