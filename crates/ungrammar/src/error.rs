use crate::{lexer::TokenKind, span::Span};

#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum LexError {
    #[error("unterminated token literal")]
    UnterminatedLiteral { span: Span },
    #[error("unexpected character {ch:?}")]
    UnexpectedCharacter { ch: char, span: Span },
}

impl LexError {
    /// Classifies the lexeme of an invalid token.
    pub(crate) fn from_invalid(src: &str, span: Span) -> LexError {
        let ch = src
            .get(span.start() as usize..)
            .and_then(|rest| rest.chars().next());
        match ch {
            Some('\'') => LexError::UnterminatedLiteral { span },
            Some(ch) => LexError::UnexpectedCharacter { ch, span },
            None => LexError::UnexpectedCharacter {
                ch: char::REPLACEMENT_CHARACTER,
                span,
            },
        }
    }

    pub fn span(&self) -> Span {
        match *self {
            LexError::UnterminatedLiteral { span } => span,
            LexError::UnexpectedCharacter { span, .. } => span,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },
    #[error("unexpected {found}, expected {expected}")]
    UnexpectedToken {
        expected: &'static str,
        found: TokenKind,
        span: Span,
    },
    #[error("empty rule for node `{node}`")]
    EmptyRule { node: String, span: Span },
    #[error("duplicate rule: `{name}`")]
    DuplicateNode { name: String, span: Span },
    #[error("undefined node: `{name}`")]
    UndefinedNode { name: String, span: Span },
    #[error("rule nested too deeply")]
    NestingTooDeep { span: Span },
}

impl ParseError {
    /// `None` when the input ended early, there is no token to point at.
    pub fn span(&self) -> Option<Span> {
        match *self {
            ParseError::UnexpectedEof { .. } => None,
            ParseError::UnexpectedToken { span, .. }
            | ParseError::EmptyRule { span, .. }
            | ParseError::DuplicateNode { span, .. }
            | ParseError::UndefinedNode { span, .. }
            | ParseError::NestingTooDeep { span } => Some(span),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl Error {
    pub fn span(&self) -> Option<Span> {
        match self {
            Error::Lex(e) => Some(e.span()),
            Error::Parse(e) => e.span(),
        }
    }
}
