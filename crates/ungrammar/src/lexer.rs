use crate::{error::LexError, span::Span};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[rustfmt::skip]
pub enum TokenKind {
    Ident, Literal,
    Eq, Star, Pipe, Question, Colon, LParen, RParen,
    Eof, Invalid,
}

use TokenKind::*;

impl TokenKind {
    /// Eof and Invalid terminate the token stream.
    pub fn is_valid(self) -> bool {
        !matches!(self, Eof | Invalid)
    }

    pub fn describe(self) -> &'static str {
        match self {
            Ident => "identifier",
            Literal => "token literal",
            Eq => "`=`",
            Star => "`*`",
            Pipe => "`|`",
            Question => "`?`",
            Colon => "`:`",
            LParen => "`(`",
            RParen => "`)`",
            Eof => "end of input",
            Invalid => "invalid token",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Identifier text or unescaped literal contents.
    pub value: Option<String>,
}

impl Token {
    fn new(kind: TokenKind, span: Span) -> Token {
        Token {
            kind,
            span,
            value: None,
        }
    }

    fn with_value(kind: TokenKind, span: Span, value: String) -> Token {
        Token {
            kind,
            span,
            value: Some(value),
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

pub struct Lexer<'a> {
    src: &'a str,
    str: &'a [u8],
    pos: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(str: &'a str) -> Self {
        debug_assert!(str.len() <= u32::MAX as usize);
        Self {
            src: str,
            str: str.as_bytes(),
            pos: 0,
        }
    }

    pub fn pos(&self) -> u32 {
        self.pos
    }

    pub fn span_since(&self, start: u32) -> Span {
        Span::new(start, self.pos())
    }

    fn next(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn peek(&self) -> Option<u8> {
        self.str.get(self.pos as usize).copied()
    }

    fn consume_while(&mut self, predicate: impl Fn(u8) -> bool) -> Span {
        let start = self.pos();
        while let Some(c) = self.peek() {
            if predicate(c) {
                self.next();
            } else {
                break;
            }
        }
        self.span_since(start)
    }

    fn sequence(&mut self, sequence: &[u8]) -> bool {
        if self.str[self.pos as usize..].starts_with(sequence) {
            self.pos += sequence.len() as u32;
            true
        } else {
            false
        }
    }

    /// Skips whitespace and `//` comments up to the next token.
    pub fn skip_trivia(&mut self) {
        loop {
            self.skip_whitespace();
            if !self.sequence(b"//") {
                break;
            }
            // the newline itself is eaten as whitespace on the next iteration
            self.consume_while(|c| c != b'\n');
        }
    }

    /// Unicode whitespace, including `\x0B`, `\x0C` and non-breaking spaces.
    fn skip_whitespace(&mut self) {
        // tokens never end inside a multibyte character
        let rest = self.src.get(self.pos as usize..).unwrap_or_default();
        let len = rest.find(|c: char| !c.is_whitespace()).unwrap_or(rest.len());
        self.pos += len as u32;
    }

    /// Lexes one token starting exactly at the current position.
    pub fn next_token(&mut self) -> Token {
        let start = self.pos();
        let Some(byte) = self.next() else {
            return Token::new(Eof, self.span_since(start));
        };

        let kind = match byte {
            b'=' => Eq,
            b'*' => Star,
            b'?' => Question,
            b'(' => LParen,
            b')' => RParen,
            b'|' => Pipe,
            b':' => Colon,
            b'\'' => return self.literal(start),
            b'_' | b'a'..=b'z' | b'A'..=b'Z' => {
                self.consume_while(is_ident);
                let span = self.span_since(start);
                let text = self.text(span);
                return Token::with_value(Ident, span, text);
            }
            _ => {
                // don't split a multibyte character
                self.consume_while(|c| (c & 0b1100_0000) == 0b1000_0000);
                Invalid
            }
        };

        Token::new(kind, self.span_since(start))
    }

    fn literal(&mut self, start: u32) -> Token {
        let mut buf = Vec::new();
        loop {
            match self.next() {
                None => return Token::new(Invalid, self.span_since(start)),
                Some(b'\\') => match self.next() {
                    Some(escaped) => buf.push(escaped),
                    None => return Token::new(Invalid, self.span_since(start)),
                },
                Some(b'\'') => break,
                Some(byte) => buf.push(byte),
            }
        }
        // escapes only ever drop an ascii backslash, the rest stays valid utf8
        let value = String::from_utf8_lossy(&buf).into_owned();
        Token::with_value(Literal, self.span_since(start), value)
    }

    fn text(&self, span: Span) -> String {
        let bytes = &self.str[span.start() as usize..span.end() as usize];
        String::from_utf8_lossy(bytes).into_owned()
    }
}

fn is_ident(c: u8) -> bool {
    matches!(c, b'_' | b'a'..=b'z' | b'A'..=b'Z')
}

/// Lexes `src` until the first token that is not valid, which is dropped
/// together with the rest of the input.
pub fn tokenize(src: &str) -> Vec<Token> {
    let mut l = Lexer::new(src);
    let mut tokens = Vec::new();
    loop {
        l.skip_trivia();
        let token = l.next_token();
        if !token.kind.is_valid() {
            break;
        }
        tokens.push(token);
    }
    log::trace!("lexed {} tokens", tokens.len());
    tokens
}

/// Like [`tokenize`], but an invalid token is reported instead of silently
/// ending the stream.
pub fn tokenize_strict(src: &str) -> Result<Vec<Token>, LexError> {
    let mut l = Lexer::new(src);
    let mut tokens = Vec::new();
    loop {
        l.skip_trivia();
        let token = l.next_token();
        match token.kind {
            Eof => return Ok(tokens),
            Invalid => return Err(LexError::from_invalid(src, token.span)),
            _ => tokens.push(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn kinds_and_values(src: &str) -> Vec<(TokenKind, Option<String>)> {
        tokenize(src)
            .into_iter()
            .map(|t| (t.kind, t.value))
            .collect()
    }

    fn ident(s: &str) -> (TokenKind, Option<String>) {
        (Ident, Some(s.to_owned()))
    }

    fn literal(s: &str) -> (TokenKind, Option<String>) {
        (Literal, Some(s.to_owned()))
    }

    #[test]
    fn test_tokenize_definitions() {
        let tokens = kinds_and_values("Grammar = Node *\n Node = name:'ident' '=' Rule");
        assert_eq!(
            tokens,
            vec![
                ident("Grammar"),
                (Eq, None),
                ident("Node"),
                (Star, None),
                ident("Node"),
                (Eq, None),
                ident("name"),
                (Colon, None),
                literal("ident"),
                literal("="),
                ident("Rule"),
            ]
        );
    }

    #[test]
    fn test_punctuation() {
        let kinds: Vec<_> = tokenize("=*?()|:").into_iter().map(|t| t.kind).collect();
        assert_eq!(kinds, [Eq, Star, Question, LParen, RParen, Pipe, Colon]);
    }

    #[test]
    fn test_literal_escapes() {
        assert_eq!(kinds_and_values(r"'a\'b'"), vec![literal("a'b")]);
        assert_eq!(kinds_and_values(r"'a\\b'"), vec![literal(r"a\b")]);
        assert_eq!(kinds_and_values(r"'\x'"), vec![literal("x")]);
        assert_eq!(kinds_and_values("'ünï'"), vec![literal("ünï")]);
        assert_eq!(kinds_and_values("''"), vec![literal("")]);
    }

    #[test]
    fn test_skips_comments() {
        assert_eq!(kinds_and_values("  // a\n  // b\nX"), vec![ident("X")]);
        assert_eq!(kinds_and_values("X // trailing"), vec![ident("X")]);
        assert_eq!(kinds_and_values("//only"), vec![]);
    }

    #[test]
    fn test_unicode_whitespace() {
        assert_eq!(
            kinds_and_values("A\x0B=\x0C'x'\r\n\u{a0}B\u{3000}"),
            vec![ident("A"), (Eq, None), literal("x"), ident("B")]
        );
        let tokens = tokenize("\u{2003}A");
        assert_eq!(tokens[0].span, Span::new(3, 4));
    }

    #[test]
    fn test_identifiers_exclude_digits() {
        // the digit is invalid and ends the stream
        assert_eq!(kinds_and_values("A_b1 C"), vec![ident("A_b")]);
    }

    #[test]
    fn test_truncates_at_invalid() {
        assert_eq!(kinds_and_values("A = 'open"), vec![ident("A"), (Eq, None)]);
        assert_eq!(kinds_and_values(r"A 'x\"), vec![ident("A")]);
        assert_eq!(kinds_and_values("A # B"), vec![ident("A")]);
        assert_eq!(kinds_and_values(""), vec![]);
        assert_eq!(kinds_and_values(" \t\n"), vec![]);
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("Node = 'a\\'b'");
        let spans: Vec<_> = tokens.iter().map(|t| t.span).collect();
        assert_eq!(spans, [Span::new(0, 4), Span::new(5, 6), Span::new(7, 13)]);
    }

    #[test]
    fn test_next_token_eof() {
        let mut l = Lexer::new("  ");
        l.skip_trivia();
        assert_eq!(l.pos(), 2);
        let token = l.next_token();
        assert_eq!(token.kind, Eof);
        assert_eq!(token.span, Span::at(2));
    }

    #[test]
    fn test_tokenize_strict() {
        let tokens = tokenize_strict("A = 'x' B").unwrap();
        assert_eq!(tokens.len(), 4);

        let err = tokenize_strict("A = 'x").unwrap_err();
        assert_eq!(err, LexError::UnterminatedLiteral { span: Span::new(4, 6) });

        let err = tokenize_strict("A = é").unwrap_err();
        assert_eq!(
            err,
            LexError::UnexpectedCharacter {
                ch: 'é',
                span: Span::new(4, 6)
            }
        );
    }

    /// Drives the lexer by hand, counting valid tokens before the stream ends.
    fn count_valid(src: &str) -> usize {
        let mut l = Lexer::new(src);
        let mut count = 0;
        loop {
            l.skip_trivia();
            if !l.next_token().kind.is_valid() {
                return count;
            }
            count += 1;
        }
    }

    proptest! {
        #[test]
        fn tokenize_never_yields_terminators(src in "\\PC*") {
            let tokens = tokenize(&src);
            prop_assert!(tokens.iter().all(|t| t.kind.is_valid()));
            prop_assert_eq!(tokens.len(), count_valid(&src));
        }

        #[test]
        fn tokenize_grammar_alphabet(src in "[A-Za-z_ =*?()|:'\\\\/\n]{0,64}") {
            let tokens = tokenize(&src);
            prop_assert!(tokens.iter().all(|t| t.kind.is_valid()));
            prop_assert_eq!(tokens.len(), count_valid(&src));
            if let Ok(strict) = tokenize_strict(&src) {
                prop_assert_eq!(strict, tokens);
            }
        }
    }
}
