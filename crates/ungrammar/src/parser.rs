use std::collections::HashMap;

use cranelift_entity::PrimaryMap;

use crate::{
    error::ParseError,
    grammar::{Grammar, NodeData, NodeId, Rule, TokenData, TokenId},
    lexer::{Token, TokenKind, TokenKind::*},
    span::Span,
};

/// A node whose definition may not have been seen yet.
struct PendingNode {
    name: String,
    /// `None` until the `name = rule` statement is parsed.
    rule: Option<Rule>,
    /// First occurrence of the name, reported if it never gets defined.
    span: Span,
}

/// Deepest nesting of parentheses and labels accepted, each level recurses
/// through every rule function once.
pub const MAX_NESTING: u32 = 128;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Open parentheses and labels around the cursor.
    depth: u32,
    nodes: PrimaryMap<NodeId, PendingNode>,
    definitions: Vec<NodeId>,
    tokens_table: PrimaryMap<TokenId, TokenData>,
    node_names: HashMap<String, NodeId>,
    token_names: HashMap<String, TokenId>,
}

/// Parses a token stream into a validated grammar, stopping at the first error.
pub fn parse(tokens: Vec<Token>) -> Result<Grammar, ParseError> {
    let mut p = Parser::new(tokens);
    while !p.eof() {
        p.node()?;
    }
    p.finish()
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Parser {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
            nodes: PrimaryMap::new(),
            definitions: Vec::new(),
            tokens_table: PrimaryMap::new(),
            node_names: HashMap::new(),
            token_names: HashMap::new(),
        }
    }

    #[inline]
    fn eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn nth(&self, lookahead: usize) -> Option<&Token> {
        self.tokens.get(self.pos + lookahead)
    }

    fn peek(&self) -> Option<TokenKind> {
        self.nth(0).map(|t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    /// Whether the cursor sits on `Ident '='`, the start of the next definition.
    fn at_definition(&self) -> bool {
        self.at(Ident) && self.nth(1).map(|t| t.kind) == Some(Eq)
    }

    fn bump(&mut self, expected: &'static str) -> Result<Token, ParseError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(ParseError::UnexpectedEof { expected })?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.bump(kind.describe())?;
        if token.kind != kind {
            return Err(ParseError::UnexpectedToken {
                expected: kind.describe(),
                found: token.kind,
                span: token.span,
            });
        }
        Ok(token)
    }

    fn intern_node(&mut self, name: &str, span: Span) -> NodeId {
        if let Some(&node) = self.node_names.get(name) {
            return node;
        }
        let node = self.nodes.push(PendingNode {
            name: name.to_owned(),
            rule: None,
            span,
        });
        log::trace!("interned node {name} as {}", node.as_u32());
        self.node_names.insert(name.to_owned(), node);
        node
    }

    fn intern_token(&mut self, name: &str) -> TokenId {
        if let Some(&token) = self.token_names.get(name) {
            return token;
        }
        let token = self.tokens_table.push(TokenData {
            name: name.to_owned(),
        });
        log::trace!("interned token {name:?} as {}", token.as_u32());
        self.token_names.insert(name.to_owned(), token);
        token
    }

    /// `Ident '=' rule`
    fn node(&mut self) -> Result<(), ParseError> {
        let name = self.expect(Ident)?;
        let text = name.value().unwrap_or_default();
        let node = self.intern_node(text, name.span);
        self.expect(Eq)?;

        let pending = &self.nodes[node];
        if pending.rule.is_some() {
            return Err(ParseError::DuplicateNode {
                name: pending.name.clone(),
                span: name.span,
            });
        }

        let rule = self.rule(node)?;
        log::trace!("defined node {text}");
        self.nodes[node].rule = Some(rule);
        self.definitions.push(node);
        Ok(())
    }

    /// Alternatives separated by `|`, each a sequence.
    fn rule(&mut self, node: NodeId) -> Result<Rule, ParseError> {
        let mut alt = vec![self.seq_rule(node)?];
        while self.at(Pipe) {
            self.pos += 1;
            alt.push(self.seq_rule(node)?);
        }
        Ok(collapse(alt, Rule::Alt))
    }

    fn seq_rule(&mut self, node: NodeId) -> Result<Rule, ParseError> {
        let mut seq = vec![self.atom_rule(node)?];
        while let Some(rule) = self.opt_atom_rule(node)? {
            seq.push(rule);
        }
        Ok(collapse(seq, Rule::Seq))
    }

    fn atom_rule(&mut self, node: NodeId) -> Result<Rule, ParseError> {
        if let Some(rule) = self.opt_atom_rule(node)? {
            return Ok(rule);
        }
        let Some(token) = self.nth(0) else {
            let end = self.tokens.last().map_or(0, |t| t.span.end());
            return Err(self.empty_rule(node, Span::at(end)));
        };
        if !self.at_definition() {
            return Err(ParseError::UnexpectedToken {
                expected: "rule",
                found: token.kind,
                span: token.span,
            });
        }

        // the required atom is the start of another definition
        let name = token.value().unwrap_or_default();
        if let Some(&next) = self.node_names.get(name) {
            if next == node || self.nodes[next].rule.is_some() {
                return Err(ParseError::DuplicateNode {
                    name: name.to_owned(),
                    span: token.span,
                });
            }
        }
        Err(self.empty_rule(node, Span::at(token.span.start())))
    }

    fn enter(&mut self, span: Span) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::NestingTooDeep { span });
        }
        self.depth += 1;
        Ok(())
    }

    fn empty_rule(&self, node: NodeId, span: Span) -> ParseError {
        ParseError::EmptyRule {
            node: self.nodes[node].name.clone(),
            span,
        }
    }

    /// Returns `None` without consuming anything when no atom starts here.
    fn opt_atom_rule(&mut self, node: NodeId) -> Result<Option<Rule>, ParseError> {
        let Some(token) = self.nth(0).cloned() else {
            return Ok(None);
        };

        let rule = match token.kind {
            Ident => {
                match self.nth(1).map(|t| t.kind) {
                    Some(Eq) => return Ok(None),
                    Some(Colon) => {
                        self.pos += 2;
                        self.enter(token.span)?;
                        let rule = self.atom_rule(node)?;
                        self.depth -= 1;
                        return Ok(Some(Rule::Labeled {
                            label: token.value.unwrap_or_default(),
                            rule: Box::new(rule),
                        }));
                    }
                    _ => {}
                }
                self.pos += 1;
                let name = token.value().unwrap_or_default();
                Rule::Node(self.intern_node(name, token.span))
            }
            Literal => {
                self.pos += 1;
                Rule::Token(self.intern_token(token.value().unwrap_or_default()))
            }
            LParen => {
                self.pos += 1;
                self.enter(token.span)?;
                let rule = self.rule(node)?;
                self.depth -= 1;
                self.expect(RParen)?;
                rule
            }
            _ => return Ok(None),
        };

        let rule = match self.peek() {
            Some(Question) => {
                self.pos += 1;
                Rule::Opt(Box::new(rule))
            }
            Some(Star) => {
                self.pos += 1;
                Rule::Rep(Box::new(rule))
            }
            _ => rule,
        };

        Ok(Some(rule))
    }

    /// Checks that every referenced node got a definition.
    fn finish(mut self) -> Result<Grammar, ParseError> {
        let mut nodes = PrimaryMap::with_capacity(self.nodes.len());
        for pending in self.nodes.values_mut() {
            let name = std::mem::take(&mut pending.name);
            let Some(rule) = pending.rule.take() else {
                return Err(ParseError::UndefinedNode {
                    name,
                    span: pending.span,
                });
            };
            nodes.push(NodeData { name, rule });
        }

        log::debug!(
            "parsed grammar with {} nodes and {} tokens",
            nodes.len(),
            self.tokens_table.len()
        );
        Ok(Grammar::from_tables(
            nodes,
            self.tokens_table,
            self.definitions,
        ))
    }
}

fn collapse(mut rules: Vec<Rule>, make: fn(Vec<Rule>) -> Rule) -> Rule {
    if rules.len() == 1 {
        if let Some(rule) = rules.pop() {
            return rule;
        }
    }
    make(rules)
}
