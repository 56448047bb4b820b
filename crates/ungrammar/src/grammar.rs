use std::ops::Index;

use cranelift_entity::{entity_impl, PrimaryMap};

/// Handle of a node rule, dense in first-seen order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(u32);

entity_impl! { NodeId }

/// Handle of a token, dense in first-seen order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TokenId(u32);

entity_impl! { TokenId }

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NodeData {
    pub name: String,
    pub rule: Rule,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TokenData {
    pub name: String,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Rule {
    Labeled { label: String, rule: Box<Rule> },
    Node(NodeId),
    Token(TokenId),
    Seq(Vec<Rule>),
    Alt(Vec<Rule>),
    Opt(Box<Rule>),
    Rep(Box<Rule>),
}

/// A parsed and validated ungrammar.
///
/// Rules reference other nodes only through [`NodeId`], so (mutually) recursive
/// definitions live in the flat node table.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Grammar {
    nodes: PrimaryMap<NodeId, NodeData>,
    tokens: PrimaryMap<TokenId, TokenData>,
    /// Nodes in the order their `name = rule` statements appeared.
    definitions: Vec<NodeId>,
}

impl Grammar {
    pub(crate) fn from_tables(
        nodes: PrimaryMap<NodeId, NodeData>,
        tokens: PrimaryMap<TokenId, TokenData>,
        definitions: Vec<NodeId>,
    ) -> Grammar {
        debug_assert_eq!(nodes.len(), definitions.len());
        Grammar {
            nodes,
            tokens,
            definitions,
        }
    }

    pub fn node(&self, node: NodeId) -> &NodeData {
        &self.nodes[node]
    }

    pub fn token(&self, token: TokenId) -> &TokenData {
        &self.tokens[token]
    }

    /// Node handles in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys()
    }

    /// Nodes in source definition order, which differs from handle order
    /// when a node is referenced before an earlier one is defined.
    pub fn definitions(&self) -> impl Iterator<Item = (NodeId, &NodeData)> + '_ {
        self.definitions.iter().map(|&node| (node, &self.nodes[node]))
    }

    /// Token handles in first-seen order.
    pub fn tokens(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.tokens.keys()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeData)> + '_ {
        self.nodes.iter()
    }

    pub fn token_data(&self) -> impl Iterator<Item = (TokenId, &TokenData)> + '_ {
        self.tokens.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, data)| data.name == name)
            .map(|(id, _)| id)
    }

    pub fn find_token(&self, name: &str) -> Option<TokenId> {
        self.tokens
            .iter()
            .find(|(_, data)| data.name == name)
            .map(|(id, _)| id)
    }
}

impl Index<NodeId> for Grammar {
    type Output = NodeData;
    fn index(&self, index: NodeId) -> &NodeData {
        &self.nodes[index]
    }
}

impl Index<TokenId> for Grammar {
    type Output = TokenData;
    fn index(&self, index: TokenId) -> &TokenData {
        &self.tokens[index]
    }
}

impl std::str::FromStr for Grammar {
    type Err = crate::Error;
    fn from_str(s: &str) -> Result<Grammar, crate::Error> {
        let tokens = crate::lexer::tokenize_strict(s)?;
        Ok(crate::parser::parse(tokens)?)
    }
}
