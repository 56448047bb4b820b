use serde::Serialize;
use ungrammar::{Grammar, Rule};

#[derive(Serialize)]
pub struct JsonGrammar<'a> {
    nodes: Vec<JsonNode<'a>>,
    tokens: Vec<&'a str>,
}

#[derive(Serialize)]
struct JsonNode<'a> {
    name: &'a str,
    rule: JsonRule<'a>,
}

/// Rule tree with handles resolved to names.
#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum JsonRule<'a> {
    Labeled {
        label: &'a str,
        rule: Box<JsonRule<'a>>,
    },
    Node(&'a str),
    Token(&'a str),
    Seq(Vec<JsonRule<'a>>),
    Alt(Vec<JsonRule<'a>>),
    Opt(Box<JsonRule<'a>>),
    Rep(Box<JsonRule<'a>>),
}

impl<'a> JsonGrammar<'a> {
    pub fn new(grammar: &'a Grammar) -> JsonGrammar<'a> {
        JsonGrammar {
            nodes: grammar
                .nodes()
                .map(|(_, node)| JsonNode {
                    name: &node.name,
                    rule: JsonRule::new(grammar, &node.rule),
                })
                .collect(),
            tokens: grammar
                .token_data()
                .map(|(_, token)| token.name.as_str())
                .collect(),
        }
    }
}

impl<'a> JsonRule<'a> {
    fn new(grammar: &'a Grammar, rule: &'a Rule) -> JsonRule<'a> {
        match rule {
            Rule::Labeled { label, rule } => JsonRule::Labeled {
                label: label.as_str(),
                rule: Box::new(JsonRule::new(grammar, rule)),
            },
            Rule::Node(node) => JsonRule::Node(&grammar[*node].name),
            Rule::Token(token) => JsonRule::Token(&grammar[*token].name),
            Rule::Seq(rules) => JsonRule::Seq(Self::list(grammar, rules)),
            Rule::Alt(rules) => JsonRule::Alt(Self::list(grammar, rules)),
            Rule::Opt(rule) => JsonRule::Opt(Box::new(JsonRule::new(grammar, rule))),
            Rule::Rep(rule) => JsonRule::Rep(Box::new(JsonRule::new(grammar, rule))),
        }
    }

    fn list(grammar: &'a Grammar, rules: &'a [Rule]) -> Vec<JsonRule<'a>> {
        rules.iter().map(|r| JsonRule::new(grammar, r)).collect()
    }
}
