use std::fmt::Write;

use ungrammar::{Grammar, Rule};

/// Renders the grammar back into ungrammar syntax, one definition per block.
///
/// Definitions keep their source order so that names and literals come back
/// in the order they were first seen, and reparsing hands out equal handles.
pub fn display_grammar(buf: &mut dyn Write, grammar: &Grammar) -> std::fmt::Result {
    for (i, (_, node)) in grammar.definitions().enumerate() {
        if i > 0 {
            buf.write_char('\n')?;
        }
        writeln!(buf, "{} =", node.name)?;
        match &node.rule {
            Rule::Alt(alternatives) => {
                for (i, rule) in alternatives.iter().enumerate() {
                    buf.write_str(if i == 0 { "  " } else { "| " })?;
                    display_rule(buf, grammar, rule, Position::Alt)?;
                    buf.write_char('\n')?;
                }
            }
            rule => {
                buf.write_str("  ")?;
                display_rule(buf, grammar, rule, Position::Top)?;
                buf.write_char('\n')?;
            }
        }
    }
    Ok(())
}

/// Where a rule is printed, decides whether it needs parentheses to parse back.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Position {
    Top,
    Alt,
    Seq,
    Label,
    Postfix,
}

fn needs_parens(rule: &Rule, position: Position) -> bool {
    match rule {
        Rule::Alt(_) => position != Position::Top,
        Rule::Seq(_) => matches!(
            position,
            Position::Seq | Position::Label | Position::Postfix
        ),
        Rule::Labeled { .. } => position == Position::Postfix,
        Rule::Node(_) | Rule::Token(_) | Rule::Opt(_) | Rule::Rep(_) => {
            position == Position::Postfix
        }
    }
}

fn display_rule(
    buf: &mut dyn Write,
    grammar: &Grammar,
    rule: &Rule,
    position: Position,
) -> std::fmt::Result {
    let parens = needs_parens(rule, position);
    if parens {
        buf.write_char('(')?;
    }
    match rule {
        Rule::Node(node) => buf.write_str(&grammar[*node].name)?,
        Rule::Token(token) => display_literal(buf, &grammar[*token].name)?,
        Rule::Labeled { label, rule } => {
            write!(buf, "{label}:")?;
            display_rule(buf, grammar, rule, Position::Label)?;
        }
        Rule::Seq(rules) => {
            for (i, rule) in rules.iter().enumerate() {
                if i > 0 {
                    buf.write_char(' ')?;
                }
                display_rule(buf, grammar, rule, Position::Seq)?;
            }
        }
        Rule::Alt(rules) => {
            for (i, rule) in rules.iter().enumerate() {
                if i > 0 {
                    buf.write_str(" | ")?;
                }
                display_rule(buf, grammar, rule, Position::Alt)?;
            }
        }
        Rule::Opt(rule) => {
            display_postfix_operand(buf, grammar, rule)?;
            buf.write_char('?')?;
        }
        Rule::Rep(rule) => {
            display_postfix_operand(buf, grammar, rule)?;
            buf.write_char('*')?;
        }
    }
    if parens {
        buf.write_char(')')?;
    }
    Ok(())
}

fn display_postfix_operand(
    buf: &mut dyn Write,
    grammar: &Grammar,
    rule: &Rule,
) -> std::fmt::Result {
    match rule {
        // bare atoms take the quantifier directly
        Rule::Node(_) | Rule::Token(_) => display_rule(buf, grammar, rule, Position::Seq),
        _ => display_rule(buf, grammar, rule, Position::Postfix),
    }
}

/// Quotes a token name, escaping `\` and `'`.
pub fn display_literal(buf: &mut dyn Write, name: &str) -> std::fmt::Result {
    buf.write_char('\'')?;
    for ch in name.chars() {
        if matches!(ch, '\\' | '\'') {
            buf.write_char('\\')?;
        }
        buf.write_char(ch)?;
    }
    buf.write_char('\'')
}
