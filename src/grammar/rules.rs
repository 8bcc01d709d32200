/*
    This module splits production strings of the form `lhs -> rhs1, rhs2`
*/

use itertools::Itertools;

use super::{GrammarErrorType, RuleResult};

const ARROW: &str = "->";

#[derive(PartialEq, Debug)]
pub struct ParsedRule {
    pub head: String,
    // One or two symbol names, enforced here
    pub body: Vec<String>,
}

fn malformed(text: &str) -> GrammarErrorType {
    GrammarErrorType::MalformedRule(text.trim().to_string())
}

// Commas are separator punctuation with no meaning of their own, so
// `np -> det, n` and `np -> det n` read the same
fn strip_separators(text: &str) -> String {
    text.replace(',', " ")
}

pub fn parse_rule(text: &str) -> RuleResult<ParsedRule> {
    let cleaned = strip_separators(text);
    let mut symbols = cleaned.split_whitespace();

    let head = match symbols.next() {
        Some(symbol) if symbol != ARROW => symbol.to_string(),
        _ => return Err(malformed(text)),
    };

    if symbols.next() != Some(ARROW) {
        return Err(malformed(text));
    }

    let body = symbols.map(str::to_string).collect_vec();
    if body.is_empty() || body.len() > 2 || body.iter().any(|symbol| symbol == ARROW) {
        return Err(malformed(text));
    }

    Ok(ParsedRule { head, body })
}
