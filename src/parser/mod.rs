/*
    This module decides membership and reconstructs derivations with the
    CYK dynamic program
*/

pub mod tree;

use std::collections::HashMap;

use crate::grammar::Grammar;
use tree::DerivationTree;

// Splits a sentence into tokens. No quoting, no multi-word terminals
pub fn tokenize(sentence: &str) -> Vec<&str> {
    sentence.split_whitespace().collect()
}

/*
    One boolean per (span length, span start, nonterminal), scoped to a
    single call. Cell (l, s, a) is true iff nonterminal a derives
    exactly the l tokens starting at position s. Stored flat: spans are
    addressed by 1-based length and 0-based start, nonterminals by
    their table index
*/
struct ParseTable {
    positions: usize,
    nonterminals: usize,
    cells: Vec<bool>,
}

impl ParseTable {
    fn new(positions: usize, nonterminals: usize) -> Self {
        ParseTable {
            positions,
            nonterminals,
            cells: vec![false; positions * positions * nonterminals]
        }
    }

    fn cell(&self, length: usize, start: usize, symbol: usize) -> usize {
        ((length - 1) * self.positions + start) * self.nonterminals + symbol
    }

    fn get(&self, length: usize, start: usize, symbol: usize) -> bool {
        self.cells[self.cell(length, start, symbol)]
    }

    fn set(&mut self, length: usize, start: usize, symbol: usize) {
        let cell = self.cell(length, start, symbol);
        self.cells[cell] = true;
    }
}

// How a cell came to be true: either the token at the span start, or a
// binary production split at an offset into the span. Keyed by the full
// (length, start, symbol) triple since several nonterminals can cover
// the same span with different derivations
#[derive(Clone, Copy)]
enum Justification {
    Token,
    Split {
        offset: usize,
        left: usize,
        right: usize
    },
}

type Backpointers = HashMap<(usize, usize, usize), Justification>;

/*
    Runs the dynamic program bottom-up over span lengths. Cells only
    ever depend on strictly shorter spans. Returns None when some token
    has no unit production at all, which already settles membership.
    The first justification found for a cell is the one kept
*/
fn fill(
    grammar: &Grammar,
    tokens: &[&str],
    mut memo: Option<&mut Backpointers>) -> Option<ParseTable>
{
    let positions = tokens.len();
    let nonterminals = grammar.symbols().nonterminal_count();
    let mut table = ParseTable::new(positions, nonterminals);

    for (start, token) in tokens.iter().enumerate() {
        for &symbol in grammar.unit_producers(token)? {
            if table.get(1, start, symbol) {
                continue;
            }
            table.set(1, start, symbol);
            if let Some(memo) = &mut memo {
                memo.insert((1, start, symbol), Justification::Token);
            }
            if cfg!(feature = "debug") {
                eprintln!("Scan {}: {} -> {}", start, grammar.symbols().name_of(symbol), token);
            }
        }
    }

    for length in 2..=positions {
        for start in 0..=(positions - length) {
            for offset in 1..length {
                for symbol in 0..nonterminals {
                    if table.get(length, start, symbol) {
                        continue;
                    }
                    for &(left, right) in grammar.binary_pairs(symbol) {
                        if table.get(offset, start, left)
                            && table.get(length - offset, start + offset, right)
                        {
                            table.set(length, start, symbol);
                            if let Some(memo) = &mut memo {
                                memo.insert(
                                    (length, start, symbol),
                                    Justification::Split { offset, left, right }
                                );
                            }
                            if cfg!(feature = "debug") {
                                eprintln!("Span ({}, {}): {} -> {} {}",
                                    length, start,
                                    grammar.symbols().name_of(symbol),
                                    grammar.symbols().name_of(left),
                                    grammar.symbols().name_of(right));
                            }
                            break;
                        }
                    }
                }
            }
        }
    }

    Some(table)
}

// Reports whether the start symbol derives exactly this token sequence
pub fn recognize(grammar: &Grammar, tokens: &[&str]) -> bool {
    if tokens.is_empty() {
        // Chomsky Normal Form has no zero-length derivations
        return false;
    }
    match fill(grammar, tokens, None) {
        Some(table) => table.get(tokens.len(), 0, grammar.start()),
        None => false,
    }
}

// Returns one derivation tree for the token sequence, or None if the
// grammar does not recognize it
pub fn parse(grammar: &Grammar, tokens: &[&str]) -> Option<DerivationTree> {
    if tokens.is_empty() {
        return None;
    }

    let mut memo = Backpointers::new();
    let table = fill(grammar, tokens, Some(&mut memo))?;

    let root = (tokens.len(), 0, grammar.start());
    if !table.get(root.0, root.1, root.2) {
        return None;
    }
    Some(build_node(grammar, tokens, &memo, root))
}

// Materializes the owned tree from the recorded justifications
fn build_node(
    grammar: &Grammar,
    tokens: &[&str],
    memo: &Backpointers,
    (length, start, symbol): (usize, usize, usize)) -> DerivationTree
{
    let name = grammar.symbols().name_of(symbol).to_string();
    let justification = memo.get(&(length, start, symbol))
        .expect("BUG: true cell without justification");

    match *justification {
        Justification::Token => DerivationTree::Leaf {
            symbol: name,
            token: tokens[start].to_string()
        },
        Justification::Split { offset, left, right } => DerivationTree::Binary {
            symbol: name,
            left: Box::new(build_node(grammar, tokens, memo, (offset, start, left))),
            right: Box::new(build_node(grammar, tokens, memo, (length - offset, start + offset, right))),
        },
    }
}
