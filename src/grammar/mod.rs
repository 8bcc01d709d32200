/*
    This module stores grammars in Chomsky Normal Form and builds the
    index structures the recognizer works from
*/

pub mod rules;

use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;

use itertools::Itertools;

use crate::error_handling::*;

#[derive(Debug)]
pub enum GrammarErrorType {
    // The rule could not be split into a head, an arrow, and one or two
    // body symbols
    MalformedRule(String),
    // The rule is well formed but not in Chomsky Normal Form
    CnfViolation(String),
    // A rule was given for a symbol outside the declared nonterminals
    UndeclaredNonterminal(String),
    // The same nonterminal was declared twice
    DuplicateNonterminal(String),
    // The start symbol is not a declared nonterminal
    UnknownStart(String),
    // There was an issue with reading a file
    FileError(std::io::Error),
}

impl ErrorType for GrammarErrorType {}

impl PartialEq for GrammarErrorType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (GrammarErrorType::FileError(a), GrammarErrorType::FileError(b)) =>
                a.kind() == b.kind(),
            (GrammarErrorType::MalformedRule(a), GrammarErrorType::MalformedRule(b)) |
            (GrammarErrorType::CnfViolation(a), GrammarErrorType::CnfViolation(b)) |
            (GrammarErrorType::UndeclaredNonterminal(a), GrammarErrorType::UndeclaredNonterminal(b)) |
            (GrammarErrorType::DuplicateNonterminal(a), GrammarErrorType::DuplicateNonterminal(b)) |
            (GrammarErrorType::UnknownStart(a), GrammarErrorType::UnknownStart(b)) => a == b,
            _ => false
        }
    }
}

impl Display for GrammarErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarErrorType::MalformedRule(rule) => write!(f, "Malformed rule `{}`", rule),
            GrammarErrorType::CnfViolation(rule) => write!(f, "Rule `{}` is not in Chomsky Normal Form", rule),
            GrammarErrorType::UndeclaredNonterminal(name) => write!(f, "Rule given for undeclared nonterminal `{}`", name),
            GrammarErrorType::DuplicateNonterminal(name) => write!(f, "Nonterminal `{}` declared twice", name),
            GrammarErrorType::UnknownStart(name) => write!(f, "Start symbol `{}` is not a declared nonterminal", name),
            GrammarErrorType::FileError(e) => write!(f, "File error: {}", e),
        }
    }
}

pub type GrammarError = Error<GrammarErrorType>;
pub type GrammarErrors = Errors<GrammarErrorType>;

pub type RuleResult<T> = std::result::Result<T, GrammarErrorType>;
pub type BuildResult<T> = std::result::Result<T, GrammarErrors>;

// Raised when a symbol name has no table index
#[derive(Debug, PartialEq)]
pub struct LookupError(pub String);

impl Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol `{}` has no table index", self.0)
    }
}

/*
    Table indices are handed out once, at construction: nonterminals
    first, in declaration order, then terminals in order of first
    appearance on a rule body. Terminal names can never collide with
    nonterminal names (a one-symbol body naming a declared nonterminal
    is rejected as a CNF violation, not read as a terminal), so a single
    name map resolves both kinds with the nonterminal list taking
    precedence.
*/
#[derive(Debug, PartialEq)]
pub struct SymbolTable {
    nonterminals: Vec<String>,
    terminals: Vec<String>,
    indices: HashMap<String, usize>,
}

impl SymbolTable {
    fn new() -> Self {
        SymbolTable {
            nonterminals: Vec::new(),
            terminals: Vec::new(),
            indices: HashMap::new()
        }
    }

    // Declared nonterminals take the first indices
    fn declare_nonterminal(&mut self, name: String) -> RuleResult<()> {
        if self.indices.contains_key(&name) {
            return Err(GrammarErrorType::DuplicateNonterminal(name));
        }
        self.indices.insert(name.clone(), self.nonterminals.len());
        self.nonterminals.push(name);
        Ok(())
    }

    // Appends the terminal if it is new, either way returning its index
    fn intern_terminal(&mut self, name: &str) -> usize {
        if let Some(&index) = self.indices.get(name) {
            return index;
        }
        let index = self.nonterminals.len() + self.terminals.len();
        self.indices.insert(name.to_string(), index);
        self.terminals.push(name.to_string());
        index
    }

    pub fn index_of(&self, name: &str) -> Result<usize, LookupError> {
        self.indices.get(name)
            .copied()
            .ok_or_else(|| LookupError(name.to_string()))
    }

    pub fn indices_of<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>, LookupError> {
        names.iter().map(|name| self.index_of(name.as_ref())).collect()
    }

    pub fn name_of(&self, index: usize) -> &str {
        if index < self.nonterminals.len() {
            &self.nonterminals[index]
        } else {
            &self.terminals[index - self.nonterminals.len()]
        }
    }

    fn nonterminal_index(&self, name: &str) -> Option<usize> {
        self.indices.get(name)
            .copied()
            .filter(|&index| self.is_nonterminal(index))
    }

    pub fn is_nonterminal(&self, index: usize) -> bool {
        index < self.nonterminals.len()
    }

    pub fn nonterminal_count(&self) -> usize {
        self.nonterminals.len()
    }
}

// The two production shapes Chomsky Normal Form allows
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Production {
    // One terminal
    Unit(usize),
    // Exactly two nonterminals
    Binary(usize, usize),
}

#[derive(Debug, PartialEq)]
pub struct Grammar {
    symbols: SymbolTable,
    start: usize,
    // Productions per nonterminal, in the order the rules listed them
    productions: Vec<Vec<Production>>,
    // terminal -> nonterminals with a unit production for it
    unit_index: HashMap<String, Vec<usize>>,
    // nonterminal -> the (left, right) pairs of its binary productions
    binary_index: Vec<Vec<(usize, usize)>>,
}

impl Grammar {
    // Builds a grammar from an in-memory rule list; errors locate rules
    // by their 1-based position
    pub fn build(nonterminals: &[&str], rule_list: &[&str], start: &str) -> BuildResult<Grammar> {
        let declared = nonterminals.iter().map(|s| s.to_string()).collect_vec();
        let located = rule_list.iter()
            .enumerate()
            .map(|(number, text)| (text.to_string(), Location::rule(number + 1)))
            .collect_vec();
        Grammar::from_rules(declared, located, start, PathBuf::new())
    }

    // Builds a grammar from located rule strings. All bad rules are
    // reported, not just the first; declaration-level problems point at
    // the file itself
    pub fn from_rules(
        declared: Vec<String>,
        rule_list: Vec<(String, Location)>,
        start: &str,
        file: PathBuf) -> BuildResult<Grammar>
    {
        let origin = Location { file, line: 0 };
        let mut errors = GrammarErrors::new();

        let mut symbols = SymbolTable::new();
        for name in declared {
            if let Err(error) = symbols.declare_nonterminal(name) {
                errors.push(GrammarError { location: origin.clone(), error });
            }
        }

        let count = symbols.nonterminal_count();
        let mut productions = vec![Vec::new(); count];
        let mut binary_index = vec![Vec::new(); count];
        let mut unit_index = HashMap::<String, Vec<usize>>::new();

        for (text, location) in rule_list {
            match Grammar::add_rule(&text, &mut symbols, &mut productions,
                                    &mut binary_index, &mut unit_index) {
                Ok(()) => (),
                Err(error) => errors.push(GrammarError { location, error }),
            }
        }

        let start = match symbols.index_of(start) {
            Ok(index) if symbols.is_nonterminal(index) => index,
            _ => {
                errors.push(GrammarError {
                    location: origin,
                    error: GrammarErrorType::UnknownStart(start.to_string())
                });
                0
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Grammar {
            symbols,
            start,
            productions,
            unit_index,
            binary_index
        })
    }

    // Classifies one rule and threads it into the index structures. The
    // body checks here are the Chomsky Normal Form validation: nothing
    // but one-terminal and two-nonterminal bodies gets through
    fn add_rule(
        text: &str,
        symbols: &mut SymbolTable,
        productions: &mut [Vec<Production>],
        binary_index: &mut [Vec<(usize, usize)>],
        unit_index: &mut HashMap<String, Vec<usize>>) -> RuleResult<()>
    {
        let rule = rules::parse_rule(text)?;

        let head = symbols.nonterminal_index(&rule.head)
            .ok_or_else(|| GrammarErrorType::UndeclaredNonterminal(rule.head.clone()))?;

        match rule.body.as_slice() {
            [symbol] => {
                // A unit chain like `a -> b` has no place in CNF
                if symbols.nonterminal_index(symbol).is_some() {
                    return Err(GrammarErrorType::CnfViolation(text.trim().to_string()));
                }
                let terminal = symbols.intern_terminal(symbol);
                productions[head].push(Production::Unit(terminal));
                unit_index.entry(symbol.clone()).or_default().push(head);
            }
            [left, right] => {
                let pair = (symbols.nonterminal_index(left), symbols.nonterminal_index(right));
                let (left, right) = match pair {
                    (Some(left), Some(right)) => (left, right),
                    _ => return Err(GrammarErrorType::CnfViolation(text.trim().to_string())),
                };
                productions[head].push(Production::Binary(left, right));
                binary_index[head].push((left, right));
            }
            // parse_rule only lets one or two symbols through
            _ => unreachable!(),
        }

        Ok(())
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn productions(&self, nonterminal: usize) -> &[Production] {
        &self.productions[nonterminal]
    }

    // None means no unit production derives the token anywhere in the
    // grammar
    pub fn unit_producers(&self, token: &str) -> Option<&[usize]> {
        self.unit_index.get(token).map(Vec::as_slice)
    }

    pub fn binary_pairs(&self, nonterminal: usize) -> &[(usize, usize)] {
        &self.binary_index[nonterminal]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn english() -> Grammar {
        Grammar::build(
            &["s", "np", "vp", "det", "n", "v", "pp", "p"],
            &[
                "s -> np, vp",
                "np -> det, n",
                "np -> she",
                "vp -> vp, pp",
                "vp -> v, np",
                "vp -> eats",
                "pp -> p, np",
                "v -> eats",
                "p -> with",
                "n -> fish",
                "n -> fork",
                "det -> a"
            ],
            "s"
        ).unwrap()
    }

    #[test]
    fn nonterminals_indexed_in_declaration_order() {
        let grammar = english();
        let names = ["s", "np", "vp", "det", "n", "v", "pp", "p"];

        assert_eq!(grammar.symbols().nonterminal_count(), 8);
        for (index, name) in names.iter().enumerate() {
            assert_eq!(grammar.symbols().index_of(name), Ok(index));
            assert_eq!(grammar.symbols().name_of(index), *name);
            assert!(grammar.symbols().is_nonterminal(index));
        }
    }

    #[test]
    fn terminals_indexed_in_encounter_order() {
        let grammar = english();
        // First appearance across rule bodies, scanning rules in order
        let terminals = ["she", "eats", "with", "fish", "fork", "a"];

        for (offset, name) in terminals.iter().enumerate() {
            assert_eq!(grammar.symbols().index_of(name), Ok(8 + offset));
            assert_eq!(grammar.symbols().name_of(8 + offset), *name);
            assert!(!grammar.symbols().is_nonterminal(8 + offset));
        }
    }

    #[test]
    fn lookup_failure() {
        let grammar = english();
        assert_eq!(
            grammar.symbols().index_of("runs"),
            Err(LookupError("runs".to_string()))
        );
        assert_eq!(
            grammar.symbols().indices_of(&["she", "runs"]),
            Err(LookupError("runs".to_string()))
        );
        assert_eq!(grammar.symbols().indices_of(&["det", "a"]), Ok(vec![3, 13]));
    }

    #[test]
    fn unit_index_lists_producers_in_rule_order() {
        let grammar = english();
        let vp = grammar.symbols().index_of("vp").unwrap();
        let v = grammar.symbols().index_of("v").unwrap();

        // `vp -> eats` is declared before `v -> eats`
        assert_eq!(grammar.unit_producers("eats"), Some(&[vp, v][..]));
        assert_eq!(grammar.unit_producers("she"), Some(&[1][..]));
        assert_eq!(grammar.unit_producers("runs"), None);
    }

    #[test]
    fn binary_index_holds_binary_bodies_only() {
        let grammar = english();
        let (np, vp, det, n, v, pp) = (1, 2, 3, 4, 5, 6);

        assert_eq!(grammar.binary_pairs(0), &[(np, vp)]);
        assert_eq!(grammar.binary_pairs(np), &[(det, n)]);
        assert_eq!(grammar.binary_pairs(vp), &[(vp, pp), (v, np)]);
        // Unit-only nonterminals have no pairs at all
        assert_eq!(grammar.binary_pairs(v), &[]);
    }

    #[test]
    fn productions_keep_insertion_order() {
        let grammar = english();
        let vp = grammar.symbols().index_of("vp").unwrap();
        let eats = grammar.symbols().index_of("eats").unwrap();

        assert_eq!(grammar.productions(vp), &[
            Production::Binary(2, 6),
            Production::Binary(5, 1),
            Production::Unit(eats)
        ]);
    }

    #[test]
    fn malformed_rules_are_rejected() {
        let bad = Grammar::build(&["s"], &["s eats"], "s").unwrap_err();
        assert_eq!(bad, vec![GrammarError {
            location: Location::rule(1),
            error: GrammarErrorType::MalformedRule("s eats".to_string())
        }]);
    }

    #[test]
    fn cnf_violations_are_rejected() {
        // Unit chain between nonterminals
        let bad = Grammar::build(&["s", "x"], &["s -> x", "x -> ok"], "s").unwrap_err();
        assert_eq!(bad, vec![GrammarError {
            location: Location::rule(1),
            error: GrammarErrorType::CnfViolation("s -> x".to_string())
        }]);

        // Terminal in a binary body
        let bad = Grammar::build(&["s", "x"], &["x -> ok", "s -> x, ok"], "s").unwrap_err();
        assert_eq!(bad, vec![GrammarError {
            location: Location::rule(2),
            error: GrammarErrorType::CnfViolation("s -> x, ok".to_string())
        }]);
    }

    #[test]
    fn undeclared_head_is_rejected() {
        let bad = Grammar::build(&["s"], &["s -> ok", "t -> ok"], "s").unwrap_err();
        assert_eq!(bad, vec![GrammarError {
            location: Location::rule(2),
            error: GrammarErrorType::UndeclaredNonterminal("t".to_string())
        }]);
    }

    #[test]
    fn duplicate_declaration_is_rejected() {
        let bad = Grammar::build(&["s", "s"], &["s -> ok"], "s").unwrap_err();
        assert_eq!(bad, vec![GrammarError {
            location: Location::rule(0),
            error: GrammarErrorType::DuplicateNonterminal("s".to_string())
        }]);
    }

    #[test]
    fn unknown_start_is_rejected() {
        let bad = Grammar::build(&["s"], &["s -> ok"], "t").unwrap_err();
        assert_eq!(bad, vec![GrammarError {
            location: Location::rule(0),
            error: GrammarErrorType::UnknownStart("t".to_string())
        }]);

        // A terminal cannot start derivations either
        let bad = Grammar::build(&["s"], &["s -> ok"], "ok").unwrap_err();
        assert_eq!(bad, vec![GrammarError {
            location: Location::rule(0),
            error: GrammarErrorType::UnknownStart("ok".to_string())
        }]);
    }

    #[test]
    fn all_bad_rules_are_reported() {
        let bad = Grammar::build(
            &["s", "x"],
            &["s -> x x", "nope", "s -> x", "y -> ok"],
            "s"
        ).unwrap_err();

        assert_eq!(bad.len(), 3);
        assert_eq!(bad[0].location, Location::rule(2));
        assert_eq!(bad[1].location, Location::rule(3));
        assert_eq!(bad[2].location, Location::rule(4));
    }

    #[test]
    fn start_symbol_is_looked_up() {
        // The start symbol's index follows its declaration position
        // rather than any fixed slot
        let grammar = Grammar::build(
            &["x", "y", "s"],
            &["x -> a", "y -> b", "s -> x, y"],
            "s"
        ).unwrap();
        assert_eq!(grammar.start(), 2);
    }
}
