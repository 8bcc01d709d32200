/*
    This module generates sentences
*/

use rand::prelude::*;
use std::fmt::Display;
use std::path::PathBuf;

use crate::error_handling::*;
use crate::grammar::{Grammar, Production};

#[derive(Debug, PartialEq)]
pub enum GenerateErrorType {
    // A declared nonterminal with no productions cannot be expanded
    UndefinedNonterminal(String),
}

impl ErrorType for GenerateErrorType {}

impl Display for GenerateErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateErrorType::UndefinedNonterminal(nonterminal) =>
                write!(f, "No production for nonterminal `{}`", nonterminal),
        }
    }
}

pub type GenerateError = Error<GenerateErrorType>;
pub type GenResult = Result<String, GenerateError>;

/*
    An endless stream of sentences sampled from a grammar. Every `next`
    derives one sentence from the start symbol, choosing uniformly among
    a nonterminal's productions. The caller owns the random source, so
    a seeded rng replays the same stream. Sampling recurses without a
    depth bound; a grammar whose derivations are expected to diverge
    will produce arbitrarily long sentences
*/
pub struct Sentences<'g, R: Rng> {
    grammar: &'g Grammar,
    location: Location,
    rng: R,
}

pub fn sentences<R: Rng>(grammar: &Grammar, file: PathBuf, rng: R) -> Sentences<R> {
    Sentences {
        grammar,
        location: Location { file, line: 0 },
        rng
    }
}

impl<R: Rng> Sentences<'_, R> {
    fn sample_symbol(&mut self, symbol: usize, tokens: &mut Vec<String>) -> Result<(), GenerateError> {
        let symbols = self.grammar.symbols();
        if !symbols.is_nonterminal(symbol) {
            tokens.push(symbols.name_of(symbol).to_string());
            return Ok(());
        }

        let production = self.grammar.productions(symbol)
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| GenerateError {
                location: self.location.clone(),
                error: GenerateErrorType::UndefinedNonterminal(symbols.name_of(symbol).to_string())
            })?;

        match production {
            Production::Unit(terminal) => self.sample_symbol(terminal, tokens),
            Production::Binary(left, right) => {
                self.sample_symbol(left, tokens)?;
                self.sample_symbol(right, tokens)
            }
        }
    }
}

impl<R: Rng> Iterator for Sentences<'_, R> {
    type Item = GenResult;

    fn next(&mut self) -> Option<Self::Item> {
        let mut tokens = Vec::new();
        Some(
            self.sample_symbol(self.grammar.start(), &mut tokens)
                .map(|()| tokens.join(" "))
        )
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rand::rngs::StdRng;

    use crate::grammar::Grammar;
    use crate::parser;
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
    fn samples_belong_to_the_grammar() {
        let grammar = english();
        let rng = StdRng::seed_from_u64(17);

        for sentence in sentences(&grammar, PathBuf::new(), rng).take(20) {
            let sentence = sentence.unwrap();
            let tokens = parser::tokenize(&sentence);
            assert!(
                parser::recognize(&grammar, &tokens),
                "generated a non-member: {:?}", sentence
            );
        }
    }

    #[test]
    fn same_seed_replays_the_stream() {
        let grammar = english();

        let first = sentences(&grammar, PathBuf::new(), StdRng::seed_from_u64(3))
            .take(5)
            .collect_vec();
        let second = sentences(&grammar, PathBuf::new(), StdRng::seed_from_u64(3))
            .take(5)
            .collect_vec();

        assert_eq!(first, second);
    }

    #[test]
    fn nonterminal_without_productions_errors() {
        let grammar = Grammar::build(&["s", "x"], &["s -> x, x"], "s").unwrap();
        let mut stream = sentences(&grammar, PathBuf::new(), StdRng::seed_from_u64(0));

        assert_eq!(stream.next(), Some(Err(GenerateError {
            location: Location { file: PathBuf::new(), line: 0 },
            error: GenerateErrorType::UndefinedNonterminal("x".to_string())
        })));
    }
}
