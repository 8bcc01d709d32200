/*
    This module loads grammars from rule files
*/

use std::fs::File;
use std::io::BufRead;
use std::path::PathBuf;

use itertools::Itertools;

use crate::error_handling::*;
use crate::grammar::{rules, BuildResult, Grammar, GrammarError, GrammarErrorType};

type LineResult<T> = Result<T, GrammarError>;

fn io_error(error: std::io::Error, file: PathBuf) -> GrammarError {
    GrammarError {
        location: Location {
            file,
            line: 0
        },
        error: GrammarErrorType::FileError(error)
    }
}

// Rule lines are anything except blanks and `;` comments
fn is_rule_line(line: &String) -> bool {
    !line.is_empty() && !line.starts_with(';')
}

// Returns an iterator over the rule lines of a file, with the io errors
// wrapped in GrammarError and enumerated
fn file_line_nums<'a>(file: File, path: &'a PathBuf) -> impl Iterator<Item = (usize, LineResult<String>)> + 'a {
    std::io::BufReader::new(file)
        .lines()
        .map(move |line| line.map_err(|e| io_error(e, path.clone())))
        .enumerate()
        .filter(|(_, line)| line.as_ref().is_ok_and(is_rule_line) || line.is_err())
        .map(|(num, line)| (num + 1, line))
}

// The left-hand sides declare the nonterminals, in order of first
// appearance; lines that do not even parse contribute nothing here and
// get reported during construction instead
fn declared_nonterminals(rule_list: &[(String, Location)]) -> Vec<String> {
    let mut declared = Vec::new();
    for (text, _) in rule_list {
        if let Ok(rule) = rules::parse_rule(text) {
            if !declared.contains(&rule.head) {
                declared.push(rule.head);
            }
        }
    }
    declared
}

pub fn load_file(path: &PathBuf, start: Option<&str>) -> BuildResult<Grammar> {
    let file = File::open(path).map_err(|e| vec![io_error(e, path.clone())])?;
    let lines = file_line_nums(file, path);

    let (read, errors): (Vec<_>, Vec<_>) = lines.partition(|(_, line)| line.is_ok());
    if !errors.is_empty() {
        return Err(errors.into_iter().map(|(_, line)| line.unwrap_err()).collect_vec());
    }

    let rule_list = read.into_iter()
        .map(|(num, line)| (line.unwrap(), Location { file: path.clone(), line: num }))
        .collect_vec();

    let declared = declared_nonterminals(&rule_list);
    let start = match start {
        Some(name) => name.to_string(),
        // Default: the first rule defines the start symbol
        None => declared.first().cloned().unwrap_or_default(),
    };

    Grammar::from_rules(declared, rule_list, &start, path.clone())
}
