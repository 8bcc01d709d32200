use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// File containing the grammar rules, one production per line
    pub file: PathBuf,

    /// Start symbol (default: left-hand side of the first rule)
    #[arg(short, long, value_name = "SYMBOL")]
    pub start: Option<String>,

    /// Report whether the sentence belongs to the grammar
    #[arg(short, long, value_name = "SENTENCE")]
    pub recognize: Option<String>,

    /// Print a derivation tree for the sentence
    #[arg(short, long, value_name = "SENTENCE")]
    pub parse: Option<String>,

    /// Number of random sentences to generate
    #[arg(short = 'n', long, value_name = "AMOUNT")]
    pub generate: Option<u32>,
}
