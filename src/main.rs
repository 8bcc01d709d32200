mod cli;
mod error_handling;
mod generator;
mod grammar;
mod loader;
mod parser;

use std::process::ExitCode;

use clap::Parser;
use rand::thread_rng;

fn main() -> ExitCode {
    let args = cli::Cli::parse();

    let grammar = match loader::load_file(&args.file, args.start.as_deref()) {
        Ok(grammar) => grammar,
        Err(errors) => {
            for error in errors {
                eprintln!("{}", error);
            }
            return ExitCode::FAILURE;
        }
    };

    if let Some(sentence) = &args.recognize {
        let tokens = parser::tokenize(sentence);
        println!("{}", parser::recognize(&grammar, &tokens));
    }

    if let Some(sentence) = &args.parse {
        let tokens = parser::tokenize(sentence);
        match parser::parse(&grammar, &tokens) {
            Some(tree) => println!("{}", tree),
            None => println!("not recognized"),
        }
    }

    if let Some(amount) = args.generate {
        let stream = generator::sentences(&grammar, args.file.clone(), thread_rng());
        for sentence in stream.take(amount as usize) {
            match sentence {
                Ok(text) => println!("{}", text),
                Err(error) => {
                    eprintln!("{}", error);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}
