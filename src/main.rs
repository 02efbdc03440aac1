use clap::{Parser as ClapParser, Subcommand};
use sluice::cli::{self, CheckOptions, CheckResult, CliError};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "sluice")]
#[command(about = "Sluice - evaluate boolean filter queries against JSON contexts")]
#[command(version)]
struct Cli {
    /// Log evaluation passes and capability lookups to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and evaluate a query
    Check {
        /// The query to evaluate
        query: String,

        /// JSON context (reads from stdin if not provided and stdin is piped)
        #[arg(short, long)]
        input: Option<String>,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,
    },

    /// Print the canonical form of a query
    Explain {
        /// The query to parse
        query: String,
    },
}

fn main() {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            query,
            input,
            syntax_only,
        } => run_check(query, input, syntax_only),
        Commands::Explain { query } => cli::explain(&query).map(|rendered| println!("{}", rendered)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(query: String, input: Option<String>, syntax_only: bool) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !syntax_only && !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer).filter(|b| !b.trim().is_empty())
        }
        None => None,
    };

    let options = CheckOptions {
        query,
        input,
        syntax_only,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Matched(matched) => println!("{}", matched),
    }
    Ok(())
}
