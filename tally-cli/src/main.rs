mod batch;
mod command;

use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tally_core::Calculator;

use crate::command::Outcome;

/// Decimal places kept by the session calculator.
const SESSION_PRECISION: u32 = 10;
/// Number of past calculations the session remembers.
const SESSION_HISTORY: usize = 50;

/// A command-line calculator with history and a memory register.
#[derive(Debug, Parser)]
#[command(name = "tally", version, about)]
struct Cli {
    /// Evaluate the given expressions concurrently instead of starting
    /// a prompt.
    #[arg(long, num_args = 1.., value_name = "EXPR", allow_hyphen_values = true)]
    batch: Option<Vec<String>>,

    /// A single expression to evaluate; tokens are joined with spaces.
    #[arg(value_name = "EXPR", allow_hyphen_values = true)]
    expression: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // The one calculator of the session; handlers borrow it, nothing
    // owns it globally.
    let mut calc = Calculator::new(SESSION_PRECISION, SESSION_HISTORY);

    if let Some(expressions) = cli.batch {
        return batch::run(&mut calc, &expressions);
    }

    if !cli.expression.is_empty() {
        let expr = cli.expression.join(" ");
        if let Outcome::Reply(text) = command::process(&mut calc, &expr) {
            println!("{}", text);
        }
        return Ok(());
    }

    interactive(&mut calc)
}

fn interactive(calc: &mut Calculator) -> Result<()> {
    println!("tally v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'help' for commands, 'quit' to exit");
    println!();

    let stdin = io::stdin();
    let mut input = String::new();
    loop {
        print!("calc> ");
        io::stdout().flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            // EOF ends the session like a quit command
            println!();
            println!("Goodbye!");
            return Ok(());
        }

        match command::process(calc, &input) {
            Outcome::Silent => {}
            Outcome::Reply(text) => println!("{}", text),
            Outcome::Quit => {
                println!("Goodbye!");
                return Ok(());
            }
        }
    }
}
