use tracing::debug;

use tally_core::format::format_result;
use tally_core::{parser, CalcError, Calculator};

/// Decimal places shown for expression results.
const DISPLAY_PRECISION: usize = 6;

/// One line of input, decoded into its command shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Empty,
    Help,
    Quit,
    History,
    MemoryClear,
    MemoryRecall,
    MemoryAdd(f64),
    MemorySubtract(f64),
    /// Anything that is not a built-in command is handed to the
    /// expression parser.
    Expression(String),
}

/// What the shell should do after one command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Print nothing and keep going.
    Silent,
    /// Print this line and keep going.
    Reply(String),
    /// End the session.
    Quit,
}

/// Decodes one raw input line. Input is trimmed and lowercased before
/// matching.
pub fn decode(input: &str) -> Result<Command, CalcError> {
    let input = input.trim().to_lowercase();

    if input.is_empty() {
        return Ok(Command::Empty);
    }

    match input.as_str() {
        "help" | "?" | "h" => return Ok(Command::Help),
        "exit" | "quit" | "q" => return Ok(Command::Quit),
        "history" => return Ok(Command::History),
        _ => {}
    }

    let tokens: Vec<&str> = input.split_whitespace().collect();
    match tokens.as_slice() {
        ["mc"] | ["memory", "clear"] => Ok(Command::MemoryClear),
        ["mr"] | ["memory", "recall"] => Ok(Command::MemoryRecall),
        ["m+", value] | ["memory", "add", value] => {
            Ok(Command::MemoryAdd(parse_memory_value(value)?))
        }
        ["m-", value] | ["memory", "sub", value] => {
            Ok(Command::MemorySubtract(parse_memory_value(value)?))
        }
        _ => Ok(Command::Expression(input)),
    }
}

fn parse_memory_value(text: &str) -> Result<f64, CalcError> {
    text.parse()
        .map_err(|_| CalcError::Validation(format!("Invalid memory value: {}", text)))
}

/// Runs one input line against the calculator and says what to print.
///
/// Every failure comes back as a `Reply` with an `Error: ` prefix; the
/// session keeps going no matter what the line contained.
pub fn process(calc: &mut Calculator, input: &str) -> Outcome {
    debug!(input, "processing command");

    let command = match decode(input) {
        Ok(command) => command,
        Err(err) => return Outcome::Reply(format!("Error: {}", err)),
    };

    match command {
        Command::Empty => Outcome::Silent,
        Command::Help => Outcome::Reply(help_text().to_string()),
        Command::Quit => Outcome::Quit,
        Command::History => {
            let history = calc.get_history(10);
            if history.is_empty() {
                return Outcome::Reply("No history".to_string());
            }
            let lines: Vec<String> = history
                .iter()
                .map(|entry| format!("  {} = {}", entry.expression, entry.result))
                .collect();
            Outcome::Reply(lines.join("\n"))
        }
        Command::MemoryClear => {
            calc.memory_clear();
            Outcome::Reply("Memory cleared".to_string())
        }
        Command::MemoryRecall => Outcome::Reply(format!("Memory: {}", calc.memory_recall())),
        Command::MemoryAdd(value) => {
            calc.memory_add(value);
            Outcome::Reply(format!("Added to memory: {}", calc.memory()))
        }
        Command::MemorySubtract(value) => {
            calc.memory_subtract(value);
            Outcome::Reply(format!("Subtracted from memory: {}", calc.memory()))
        }
        Command::Expression(expr) => evaluate(calc, &expr),
    }
}

fn evaluate(calc: &mut Calculator, expr: &str) -> Outcome {
    let (operation, operands) = match parser::parse(expr) {
        Ok(parsed) => parsed,
        Err(err) => return Outcome::Reply(format!("Error: {}", err)),
    };

    let result = calc.calculate(&operation, &operands);
    if result.success {
        Outcome::Reply(format_result(result.value, DISPLAY_PRECISION, true, "", ""))
    } else {
        Outcome::Reply(format!("Error: {}", result.error_message))
    }
}

pub fn help_text() -> &'static str {
    "Calculator Commands:
  Basic:     2 + 3, 10 - 5, 4 * 3, 20 / 4
  Power:     2 ** 8, 3 ** 2
  Modulo:    10 % 3
  Functions: sqrt(16), log(100), sin(0.5), cos(0.5), tan(0.5)

  Memory:
    mc / memory clear  - Clear memory
    mr / memory recall - Show memory value
    m+ <value>         - Add to memory
    m- <value>         - Subtract from memory

  Other:
    history - Show calculation history
    help    - Show this help
    quit    - Exit calculator"
}
