use std::cell::RefCell;
use std::time::Duration;

use anyhow::Result;
use futures::future::join_all;
use tracing::info_span;

use tally_core::{Calculator, ScopedCalculator};

use crate::command::{self, Outcome};

/// Delay before each expression, standing in for real asynchronous
/// work so the batch actually interleaves on the scheduler.
const SIMULATED_DELAY: Duration = Duration::from_millis(10);

/// Evaluates a list of expressions cooperatively and prints one
/// `expr = reply` line per expression, in input order. Lines that are
/// empty or start with `#` are skipped. One failed expression does not
/// abort the batch.
pub fn run(calc: &mut Calculator, expressions: &[String]) -> Result<()> {
    let valid = filter_expressions(expressions);

    if valid.is_empty() {
        println!("No valid expressions to process");
        return Ok(());
    }

    let span = info_span!("batch", expressions = valid.len());
    let _guard = span.enter();

    for line in evaluate_batch(calc, &valid)? {
        println!("{}", line);
    }

    Ok(())
}

fn filter_expressions(expressions: &[String]) -> Vec<&str> {
    expressions
        .iter()
        .map(String::as_str)
        .filter(|e| !e.trim().is_empty() && !e.starts_with('#'))
        .collect()
}

/// Runs the expressions as tasks on a current-thread runtime and
/// collects the replies in input order, whatever order the tasks
/// finish in. The calculator is borrowed through a scoped guard, so
/// batch state is gone once the batch is over.
fn evaluate_batch(calc: &mut Calculator, expressions: &[&str]) -> Result<Vec<String>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    let scoped = RefCell::new(calc.scoped());
    let results = runtime.block_on(join_all(
        expressions.iter().map(|expr| evaluate_one(&scoped, expr)),
    ));

    Ok(results)
}

async fn evaluate_one(calc: &RefCell<ScopedCalculator<'_>>, expr: &str) -> String {
    tokio::time::sleep(SIMULATED_DELAY).await;

    // Tasks only interleave at await points, so this borrow never
    // overlaps another task's.
    let mut guard = calc.borrow_mut();
    let reply = match command::process(&mut guard, expr) {
        Outcome::Reply(text) => text,
        Outcome::Silent | Outcome::Quit => String::new(),
    };

    format!("{} = {}", expr, reply)
}
