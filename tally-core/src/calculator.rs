use std::collections::VecDeque;
use std::fmt::Write;
use std::ops::{Deref, DerefMut};
use std::time::SystemTime;

use tracing::{debug, warn};

use crate::error::CalcError;
use crate::format::round_half_up;

/// The outcome of one calculation, successful or not.
///
/// `calculate` never lets an error escape; a failure is reported
/// through `success` and `error_message` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult {
    pub value: f64,
    pub operation: String,
    pub inputs: Vec<f64>,
    pub success: bool,
    pub error_message: String,
}

impl OperationResult {
    fn success(operation: &str, inputs: &[f64], value: f64) -> OperationResult {
        OperationResult {
            value,
            operation: operation.to_string(),
            inputs: inputs.to_vec(),
            success: true,
            error_message: String::new(),
        }
    }

    fn failure(operation: &str, inputs: &[f64], message: String) -> OperationResult {
        OperationResult {
            value: 0.0,
            operation: operation.to_string(),
            inputs: inputs.to_vec(),
            success: false,
            error_message: message,
        }
    }
}

/// One successful calculation, as remembered by the history ring.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Rendered as `operation(op1, op2, …)`.
    pub expression: String,
    pub result: f64,
    pub timestamp: SystemTime,
}

/// A calculator session: precision, a memory register, the last result
/// and a bounded history of successful calculations.
///
/// One instance lives for the whole session. The entry point constructs
/// it and hands out `&mut` to the command handlers; there is no hidden
/// global.
pub struct Calculator {
    precision: u32,
    memory: f64,
    history: VecDeque<HistoryEntry>,
    capacity: usize,
    last_result: f64,
}

impl Default for Calculator {
    fn default() -> Calculator {
        Calculator::new(10, 100)
    }
}

impl Calculator {
    /// Creates a calculator that rounds to `precision` decimal places
    /// and remembers up to `capacity` past calculations.
    pub fn new(precision: u32, capacity: usize) -> Calculator {
        Calculator {
            precision,
            memory: 0.0,
            history: VecDeque::with_capacity(capacity),
            capacity,
            last_result: 0.0,
        }
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// The unsigned parameter type is what keeps the non-negative
    /// invariant; there is nothing to validate at runtime.
    pub fn set_precision(&mut self, precision: u32) {
        self.precision = precision;
    }

    pub fn memory(&self) -> f64 {
        self.memory
    }

    pub fn last_result(&self) -> f64 {
        self.last_result
    }

    /// Looks up the operation, computes, rounds, and records the result.
    ///
    /// Every error is converted to a failed [`OperationResult`] at this
    /// boundary; only successful results touch `last_result` and the
    /// history.
    pub fn calculate(&mut self, operation: &str, operands: &[f64]) -> OperationResult {
        debug!(operation, ?operands, "calculate");

        for operand in operands {
            if !operand.is_finite() {
                return OperationResult::failure(operation, operands, "Invalid input".to_string());
            }
        }

        match apply(operation, operands) {
            Ok(raw) => {
                let value = round_half_up(raw, self.precision);
                self.last_result = value;
                self.record(operation, operands, value);
                OperationResult::success(operation, operands, value)
            }
            Err(err) => {
                warn!(operation, %err, "calculation failed");
                OperationResult::failure(operation, operands, err.to_string())
            }
        }
    }

    fn record(&mut self, operation: &str, operands: &[f64], result: f64) {
        if self.history.len() == self.capacity {
            // the ring is full, forget the oldest entry
            self.history.pop_front();
        }
        self.history.push_back(HistoryEntry {
            expression: render_expression(operation, operands),
            result,
            timestamp: SystemTime::now(),
        });
    }

    /// Returns up to `limit` most recent entries, newest last.
    pub fn get_history(&self, limit: usize) -> Vec<HistoryEntry> {
        let skip = self.history.len().saturating_sub(limit);
        self.history.iter().skip(skip).cloned().collect()
    }

    pub fn memory_add(&mut self, value: f64) {
        self.memory += value;
    }

    pub fn memory_subtract(&mut self, value: f64) {
        self.memory -= value;
    }

    pub fn memory_clear(&mut self) {
        self.memory = 0.0;
    }

    pub fn memory_recall(&self) -> f64 {
        self.memory
    }

    /// Zeroes memory and the last result and empties the history.
    /// Idempotent.
    pub fn reset(&mut self) {
        self.memory = 0.0;
        self.last_result = 0.0;
        self.history.clear();
    }

    /// Borrows the calculator for a scope at the end of which its state
    /// is reset, whatever happened inside.
    pub fn scoped(&mut self) -> ScopedCalculator<'_> {
        ScopedCalculator(self)
    }
}

/// A guard that resets the borrowed calculator when dropped.
pub struct ScopedCalculator<'a>(&'a mut Calculator);

impl Deref for ScopedCalculator<'_> {
    type Target = Calculator;

    fn deref(&self) -> &Calculator {
        self.0
    }
}

impl DerefMut for ScopedCalculator<'_> {
    fn deref_mut(&mut self) -> &mut Calculator {
        self.0
    }
}

impl Drop for ScopedCalculator<'_> {
    fn drop(&mut self) {
        self.0.reset();
    }
}

/// The operation table. Dispatches on name and arity together, so a
/// known name with the wrong number of operands is an unknown
/// operation, exactly like a name that was never known.
fn apply(operation: &str, operands: &[f64]) -> Result<f64, CalcError> {
    Ok(match (operation, operands) {
        ("+", [a, b]) => a + b,
        ("-", [a, b]) => a - b,
        ("*", [a, b]) => a * b,
        ("/", [a, b]) => {
            if *b == 0.0 {
                return Err(CalcError::DivisionByZero);
            }
            a / b
        }

        ("**", [a, b]) => a.powf(*b),
        ("%", [a, b]) => {
            if *b == 0.0 {
                return Err(CalcError::ModuloByZero);
            }
            // the remainder takes the sign of the divisor
            a - b * (a / b).floor()
        }

        ("sqrt", [a]) => {
            if *a < 0.0 {
                return Err(CalcError::Domain(
                    "Cannot take sqrt of negative number".to_string(),
                ));
            }
            a.sqrt()
        }
        ("log", [a]) => {
            if *a <= 0.0 {
                return Err(CalcError::Domain("Log of non-positive number".to_string()));
            }
            a.ln()
        }
        ("log", [a, base]) => {
            if *a <= 0.0 {
                return Err(CalcError::Domain("Log of non-positive number".to_string()));
            }
            if *base <= 0.0 || *base == 1.0 {
                return Err(CalcError::Domain("Invalid logarithm base".to_string()));
            }
            a.log(*base)
        }
        ("sin", [a]) => a.sin(),
        ("cos", [a]) => a.cos(),
        ("tan", [a]) => a.tan(),

        _ => return Err(CalcError::UnknownOperation(operation.to_string())),
    })
}

fn render_expression(operation: &str, operands: &[f64]) -> String {
    let mut rendered = String::new();
    rendered.push_str(operation);
    rendered.push('(');
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            rendered.push_str(", ");
        }
        // infallible for String
        let _ = write!(rendered, "{}", operand);
    }
    rendered.push(')');
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_performs_basic_arithmetic() {
        let mut calc = Calculator::default();
        assert_eq!(calc.calculate("+", &[2.0, 3.0]).value, 5.0);
        assert_eq!(calc.calculate("-", &[10.0, 4.0]).value, 6.0);
        assert_eq!(calc.calculate("*", &[4.0, 3.0]).value, 12.0);
        assert_eq!(calc.calculate("/", &[20.0, 4.0]).value, 5.0);
    }

    #[test]
    fn it_rounds_division_to_the_configured_precision() {
        let mut calc = Calculator::new(2, 10);
        let result = calc.calculate("/", &[1.0, 3.0]);
        assert!(result.success);
        assert_eq!(result.value, 0.33);
    }

    #[test]
    fn it_reports_division_by_zero() {
        let mut calc = Calculator::default();
        let result = calc.calculate("/", &[1.0, 0.0]);
        assert!(!result.success);
        assert_eq!(result.error_message, "Division by zero");
        // the failure leaves no trace in state
        assert_eq!(calc.last_result(), 0.0);
        assert!(calc.get_history(10).is_empty());
    }

    #[test]
    fn it_reports_modulo_by_zero() {
        let mut calc = Calculator::default();
        let result = calc.calculate("%", &[10.0, 0.0]);
        assert!(!result.success);
        assert_eq!(result.error_message, "Modulo by zero");
    }

    #[test]
    fn it_takes_the_sign_of_the_divisor_for_modulo() {
        let mut calc = Calculator::default();
        assert_eq!(calc.calculate("%", &[-7.0, 3.0]).value, 2.0);
        assert_eq!(calc.calculate("%", &[7.0, -3.0]).value, -2.0);
        assert_eq!(calc.calculate("%", &[10.0, 3.0]).value, 1.0);
    }

    #[test]
    fn it_computes_powers() {
        let mut calc = Calculator::default();
        assert_eq!(calc.calculate("**", &[2.0, 8.0]).value, 256.0);
    }

    #[test]
    fn it_guards_the_sqrt_domain() {
        let mut calc = Calculator::default();

        let result = calc.calculate("sqrt", &[-1.0]);
        assert!(!result.success);
        assert_eq!(result.error_message, "Cannot take sqrt of negative number");

        let result = calc.calculate("sqrt", &[4.0]);
        assert!(result.success);
        assert_eq!(result.value, 2.0);
    }

    #[test]
    fn it_defaults_log_to_the_natural_base() {
        let mut calc = Calculator::default();
        let result = calc.calculate("log", &[std::f64::consts::E]);
        assert!(result.success);
        assert_eq!(result.value, 1.0);

        let result = calc.calculate("log", &[100.0, 10.0]);
        assert!(result.success);
        assert_eq!(result.value, 2.0);
    }

    #[test]
    fn it_guards_the_log_domain() {
        let mut calc = Calculator::default();
        assert!(!calc.calculate("log", &[0.0]).success);
        assert!(!calc.calculate("log", &[-5.0, 10.0]).success);
        assert!(!calc.calculate("log", &[100.0, 1.0]).success);
    }

    #[test]
    fn it_rejects_unknown_operations_and_wrong_arity() {
        let mut calc = Calculator::default();

        let result = calc.calculate("frobnicate", &[1.0]);
        assert!(!result.success);
        assert_eq!(result.error_message, "Unknown operation: frobnicate");

        // a known name with the wrong number of operands is unknown too
        assert!(!calc.calculate("+", &[1.0]).success);
        assert!(!calc.calculate("sqrt", &[1.0, 2.0]).success);
        assert!(!calc.calculate("log", &[8.0, 2.0, 3.0]).success);
    }

    #[test]
    fn it_rejects_non_finite_operands() {
        let mut calc = Calculator::default();

        let result = calc.calculate("+", &[f64::NAN, 1.0]);
        assert!(!result.success);
        assert_eq!(result.error_message, "Invalid input");

        assert!(!calc.calculate("+", &[f64::INFINITY, 1.0]).success);
    }

    #[test]
    fn it_evicts_the_oldest_history_entry_when_full() {
        let mut calc = Calculator::new(10, 3);
        for i in 0..4 {
            assert!(calc.calculate("+", &[i as f64, 1.0]).success);
        }

        let history = calc.get_history(3);
        assert_eq!(history.len(), 3);
        // the first calculation, +(0, 1), has been evicted
        assert_eq!(history[0].expression, "+(1, 1)");
        assert_eq!(history[2].expression, "+(3, 1)");
    }

    #[test]
    fn it_returns_history_newest_last() {
        let mut calc = Calculator::default();
        calc.calculate("+", &[1.0, 1.0]);
        calc.calculate("+", &[2.0, 2.0]);
        calc.calculate("+", &[3.0, 3.0]);

        let history = calc.get_history(2);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].result, 4.0);
        assert_eq!(history[1].result, 6.0);

        // a limit larger than the history returns everything
        assert_eq!(calc.get_history(100).len(), 3);
    }

    #[test]
    fn it_accumulates_memory() {
        let mut calc = Calculator::default();
        calc.memory_add(5.0);
        calc.memory_subtract(3.0);
        assert_eq!(calc.memory_recall(), 2.0);

        calc.memory_clear();
        assert_eq!(calc.memory_recall(), 0.0);
    }

    #[test]
    fn it_resets_idempotently() {
        let mut calc = Calculator::default();
        calc.memory_add(7.0);
        calc.calculate("+", &[1.0, 2.0]);

        calc.reset();
        calc.reset();

        assert_eq!(calc.memory_recall(), 0.0);
        assert_eq!(calc.last_result(), 0.0);
        assert!(calc.get_history(10).is_empty());
    }

    #[test]
    fn it_resets_when_the_scoped_guard_drops() {
        let mut calc = Calculator::default();
        {
            let mut scoped = calc.scoped();
            scoped.memory_add(9.0);
            scoped.calculate("*", &[2.0, 2.0]);
            assert_eq!(scoped.memory_recall(), 9.0);
        }
        assert_eq!(calc.memory_recall(), 0.0);
        assert!(calc.get_history(10).is_empty());
    }

    #[test]
    fn it_tracks_the_last_result() {
        let mut calc = Calculator::default();
        calc.calculate("+", &[2.0, 3.0]);
        assert_eq!(calc.last_result(), 5.0);

        // a failed calculation does not overwrite it
        calc.calculate("/", &[1.0, 0.0]);
        assert_eq!(calc.last_result(), 5.0);
    }

    #[test]
    fn it_applies_an_updated_precision() {
        let mut calc = Calculator::new(2, 10);
        assert_eq!(calc.precision(), 2);

        calc.set_precision(0);
        // 2.5 rounds away from zero
        assert_eq!(calc.calculate("/", &[10.0, 4.0]).value, 3.0);
    }

    #[test]
    fn it_renders_history_expressions() {
        let mut calc = Calculator::default();
        calc.calculate("log", &[100.0, 10.0]);
        let history = calc.get_history(1);
        assert_eq!(history[0].expression, "log(100, 10)");
        assert_eq!(history[0].result, 2.0);
    }
}
