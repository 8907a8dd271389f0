use lazy_static::lazy_static;
use regex::Regex;

use crate::error::CalcError;

lazy_static! {
    /// Matches function-style calls like `sqrt(16)` or `log(100, 10)`.
    /// The argument capture is greedy and the pattern is not anchored at
    /// the end, so everything up to the last closing parenthesis counts
    /// as the argument list.
    static ref FUNC_CALL: Regex = Regex::new(r"^(\w+)\s*\(\s*(.+)\s*\)").unwrap();
}

/// The operator scan order. `*` is deliberately listed before `**`:
/// splitting a power expression on the bare `*` leaves a right side that
/// starts with `*` and fails to parse as a number, so the scan falls
/// through and `**` matches next. Reordering the list changes which
/// expressions parse.
const BINARY_OPS: [&str; 6] = ["+", "-", "*", "/", "**", "%"];

/// A parser turns one line of text into an operation name and its
/// operands.
///
/// Two shapes are recognized, tried in this order:
/// 1. a function call: `name(arg1, arg2, …)` with numeric arguments;
/// 2. a binary expression: two numbers around the first occurrence of
///    an operator from [`BINARY_OPS`].
pub fn parse(text: &str) -> Result<(String, Vec<f64>), CalcError> {
    let text = text.trim();

    if let Some(caps) = FUNC_CALL.captures(text) {
        let name = caps[1].to_string();
        let mut args = Vec::with_capacity(2);
        for part in caps[2].split(',') {
            let part = part.trim();
            let val: f64 = part
                .parse()
                .map_err(|_| CalcError::Validation(format!("Invalid argument: {}", part)))?;
            args.push(val);
        }
        return Ok((name, args));
    }

    for op in &BINARY_OPS {
        if let Some(pos) = text.find(op) {
            let left = &text[..pos];
            let right = &text[pos + op.len()..];

            // if either side is not a number, try the next operator
            if let (Ok(a), Ok(b)) = (left.trim().parse::<f64>(), right.trim().parse::<f64>()) {
                return Ok((op.to_string(), vec![a, b]));
            }
        }
    }

    Err(CalcError::Parse(text.to_string()))
}
