//! Number rendering for display.

/// Rounds a value to `precision` decimal places, with ties away from
/// zero.
pub fn round_half_up(value: f64, precision: u32) -> f64 {
    let scale = 10f64.powi(precision as i32);
    (value * scale).round() / scale
}

/// Formats a number with fixed decimal precision, optional `,`
/// grouping of the integer part, and an optional prefix/suffix.
///
/// A value that is not a usable number renders as `Invalid`.
pub fn format_result(
    value: f64,
    precision: usize,
    thousands_separator: bool,
    prefix: &str,
    suffix: &str,
) -> String {
    if !value.is_finite() {
        return "Invalid".to_string();
    }

    let fixed = format!("{:.*}", precision, value);
    let body = if thousands_separator {
        group_thousands(&fixed)
    } else {
        fixed
    };

    format!("{}{}{}", prefix, body, suffix)
}

/// Inserts `,` separators into the integer part of an already fixed
/// formatted number.
fn group_thousands(fixed: &str) -> String {
    let (sign, rest) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed),
    };
    let (int_part, frac_part) = match rest.find('.') {
        Some(dot) => rest.split_at(dot),
        None => (rest, ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let int_grouped: String = grouped.chars().rev().collect();

    format!("{}{}{}", sign, int_grouped, frac_part)
}
