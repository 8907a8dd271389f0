//! Statistical operations over a data series.

use std::collections::HashMap;

use crate::error::CalcError;

/// Computes a statistic over a non-empty data slice.
///
/// Supported operations: `mean`, `median`, `mode`, `stdev` (sample),
/// `variance` (sample).
pub fn statistics(operation: &str, data: &[f64]) -> Result<f64, CalcError> {
    if data.is_empty() {
        return Err(CalcError::EmptyInput);
    }
    for datum in data {
        if !datum.is_finite() {
            return Err(CalcError::Validation("Invalid input".to_string()));
        }
    }

    match operation {
        "mean" => Ok(mean(data)),
        "median" => Ok(median(data)),
        "mode" => Ok(mode(data)),
        "stdev" => sample_variance(data).map(f64::sqrt),
        "variance" => sample_variance(data),
        _ => Err(CalcError::UnknownOperation(operation.to_string())),
    }
}

/// Reduces a non-empty data slice to one value.
///
/// Supported operations: `sum`/`add`, `product`/`multiply`, `max`,
/// `min`, `average`/`avg`.
pub fn aggregate(operation: &str, data: &[f64]) -> Result<f64, CalcError> {
    if data.is_empty() {
        return Err(CalcError::EmptyInput);
    }

    match operation {
        "sum" | "add" => Ok(data.iter().sum()),
        "product" | "multiply" => Ok(data.iter().product()),
        "max" => Ok(data.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
        "min" => Ok(data.iter().copied().fold(f64::INFINITY, f64::min)),
        "average" | "avg" => Ok(mean(data)),
        _ => Err(CalcError::UnknownOperation(operation.to_string())),
    }
}

fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

fn median(data: &[f64]) -> f64 {
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// The most frequent value. Ties resolve to the value that reaches the
/// winning count first in input order, so the answer is deterministic
/// for a given series.
fn mode(data: &[f64]) -> f64 {
    let mut counts: HashMap<u64, usize> = HashMap::new();
    for datum in data {
        *counts.entry(datum.to_bits()).or_insert(0) += 1;
    }

    let best_count = counts.values().copied().max().unwrap_or(0);
    for datum in data {
        if counts[&datum.to_bits()] == best_count {
            return *datum;
        }
    }
    // non-empty data always has a mode
    data[0]
}

fn sample_variance(data: &[f64]) -> Result<f64, CalcError> {
    if data.len() < 2 {
        return Err(CalcError::Domain(
            "At least two data points required".to_string(),
        ));
    }

    let mean = mean(data);
    let squared_deviations: f64 = data.iter().map(|x| (x - mean) * (x - mean)).sum();
    Ok(squared_deviations / (data.len() - 1) as f64)
}
