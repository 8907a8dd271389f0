use thiserror::Error;

/// Everything that can go wrong between reading an expression and
/// producing a value.
///
/// All of these are recovered at the calculator boundary and turned
/// into a failed [`OperationResult`](crate::OperationResult); none of
/// them should escape to a caller as a panic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("Cannot parse expression: {0}")]
    Parse(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Modulo by zero")]
    ModuloByZero,

    /// Invalid input to a function that is only defined on part of the
    /// number line, like `sqrt` or `log`.
    #[error("{0}")]
    Domain(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Empty data list")]
    EmptyInput,

    /// An operand that is not a usable number (unparsable text, NaN,
    /// infinity).
    #[error("{0}")]
    Validation(String),
}
