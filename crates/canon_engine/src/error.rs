use thiserror::Error;

/// Recoverable API-level failures of the engine. Steady-state
/// simplification never surfaces these; they cover the construction surface
/// (unknown function names, wrong arity) and polynomial conversion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),
    #[error("Function '{name}' expects {expected} argument(s), got {got}")]
    InvalidArity {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("Polynomial error: {0}")]
    Polynomial(#[from] PolyError),
}

/// Failures of expression → polynomial conversion and polynomial
/// arithmetic. All of them mean "treat the input as opaque", never abort.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolyError {
    #[error("expression is not polynomial")]
    NotPolynomial,
    #[error("too many distinct variables")]
    TooManyVariables,
    #[error("exponent too large")]
    ExponentTooLarge,
    #[error("coefficient overflowed machine width")]
    Overflow,
}
