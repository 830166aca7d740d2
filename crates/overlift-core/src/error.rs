use thiserror::Error;

/// Errors surfaced by the overlift compiler.
///
/// Every error is fatal to the compilation that raised it; nothing is
/// retried or partially recovered.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The top-level input cannot be compiled (e.g. source text was supplied
    /// but no frontend is configured to parse it).
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// A call refers to a name outside the recognized Overpass vocabulary.
    #[error("{name} is not a valid Overpass type")]
    UnknownName { name: String },

    /// A scalar and a set were mixed under `+` or `-`.
    #[error("{0}")]
    OperatorType(String),

    /// An operator the target language cannot express (floor division).
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// A call received a number of positional arguments it does not accept.
    #[error("{0}")]
    Arity(String),

    /// A construct with no OverpassQL rendering reached the emitter.
    #[error("{0}")]
    Unsupported(String),

    /// A user identifier collides with the reserved `tmp` namespace.
    #[error("identifier {name} uses the reserved tmp prefix")]
    ReservedName { name: String },

    /// Reported by an external frontend while parsing host source.
    #[error("parse error: {message}")]
    Parse { message: String },
}
