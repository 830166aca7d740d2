//! Seams to external collaborators.
//!
//! Overlift compiles an already-parsed tree; turning host-language source
//! text into that tree is somebody else's job. These traits pin down the
//! interface without pulling a parser into the core.

use crate::ast::{Module, Stmt};
use crate::error::CoreError;

/// Frontend trait — parses host source text into the module the compiler
/// consumes (the body of the user's wrapper function, not the wrapper
/// itself).
pub trait Frontend {
    fn parse(&self, source: &str) -> Result<Module, CoreError>;
}

/// Anything that can produce its own source text — the moral equivalent of
/// handing the compiler a callable and letting it fish out the code.
pub trait QuerySource {
    fn source_text(&self) -> Result<String, CoreError>;
}

/// The three input shapes the compiler accepts.
pub enum QueryInput {
    /// An already-parsed wrapper body.
    Ast(Vec<Stmt>),
    /// Host source text; requires a configured [`Frontend`].
    Source(String),
    /// A source provider; requires a configured [`Frontend`].
    Callable(Box<dyn QuerySource>),
}

impl From<Vec<Stmt>> for QueryInput {
    fn from(body: Vec<Stmt>) -> Self {
        Self::Ast(body)
    }
}

impl From<String> for QueryInput {
    fn from(source: String) -> Self {
        Self::Source(source)
    }
}

impl From<&str> for QueryInput {
    fn from(source: &str) -> Self {
        Self::Source(source.to_string())
    }
}
