//! Core of the overlift query compiler.
//!
//! Overlift translates a small, dynamically-typed query dialect into
//! OverpassQL, the set-oriented language of the Overpass API. This crate
//! holds everything up to (but not including) text emission:
//!
//! - the [`ast`] module: the statement/expression tree the compiler consumes;
//! - the [`desugar`] module: the fixpoint rewrite that eliminates `if`,
//!   `break` and `continue` and flattens call arguments, leaving only the
//!   shapes an OverpassQL backend can print;
//! - [`validate`]: input-side identifier checks;
//! - [`pipeline`]: the seams to external collaborators (host-language
//!   parsers, source providers);
//! - [`error::CoreError`]: the single error type shared across the workspace.
//!
//! Emission to OverpassQL text lives in the `overlift-backend-overpassql`
//! crate; the user-facing wiring lives in `overlift`.

pub mod ast;
pub mod desugar;
pub mod error;
pub mod names;
pub mod pipeline;
pub mod validate;
