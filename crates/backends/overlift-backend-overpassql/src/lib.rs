//! OverpassQL text backend.
//!
//! Walks a desugared [`overlift_core::ast::Module`] and prints the
//! equivalent OverpassQL script. The backend assumes desugaring has already
//! run: no `if`/`break`/`continue`, every loop iterator a plain name, every
//! call's first positional argument a name or a number. Anything else is
//! rejected rather than guessed at.

mod calls;
mod emit;

pub use emit::emit_module;
