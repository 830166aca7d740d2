//! Compile a small query dialect into OverpassQL.
//!
//! The input is the body of a wrapper function in a host query dialect —
//! assignments, `if`/`for`, conditional expressions, locator constructor
//! calls — and the output is an equivalent OverpassQL script. The heavy
//! lifting happens in two passes: desugaring rewrites everything OverpassQL
//! cannot express into set assignments and `foreach` loops
//! ([`overlift_core::desugar`]), then the backend prints the result
//! (`overlift-backend-overpassql`).
//!
//! ```
//! use overlift::{compile, QueryInput};
//! use overlift::ast::{Expr, Number, Stmt};
//!
//! let body = vec![
//!     Stmt::Assign {
//!         target: "x".to_string(),
//!         value: Expr::Call {
//!             func: Box::new(Expr::Name("Node".to_string())),
//!             args: vec![Expr::Num(Number::Int(1))],
//!             keywords: vec![],
//!         },
//!     },
//! ];
//! assert_eq!(compile(QueryInput::Ast(body)).unwrap(), "(node(1);) -> .x;");
//! ```

pub use overlift_core::ast;
pub use overlift_core::error::CoreError;
pub use overlift_core::pipeline::{Frontend, QueryInput, QuerySource};

use overlift_core::ast::{Expr, Module, Stmt};
use overlift_core::desugar::desugar;
use overlift_core::names::NameGen;
use overlift_core::validate::validate;

/// The compiler: dispatches on input shape and wires validate → desugar →
/// emit. Parsing host source is delegated to a [`Frontend`], if one is
/// configured.
#[derive(Default)]
pub struct Compiler {
    frontend: Option<Box<dyn Frontend>>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a host-language frontend, enabling [`QueryInput::Source`] and
    /// [`QueryInput::Callable`] inputs.
    pub fn with_frontend(frontend: Box<dyn Frontend>) -> Self {
        Self {
            frontend: Some(frontend),
        }
    }

    pub fn compile(&self, input: QueryInput) -> Result<String, CoreError> {
        match input {
            QueryInput::Ast(body) => self.compile_body(body),
            QueryInput::Source(source) => self.compile_source(&source),
            QueryInput::Callable(provider) => {
                let source = provider.source_text()?;
                self.compile_source(&source)
            }
        }
    }

    fn compile_source(&self, source: &str) -> Result<String, CoreError> {
        let frontend = self.frontend.as_ref().ok_or_else(|| {
            CoreError::UnsupportedInput(
                "source input requires a configured frontend".to_string(),
            )
        })?;
        self.compile_body(frontend.parse(source)?.body)
    }

    fn compile_body(&self, body: Vec<Stmt>) -> Result<String, CoreError> {
        validate(&body)?;
        let mut names = NameGen::new();
        let mut body = desugar(body, &mut names);
        // Terminate with a statement that emits nothing, so that trailing
        // constructs are never swallowed by the backend.
        body.push(noop());
        overlift_backend_overpassql::emit_module(&Module { body })
    }
}

/// Compile an input with a frontend-less [`Compiler`]. Only
/// [`QueryInput::Ast`] inputs can succeed.
pub fn compile(input: QueryInput) -> Result<String, CoreError> {
    Compiler::new().compile(input)
}

fn noop() -> Stmt {
    Stmt::Expr {
        value: Expr::Call {
            func: Box::new(Expr::Name("noop".to_string())),
            args: vec![],
            keywords: vec![],
        },
    }
}
