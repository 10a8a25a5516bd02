//! Consoline is a line editor and statement accumulator for embedding a
//! scripting console in any terminal-like surface. The host only has to
//! push raw input into a queue and accept text written back; everything
//! between (escape-sequence decoding, editing, redraw, history, completion
//! and multi-line statements) happens here.
//!
//! Features:
//! - Surface-agnostic: anything implementing [`surface::Surface`]
//! - UTF-8 input, one code point per cursor cell
//! - Emacs cursor keybindings
//! - Statement history
//! - Tab completion with columnar listing
//! - Auto-indent and dedent for block statements
//! - Pluggable syntax highlighting
//!
//! The language itself stays outside: an [`interpreter::Interpreter`]
//! decides whether a source is complete and executes it.
//!
//! Sessions are built with [`builder::SessionBuilder`].
//!
//! # Example
//! ```no_run
//! use consoline::builder::SessionBuilder;
//! use consoline::error::ExecError;
//! use consoline::event_source::{channel, pump};
//! use consoline::interpreter::{CompileMode, CompileOutcome, ExecContext, Interpreter};
//! use consoline::surface::{IoSurface, StdoutWrapper};
//!
//! struct Echo;
//!
//! impl Interpreter for Echo {
//!     type Code = String;
//!
//!     fn compile(&mut self, source: &str, _: CompileMode) -> CompileOutcome<String> {
//!         CompileOutcome::Complete(source.to_string())
//!     }
//!
//!     fn execute(&mut self, code: String, ctx: &mut ExecContext<'_>) -> Result<(), ExecError> {
//!         ctx.display(&code)?;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let (tx, rx) = channel();
//!     tokio::spawn(pump(tokio::io::stdin(), tx));
//!
//!     let surface = IoSurface::new(StdoutWrapper::new(), 24, 80);
//!     let mut session = SessionBuilder::new().build(surface, Echo, rx);
//!
//!     let _ = session.run().await;
//! }
//! ```

pub mod accumulator;
pub mod builder;
pub mod complete;
pub mod decoder;
pub mod error;
pub mod event_source;
pub mod history;
pub mod interpreter;
pub mod line_buffer;
pub mod redraw;
pub mod session;
pub mod style;
pub mod surface;
mod utf8;

#[cfg(test)]
pub(crate) mod testlib;

pub use builder::SessionBuilder;
pub use error::Error;
pub use session::Session;
