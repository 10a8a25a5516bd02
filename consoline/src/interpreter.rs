//! Contracts for the compile/execute engine and the highlighter

use core::fmt;

use crate::error::{Error, ExecError, ProviderError};
use crate::style::Styles;
use crate::surface::Surface;

/// How strictly the completeness oracle should judge a source
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CompileMode {
    /// More lines may follow; an open block is `Incomplete`
    Interactive,
    /// The statement has ended; anything unfinished is a syntax error
    Final,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum CompileOutcome<C> {
    Complete(C),
    Incomplete,
    SyntaxError(String),
}

/// Completeness oracle and executor for one session
///
/// Never called reentrantly: one statement executes at a time.
pub trait Interpreter {
    /// Compiled, executable form of a statement
    type Code;

    fn compile(&mut self, source: &str, mode: CompileMode) -> CompileOutcome<Self::Code>;

    /// Run a compiled statement. Output goes through `ctx`; an error is
    /// reported by the session and never ends it.
    fn execute(&mut self, code: Self::Code, ctx: &mut ExecContext<'_>) -> Result<(), ExecError>;
}

/// Styles the edit line for display
///
/// The returned text may contain escape sequences but must show the same
/// code points as `text`.
pub trait Highlighter {
    fn highlight(&self, text: &str) -> Result<String, ProviderError>;
}

impl Highlighter for () {
    fn highlight(&self, text: &str) -> Result<String, ProviderError> {
        Ok(text.to_string())
    }
}

impl<T: Highlighter> Highlighter for &T {
    fn highlight(&self, text: &str) -> Result<String, ProviderError> {
        T::highlight(self, text)
    }
}

/// Per-statement execution context
///
/// Carries everything an executor may touch: the surface, the session
/// styles and the last displayed value.
pub struct ExecContext<'a> {
    surface: &'a mut dyn Surface,
    styles: &'a Styles,
    last_value: &'a mut Option<String>,
    clear_requested: bool,
    write_failure: Option<Error>,
}

impl<'a> ExecContext<'a> {
    pub fn new(
        surface: &'a mut dyn Surface,
        styles: &'a Styles,
        last_value: &'a mut Option<String>,
    ) -> Self {
        Self {
            surface,
            styles,
            last_value,
            clear_requested: false,
            write_failure: None,
        }
    }

    /// Write program output, translating `\n` to `\r\n`
    pub fn write(&mut self, text: &str) -> Result<(), Error> {
        let translated = translate_newlines(text);

        match self.surface.write(&translated) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.write_failure.get_or_insert(err);
                Err(err)
            }
        }
    }

    /// Show the value of an expression statement and keep it as the last
    /// value
    pub fn display(&mut self, repr: &str) -> Result<(), Error> {
        self.write(repr)?;
        self.write("\n")?;
        *self.last_value = Some(repr.to_string());
        Ok(())
    }

    /// Write text in the error style
    pub fn write_error(&mut self, text: &str) -> Result<(), Error> {
        let styled = self.styles.error.paint(text).to_string();
        self.write(&styled)
    }

    pub fn last_value(&self) -> Option<&str> {
        self.last_value.as_deref()
    }

    /// Clear the surface and reprint the banner once the statement finishes
    pub fn request_clear(&mut self) {
        self.clear_requested = true;
    }

    pub fn rows(&self) -> usize {
        self.surface.rows()
    }

    pub fn cols(&self) -> usize {
        self.surface.cols()
    }

    pub(crate) fn clear_requested(&self) -> bool {
        self.clear_requested
    }

    pub(crate) fn take_write_failure(&mut self) -> Option<Error> {
        self.write_failure.take()
    }
}

impl fmt::Write for ExecContext<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s).map_err(|_| fmt::Error)
    }
}

impl From<Error> for ExecError {
    fn from(err: Error) -> Self {
        ExecError::new("OSError", err.to_string())
    }
}

/// `\n` to `\r\n`, leaving existing `\r\n` alone
pub fn translate_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev = '\0';

    for c in text.chars() {
        if c == '\n' && prev != '\r' {
            out.push('\r');
        }
        out.push(c);
        prev = c;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testlib::MockSurface;
    use core::fmt::Write as _;

    #[test]
    fn newlines() {
        assert_eq!(translate_newlines("a\nb\r\nc\n"), "a\r\nb\r\nc\r\n");
        assert_eq!(translate_newlines(""), "");
    }

    #[test]
    fn context_output() {
        let mut surface = MockSurface::new(24, 80);
        let styles = Styles::default();
        let mut last_value = None;

        {
            let mut ctx = ExecContext::new(&mut surface, &styles, &mut last_value);

            ctx.write("one\n").unwrap();
            write!(ctx, "{}\n", 2).unwrap();
            ctx.display("'three'").unwrap();
            ctx.write_error("Oops: four\n").unwrap();

            assert_eq!(ctx.last_value(), Some("'three'"));
            assert_eq!(ctx.cols(), 80);
            assert!(!ctx.clear_requested());

            ctx.request_clear();

            assert!(ctx.clear_requested());
            assert!(ctx.take_write_failure().is_none());
        }

        assert_eq!(last_value.as_deref(), Some("'three'"));
        assert_eq!(
            surface.screen_as_string(),
            "one\n2\n'three'\nOops: four"
        );
        assert!(surface.output().contains("\x1b[31mOops: four\r\n\x1b[0m"));
    }

    #[test]
    fn plain_highlighter() {
        assert_eq!(().highlight("x = 1").unwrap(), "x = 1");
    }
}
