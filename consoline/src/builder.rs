//! Session configuration and construction

use core::time::Duration;

use crate::{
    accumulator::IndentRules,
    complete::Completer,
    event_source::EventSource,
    history::{History, UnboundedHistory},
    interpreter::{Highlighter, Interpreter},
    session::Session,
    style::{Color, Styles},
    surface::Surface,
};

/// Default window for telling a bare Escape from a cursor-key sequence
pub const DEFAULT_ESCAPE_TIMEOUT: Duration = Duration::from_millis(30);

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Prompt {
    pub primary: String,
    pub continuation: String,
}

impl Default for Prompt {
    fn default() -> Self {
        Self {
            primary: ">>> ".to_string(),
            continuation: "... ".to_string(),
        }
    }
}

/// Script executed before the first prompt
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StartupScript {
    pub source: String,
    /// Show what the script writes instead of discarding it
    pub show_output: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub prompt: Prompt,
    pub styles: Styles,
    /// Printed at start and after every screen clear
    pub banner: Option<String>,
    pub startup: Option<StartupScript>,
    /// Print banner and startup output, then return without reading input
    pub readonly: bool,
    pub escape_timeout: Duration,
    pub indent: IndentRules,
    /// Tab with nothing to complete inserts one indent unit on fresh lines
    pub tab_inserts_indent: bool,
    /// Ring the bell on edits that cannot happen, e.g. Backspace at column 0
    pub audible_bell: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: Prompt::default(),
            styles: Styles::default(),
            banner: None,
            startup: None,
            readonly: false,
            escape_timeout: DEFAULT_ESCAPE_TIMEOUT,
            indent: IndentRules::default(),
            tab_inserts_indent: false,
            audible_bell: true,
        }
    }
}

/// Builder for [`Session`].
///
/// # Example
/// ```
/// use consoline::builder::SessionBuilder;
/// use consoline::complete::ListCompleter;
/// use consoline::style::Color;
///
/// let builder = SessionBuilder::new()
///     .with_prompt("$ ", "> ")
///     .with_prompt_color(Color::Rgb(0xff, 0x80, 0x00))
///     .with_banner("toy console")
///     .with_completer(ListCompleter::new(["print", "range"]));
///
/// assert_eq!(builder.config().prompt.primary, "$ ");
/// ```
pub struct SessionBuilder<C: Completer, L: Highlighter, H: History> {
    config: Config,
    completer: C,
    highlighter: L,
    history: H,
}

impl SessionBuilder<(), (), UnboundedHistory> {
    /// Builder with default configuration, no completion, no highlighting
    /// and unbounded history
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            completer: (),
            highlighter: (),
            history: UnboundedHistory::new(),
        }
    }
}

impl Default for SessionBuilder<(), (), UnboundedHistory> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Completer, L: Highlighter, H: History> SessionBuilder<C, L, H> {
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn with_prompt(mut self, primary: impl Into<String>, continuation: impl Into<String>) -> Self {
        self.config.prompt = Prompt {
            primary: primary.into(),
            continuation: continuation.into(),
        };
        self
    }

    pub fn with_prompt_color(mut self, color: Color) -> Self {
        self.config.styles.prompt = color.normal();
        self
    }

    pub fn with_styles(mut self, styles: Styles) -> Self {
        self.config.styles = styles;
        self
    }

    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.config.banner = Some(banner.into());
        self
    }

    pub fn with_startup_script(mut self, source: impl Into<String>, show_output: bool) -> Self {
        self.config.startup = Some(StartupScript {
            source: source.into(),
            show_output,
        });
        self
    }

    pub fn readonly(mut self, readonly: bool) -> Self {
        self.config.readonly = readonly;
        self
    }

    pub fn with_escape_timeout(mut self, timeout: Duration) -> Self {
        self.config.escape_timeout = timeout;
        self
    }

    pub fn with_indent(mut self, indent: IndentRules) -> Self {
        self.config.indent = indent;
        self
    }

    pub fn tab_inserts_indent(mut self, enabled: bool) -> Self {
        self.config.tab_inserts_indent = enabled;
        self
    }

    pub fn audible_bell(mut self, enabled: bool) -> Self {
        self.config.audible_bell = enabled;
        self
    }

    /// Add completion provider
    pub fn with_completer<C2: Completer>(self, completer: C2) -> SessionBuilder<C2, L, H> {
        SessionBuilder {
            config: self.config,
            completer,
            highlighter: self.highlighter,
            history: self.history,
        }
    }

    /// Add syntax highlighter
    pub fn with_highlighter<L2: Highlighter>(self, highlighter: L2) -> SessionBuilder<C, L2, H> {
        SessionBuilder {
            config: self.config,
            completer: self.completer,
            highlighter,
            history: self.history,
        }
    }

    /// Use another history store
    pub fn with_history<H2: History>(self, history: H2) -> SessionBuilder<C, L, H2> {
        SessionBuilder {
            config: self.config,
            completer: self.completer,
            highlighter: self.highlighter,
            history,
        }
    }

    /// Build [`Session`]. Is equivalent of calling [`Session::new()`].
    pub fn build<S: Surface, I: Interpreter>(
        self,
        surface: S,
        interpreter: I,
        source: EventSource,
    ) -> Session<S, I, C, L, H> {
        Session::new(
            surface,
            interpreter,
            self.completer,
            self.highlighter,
            self.history,
            source,
            self.config,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complete::ListCompleter;
    use crate::event_source::channel;
    use crate::testlib::{MockInterpreter, MockSurface};

    #[test]
    fn defaults() {
        let config = Config::default();

        assert_eq!(config.prompt.primary, ">>> ");
        assert_eq!(config.prompt.continuation, "... ");
        assert_eq!(config.styles.prompt, Color::Green.normal());
        assert_eq!(config.escape_timeout, Duration::from_millis(30));
        assert_eq!(config.indent.unit, 4);
        assert!(config.banner.is_none());
        assert!(!config.readonly);
    }

    #[test]
    fn builder() {
        let (_tx, rx) = channel();

        let session = SessionBuilder::new()
            .with_prompt("$ ", "| ")
            .with_prompt_color(Color::Cyan)
            .with_banner("hello")
            .with_startup_script("x = 1", false)
            .readonly(true)
            .with_escape_timeout(Duration::from_millis(5))
            .tab_inserts_indent(true)
            .audible_bell(false)
            .with_completer(ListCompleter::new(["print"]))
            .with_highlighter(())
            .with_history(UnboundedHistory::new())
            .build(MockSurface::new(24, 80), MockInterpreter::new(), rx);

        let config = session.config();

        assert_eq!(config.prompt.primary, "$ ");
        assert_eq!(config.styles.prompt, Color::Cyan.normal());
        assert_eq!(config.banner.as_deref(), Some("hello"));
        assert_eq!(
            config.startup,
            Some(StartupScript {
                source: "x = 1".to_string(),
                show_output: false
            })
        );
        assert!(config.readonly);
        assert!(config.tab_inserts_indent);
        assert!(!config.audible_bell);
    }
}
