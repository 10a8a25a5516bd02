//! Per-surface editing session
//!
//! One cooperative task owns the session. It suspends only while waiting
//! for input (and during the bare-Escape window); every edit, redraw,
//! completion and execution runs to completion between two key presses.

use tracing::{debug, warn};

use crate::{
    accumulator::{Accumulator, Mode, Submission},
    builder::Config,
    complete::{complete_at, completion_token, format_columns, Completer, Completion},
    decoder::{Key, KeyDecoder},
    error::Error,
    event_source::EventSource,
    history::{get_history_entries, Direction, History, HistoryNavigator},
    interpreter::{translate_newlines, CompileMode, CompileOutcome, ExecContext, Highlighter, Interpreter},
    line_buffer::{Edit, LineBuffer},
    redraw::{self, BELL, HIDE_CURSOR, NEWLINE, SHOW_CURSOR},
    style::Styles,
    surface::{DiscardSurface, Surface},
};

/// Per-call editing behavior of [`Session::readline`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EditStrategy {
    /// Enter accepts the line, Tab completes
    Default,
    /// Enter on a whitespace-only line removes one indent unit in place
    /// instead of accepting it
    DedentOnEmpty,
    /// Tab with nothing to complete inserts one indent unit
    CustomTab,
}

/// Line editor, history and statement accumulator for one surface
///
/// It is recommended to use [`crate::builder::SessionBuilder`] to build a
/// session.
pub struct Session<S, I, C, L, H>
where
    S: Surface,
    I: Interpreter,
    C: Completer,
    L: Highlighter,
    H: History,
{
    surface: S,
    interpreter: I,
    completer: C,
    highlighter: L,
    decoder: KeyDecoder,
    line: LineBuffer,
    history: HistoryNavigator<H>,
    accumulator: Accumulator,
    config: Config,
    next_indent: usize,
    last_value: Option<String>,
}

fn spaces(width: usize) -> String {
    " ".repeat(width)
}

fn write_styled_error(surface: &mut dyn Surface, styles: &Styles, text: &str) -> Result<(), Error> {
    surface.write(&styles.error.paint(translate_newlines(text)).to_string())?;
    surface.write(NEWLINE)
}

impl<S, I, C, L, H> Session<S, I, C, L, H>
where
    S: Surface,
    I: Interpreter,
    C: Completer,
    L: Highlighter,
    H: History,
{
    pub fn new(
        surface: S,
        interpreter: I,
        completer: C,
        highlighter: L,
        history: H,
        source: EventSource,
        config: Config,
    ) -> Self {
        Self {
            surface,
            interpreter,
            completer,
            highlighter,
            decoder: KeyDecoder::new(source, config.escape_timeout),
            line: LineBuffer::new(),
            history: HistoryNavigator::new(history),
            accumulator: Accumulator::new(),
            config,
            next_indent: 0,
            last_value: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn interpreter(&self) -> &I {
        &self.interpreter
    }

    pub fn line(&self) -> &LineBuffer {
        &self.line
    }

    pub fn mode(&self) -> Mode {
        self.accumulator.mode()
    }

    /// Value most recently shown by [`ExecContext::display`]
    pub fn last_value(&self) -> Option<&str> {
        self.last_value.as_deref()
    }

    /// Load history from iterator
    pub fn load_history<'a>(&mut self, entries: impl IntoIterator<Item = &'a str>) -> usize {
        self.history.load(entries)
    }

    /// Get history as iterator, oldest first
    pub fn history(&self) -> impl Iterator<Item = &str> + '_ {
        get_history_entries(self.history.history())
    }

    fn prompt_text(&self) -> &str {
        match self.accumulator.mode() {
            Mode::FreshStatement => &self.config.prompt.primary,
            Mode::Continuing => &self.config.prompt.continuation,
        }
    }

    fn redraw(&mut self) -> Result<(), Error> {
        let prompt = self.config.styles.prompt.paint(self.prompt_text()).to_string();
        let text = self.line.as_str();

        let highlighted = match self.highlighter.highlight(text) {
            Ok(highlighted) => highlighted,
            Err(err) => {
                warn!(%err, "highlighter failed, showing plain text");
                text.to_string()
            }
        };

        let rendered = redraw::render_line(
            &prompt,
            &highlighted,
            self.line.len(),
            self.line.cursor(),
        );

        self.surface.write(HIDE_CURSOR)?;
        self.surface.write(&rendered)?;
        self.surface.write(SHOW_CURSOR)?;
        self.surface.flush()
    }

    fn apply(&mut self, edit: Edit) -> Result<(), Error> {
        match edit {
            Edit::Changed => self.redraw(),
            Edit::CursorMoved(delta) => {
                self.surface.write(&redraw::cursor_move(delta))?;
                self.surface.flush()
            }
            Edit::Unchanged if self.config.audible_bell => {
                self.surface.write(BELL)?;
                self.surface.flush()
            }
            Edit::Unchanged => Ok(()),
        }
    }

    fn print_banner(&mut self) -> Result<(), Error> {
        if let Some(banner) = &self.config.banner {
            let painted = self
                .config
                .styles
                .banner
                .paint(translate_newlines(banner))
                .to_string();

            self.surface.write(&painted)?;
            self.surface.write(NEWLINE)?;
        }

        Ok(())
    }

    fn clear_screen(&mut self) -> Result<(), Error> {
        self.surface.write(&redraw::clear_screen())?;
        self.print_banner()
    }

    fn complete(&mut self, strategy: EditStrategy) -> Result<(), Error> {
        let chars: Vec<char> = self.line.chars().collect();
        let cursor = self.line.cursor();

        if strategy == EditStrategy::CustomTab && completion_token(&chars, cursor) == cursor {
            let unit = spaces(self.config.indent.unit);
            let edit = self.line.insert_str(&unit);
            return self.apply(edit);
        }

        match complete_at(&self.completer, &chars, cursor) {
            Completion::Nothing => Ok(()),
            Completion::Splice { start, end, text } => {
                let edit = self.line.splice(start, end, &text);
                self.apply(edit)
            }
            Completion::Listing(candidates) => {
                self.surface.write(NEWLINE)?;
                self.surface
                    .write(&format_columns(&candidates, self.surface.cols()))?;
                self.redraw()
            }
        }
    }

    fn browse(&mut self, direction: Direction) -> Result<(), Error> {
        match self.history.browse(direction) {
            Some(text) => {
                self.line.set(&text);
                self.redraw()
            }
            None => Ok(()),
        }
    }

    /// Read one line with the prompt for the current accumulator state.
    ///
    /// The buffer starts with the pending auto-indent. Returns the accepted
    /// text after echoing a newline. Ctrl+C unwinds with
    /// [`Error::Interrupted`], a bare Escape with [`Error::Aborted`], end of
    /// input with [`Error::Closed`].
    pub async fn readline(&mut self, strategy: EditStrategy) -> Result<String, Error> {
        self.history.reset();

        let indent = spaces(core::mem::take(&mut self.next_indent));
        self.line.set(&indent);
        self.redraw()?;

        loop {
            let key = self.decoder.next_key().await.ok_or(Error::Closed)?;

            match key {
                Key::Char(c) => {
                    let edit = self.line.insert(c);
                    self.apply(edit)?;
                }
                Key::Enter => {
                    let dedent = match strategy {
                        EditStrategy::DedentOnEmpty => self
                            .accumulator
                            .dedent_request(self.line.as_str(), &self.config.indent),
                        _ => None,
                    };

                    if let Some(width) = dedent {
                        self.line.set(&spaces(width));
                        self.redraw()?;
                        continue;
                    }

                    self.surface.write(NEWLINE)?;
                    self.surface.flush()?;

                    return Ok(self.line.as_str().to_string());
                }
                Key::Tab => self.complete(strategy)?,
                Key::Backspace => {
                    let edit = self.line.delete_before();
                    self.apply(edit)?;
                }
                Key::CtrlC => return Err(Error::Interrupted),
                Key::Escape => return Err(Error::Aborted),
                Key::CtrlL => {
                    self.clear_screen()?;
                    self.redraw()?;
                }
                Key::ArrowUp => self.browse(Direction::Older)?,
                Key::ArrowDown => self.browse(Direction::Newer)?,
                Key::ArrowLeft => {
                    let edit = self.line.move_left();
                    self.apply(edit)?;
                }
                Key::ArrowRight => {
                    let edit = self.line.move_right();
                    self.apply(edit)?;
                }
                Key::Home => {
                    let edit = self.line.move_home();
                    self.apply(edit)?;
                }
                Key::End => {
                    let edit = self.line.move_end();
                    self.apply(edit)?;
                }
            }
        }
    }

    fn strategy(&self) -> EditStrategy {
        match self.accumulator.mode() {
            Mode::Continuing => EditStrategy::DedentOnEmpty,
            Mode::FreshStatement if self.config.tab_inserts_indent => EditStrategy::CustomTab,
            Mode::FreshStatement => EditStrategy::Default,
        }
    }

    fn reset_statement(&mut self) {
        self.accumulator.reset();
        self.next_indent = 0;
    }

    /// Read and process one line. Interrupts and aborts are absorbed here;
    /// only [`Error::Closed`] and write failures are returned.
    pub async fn step(&mut self) -> Result<(), Error> {
        match self.readline(self.strategy()).await {
            Ok(line) => self.submit(&line),
            Err(Error::Interrupted) => {
                debug!("interrupted");
                self.reset_statement();
                let to_end = self.line.len() - self.line.cursor();
                self.surface.write(&redraw::cursor_right(to_end))?;
                self.surface.write("^C")?;
                self.surface.write(NEWLINE)
            }
            Err(Error::Aborted) => {
                debug!("line aborted");
                self.reset_statement();
                self.line.clear();
                self.redraw()
            }
            Err(err) => Err(err),
        }
    }

    fn submit(&mut self, line: &str) -> Result<(), Error> {
        let submission = self
            .accumulator
            .submit(line, &mut self.interpreter, &self.config.indent);

        match submission {
            Submission::Discard => Ok(()),
            Submission::Execute { source, code } => {
                self.history.record_accepted(&source);
                self.execute(code, false)
            }
            Submission::Continue { indent } => {
                self.next_indent = indent;
                Ok(())
            }
            Submission::SyntaxError(message) => {
                debug!(%message, "syntax error");
                write_styled_error(
                    &mut self.surface,
                    &self.config.styles,
                    &format!("SyntaxError: {}", message),
                )
            }
        }
    }

    fn execute(&mut self, code: I::Code, hidden: bool) -> Result<(), Error> {
        let mut discard = DiscardSurface::new(self.surface.rows(), self.surface.cols());
        let surface: &mut dyn Surface = if hidden {
            &mut discard
        } else {
            &mut self.surface
        };

        let mut ctx = ExecContext::new(surface, &self.config.styles, &mut self.last_value);
        let result = self.interpreter.execute(code, &mut ctx);
        let clear_requested = ctx.clear_requested();

        if let Some(err) = ctx.take_write_failure() {
            return Err(err);
        }
        drop(ctx);

        if let Err(err) = result {
            debug!(%err, "execution failed");
            let surface: &mut dyn Surface = if hidden {
                &mut discard
            } else {
                &mut self.surface
            };
            write_styled_error(surface, &self.config.styles, &err.to_string())?;
        }

        if clear_requested && !hidden {
            self.clear_screen()?;
        }

        Ok(())
    }

    fn run_startup(&mut self) -> Result<(), Error> {
        let Some(script) = self.config.startup.clone() else {
            return Ok(());
        };
        let hidden = !script.show_output;

        debug!(hidden, "running startup script");

        match self.interpreter.compile(&script.source, CompileMode::Final) {
            CompileOutcome::Complete(code) => self.execute(code, hidden),
            CompileOutcome::Incomplete => {
                warn!("startup script is incomplete");
                Ok(())
            }
            CompileOutcome::SyntaxError(message) => {
                warn!(%message, "startup script has a syntax error");

                if hidden {
                    Ok(())
                } else {
                    write_styled_error(
                        &mut self.surface,
                        &self.config.styles,
                        &format!("SyntaxError: {}", message),
                    )
                }
            }
        }
    }

    /// Print the banner and run the startup script. Hosts driving
    /// [`Session::step`] themselves call this once first.
    pub fn start(&mut self) -> Result<(), Error> {
        self.print_banner()?;
        self.run_startup()?;
        self.surface.flush()
    }

    /// [`Session::start`], then read and execute statements until input
    /// closes.
    ///
    /// In readonly mode returns `Ok(())` right after the startup script.
    /// Otherwise the loop ends only with [`Error::Closed`] or a surface
    /// write failure.
    pub async fn run(&mut self) -> Result<(), Error> {
        self.start()?;

        if self.config.readonly {
            debug!("readonly session, not reading input");
            return Ok(());
        }

        loop {
            self.step().await?;
        }
    }
}
