use crate::error::{Error, ExecError, ProviderError};
use crate::interpreter::{CompileMode, CompileOutcome, ExecContext, Highlighter, Interpreter};
use crate::style::Color;
use crate::surface::Surface;

pub mod csi {
    pub const UP: &str = "\x1b[A";
    pub const DOWN: &str = "\x1b[B";
    pub const RIGHT: &str = "\x1b[C";
    pub const LEFT: &str = "\x1b[D";
    pub const HOME: &str = "\x1b[1~";
    pub const DELETE: &str = "\x1b[3~";
    pub const END: &str = "\x1b[4~";
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct Cursor {
    pub row: usize,
    pub column: usize,
}

impl Cursor {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

#[derive(Debug)]
enum State {
    Ground,
    Escape,
    Csi(String),
}

/// Surface that interprets what the editor writes into a screen model
pub struct MockSurface {
    state: State,
    screen: Vec<Vec<char>>,
    pub cursor: Cursor,
    rows: usize,
    columns: usize,
    pub bell: bool,
    pub cursor_visible: bool,
    pub clears: usize,
    output: String,
}

impl MockSurface {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            state: State::Ground,
            screen: vec![vec!['\0'; columns]; rows],
            cursor: Cursor::default(),
            rows,
            columns,
            bell: false,
            cursor_visible: true,
            clears: 0,
            output: String::new(),
        }
    }

    /// Everything written so far, escape sequences included
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn screen_as_string(&self) -> String {
        self.screen
            .iter()
            .map(|v| v.iter().take_while(|&&c| c != '\0').collect::<String>())
            .filter(|s| !s.is_empty())
            .collect::<Vec<String>>()
            .join("\n")
    }

    /// Text of the row the cursor is on
    pub fn current_line(&self) -> String {
        self.screen[self.cursor.row]
            .iter()
            .take_while(|&&c| c != '\0')
            .collect()
    }

    fn move_column(&mut self, steps: isize) {
        self.cursor.column =
            0.max((self.cursor.column as isize + steps).min(self.columns as isize - 1)) as usize;
    }

    fn scroll_up(&mut self, lines: usize) {
        for _ in 0..lines {
            self.screen.remove(0);
            self.screen.push(vec!['\0'; self.columns]);
        }
    }

    fn line_feed(&mut self) {
        if self.cursor.row + 1 == self.rows {
            self.scroll_up(1);
        } else {
            self.cursor.row += 1;
        }
    }

    fn print(&mut self, c: char) {
        let Cursor { row, column } = self.cursor;

        self.screen[row][column] = c;
        self.move_column(1);
    }

    fn erase_line_from_cursor(&mut self) {
        let Cursor { row, column } = self.cursor;

        for cell in &mut self.screen[row][column..] {
            *cell = '\0';
        }
    }

    fn csi(&mut self, params: &str, c: char) {
        let mut args = params
            .trim_start_matches('?')
            .split(';')
            .map(|arg| arg.parse::<usize>().ok());
        let arg1 = args.next().flatten();
        let arg2 = args.next().flatten();

        match c {
            'A' | 'B' => unimplemented!("vertical cursor movement"),
            'C' => self.move_column(arg1.unwrap_or(1) as isize),
            'D' => self.move_column(-(arg1.unwrap_or(1) as isize)),
            'H' => {
                self.cursor = Cursor::new(
                    (arg1.unwrap_or(1) - 1).min(self.rows - 1),
                    (arg2.unwrap_or(1) - 1).min(self.columns - 1),
                );
            }
            'J' => {
                if arg1 == Some(2) {
                    self.screen = vec![vec!['\0'; self.columns]; self.rows];
                    self.clears += 1;
                }
            }
            'K' => self.erase_line_from_cursor(),
            'm' => (),
            'h' if params == "?25" => self.cursor_visible = true,
            'l' if params == "?25" => self.cursor_visible = false,
            _ => unimplemented!("CSI {:?} {:?}", params, c),
        }
    }

    fn advance(&mut self, c: char) {
        match core::mem::replace(&mut self.state, State::Ground) {
            State::Ground => match c {
                '\x1b' => self.state = State::Escape,
                '\r' => self.cursor.column = 0,
                '\n' => self.line_feed(),
                '\x07' => self.bell = true,
                c if c.is_control() => unimplemented!("control {:?}", c),
                c => self.print(c),
            },
            State::Escape => match c {
                '[' => self.state = State::Csi(String::new()),
                _ => unimplemented!("escape {:?}", c),
            },
            State::Csi(mut params) => match c {
                '\x40'..='\x7e' => self.csi(&params, c),
                _ => {
                    params.push(c);
                    self.state = State::Csi(params);
                }
            },
        }
    }
}

impl Surface for MockSurface {
    fn write(&mut self, text: &str) -> Result<(), Error> {
        self.output.push_str(text);

        for c in text.chars() {
            self.advance(c);
        }

        Ok(())
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.columns
    }
}

/// Scripted completeness oracle and executor
///
/// - `!` anywhere is a syntax error
/// - unbalanced brackets are incomplete
/// - a line ending in `:` keeps the statement open until a blank line
/// - `boom` raises, `show X` displays `X`, `print X` writes `X`, `clear()`
///   clears the screen
#[derive(Debug, Default)]
pub struct MockInterpreter {
    pub compiled: Vec<(String, CompileMode)>,
    pub executed: Vec<String>,
}

impl MockInterpreter {
    pub fn new() -> Self {
        Self::default()
    }
}

fn bracket_depth(source: &str) -> isize {
    source.chars().fold(0, |depth, c| match c {
        '(' | '[' | '{' => depth + 1,
        ')' | ']' | '}' => depth - 1,
        _ => depth,
    })
}

impl Interpreter for MockInterpreter {
    type Code = String;

    fn compile(&mut self, source: &str, mode: CompileMode) -> CompileOutcome<String> {
        self.compiled.push((source.to_string(), mode));

        if source.contains('!') {
            return CompileOutcome::SyntaxError("invalid syntax".to_string());
        }

        match bracket_depth(source) {
            depth if depth < 0 => {
                return CompileOutcome::SyntaxError("unmatched bracket".to_string())
            }
            depth if depth > 0 => return CompileOutcome::Incomplete,
            _ => (),
        }

        let opens_block = |line: &str| line.trim_end().ends_with(':');

        match mode {
            CompileMode::Interactive if source.lines().any(opens_block) => {
                CompileOutcome::Incomplete
            }
            CompileMode::Final if source.lines().last().map_or(false, opens_block) => {
                CompileOutcome::SyntaxError("expected an indented block".to_string())
            }
            _ => CompileOutcome::Complete(source.to_string()),
        }
    }

    fn execute(&mut self, code: String, ctx: &mut ExecContext<'_>) -> Result<(), ExecError> {
        self.executed.push(code.clone());

        if code == "boom" {
            return Err(ExecError::new("RuntimeError", "boom"));
        }

        if code == "clear()" {
            ctx.request_clear();
        } else if let Some(value) = code.strip_prefix("show ") {
            ctx.display(value)?;
        } else if let Some(text) = code.strip_prefix("print ") {
            ctx.write(text)?;
            ctx.write("\n")?;
        }

        Ok(())
    }
}

/// Paints digits blue so the highlighted text is longer than the source
pub struct DigitHighlighter;

impl Highlighter for DigitHighlighter {
    fn highlight(&self, text: &str) -> Result<String, ProviderError> {
        Ok(text
            .chars()
            .map(|c| {
                if c.is_ascii_digit() {
                    Color::Blue.paint(c.to_string()).to_string()
                } else {
                    c.to_string()
                }
            })
            .collect())
    }
}

pub struct FailingHighlighter;

impl Highlighter for FailingHighlighter {
    fn highlight(&self, _: &str) -> Result<String, ProviderError> {
        Err("highlighter crashed".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_surface() {
        let mut surface = MockSurface::new(4, 20);

        surface.write(">>> abc\x1b[2D").unwrap();

        assert_eq!(surface.cursor, Cursor::new(0, 5));

        surface.write("\r\x1b[K>>> x").unwrap();

        assert_eq!(surface.screen_as_string(), ">>> x");

        surface.write("\r\n\x1b[32m...\x1b[0m y\x07").unwrap();

        assert_eq!(surface.screen_as_string(), ">>> x\n... y");
        assert!(surface.bell);

        surface.write("\x1b[?25l\x1b[2J\x1b[3J\x1b[H").unwrap();

        assert_eq!(surface.screen_as_string(), "");
        assert_eq!(surface.cursor, Cursor::new(0, 0));
        assert_eq!(surface.clears, 1);
        assert!(!surface.cursor_visible);
    }

    #[test]
    fn mock_surface_scrolls() {
        let mut surface = MockSurface::new(2, 10);

        surface.write("a\r\nb\r\nc").unwrap();

        assert_eq!(surface.screen_as_string(), "b\nc");
    }
}
