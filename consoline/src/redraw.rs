//! Escape-sequence vocabulary written to the surface
//!
//! The editor only ever manages one logical line, so every redraw is
//! "return to column 0, clear, rewrite, step the cursor back".

/// Return to column 0 and clear to end of line
pub const CLEAR_LINE: &str = "\r\x1b[K";
/// Erase screen and scrollback, cursor stays put
pub const ERASE_SCREEN: &str = "\x1b[2J\x1b[3J";
pub const BELL: &str = "\x07";
pub const SHOW_CURSOR: &str = "\x1b[?25h";
pub const HIDE_CURSOR: &str = "\x1b[?25l";
pub const NEWLINE: &str = "\r\n";

pub fn cursor_left(n: usize) -> String {
    if n == 0 {
        String::new()
    } else {
        format!("\x1b[{}D", n)
    }
}

pub fn cursor_right(n: usize) -> String {
    if n == 0 {
        String::new()
    } else {
        format!("\x1b[{}C", n)
    }
}

/// Relative horizontal move, negative is left
pub fn cursor_move(delta: isize) -> String {
    if delta < 0 {
        cursor_left(delta.unsigned_abs())
    } else {
        cursor_right(delta as usize)
    }
}

/// Absolute position, both zero-based
pub fn cursor_to(row: usize, column: usize) -> String {
    format!("\x1b[{};{}H", row + 1, column + 1)
}

/// Erase screen and scrollback, cursor to top left
pub fn clear_screen() -> String {
    format!("{}{}", ERASE_SCREEN, cursor_to(0, 0))
}

/// Full rewrite of the edit line.
///
/// `semantic_len` is the buffer length in code points; `highlighted` may be
/// longer because of styling, but only `semantic_len` counts for the cursor.
pub fn render_line(prompt: &str, highlighted: &str, semantic_len: usize, cursor: usize) -> String {
    let mut out = String::with_capacity(CLEAR_LINE.len() + prompt.len() + highlighted.len() + 8);

    out.push_str(CLEAR_LINE);
    out.push_str(prompt);
    out.push_str(highlighted);
    out.push_str(&cursor_left(semantic_len.saturating_sub(cursor)));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn moves() {
        assert_eq!(cursor_left(0), "");
        assert_eq!(cursor_left(3), "\x1b[3D");
        assert_eq!(cursor_right(12), "\x1b[12C");
        assert_eq!(cursor_move(-2), "\x1b[2D");
        assert_eq!(cursor_move(1), "\x1b[1C");
        assert_eq!(cursor_move(0), "");
        assert_eq!(cursor_to(0, 0), "\x1b[1;1H");
        assert_eq!(cursor_to(4, 9), "\x1b[5;10H");
        assert_eq!(clear_screen(), "\x1b[2J\x1b[3J\x1b[1;1H");
    }

    #[test]
    fn render() {
        assert_eq!(render_line("> ", "abc", 3, 3), "\r\x1b[K> abc");
        assert_eq!(render_line("> ", "abc", 3, 1), "\r\x1b[K> abc\x1b[2D");
    }

    #[test]
    fn render_ignores_styling_length() {
        let styled = "\x1b[34mabc\x1b[0m";

        assert_eq!(
            render_line("> ", styled, 3, 0),
            "\r\x1b[K> \x1b[34mabc\x1b[0m\x1b[3D"
        );
    }
}
