//! Single-line edit buffer with a code point cursor

use core::ops::Range;

/// Visual effect of an edit
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum Edit {
    /// Buffer contents changed, the line must be rewritten
    Changed,
    /// Only the cursor moved, by this many cells (negative is left)
    CursorMoved(isize),
    /// Nothing happened
    Unchanged,
}

/// Text plus cursor, where the cursor counts code points and always lies in
/// `0..=len`.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct LineBuffer {
    buf: String,
    cursor: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Length in code points
    pub fn len(&self) -> usize {
        self.buf.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.buf.chars()
    }

    fn char_ranges(&self) -> impl Iterator<Item = (Range<usize>, char)> + '_ {
        self.buf
            .char_indices()
            .map(|(start, c)| (start..start + c.len_utf8(), c))
    }

    fn get_byte_position(&self, char_index: usize) -> usize {
        self.buf
            .char_indices()
            .nth(char_index)
            .map(|(pos, _)| pos)
            .unwrap_or(self.buf.len())
    }

    /// Replace the contents, placing the cursor at the end
    pub fn set(&mut self, text: &str) {
        self.buf.clear();
        self.buf.push_str(text);
        self.cursor = self.len();
    }

    pub fn clear(&mut self) {
        self.set("");
    }

    pub fn insert(&mut self, c: char) -> Edit {
        let pos = self.get_byte_position(self.cursor);

        self.buf.insert(pos, c);
        self.cursor += 1;

        Edit::Changed
    }

    pub fn insert_str(&mut self, s: &str) -> Edit {
        if s.is_empty() {
            return Edit::Unchanged;
        }

        let pos = self.get_byte_position(self.cursor);

        self.buf.insert_str(pos, s);
        self.cursor += s.chars().count();

        Edit::Changed
    }

    pub fn delete_before(&mut self) -> Edit {
        if self.cursor == 0 {
            return Edit::Unchanged;
        }

        let found = self.char_ranges().nth(self.cursor - 1);

        if let Some((range, _)) = found {
            self.buf.replace_range(range, "");
            self.cursor -= 1;
        }

        Edit::Changed
    }

    /// Replace code points `start..end` with `text`, leaving the cursor at
    /// the end of the inserted text.
    pub fn splice(&mut self, start: usize, end: usize, text: &str) -> Edit {
        let len = self.len();
        let end = end.min(len);
        let start = start.min(end);

        let byte_start = self.get_byte_position(start);
        let byte_end = self.get_byte_position(end);

        self.buf.replace_range(byte_start..byte_end, text);
        self.cursor = start + text.chars().count();

        Edit::Changed
    }

    fn move_to(&mut self, cursor: usize) -> Edit {
        let cursor = cursor.min(self.len());
        let delta = cursor as isize - self.cursor as isize;

        self.cursor = cursor;

        if delta == 0 {
            Edit::Unchanged
        } else {
            Edit::CursorMoved(delta)
        }
    }

    pub fn move_left(&mut self) -> Edit {
        self.move_to(self.cursor.saturating_sub(1))
    }

    pub fn move_right(&mut self) -> Edit {
        self.move_to(self.cursor + 1)
    }

    pub fn move_home(&mut self) -> Edit {
        self.move_to(0)
    }

    pub fn move_end(&mut self) -> Edit {
        self.move_to(self.len())
    }
}
