//! Statement history

use tracing::debug;

/// Trait for statement history
pub trait History {
    /// Return entry at index, or None if out of bounds
    fn get_entry(&self, index: usize) -> Option<&str>;

    /// Add new entry at the end
    fn add_entry<'a>(&mut self, entry: &'a str) -> Result<(), &'a str>;

    /// Return number of entries in history
    fn number_of_entries(&self) -> usize;

    /// Add entries from an iterator, stopping at the first rejected one
    fn load_entries<'a, I: Iterator<Item = &'a str>>(&mut self, entries: I) -> usize {
        entries
            .take_while(|entry| self.add_entry(entry).is_ok())
            .count()
    }
}

/// Return an iterator over history entries, oldest first
pub fn get_history_entries<H: History>(history: &H) -> impl Iterator<Item = &str> + '_ {
    (0..history.number_of_entries()).filter_map(|index| history.get_entry(index))
}

/// Append-only history that lives as long as the session
#[derive(Debug, Default, Clone)]
pub struct UnboundedHistory {
    entries: Vec<String>,
}

impl UnboundedHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl History for UnboundedHistory {
    fn get_entry(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    fn add_entry<'a>(&mut self, entry: &'a str) -> Result<(), &'a str> {
        self.entries.push(entry.to_string());
        Ok(())
    }

    fn number_of_entries(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Direction {
    Older,
    Newer,
}

/// History plus browse cursor
///
/// The cursor lies in `0..=len`; `len` is the empty "present" slot past
/// every entry.
#[derive(Debug)]
pub struct HistoryNavigator<H: History> {
    history: H,
    position: usize,
}

impl<H: History> HistoryNavigator<H> {
    pub fn new(history: H) -> Self {
        let position = history.number_of_entries();

        Self { history, position }
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the cursor back to the present slot
    pub fn reset(&mut self) {
        self.position = self.history.number_of_entries();
    }

    /// Record an accepted statement. Blank sources are ignored.
    pub fn record_accepted(&mut self, source: &str) {
        let entry = source.trim();

        if !entry.is_empty() {
            match self.history.add_entry(entry) {
                Ok(()) => debug!(entry, "history entry added"),
                Err(entry) => debug!(entry, "history rejected entry"),
            }
        }

        self.reset();
    }

    /// Bulk-load earlier entries, returning how many were accepted
    pub fn load<'a, I: IntoIterator<Item = &'a str>>(&mut self, entries: I) -> usize {
        let count = self.history.load_entries(entries.into_iter());

        self.reset();

        count
    }

    /// Step the cursor and return the text to show.
    ///
    /// `None` when the history is empty. Multi-line entries are shown by
    /// their first line only.
    pub fn browse(&mut self, direction: Direction) -> Option<String> {
        let len = self.history.number_of_entries();

        if len == 0 {
            return None;
        }

        self.position = match direction {
            Direction::Older => self.position.saturating_sub(1),
            Direction::Newer => (self.position + 1).min(len),
        };

        if self.position == len {
            return Some(String::new());
        }

        let entry = self.history.get_entry(self.position)?;

        Some(entry.lines().next().unwrap_or("").to_string())
    }
}
