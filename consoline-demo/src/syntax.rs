//! Highlighting and completion for the calculator language

use consoline::complete::Completer;
use consoline::error::ProviderError;
use consoline::interpreter::Highlighter;
use consoline::style::Color;

use crate::calc::{Variables, BUILTINS, KEYWORDS};

pub struct CalcHighlighter;

impl CalcHighlighter {
    fn word_color(word: &str) -> Option<Color> {
        if KEYWORDS.contains(&word) {
            Some(Color::Magenta)
        } else if BUILTINS.contains(&word) {
            Some(Color::Cyan)
        } else {
            None
        }
    }
}

impl Highlighter for CalcHighlighter {
    fn highlight(&self, text: &str) -> Result<String, ProviderError> {
        let mut out = String::with_capacity(text.len() * 2);
        let mut rest = text;

        while let Some(c) = rest.chars().next() {
            let (len, color) = if c == '#' {
                (rest.len(), Some(Color::DarkGray))
            } else if c.is_ascii_digit() {
                let len = rest
                    .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                    .unwrap_or(rest.len());
                (len, Some(Color::Blue))
            } else if c.is_alphabetic() || c == '_' {
                let len = rest
                    .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                    .unwrap_or(rest.len());
                (len, Self::word_color(&rest[..len]))
            } else {
                (c.len_utf8(), None)
            };

            match color {
                Some(color) => out.push_str(&color.paint(&rest[..len]).to_string()),
                None => out.push_str(&rest[..len]),
            }
            rest = &rest[len..];
        }

        Ok(out)
    }
}

/// Completes keywords, builtins and defined variables
pub struct CalcCompleter {
    variables: Variables,
}

impl CalcCompleter {
    pub fn new(variables: Variables) -> Self {
        Self { variables }
    }
}

impl Completer for CalcCompleter {
    fn complete(&self, prefix: &str, index: usize) -> Result<Option<String>, ProviderError> {
        let variables = self.variables.borrow();

        let keywords = KEYWORDS.iter().map(|word| format!("{} ", word));
        let builtins = BUILTINS.iter().map(|word| format!("{}(", word));
        let names = variables.keys().cloned();

        let mut candidates = keywords
            .chain(builtins)
            .chain(names)
            .filter(|candidate| candidate.starts_with(prefix))
            .collect::<Vec<_>>();
        candidates.sort();

        Ok(candidates.into_iter().nth(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn highlight_keeps_text() {
        let highlighted = CalcHighlighter.highlight("if x1 > 10: # é").unwrap();

        assert_eq!(
            highlighted,
            "\x1b[35mif\x1b[0m x1 > \x1b[34m10\x1b[0m: \x1b[90m# é\x1b[0m"
        );
    }

    #[test]
    fn completes_names() {
        let variables = Variables::default();
        variables.borrow_mut().insert("price".to_string(), 1.0);
        let completer = CalcCompleter::new(variables.clone());

        assert_eq!(completer.complete("pr", 0).unwrap().as_deref(), Some("price"));
        assert_eq!(completer.complete("pr", 1).unwrap().as_deref(), Some("print("));
        assert_eq!(completer.complete("pr", 2).unwrap(), None);
        assert_eq!(completer.complete("wh", 0).unwrap().as_deref(), Some("while "));

        variables.borrow_mut().insert("whole".to_string(), 2.0);
        assert_eq!(completer.complete("wh", 0).unwrap().as_deref(), Some("while "));
        assert_eq!(completer.complete("wh", 1).unwrap().as_deref(), Some("whole"));
    }
}
