//! Tab completion

use tracing::warn;

use crate::error::ProviderError;

/// A type that provides completion candidates
///
/// ```
/// use consoline::complete::{Completer, ListCompleter};
///
/// let builtins = ListCompleter::new(["print", "property", "range"]);
///
/// assert_eq!(builtins.complete("pr", 1).unwrap().as_deref(), Some("property"));
/// assert_eq!(builtins.complete("pr", 2).unwrap(), None);
/// ```
pub trait Completer {
    /// Given the token `prefix`, return the `index`'th candidate that would
    /// replace it, or `None` once candidates are exhausted.
    fn complete(&self, prefix: &str, index: usize) -> Result<Option<String>, ProviderError>;
}

impl Completer for () {
    fn complete(&self, _: &str, _: usize) -> Result<Option<String>, ProviderError> {
        Ok(None)
    }
}

impl<T: Completer> Completer for &T {
    fn complete(&self, prefix: &str, index: usize) -> Result<Option<String>, ProviderError> {
        T::complete(self, prefix, index)
    }
}

/// Completes from a fixed word list
#[derive(Debug, Clone, Default)]
pub struct ListCompleter {
    words: Vec<String>,
}

impl ListCompleter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }
}

impl Completer for ListCompleter {
    fn complete(&self, prefix: &str, index: usize) -> Result<Option<String>, ProviderError> {
        Ok(self
            .words
            .iter()
            .filter(|word| word.starts_with(prefix))
            .nth(index)
            .cloned())
    }
}

/// Safety net against providers that never report exhaustion
pub const MAX_CANDIDATES: usize = 1000;

/// Start (in code points) of the completion token ending at `cursor`: the
/// longest run of word characters or `.` directly before it.
pub fn completion_token(chars: &[char], cursor: usize) -> usize {
    let cursor = cursor.min(chars.len());

    chars[..cursor]
        .iter()
        .rposition(|&c| !(c.is_alphanumeric() || c == '_' || c == '.'))
        .map_or(0, |pos| pos + 1)
}

/// Ask the provider for every candidate, in provider order without
/// duplicates. A failing provider counts as having no candidates.
pub fn collect_candidates<C: Completer>(completer: &C, prefix: &str) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();

    for index in 0..MAX_CANDIDATES {
        match completer.complete(prefix, index) {
            Ok(Some(candidate)) => {
                if !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
            Ok(None) => return candidates,
            Err(err) => {
                warn!(%err, prefix, "completion provider failed");
                return Vec::new();
            }
        }
    }

    warn!(prefix, "completion provider did not report exhaustion");
    candidates
}

/// What a Tab press should do
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Completion {
    /// No token or no candidates
    Nothing,
    /// Replace code points `start..end` with `text`
    Splice {
        start: usize,
        end: usize,
        text: String,
    },
    /// Several candidates to list above the prompt
    Listing(Vec<String>),
}

/// Decide how to complete the token ending at `cursor`
pub fn complete_at<C: Completer>(completer: &C, chars: &[char], cursor: usize) -> Completion {
    let cursor = cursor.min(chars.len());
    let start = completion_token(chars, cursor);

    if start == cursor {
        return Completion::Nothing;
    }

    let prefix: String = chars[start..cursor].iter().collect();
    let mut candidates = collect_candidates(completer, &prefix);

    match candidates.len() {
        0 => Completion::Nothing,
        1 => Completion::Splice {
            start,
            end: cursor,
            text: candidates.remove(0),
        },
        _ => Completion::Listing(candidates),
    }
}

/// Lay candidates out left-justified in as many columns as fit in `width`.
///
/// Every row, including a partial last one, ends with `"\r\n"`.
pub fn format_columns(candidates: &[String], width: usize) -> String {
    let longest = candidates
        .iter()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(0);
    let column_width = longest + 2;
    let columns = (width / column_width).max(1);

    let mut out = String::new();

    for (i, candidate) in candidates.iter().enumerate() {
        out.push_str(candidate);

        let pad = column_width - candidate.chars().count();
        out.extend(core::iter::repeat(' ').take(pad));

        if (i + 1) % columns == 0 {
            out.push_str("\r\n");
        }
    }

    if candidates.len() % columns != 0 {
        out.push_str("\r\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Failing;

    impl Completer for Failing {
        fn complete(&self, _: &str, _: usize) -> Result<Option<String>, ProviderError> {
            Err("provider exploded".into())
        }
    }

    struct Endless;

    impl Completer for Endless {
        fn complete(&self, prefix: &str, index: usize) -> Result<Option<String>, ProviderError> {
            Ok(Some(format!("{}{}", prefix, index % 3)))
        }
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn token() {
        assert_eq!(completion_token(&chars("x = os.pa"), 9), 4);
        assert_eq!(completion_token(&chars("pri"), 3), 0);
        assert_eq!(completion_token(&chars("f(a_b"), 5), 2);
        assert_eq!(completion_token(&chars("x "), 2), 2);
        assert_eq!(completion_token(&chars("abc def"), 2), 0);
    }

    #[test]
    fn single_candidate_splices() {
        let completer = ListCompleter::new(["print", "range"]);

        assert_eq!(
            complete_at(&completer, &chars("pri"), 3),
            Completion::Splice {
                start: 0,
                end: 3,
                text: "print".to_string()
            }
        );
    }

    #[test]
    fn several_candidates_list() {
        let completer = ListCompleter::new(["print", "property", "print"]);

        assert_eq!(
            complete_at(&completer, &chars("x = pr"), 6),
            Completion::Listing(vec!["print".to_string(), "property".to_string()])
        );
    }

    #[test]
    fn nothing_to_complete() {
        let completer = ListCompleter::new(["print"]);

        assert_eq!(complete_at(&completer, &chars("x = "), 4), Completion::Nothing);
        assert_eq!(complete_at(&completer, &chars("zz"), 2), Completion::Nothing);
        assert_eq!(complete_at(&(), &chars("pri"), 3), Completion::Nothing);
    }

    #[test]
    fn failing_provider_has_no_candidates() {
        assert_eq!(collect_candidates(&Failing, "pri"), Vec::<String>::new());
        assert_eq!(complete_at(&Failing, &chars("pri"), 3), Completion::Nothing);
    }

    #[test]
    fn endless_provider_is_capped() {
        assert_eq!(collect_candidates(&Endless, "a"), ["a0", "a1", "a2"]);
    }

    #[test]
    fn columns() {
        let candidates: Vec<String> = ["alpha", "beta", "gamma", "delta", "pi"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        // column width 7, three columns in 21 cells
        assert_eq!(
            format_columns(&candidates, 21),
            "alpha  beta   gamma  \r\ndelta  pi     \r\n"
        );

        assert_eq!(
            format_columns(&candidates[..3], 21),
            "alpha  beta   gamma  \r\n"
        );

        // narrower than one column still gives one column
        assert_eq!(format_columns(&candidates[..2], 3), "alpha  \r\nbeta   \r\n");
    }
}
