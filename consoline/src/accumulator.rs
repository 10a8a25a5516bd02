//! Multi-line statement accumulation
//!
//! Decides, for every accepted line, whether the statement continues, is
//! ready to execute, or is a syntax error, and computes the auto-indent of
//! the next continuation line.

use tracing::debug;

use crate::interpreter::{CompileMode, CompileOutcome, Interpreter};

/// Auto-indent configuration
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct IndentRules {
    /// Cells added after a block opener and removed by a dedent
    pub unit: usize,
    /// Trailing tokens that open a block, e.g. `:`
    pub openers: Vec<String>,
}

impl Default for IndentRules {
    fn default() -> Self {
        Self {
            unit: 4,
            openers: vec![":".to_string()],
        }
    }
}

impl IndentRules {
    /// Indent for the line following `line`: its own leading whitespace,
    /// plus one unit if it ends in a block opener.
    pub fn next_indent(&self, line: &str) -> usize {
        let leading = line.chars().take_while(|c| c.is_whitespace()).count();
        let trimmed = line.trim_end();

        let opens_block = !trimmed.is_empty()
            && self
                .openers
                .iter()
                .any(|opener| !opener.is_empty() && trimmed.ends_with(opener.as_str()));

        if opens_block {
            leading + self.unit
        } else {
            leading
        }
    }

    /// Indent after a dedent request. Approximate: it ignores the actual
    /// block structure and always removes one fixed unit.
    pub fn dedent(&self, width: usize) -> usize {
        width.saturating_sub(self.unit)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Mode {
    FreshStatement,
    Continuing,
}

/// Outcome of submitting one line
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Submission<C> {
    /// Blank line on a fresh statement, nothing to do
    Discard,
    /// A complete statement: record `source` and execute `code`
    Execute { source: String, code: C },
    /// More lines needed; the next one starts with `indent` cells. A
    /// dedent request yields this too, without accumulating anything.
    Continue { indent: usize },
    /// The statement was discarded
    SyntaxError(String),
}

#[derive(Debug, Default)]
pub struct Accumulator {
    pending: Vec<String>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        if self.pending.is_empty() {
            Mode::FreshStatement
        } else {
            Mode::Continuing
        }
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Drop the statement in progress
    pub fn reset(&mut self) {
        if !self.pending.is_empty() {
            debug!(lines = self.pending.len(), "discarding pending statement");
        }
        self.pending.clear();
    }

    /// A whitespace-only continuation line that still has indentation asks
    /// for one unit less instead of ending the statement. Returns the indent
    /// to rewrite the line with, or `None` if `line` is a plain submission.
    pub fn dedent_request(&self, line: &str, rules: &IndentRules) -> Option<usize> {
        let width = line.chars().count();

        if self.mode() != Mode::Continuing || width == 0 || !line.trim().is_empty() {
            return None;
        }

        let indent = rules.dedent(width);
        debug!(width, indent, "dedent");
        Some(indent)
    }

    pub fn submit<I: Interpreter>(
        &mut self,
        line: &str,
        interpreter: &mut I,
        rules: &IndentRules,
    ) -> Submission<I::Code> {
        let blank = line.trim().is_empty();

        match self.mode() {
            Mode::FreshStatement if blank => Submission::Discard,
            Mode::FreshStatement => {
                let outcome = interpreter.compile(line, CompileMode::Interactive);
                self.handle(line, outcome, rules)
            }
            Mode::Continuing if blank => match self.dedent_request(line, rules) {
                Some(indent) => Submission::Continue { indent },
                None => self.finish(interpreter),
            },
            Mode::Continuing => {
                self.pending.push(line.to_string());
                let source = self.pending.join("\n");
                let outcome = interpreter.compile(&source, CompileMode::Interactive);
                self.handle(line, outcome, rules)
            }
        }
    }

    fn handle<C>(
        &mut self,
        line: &str,
        outcome: CompileOutcome<C>,
        rules: &IndentRules,
    ) -> Submission<C> {
        match outcome {
            CompileOutcome::Complete(code) => {
                let source = if self.pending.is_empty() {
                    line.to_string()
                } else {
                    self.pending.join("\n")
                };
                self.pending.clear();
                debug!(%source, "statement complete");
                Submission::Execute { source, code }
            }
            CompileOutcome::Incomplete => {
                if self.pending.is_empty() {
                    self.pending.push(line.to_string());
                }
                let indent = rules.next_indent(line);
                debug!(lines = self.pending.len(), indent, "statement continues");
                Submission::Continue { indent }
            }
            CompileOutcome::SyntaxError(message) => {
                self.reset();
                Submission::SyntaxError(message)
            }
        }
    }

    /// End of statement: validate and hand over everything accumulated
    fn finish<I: Interpreter>(&mut self, interpreter: &mut I) -> Submission<I::Code> {
        while self
            .pending
            .last()
            .map_or(false, |line| line.trim().is_empty())
        {
            self.pending.pop();
        }

        let source = self.pending.join("\n");
        self.pending.clear();

        if source.trim().is_empty() {
            return Submission::Discard;
        }

        match interpreter.compile(&source, CompileMode::Final) {
            CompileOutcome::Complete(code) => {
                debug!(%source, "statement complete");
                Submission::Execute { source, code }
            }
            CompileOutcome::Incomplete => {
                Submission::SyntaxError("unexpected end of input".to_string())
            }
            CompileOutcome::SyntaxError(message) => Submission::SyntaxError(message),
        }
    }
}
