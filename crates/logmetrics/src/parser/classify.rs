//! Line classifier: one line in, exactly one [`ClassifiedLine`] out.
//!
//! Grammars are tried in a fixed order: header, traceback marker, exception
//! terminator, vote line. Anything else is `Plain`. The classifier holds only
//! compiled, immutable grammars, so classifying the same line twice always
//! gives the same answer.

use regex::Regex;

use super::layout::{HeaderGrammar, HeaderLayout, HeaderMiss, LayoutError};
use super::model::{ClassifiedLine, VoteCount};
use super::timestamp::{TimestampFormat, TimestampParser};
use super::MAX_LINE_SIZE;

const TRACEBACK_MARKER: &str = "Traceback";
const EXCEPTION_PATTERN: &str = r"^(?P<exception>[A-Za-z][A-Za-z0-9_]*)(?::.*)?$";
const VOTE_PATTERN: &str = r"^(?P<label>[A-Za-z][A-Za-z0-9_]*)\s+(?::\s*(?P<state>.*))?$";

/// Why a line that looked structured ended up as `Plain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demotion {
    /// Header layout matched but the timestamp did not parse.
    BadTimestamp,
    /// Line longer than the configured limit; not inspected.
    Oversize,
}

#[derive(Debug, Clone)]
pub struct LineClassifier {
    header: HeaderGrammar,
    exception: Regex,
    vote: Regex,
    max_line_size: usize,
}

impl LineClassifier {
    pub fn new(
        layout: HeaderLayout,
        timestamp_format: TimestampFormat,
        default_year: i32,
    ) -> Result<Self, LayoutError> {
        let header = HeaderGrammar::new(layout, TimestampParser::new(timestamp_format, default_year))?;
        Ok(Self {
            header,
            exception: Regex::new(EXCEPTION_PATTERN)?,
            vote: Regex::new(VOTE_PATTERN)?,
            max_line_size: MAX_LINE_SIZE,
        })
    }

    pub fn with_max_line_size(mut self, max_line_size: usize) -> Self {
        self.max_line_size = max_line_size;
        self
    }

    pub fn classify(&self, line: &str) -> ClassifiedLine {
        self.classify_detailed(line).0
    }

    /// Like [`classify`](Self::classify), also reporting why a line was
    /// demoted to `Plain`, if it was.
    pub fn classify_detailed(&self, line: &str) -> (ClassifiedLine, Option<Demotion>) {
        if line.len() > self.max_line_size {
            return (ClassifiedLine::Plain, Some(Demotion::Oversize));
        }

        match self.header.match_line(line) {
            Ok(fields) => return (ClassifiedLine::Header(fields), None),
            Err(HeaderMiss::BadTimestamp) => {
                tracing::trace!(line, "classifier: header with unparseable timestamp");
                return (ClassifiedLine::Plain, Some(Demotion::BadTimestamp));
            }
            Err(HeaderMiss::NoMatch) => {}
        }

        if line.starts_with(TRACEBACK_MARKER) {
            return (ClassifiedLine::TracebackMarker, None);
        }

        if let Some(caps) = self.exception.captures(line) {
            return (
                ClassifiedLine::ExceptionTerminator {
                    exception_name: caps["exception"].to_string(),
                },
                None,
            );
        }

        if let Some(caps) = self.vote.captures(line) {
            let state = caps
                .name("state")
                .map(|m| m.as_str().trim())
                .filter(|s| !s.is_empty());
            let (numerator, denominator) = state.map(split_fraction).unwrap_or((None, None));
            return (
                ClassifiedLine::VoteLine(VoteCount {
                    label: caps["label"].to_string(),
                    state: state.map(str::to_string),
                    numerator,
                    denominator,
                }),
                None,
            );
        }

        (ClassifiedLine::Plain, None)
    }
}

/// `"6/6"` → `(Some(6), Some(6))`. Both halves must be integers, otherwise
/// neither is reported.
fn split_fraction(state: &str) -> (Option<u32>, Option<u32>) {
    let Some((num, den)) = state.split_once('/') else {
        return (None, None);
    };
    match (num.trim().parse(), den.trim().parse()) {
        (Ok(num), Ok(den)) => (Some(num), Some(den)),
        _ => (None, None),
    }
}
