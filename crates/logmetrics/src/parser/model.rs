use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Which grammar a single line matched.
///
/// Classification is total: every line maps to exactly one variant, with
/// [`ClassifiedLine::Plain`] as the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedLine {
    /// A line that opens a new logical record.
    Header(HeaderFields),
    /// `<Identifier>[: rest]`, the last line of a stack trace.
    ExceptionTerminator { exception_name: String },
    /// The literal `Traceback` sentinel line.
    TracebackMarker,
    /// One line of a vote-tally block, e.g. `True      : 6/6`.
    VoteLine(VoteCount),
    /// Free text.
    Plain,
}

impl ClassifiedLine {
    pub fn kind(&self) -> LineKind {
        match self {
            ClassifiedLine::Header(_) => LineKind::Header,
            ClassifiedLine::ExceptionTerminator { .. } => LineKind::ExceptionTerminator,
            ClassifiedLine::TracebackMarker => LineKind::TracebackMarker,
            ClassifiedLine::VoteLine(_) => LineKind::VoteLine,
            ClassifiedLine::Plain => LineKind::Plain,
        }
    }

    pub fn is_header(&self) -> bool {
        matches!(self, ClassifiedLine::Header(_))
    }
}

/// Fieldless tag of [`ClassifiedLine`], used for counters and tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Header,
    ExceptionTerminator,
    TracebackMarker,
    VoteLine,
    Plain,
}

impl LineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineKind::Header => "header",
            LineKind::ExceptionTerminator => "exception_terminator",
            LineKind::TracebackMarker => "traceback_marker",
            LineKind::VoteLine => "vote_line",
            LineKind::Plain => "plain",
        }
    }
}

/// Fields captured from a header line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderFields {
    pub timestamp: NaiveDateTime,
    /// `None` when the severity field is empty.
    pub severity: Option<String>,
    /// Logger name (pipe layout) or channel (space layout).
    pub logger: String,
    pub location: String,
    pub message: String,
    /// Only the space-delimited layout carries `[file:function:line]`.
    pub call_site: Option<CallSite>,
}

impl HeaderFields {
    pub fn is_error(&self) -> bool {
        self.severity.as_deref() == Some("ERROR")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallSite {
    pub file: String,
    pub function: String,
    pub line: String,
}

impl CallSite {
    /// Aggregation key, `file-function-line`.
    pub fn key(&self) -> String {
        format!("{}-{}-{}", self.file, self.function, self.line)
    }
}

/// A `label : state` line inside a vote-tally block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteCount {
    pub label: String,
    /// Text after the colon, trimmed. `None` when the line has no colon.
    pub state: Option<String>,
    pub numerator: Option<u32>,
    pub denominator: Option<u32>,
}
