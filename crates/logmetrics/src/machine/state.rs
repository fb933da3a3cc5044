//! Record reconstructor: exception-trace state machine.
//!
//! Possible transitions:
//!
//! `LookingForStart`
//! - ERROR header: remember the header, go to `FindStackTraceStart`
//! - other header with a severity: emit an event, stay
//! - anything else: stay
//!
//! `FindStackTraceStart`
//! - `Traceback` marker: go to `FindStackTraceEnd`
//! - header with a severity: re-enter `LookingForStart` with the same line
//! - anything else: stay
//!
//! `FindStackTraceEnd`
//! - exception terminator: emit an event tagged `exception:<name>`, go to
//!   `LookingForStart`
//! - header with a severity: re-enter `LookingForStart` with the same line
//! - anything else: stay
//!
//! Re-entry is evaluated by a trampoline in [`step`], never by recursion.

use chrono::NaiveDateTime;

use crate::emit::{exception_tag, make_event, Event};
use crate::parser::{ClassifiedLine, HeaderFields};

use super::listener::{LineListener, Record};

/// Header fields kept while waiting for a traceback to finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRecord {
    pub timestamp: NaiveDateTime,
    pub severity: String,
    pub logger: String,
    pub location: String,
}

impl PendingRecord {
    fn from_header(header: &HeaderFields, severity: &str) -> Self {
        Self {
            timestamp: header.timestamp,
            severity: severity.to_string(),
            logger: header.logger.clone(),
            location: header.location.clone(),
        }
    }
}

/// Parser state. The pending record lives inside the two trace states, so it
/// cannot outlive them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParserState {
    #[default]
    LookingForStart,
    FindStackTraceStart(PendingRecord),
    FindStackTraceEnd(PendingRecord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateName {
    LookingForStart,
    FindStackTraceStart,
    FindStackTraceEnd,
}

impl ParserState {
    pub fn name(&self) -> StateName {
        match self {
            ParserState::LookingForStart => StateName::LookingForStart,
            ParserState::FindStackTraceStart(_) => StateName::FindStackTraceStart,
            ParserState::FindStackTraceEnd(_) => StateName::FindStackTraceEnd,
        }
    }

    pub fn pending(&self) -> Option<&PendingRecord> {
        match self {
            ParserState::LookingForStart => None,
            ParserState::FindStackTraceStart(p) | ParserState::FindStackTraceEnd(p) => Some(p),
        }
    }
}

/// Result of a single transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Done(ParserState, Option<Event>),
    /// Evaluate the same line again from this state.
    Reenter(ParserState),
}

/// One transition, no re-entry.
pub fn transition(state: ParserState, line: &ClassifiedLine) -> Step {
    match (state, line) {
        (ParserState::LookingForStart, ClassifiedLine::Header(header)) => {
            match header.severity.as_deref() {
                Some(severity) if header.is_error() => Step::Done(
                    ParserState::FindStackTraceStart(PendingRecord::from_header(header, severity)),
                    None,
                ),
                Some(severity) => Step::Done(
                    ParserState::LookingForStart,
                    Some(make_event(&header.logger, severity, header.timestamp, Vec::new())),
                ),
                None => Step::Done(ParserState::LookingForStart, None),
            }
        }
        (ParserState::LookingForStart, _) => Step::Done(ParserState::LookingForStart, None),

        // a header without severity does not interrupt a trace
        (state, ClassifiedLine::Header(header)) if header.severity.is_none() => Step::Done(state, None),
        (_, ClassifiedLine::Header(_)) => Step::Reenter(ParserState::LookingForStart),

        (ParserState::FindStackTraceStart(pending), ClassifiedLine::TracebackMarker) => {
            Step::Done(ParserState::FindStackTraceEnd(pending), None)
        }

        (ParserState::FindStackTraceEnd(pending), ClassifiedLine::ExceptionTerminator { exception_name }) => {
            let event = make_event(
                &pending.logger,
                &pending.severity,
                pending.timestamp,
                [exception_tag(exception_name)],
            );
            Step::Done(ParserState::LookingForStart, Some(event))
        }

        (state, _) => Step::Done(state, None),
    }
}

/// Run [`transition`] until it settles.
pub fn step(mut state: ParserState, line: &ClassifiedLine) -> (ParserState, Option<Event>) {
    loop {
        match transition(state, line) {
            Step::Done(next, event) => return (next, event),
            Step::Reenter(next) => {
                debug_assert_eq!(next.name(), StateName::LookingForStart);
                state = next;
            }
        }
    }
}

/// Owns the parser state for one session.
#[derive(Debug, Default)]
pub struct Reconstructor {
    state: ParserState,
}

impl Reconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    pub fn feed(&mut self, line: &ClassifiedLine) -> Option<Event> {
        let from = self.state.name();
        let (next, event) = step(std::mem::take(&mut self.state), line);
        if next.name() != from {
            tracing::trace!(?from, to = ?next.name(), "reconstructor: transition");
        }
        self.state = next;
        event
    }

    /// Drop whatever is pending and return to `LookingForStart`.
    pub fn reset(&mut self) -> Option<PendingRecord> {
        match std::mem::take(&mut self.state) {
            ParserState::LookingForStart => None,
            ParserState::FindStackTraceStart(p) | ParserState::FindStackTraceEnd(p) => Some(p),
        }
    }
}

impl LineListener for Reconstructor {
    fn name(&self) -> &'static str {
        "reconstructor"
    }

    fn observe(&mut self, line: &ClassifiedLine, out: &mut Vec<Record>) {
        if let Some(event) = self.feed(line) {
            out.push(Record::Event(event));
        }
    }

    fn end_of_stream(&mut self) -> bool {
        match self.reset() {
            Some(pending) => {
                tracing::debug!(
                    logger = %pending.logger,
                    timestamp = %pending.timestamp,
                    "reconstructor: stream ended mid-trace, dropping record"
                );
                true
            }
            None => false,
        }
    }
}
