//! Listeners subscribed to the classified-line stream.
//!
//! Every listener sees every classified line of a session, in arrival order.
//! Listeners are independent: the exception-trace reconstructor and the
//! vote-tally extractor never look at each other's state.

use serde::Serialize;

use crate::emit::Event;
use crate::parser::ClassifiedLine;

use super::tally::VoteRecord;

/// Output unit of a parsing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Event(Event),
    Vote(VoteRecord),
}

impl Record {
    pub fn as_event(&self) -> Option<&Event> {
        match self {
            Record::Event(event) => Some(event),
            Record::Vote(_) => None,
        }
    }

    pub fn as_vote(&self) -> Option<&VoteRecord> {
        match self {
            Record::Vote(vote) => Some(vote),
            Record::Event(_) => None,
        }
    }
}

pub trait LineListener: Send {
    /// Name used in tracing output.
    fn name(&self) -> &'static str;

    /// Observe one classified line, pushing any completed records to `out`.
    fn observe(&mut self, line: &ClassifiedLine, out: &mut Vec<Record>);

    /// End of stream. Partially built records are discarded; returns whether
    /// one was pending.
    fn end_of_stream(&mut self) -> bool {
        false
    }
}
