//! Vote-tally extraction.
//!
//! A header whose message contains the sentinel (`Votes : Votes` by default)
//! opens a block; each following vote line becomes a [`VoteRecord`] stamped
//! with the opening header's timestamp. The block closes at the next header
//! or at the first line that is not a vote line.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::parser::{ClassifiedLine, VoteCount};

use super::listener::{LineListener, Record};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub label: String,
    pub state: Option<String>,
    pub numerator: Option<u32>,
    pub denominator: Option<u32>,
    pub timestamp: NaiveDateTime,
}

impl VoteRecord {
    fn new(count: &VoteCount, timestamp: NaiveDateTime) -> Self {
        Self {
            label: count.label.clone(),
            state: count.state.clone(),
            numerator: count.numerator,
            denominator: count.denominator,
            timestamp,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VoteTally {
    sentinel: String,
    /// Timestamp of the sentinel header while a block is open.
    open: Option<NaiveDateTime>,
}

impl VoteTally {
    pub fn new(sentinel: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
            open: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn feed(&mut self, line: &ClassifiedLine) -> Option<VoteRecord> {
        match line {
            ClassifiedLine::Header(header) => {
                if header.message.contains(&self.sentinel) {
                    tracing::trace!(timestamp = %header.timestamp, "tally: block opened");
                    self.open = Some(header.timestamp);
                } else {
                    self.open = None;
                }
                None
            }
            ClassifiedLine::VoteLine(count) => self.open.map(|ts| VoteRecord::new(count, ts)),
            _ => {
                self.open = None;
                None
            }
        }
    }
}

impl LineListener for VoteTally {
    fn name(&self) -> &'static str {
        "tally"
    }

    fn observe(&mut self, line: &ClassifiedLine, out: &mut Vec<Record>) {
        if let Some(vote) = self.feed(line) {
            out.push(Record::Vote(vote));
        }
    }

    fn end_of_stream(&mut self) -> bool {
        // votes are emitted line by line; nothing is lost
        self.open = None;
        false
    }
}
