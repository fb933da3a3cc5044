use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::parser::{Demotion, LineKind};

/// Per-line classification counters (hottest path - updated per log line)
#[derive(Debug, Default)]
pub struct LineMetrics {
    pub read: AtomicU64,
    pub header: AtomicU64,
    pub traceback_marker: AtomicU64,
    pub exception_terminator: AtomicU64,
    pub vote_line: AtomicU64,
    pub plain: AtomicU64,
}

/// Lines demoted to plain
#[derive(Debug, Default)]
pub struct DemotionMetrics {
    pub bad_timestamp: AtomicU64,
    pub oversize: AtomicU64,
}

/// Output counters
#[derive(Debug, Default)]
pub struct RecordMetrics {
    pub events: AtomicU64,
    pub votes: AtomicU64,
    pub incomplete_dropped: AtomicU64,
}

/// Counters for one parsing session.
///
/// The session task is the only writer. Readers (the binary, on shutdown)
/// take a [`snapshot`](Self::snapshot); individual loads are atomic but the
/// snapshot as a whole is not.
#[derive(Debug, Default)]
pub struct SessionMetrics {
    pub lines: LineMetrics,
    pub demotions: DemotionMetrics,
    pub records: RecordMetrics,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_line(&self, kind: LineKind, demotion: Option<Demotion>) {
        self.lines.read.fetch_add(1, Ordering::Relaxed);
        match kind {
            LineKind::Header => self.lines.header.fetch_add(1, Ordering::Relaxed),
            LineKind::TracebackMarker => self.lines.traceback_marker.fetch_add(1, Ordering::Relaxed),
            LineKind::ExceptionTerminator => self.lines.exception_terminator.fetch_add(1, Ordering::Relaxed),
            LineKind::VoteLine => self.lines.vote_line.fetch_add(1, Ordering::Relaxed),
            LineKind::Plain => self.lines.plain.fetch_add(1, Ordering::Relaxed),
        };
        match demotion {
            Some(Demotion::BadTimestamp) => {
                self.demotions.bad_timestamp.fetch_add(1, Ordering::Relaxed);
            }
            Some(Demotion::Oversize) => {
                self.demotions.oversize.fetch_add(1, Ordering::Relaxed);
            }
            None => {}
        }
    }

    #[inline]
    pub fn record_event(&self) {
        self.records.events.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_vote(&self) {
        self.records.votes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_incomplete(&self) {
        self.records.incomplete_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lines_read: self.lines.read.load(Ordering::Relaxed),
            headers: self.lines.header.load(Ordering::Relaxed),
            traceback_markers: self.lines.traceback_marker.load(Ordering::Relaxed),
            exception_terminators: self.lines.exception_terminator.load(Ordering::Relaxed),
            vote_lines: self.lines.vote_line.load(Ordering::Relaxed),
            plain_lines: self.lines.plain.load(Ordering::Relaxed),
            bad_timestamps: self.demotions.bad_timestamp.load(Ordering::Relaxed),
            oversize_lines: self.demotions.oversize.load(Ordering::Relaxed),
            events_emitted: self.records.events.load(Ordering::Relaxed),
            votes_emitted: self.records.votes.load(Ordering::Relaxed),
            incomplete_dropped: self.records.incomplete_dropped.load(Ordering::Relaxed),
        }
    }
}

/// A read-only snapshot of session metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub lines_read: u64,
    pub headers: u64,
    pub traceback_markers: u64,
    pub exception_terminators: u64,
    pub vote_lines: u64,
    pub plain_lines: u64,
    pub bad_timestamps: u64,
    pub oversize_lines: u64,
    pub events_emitted: u64,
    pub votes_emitted: u64,
    pub incomplete_dropped: u64,
}
