//! One parsing session: classifier plus listeners over a single log stream.
//!
//! A session is confined to one task. Lines must be fed in arrival order;
//! the reconstructor relies on it to notice a new header interrupting a
//! trace.

use std::borrow::Cow;
use std::sync::Arc;

use serde::Serialize;

use crate::conf::ParserConfig;
use crate::machine::{CallSiteCount, CallSiteCounter, LineListener, Reconstructor, Record, VoteTally};
use crate::metrics::{MetricsSnapshot, SessionMetrics};
use crate::parser::{strip_ansi_codes, LayoutError, LineClassifier};

pub struct Session {
    classifier: LineClassifier,
    strip_ansi: bool,
    max_line_size: usize,
    reconstructor: Reconstructor,
    tally: VoteTally,
    callsites: CallSiteCounter,
    extra: Vec<Box<dyn LineListener>>,
    metrics: Arc<SessionMetrics>,
}

/// What is left once a session has seen its last line.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub metrics: MetricsSnapshot,
    pub callsites: Vec<CallSiteCount>,
    pub callsite_total: u64,
}

impl Session {
    pub fn new(config: &ParserConfig) -> Result<Self, LayoutError> {
        let classifier = LineClassifier::new(
            config.header_layout,
            config.timestamp_format,
            config.default_year,
        )?
        .with_max_line_size(config.max_line_size);

        Ok(Self {
            classifier,
            strip_ansi: config.strip_ansi,
            max_line_size: config.max_line_size,
            reconstructor: Reconstructor::new(),
            tally: VoteTally::new(config.vote_sentinel.clone()),
            callsites: CallSiteCounter::new(config.vote_sentinel.clone()),
            extra: Vec::new(),
            metrics: Arc::new(SessionMetrics::new()),
        })
    }

    /// Add a listener that sees every classified line after the built-in ones.
    pub fn subscribe(&mut self, listener: Box<dyn LineListener>) {
        tracing::debug!(listener = listener.name(), "session: listener subscribed");
        self.extra.push(listener);
    }

    /// Longest line the classifier inspects; sources read at most one byte more.
    pub fn max_line_size(&self) -> usize {
        self.max_line_size
    }

    pub fn metrics(&self) -> Arc<SessionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Feed one raw line as read from the source. Handles framing, escape
    /// stripping and lossy UTF-8 decoding.
    pub fn feed_bytes(&mut self, raw: &[u8]) -> Vec<Record> {
        let framed = frame_line(raw);
        let cleaned = if self.strip_ansi {
            strip_ansi_codes(framed)
        } else {
            Cow::Borrowed(framed)
        };
        let text = String::from_utf8_lossy(&cleaned);
        self.feed_line(&text)
    }

    /// Feed one already-framed line.
    pub fn feed_line(&mut self, line: &str) -> Vec<Record> {
        let (classified, demotion) = self.classifier.classify_detailed(line);
        let kind = classified.kind();
        tracing::trace!(kind = kind.as_str(), ?demotion, "session: line classified");
        self.metrics.record_line(kind, demotion);

        let mut out = Vec::new();
        self.reconstructor.observe(&classified, &mut out);
        self.tally.observe(&classified, &mut out);
        self.callsites.observe(&classified, &mut out);
        for listener in self.extra.iter_mut() {
            listener.observe(&classified, &mut out);
        }

        for record in &out {
            match record {
                Record::Event(_) => self.metrics.record_event(),
                Record::Vote(_) => self.metrics.record_vote(),
            }
        }
        out
    }

    /// Feed an in-memory block of text, one line per `\n`.
    pub fn feed_str(&mut self, text: &str) -> Vec<Record> {
        text.lines().flat_map(|line| self.feed_bytes(line.as_bytes())).collect()
    }

    /// End of stream: pending records are discarded, not flushed.
    pub fn finish(mut self) -> SessionSummary {
        let mut dropped = 0;
        if self.reconstructor.end_of_stream() {
            dropped += 1;
        }
        if self.tally.end_of_stream() {
            dropped += 1;
        }
        for listener in self.extra.iter_mut() {
            if listener.end_of_stream() {
                dropped += 1;
            }
        }
        for _ in 0..dropped {
            self.metrics.record_incomplete();
        }

        SessionSummary {
            metrics: self.metrics.snapshot(),
            callsites: self.callsites.sorted(),
            callsite_total: self.callsites.total(),
        }
    }
}

/// Strip trailing CR/LF bytes.
pub fn frame_line(raw: &[u8]) -> &[u8] {
    let end = raw
        .iter()
        .rposition(|b| *b != b'\n' && *b != b'\r')
        .map(|p| p + 1)
        .unwrap_or(0);
    &raw[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::Event;
    use crate::parser::{ClassifiedLine, HeaderLayout};
    use chrono::NaiveDate;

    fn pipe_session() -> Session {
        Session::new(&ParserConfig::default()).unwrap()
    }

    fn events(records: &[Record]) -> Vec<&Event> {
        records.iter().filter_map(Record::as_event).collect()
    }

    // ── Framing ─────────────────────────────────────────────────

    #[test]
    fn test_frame_line() {
        assert_eq!(frame_line(b"abc\r\n"), b"abc");
        assert_eq!(frame_line(b"abc\n"), b"abc");
        assert_eq!(frame_line(b"abc\n\r\n"), b"abc");
        assert_eq!(frame_line(b"\r\n"), b"");
        assert_eq!(frame_line(b"a\rb"), b"a\rb");
    }

    // ── End to end ──────────────────────────────────────────────

    #[test]
    fn test_three_line_trace_yields_single_event() {
        let mut session = pipe_session();
        let records = session.feed_str(
            "2020-01-01 00:00:00,000 | ERROR | svc | loc |x\n\
             Traceback (most recent call last):\n\
             ValueError: boom\n",
        );
        assert_eq!(records.len(), 1);
        let event = records[0].as_event().unwrap();
        assert_eq!(event.metric_name, "logs.svc.error");
        assert_eq!(
            event.timestamp,
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_milli_opt(0, 0, 0, 0).unwrap()
        );
        assert_eq!(event.tags.iter().collect::<Vec<_>>(), vec!["exception:ValueError"]);
        assert_eq!(event.count, 1);
    }

    #[test]
    fn test_crlf_and_ansi_input() {
        let mut session = pipe_session();
        let mut records = session.feed_bytes(b"2020-01-01 00:00:00,000 | \x1b[31mERROR\x1b[0m | svc | loc |x\r\n");
        records.extend(session.feed_bytes(b"Traceback (most recent call last):\r\n"));
        records.extend(session.feed_bytes(b"ValueError: boom\r\n"));
        assert_eq!(events(&records).len(), 1);
    }

    #[test]
    fn test_ansi_kept_when_disabled() {
        let config = ParserConfig { strip_ansi: false, ..Default::default() };
        let mut session = Session::new(&config).unwrap();
        let records = session.feed_bytes(b"2020-01-01 00:00:00,000 | \x1b[33mWARN\x1b[0m | svc | loc |x");
        // the colored field is still a single token, so it is the severity
        assert_eq!(events(&records)[0].metric_name, "logs.svc.\x1b[33mwarn\x1b[0m");
    }

    #[test]
    fn test_invalid_utf8_is_data() {
        let mut session = pipe_session();
        let records = session.feed_bytes(b"\xff\xfe garbage\n");
        assert!(records.is_empty());
        assert_eq!(session.metrics().snapshot().plain_lines, 1);
    }

    #[test]
    fn test_vote_block_alongside_events() {
        let config = ParserConfig { header_layout: HeaderLayout::SpaceDelimited, ..Default::default() };
        let mut session = Session::new(&config).unwrap();
        let records = session.feed_str(
            "2020-12-30 00:02:00,000 588 1402 hxd9e8a1 icon_dex DEBUG    [vote.py:get_summary:120] Votes : Votes\n\
             True      : 6/6\n\
             Empty     : 0/6\n",
        );
        // the sentinel header is itself a DEBUG record
        assert_eq!(events(&records).len(), 1);
        let votes: Vec<_> = records.iter().filter_map(Record::as_vote).collect();
        assert_eq!(votes.len(), 2);
        assert_eq!((votes[0].numerator, votes[0].denominator), (Some(6), Some(6)));
        assert_eq!((votes[1].numerator, votes[1].denominator), (Some(0), Some(6)));
    }

    // ── Summary ─────────────────────────────────────────────────

    #[test]
    fn test_finish_counts_dropped_trace() {
        let mut session = pipe_session();
        session.feed_str("2020-01-01 00:00:00,000 | ERROR | svc | loc |x\nTraceback (most recent call last):\n");
        let summary = session.finish();
        assert_eq!(summary.metrics.incomplete_dropped, 1);
        assert_eq!(summary.metrics.events_emitted, 0);
        assert_eq!(summary.metrics.lines_read, 2);
    }

    #[test]
    fn test_finish_reports_callsites() {
        let config = ParserConfig { header_layout: HeaderLayout::SpaceDelimited, ..Default::default() };
        let mut session = Session::new(&config).unwrap();
        session.feed_str(
            "2020-12-30 00:01:57,131 588 1402 hxd9e8a1 icon_dex DEBUG    [epoch.py:new_round:60] new round 0, 0\n\
             2020-12-30 00:01:58,131 588 1402 hxd9e8a1 icon_dex DEBUG    [epoch.py:new_round:60] new round 1, 0\n",
        );
        let summary = session.finish();
        assert_eq!(summary.callsite_total, 2);
        assert_eq!(summary.callsites[0].key, "epoch.py-new_round-60");
        assert_eq!(summary.callsites[0].count, 2);
    }

    // ── Extra listeners ─────────────────────────────────────────

    struct HeaderCounter(std::sync::Arc<std::sync::atomic::AtomicU64>);

    impl LineListener for HeaderCounter {
        fn name(&self) -> &'static str {
            "header_counter"
        }

        fn observe(&mut self, line: &ClassifiedLine, _out: &mut Vec<Record>) {
            if line.is_header() {
                self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            }
        }
    }

    #[test]
    fn test_subscribed_listener_sees_every_line() {
        let seen = std::sync::Arc::new(std::sync::atomic::AtomicU64::new(0));
        let mut session = pipe_session();
        session.subscribe(Box::new(HeaderCounter(seen.clone())));
        session.feed_str(
            "2020-01-01 00:00:00,000 | INFO | svc | loc |a\n\
             noise\n\
             2020-01-01 00:00:01,000 | ERROR | svc | loc |b\n",
        );
        assert_eq!(seen.load(std::sync::atomic::Ordering::Relaxed), 2);
    }
}
