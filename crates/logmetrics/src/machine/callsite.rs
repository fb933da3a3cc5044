//! Per call-site header counts (`file-function-line`).
//!
//! Only layouts that carry a call site contribute. Sentinel headers that open
//! a vote-tally block are not counted.

use std::collections::HashMap;

use serde::Serialize;

use crate::parser::ClassifiedLine;

use super::listener::{LineListener, Record};

#[derive(Debug, Clone, Default)]
pub struct CallSiteCounter {
    sentinel: String,
    counts: HashMap<String, u64>,
    total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSiteCount {
    pub key: String,
    pub count: u64,
}

impl CallSiteCounter {
    pub fn new(sentinel: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
            ..Default::default()
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Counts sorted ascending by count, ties broken by key.
    pub fn sorted(&self) -> Vec<CallSiteCount> {
        let mut out: Vec<CallSiteCount> = self
            .counts
            .iter()
            .map(|(key, count)| CallSiteCount { key: key.clone(), count: *count })
            .collect();
        out.sort_by(|a, b| a.count.cmp(&b.count).then_with(|| a.key.cmp(&b.key)));
        out
    }
}

impl LineListener for CallSiteCounter {
    fn name(&self) -> &'static str {
        "callsites"
    }

    fn observe(&mut self, line: &ClassifiedLine, _out: &mut Vec<Record>) {
        let ClassifiedLine::Header(header) = line else {
            return;
        };
        if header.message.contains(&self.sentinel) {
            return;
        }
        if let Some(site) = &header.call_site {
            *self.counts.entry(site.key()).or_insert(0) += 1;
            self.total += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{HeaderLayout, LineClassifier, TimestampFormat, VOTE_SENTINEL};

    const SAMPLE: &str = "\
2020-12-30 00:01:09,478 588 140200862721792 hxd9e8a1 icon_dex DEBUG    [rest_client.py:call_async:146] REST call async complete method_name(node_getBlockByHeight)
2020-12-30 00:01:09,479 588 140200862721792 hxd9e8a1 icon_dex DEBUG    [block_sync.py:_request_completed:338] block_height(743175) received
2020-12-30 00:01:09,479 588 140200862721792 hxd9e8a1 icon_dex DEBUG    [block_sync.py:_block_sync:477] try add block height: 743175
2020-12-30 00:01:10,479 588 140200862721792 hxd9e8a1 icon_dex DEBUG    [block_sync.py:_block_sync:477] try add block height: 743176
2020-12-30 00:01:11,000 588 140200862721792 hxd9e8a1 icon_dex DEBUG    [vote.py:get_summary:120] Votes : Votes
True      : 6/6
not a header";

    fn count(text: &str) -> CallSiteCounter {
        let c = LineClassifier::new(HeaderLayout::SpaceDelimited, TimestampFormat::Full, 2019).unwrap();
        let mut counter = CallSiteCounter::new(VOTE_SENTINEL);
        let mut out = Vec::new();
        for line in text.lines() {
            counter.observe(&c.classify(line), &mut out);
        }
        assert!(out.is_empty());
        counter
    }

    #[test]
    fn test_counts_by_call_site() {
        let counter = count(SAMPLE);
        assert_eq!(counter.total(), 4);
        assert_eq!(counter.get("block_sync.py-_block_sync-477"), 2);
        assert_eq!(counter.get("rest_client.py-call_async-146"), 1);
        assert_eq!(counter.get("vote.py-get_summary-120"), 0);
    }

    #[test]
    fn test_sorted_ascending_by_count() {
        let sorted = count(SAMPLE).sorted();
        assert_eq!(sorted.len(), 3);
        assert_eq!(sorted.last().unwrap().key, "block_sync.py-_block_sync-477");
        assert_eq!(sorted[0].key, "block_sync.py-_request_completed-338");
        assert!(sorted.windows(2).all(|w| w[0].count <= w[1].count));
    }

    #[test]
    fn test_pipe_layout_contributes_nothing() {
        let c = LineClassifier::new(HeaderLayout::PipeDelimited, TimestampFormat::Full, 2019).unwrap();
        let mut counter = CallSiteCounter::new(VOTE_SENTINEL);
        counter.observe(&c.classify("2020-01-01 00:00:00,000 | INFO | svc | loc |x"), &mut Vec::new());
        assert_eq!(counter.total(), 0);
    }
}
