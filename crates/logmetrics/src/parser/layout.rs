//! Header line layouts.
//!
//! Both layouts are expressed as data: a regex assembled from the layout and
//! the timestamp fragment, plus a mapping from capture groups to
//! [`HeaderFields`].

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{CallSite, HeaderFields};
use super::timestamp::{TimestampFormat, TimestampParser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderLayout {
    /// `timestamp | severity | logger | location |message`
    #[default]
    PipeDelimited,
    /// `timestamp pid thread peer channel level [file:function:line] message`
    SpaceDelimited,
}

impl HeaderLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderLayout::PipeDelimited => "pipe_delimited",
            HeaderLayout::SpaceDelimited => "space_delimited",
        }
    }

    fn pattern(&self, timestamp: TimestampFormat) -> String {
        let ts = timestamp.pattern();
        match self {
            HeaderLayout::PipeDelimited => format!(
                r"^(?P<timestamp>{ts}) \| (?P<severity>[^ ]*) \| (?P<logger>[^ ]*) \| (?P<location>[^ ]*) \|(?P<message>.*)$"
            ),
            HeaderLayout::SpaceDelimited => format!(
                concat!(
                    r"^(?P<timestamp>{ts}) (?P<pid>\d+) (?P<thread_id>\d+) (?P<peer_id>[A-Za-z0-9_]{{8}}) ",
                    r"(?P<logger>[A-Za-z0-9_]+) (?P<severity>[A-Za-z]+)\s+",
                    r"\[(?P<file>[^:\]]*):(?P<function>[^:\]]*):(?P<line>[^:\]]*)\] ?(?P<message>.*)$",
                ),
                ts = ts
            ),
        }
    }
}

impl std::str::FromStr for HeaderLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pipe_delimited" | "pipe" => Ok(HeaderLayout::PipeDelimited),
            "space_delimited" | "space" => Ok(HeaderLayout::SpaceDelimited),
            other => Err(format!(
                "unknown header_layout '{}' (expected pipe_delimited|space_delimited)",
                other
            )),
        }
    }
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Invalid header pattern: {0}")]
    Regex(#[from] regex::Error),
}

/// Why a header-shaped line was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMiss {
    /// The layout regex did not match.
    NoMatch,
    /// The layout matched but the timestamp is not a real date/time.
    BadTimestamp,
}

/// Compiled header grammar for one layout/timestamp combination.
#[derive(Debug, Clone)]
pub struct HeaderGrammar {
    layout: HeaderLayout,
    regex: Regex,
    timestamps: TimestampParser,
}

impl HeaderGrammar {
    pub fn new(layout: HeaderLayout, timestamps: TimestampParser) -> Result<Self, LayoutError> {
        let regex = Regex::new(&layout.pattern(timestamps.format()))?;
        Ok(Self { layout, regex, timestamps })
    }

    pub fn match_line(&self, line: &str) -> Result<HeaderFields, HeaderMiss> {
        let caps = self.regex.captures(line).ok_or(HeaderMiss::NoMatch)?;
        let timestamp = self
            .timestamps
            .parse(group(&caps, "timestamp"))
            .ok_or(HeaderMiss::BadTimestamp)?;

        let severity = Some(group(&caps, "severity"))
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let fields = match self.layout {
            HeaderLayout::PipeDelimited => HeaderFields {
                timestamp,
                severity,
                logger: group(&caps, "logger").to_string(),
                location: group(&caps, "location").to_string(),
                message: group(&caps, "message").to_string(),
                call_site: None,
            },
            HeaderLayout::SpaceDelimited => {
                let call_site = CallSite {
                    file: group(&caps, "file").to_string(),
                    function: group(&caps, "function").to_string(),
                    line: group(&caps, "line").to_string(),
                };
                HeaderFields {
                    timestamp,
                    severity,
                    logger: group(&caps, "logger").to_string(),
                    location: format!("{}:{}:{}", call_site.file, call_site.function, call_site.line),
                    message: group(&caps, "message").to_string(),
                    call_site: Some(call_site),
                }
            }
        };
        Ok(fields)
    }
}

fn group<'a>(caps: &Captures<'a>, name: &str) -> &'a str {
    caps.name(name).map(|m| m.as_str()).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn grammar(layout: HeaderLayout, format: TimestampFormat) -> HeaderGrammar {
        HeaderGrammar::new(layout, TimestampParser::new(format, 2019)).unwrap()
    }

    // ── Pipe-delimited ──────────────────────────────────────────

    #[test]
    fn test_pipe_header_fields() {
        let g = grammar(HeaderLayout::PipeDelimited, TimestampFormat::Full);
        let h = g.match_line("2020-01-01 00:00:00,000 | ERROR | svc | loc |x").unwrap();
        assert_eq!(h.severity.as_deref(), Some("ERROR"));
        assert_eq!(h.logger, "svc");
        assert_eq!(h.location, "loc");
        assert_eq!(h.message, "x");
        assert!(h.call_site.is_none());
        assert_eq!(h.timestamp.year(), 2020);
    }

    #[test]
    fn test_pipe_header_empty_severity() {
        let g = grammar(HeaderLayout::PipeDelimited, TimestampFormat::Full);
        let h = g.match_line("2020-01-01 00:00:00,000 |  | svc | loc | msg").unwrap();
        assert!(h.severity.is_none());
    }

    #[test]
    fn test_pipe_header_bad_timestamp() {
        let g = grammar(HeaderLayout::PipeDelimited, TimestampFormat::Full);
        assert_eq!(
            g.match_line("2020-13-01 00:00:00,000 | INFO | svc | loc | msg"),
            Err(HeaderMiss::BadTimestamp)
        );
    }

    #[test]
    fn test_pipe_header_rejects_space_layout() {
        let g = grammar(HeaderLayout::PipeDelimited, TimestampFormat::Full);
        let line = "2020-12-30 00:01:57,131 588 140200854329088 hxd9e8a1 icon_dex DEBUG    [epoch.py:new_round:60] new round 0, 0";
        assert_eq!(g.match_line(line), Err(HeaderMiss::NoMatch));
    }

    // ── Space-delimited ─────────────────────────────────────────

    #[test]
    fn test_space_header_fields() {
        let g = grammar(HeaderLayout::SpaceDelimited, TimestampFormat::Full);
        let line = "2020-12-30 00:01:57,131 588 140200854329088 hxd9e8a1 icon_dex DEBUG    [epoch.py:set_epoch_leader:86] height(743328) leader_id(hx8573)";
        let h = g.match_line(line).unwrap();
        assert_eq!(h.severity.as_deref(), Some("DEBUG"));
        assert_eq!(h.logger, "icon_dex");
        assert_eq!(h.location, "epoch.py:set_epoch_leader:86");
        assert_eq!(h.message, "height(743328) leader_id(hx8573)");
        let site = h.call_site.unwrap();
        assert_eq!(site.file, "epoch.py");
        assert_eq!(site.function, "set_epoch_leader");
        assert_eq!(site.line, "86");
        assert_eq!(h.timestamp.nanosecond(), 131_000_000);
    }

    #[test]
    fn test_space_header_short_timestamp() {
        let g = grammar(HeaderLayout::SpaceDelimited, TimestampFormat::Short);
        let line = "1230 00:01:09,479 588 140200862721792 hxd9e8a1 icon_dex WARNING [block_sync.py:_block_sync:477] try add block";
        let h = g.match_line(line).unwrap();
        assert_eq!(h.timestamp.year(), 2019);
        assert_eq!(h.timestamp.month(), 12);
        assert_eq!(h.severity.as_deref(), Some("WARNING"));
    }

    #[test]
    fn test_layout_from_str() {
        assert_eq!("pipe".parse::<HeaderLayout>(), Ok(HeaderLayout::PipeDelimited));
        assert_eq!("space_delimited".parse::<HeaderLayout>(), Ok(HeaderLayout::SpaceDelimited));
        assert!("csv".parse::<HeaderLayout>().is_err());
    }

    #[test]
    fn test_layout_name_parses_back() {
        for layout in [HeaderLayout::PipeDelimited, HeaderLayout::SpaceDelimited] {
            assert_eq!(layout.as_str().parse::<HeaderLayout>(), Ok(layout));
        }
    }
}
