//! Event emitter: converts completed reconstructions into metric events.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    #[default]
    Counter,
}

/// One counted occurrence of a log record.
///
/// Immutable once emitted; the caller owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub metric_name: String,
    pub timestamp: NaiveDateTime,
    pub count: u64,
    pub tags: BTreeSet<String>,
    pub metric_type: MetricType,
}

/// `logs.<logger>.<severity lowercased>`
pub fn metric_name(logger: &str, severity: &str) -> String {
    format!("logs.{}.{}", logger, severity.to_lowercase())
}

pub fn make_event<I>(logger: &str, severity: &str, timestamp: NaiveDateTime, tags: I) -> Event
where
    I: IntoIterator<Item = String>,
{
    Event {
        metric_name: metric_name(logger, severity),
        timestamp,
        count: 1,
        tags: tags.into_iter().collect(),
        metric_type: MetricType::Counter,
    }
}

pub fn exception_tag(exception_name: &str) -> String {
    format!("exception:{}", exception_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_milli_opt(0, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_metric_name_lowercases_severity() {
        assert_eq!(metric_name("svc", "WARN"), "logs.svc.warn");
        assert_eq!(metric_name("icon_dex", "Debug"), "logs.icon_dex.debug");
    }

    #[test]
    fn test_make_event_defaults() {
        let event = make_event("svc", "INFO", ts(), Vec::new());
        assert_eq!(event.metric_name, "logs.svc.info");
        assert_eq!(event.count, 1);
        assert!(event.tags.is_empty());
        assert_eq!(event.metric_type, MetricType::Counter);
        assert_eq!(event.timestamp, ts());
    }

    #[test]
    fn test_make_event_with_exception_tag() {
        let event = make_event("svc", "ERROR", ts(), [exception_tag("ValueError")]);
        assert!(event.tags.contains("exception:ValueError"));
        assert_eq!(event.tags.len(), 1);
    }

    #[test]
    fn test_event_json_shape() {
        let event = make_event("svc", "ERROR", ts(), [exception_tag("ValueError")]);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["metric_name"], "logs.svc.error");
        assert_eq!(json["count"], 1);
        assert_eq!(json["metric_type"], "counter");
        assert_eq!(json["tags"][0], "exception:ValueError");
        assert_eq!(json["timestamp"], "2020-01-01T00:00:00");
    }
}
