/// Line grammars and classification
///
/// Turns one raw log line into exactly one [`ClassifiedLine`]. Nothing in
/// here is stateful: grammars are compiled once from configuration and then
/// only read.
///
/// # Architecture
///
/// - `model.rs`: classified-line variants and captured header fields
/// - `timestamp.rs`: full / short (year-less) timestamp parsing
/// - `layout.rs`: pipe- and space-delimited header layouts
/// - `classify.rs`: the classifier, trying grammars in a fixed order
/// - `ansi.rs`: escape-code stripping applied before classification

pub mod model;
pub mod timestamp;
pub mod layout;
pub mod classify;
mod ansi;

pub use model::{CallSite, ClassifiedLine, HeaderFields, LineKind, VoteCount};
pub use timestamp::{TimestampFormat, TimestampParser};
pub use layout::{HeaderLayout, LayoutError};
pub use classify::{Demotion, LineClassifier};
pub use ansi::strip_ansi_codes;

pub const MAX_LINE_SIZE: usize = 1_048_576; // 1MB
pub const DEFAULT_YEAR: i32 = 2019;
pub const VOTE_SENTINEL: &str = "Votes : Votes";
