//! Machine module: stateful listeners over the classified-line stream.

pub mod listener;
pub mod state;
pub mod tally;
pub mod callsite;

pub use listener::{LineListener, Record};
pub use state::{step, transition, ParserState, PendingRecord, Reconstructor, StateName, Step};
pub use tally::{VoteRecord, VoteTally};
pub use callsite::{CallSiteCount, CallSiteCounter};
