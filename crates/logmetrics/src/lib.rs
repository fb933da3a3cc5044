// Module structure for the log-to-metrics parser.

// Core
pub mod error;
pub mod parser;
pub mod machine;
pub mod emit;
pub mod metrics;

// Driving a stream
pub mod conf;
pub mod session;
pub mod source;
pub mod pipeline;
pub mod output;
pub mod runtime;
