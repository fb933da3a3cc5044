//! Runtime module — process lifecycle: boot, run, stop.

pub mod boot;
pub mod cli;
pub mod run;
pub mod stop;
