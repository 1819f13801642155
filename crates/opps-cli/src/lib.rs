//! Library side of `opps-scrub`: the command line, the batch passes, their
//! reports, and the logging and console output shared by the subcommands.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod passes;
pub mod summary;
pub mod types;
