//! Output writers for the command-line tool.
//!
//! Library callers get records back in memory; only the binary writes them
//! out, as JSON on stdout or to a file.

pub mod json;
