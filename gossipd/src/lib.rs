#![crate_name = "gossipd"]

//! Operator tooling for the gossip filter: replay captured gossip against a
//! chain source and summarize what was accepted.

/// Command line configuration
#[cfg(feature = "main")]
pub mod config;
/// JSON views of the gossip graph
pub mod model;
/// Feeding captured gossip through a filter
pub mod replay;
/// Miscellaneous utilities
pub mod util;
