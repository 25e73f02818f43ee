#![crate_name = "lightning_gossip"]

//! Validation and ordering of Lightning gossip.
//! See [`filter::GossipFilter`] for the entry point.

#![forbid(unsafe_code)]
#![warn(rustdoc::broken_intra_doc_links)]
#![warn(missing_docs)]

#[cfg(not(feature = "std"))]
compile_error!("the `std` feature must be enabled");

#[macro_use]
extern crate alloc;
extern crate core;

pub use bitcoin;
pub use lightning;

/// Various utilities
#[macro_use]
pub mod util;
/// Chain data source contract
pub mod chain;
/// Gossip error taxonomy
pub mod error;
/// The gossip filter pipeline
pub mod filter;
/// Gossip messages and their wire encoding
pub mod msgs;
/// Deferred messages awaiting a prerequisite
pub mod pending;
/// Short channel identifiers
pub mod scid;
/// Gossip storage contract
pub mod store;
/// Per-message validation
pub mod validator;

pub use alloc::sync::Arc;

/// Common imports
pub mod prelude {
    pub use alloc::{boxed::Box, string::String, vec, vec::Vec};

    pub use alloc::collections::BTreeMap as OrderedMap;
    pub use alloc::collections::BTreeSet as OrderedSet;
    pub use std::collections::HashMap as Map;

    pub use alloc::borrow::ToOwned;
    pub use alloc::string::ToString;

    pub use std::sync::{Mutex, MutexGuard};

    /// Convenience trait for Send + Sync
    pub trait SendSync: Send + Sync {}
}

pub use prelude::SendSync;
