//! Core data structures for the ballot system
//!
//! This crate provides the fundamental building blocks shared by the engine,
//! the RPC surface, and the CLI:
//! - Basic types (Hash, Address, ProposalId, etc.)
//! - The voting workflow data model (phases, voter records, proposals)
//! - The signed call envelope used to authenticate state-changing operations
//! - Domain events and keypair utilities

pub mod ballot;
pub mod call;
pub mod error;
pub mod event;
pub mod keys;
pub mod types;

// Re-export commonly used types
pub use ballot::*;
pub use call::*;
pub use error::*;
pub use event::*;
pub use keys::*;
pub use types::*;
