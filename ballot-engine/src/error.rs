//! Engine error types

use ballot_core::{Address, ProposalId, WorkflowPhase};
use thiserror::Error;

/// Engine error type. Every variant is a rejection of the whole call: no
/// operation ever leaves partial state behind, and nothing is retried.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Caller is not the administrator for an admin-only operation
    #[error("Unauthorized: {caller} is not the administrator")]
    Unauthorized { caller: Address },

    /// Operation invoked outside its required phase
    #[error("Phase mismatch: expected {expected}, current phase is {actual}")]
    PhaseMismatch {
        expected: WorkflowPhase,
        actual: WorkflowPhase,
    },

    /// Duplicate voter registration attempt
    #[error("Already registered: {0}")]
    AlreadyRegistered(Address),

    /// Caller or queried address has no voter record
    #[error("Not a voter: {0}")]
    NotAVoter(Address),

    /// Proposal description is empty
    #[error("Proposal description must not be empty")]
    EmptyProposal,

    /// Voter attempted a second vote
    #[error("Already voted: {0}")]
    AlreadyVoted(Address),

    /// Referenced proposal index does not exist
    #[error("Proposal not found: {0}")]
    ProposalNotFound(ProposalId),

    /// Call nonce does not match the caller's expected nonce
    #[error("Invalid nonce: expected {expected}, got {actual}")]
    InvalidNonce { expected: u64, actual: u64 },

    /// Envelope or crypto failure
    #[error(transparent)]
    Core(#[from] ballot_core::CoreError),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
