//! Voting workflow data model

use crate::ProposalId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Description of the sentinel proposal appended at index 0 when proposal
/// registration opens, so index 0 is never a "real" winner by default.
pub const GENESIS_PROPOSAL: &str = "GENESIS";

/// Workflow phases, strictly ordered; the workflow only ever moves forward
/// by exactly one step through the designated transition operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    RegisteringVoters,
    ProposalsRegistrationStarted,
    ProposalsRegistrationEnded,
    VotingSessionStarted,
    VotingSessionEnded,
    VotesTallied,
}

impl WorkflowPhase {
    /// Numeric value of the phase (0 through 5)
    pub fn as_u8(self) -> u8 {
        match self {
            WorkflowPhase::RegisteringVoters => 0,
            WorkflowPhase::ProposalsRegistrationStarted => 1,
            WorkflowPhase::ProposalsRegistrationEnded => 2,
            WorkflowPhase::VotingSessionStarted => 3,
            WorkflowPhase::VotingSessionEnded => 4,
            WorkflowPhase::VotesTallied => 5,
        }
    }

    /// The phase that follows this one, if any
    pub fn next(self) -> Option<WorkflowPhase> {
        match self {
            WorkflowPhase::RegisteringVoters => Some(WorkflowPhase::ProposalsRegistrationStarted),
            WorkflowPhase::ProposalsRegistrationStarted => {
                Some(WorkflowPhase::ProposalsRegistrationEnded)
            }
            WorkflowPhase::ProposalsRegistrationEnded => Some(WorkflowPhase::VotingSessionStarted),
            WorkflowPhase::VotingSessionStarted => Some(WorkflowPhase::VotingSessionEnded),
            WorkflowPhase::VotingSessionEnded => Some(WorkflowPhase::VotesTallied),
            WorkflowPhase::VotesTallied => None,
        }
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowPhase::RegisteringVoters => "RegisteringVoters",
            WorkflowPhase::ProposalsRegistrationStarted => "ProposalsRegistrationStarted",
            WorkflowPhase::ProposalsRegistrationEnded => "ProposalsRegistrationEnded",
            WorkflowPhase::VotingSessionStarted => "VotingSessionStarted",
            WorkflowPhase::VotingSessionEnded => "VotingSessionEnded",
            WorkflowPhase::VotesTallied => "VotesTallied",
        };
        write!(f, "{}", name)
    }
}

/// A registered voter's record. Created by the administrator during voter
/// registration and mutated exactly once, when the voter casts a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoterRecord {
    pub is_registered: bool,
    pub has_voted: bool,
    pub voted_proposal_id: ProposalId,
}

impl VoterRecord {
    /// Fresh record for a newly registered voter
    pub fn registered() -> Self {
        Self {
            is_registered: true,
            has_voted: false,
            voted_proposal_id: 0,
        }
    }
}

/// A submitted proposal; its index in the proposal list is its identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub description: String,
    pub vote_count: u64,
}

impl Proposal {
    /// Create a new proposal with zero votes
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            vote_count: 0,
        }
    }

    /// The sentinel proposal seeded at index 0
    pub fn genesis() -> Self {
        Self::new(GENESIS_PROPOSAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_ordering() {
        assert!(WorkflowPhase::RegisteringVoters < WorkflowPhase::VotesTallied);
        assert_eq!(WorkflowPhase::RegisteringVoters.as_u8(), 0);
        assert_eq!(WorkflowPhase::VotesTallied.as_u8(), 5);
    }

    #[test]
    fn test_phase_progression() {
        let mut phase = WorkflowPhase::RegisteringVoters;
        let mut steps = 0;
        while let Some(next) = phase.next() {
            assert_eq!(next.as_u8(), phase.as_u8() + 1);
            phase = next;
            steps += 1;
        }
        assert_eq!(steps, 5);
        assert_eq!(phase, WorkflowPhase::VotesTallied);
        assert!(phase.next().is_none());
    }

    #[test]
    fn test_voter_record_defaults() {
        let record = VoterRecord::default();
        assert!(!record.is_registered);
        assert!(!record.has_voted);
        assert_eq!(record.voted_proposal_id, 0);

        let registered = VoterRecord::registered();
        assert!(registered.is_registered);
        assert!(!registered.has_voted);
    }

    #[test]
    fn test_genesis_proposal() {
        let genesis = Proposal::genesis();
        assert_eq!(genesis.description, "GENESIS");
        assert_eq!(genesis.vote_count, 0);
    }
}
