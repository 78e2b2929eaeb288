//! Domain events emitted by the voting workflow

use crate::{Address, ProposalId, WorkflowPhase};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Events emitted by workflow operations. Observers and indexers consume
/// these from the event log to render live phase and tallies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BallotEvent {
    /// A voter was registered by the administrator
    VoterRegistered { voter: Address },
    /// A proposal was appended at the given index
    ProposalRegistered { proposal_id: ProposalId },
    /// A voter cast a vote for a proposal
    Voted {
        voter: Address,
        proposal_id: ProposalId,
    },
    /// The workflow advanced one phase
    WorkflowStatusChange {
        previous: WorkflowPhase,
        next: WorkflowPhase,
    },
}

impl fmt::Display for BallotEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BallotEvent::VoterRegistered { voter } => write!(f, "VoterRegistered({})", voter),
            BallotEvent::ProposalRegistered { proposal_id } => {
                write!(f, "ProposalRegistered({})", proposal_id)
            }
            BallotEvent::Voted { voter, proposal_id } => {
                write!(f, "Voted({}, {})", voter, proposal_id)
            }
            BallotEvent::WorkflowStatusChange { previous, next } => {
                write!(f, "WorkflowStatusChange({} -> {})", previous, next)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = BallotEvent::ProposalRegistered { proposal_id: 2 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "proposal_registered");
        assert_eq!(json["proposal_id"], 2);

        let decoded: BallotEvent = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_status_change_display() {
        let event = BallotEvent::WorkflowStatusChange {
            previous: WorkflowPhase::RegisteringVoters,
            next: WorkflowPhase::ProposalsRegistrationStarted,
        };
        assert_eq!(
            event.to_string(),
            "WorkflowStatusChange(RegisteringVoters -> ProposalsRegistrationStarted)"
        );
    }
}
