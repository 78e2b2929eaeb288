//! The voting workflow state machine
//!
//! A single administrator, fixed at creation, drives the workflow through
//! its six phase transitions and registers voters; registered voters submit
//! proposals and cast votes during the phases designated for those actions.
//! Every operation takes the caller's address as an explicit argument and
//! checks all of its preconditions before mutating anything, so a failed
//! call never leaves partial state behind.

use crate::{EngineError, EngineResult};
use ballot_core::{Address, BallotEvent, Proposal, ProposalId, VoterRecord, WorkflowPhase};
use std::collections::HashMap;
use tracing::{debug, info};

/// The voting workflow: voter registry, proposal list, phase, and tally
#[derive(Debug, Clone)]
pub struct VotingWorkflow {
    /// Administrator identity, fixed at creation
    administrator: Address,
    /// Current workflow phase
    phase: WorkflowPhase,
    /// Voter registry
    voters: HashMap<Address, VoterRecord>,
    /// Proposals in submission order; index is the proposal identifier
    proposals: Vec<Proposal>,
    /// Winning proposal, set once by `tally_votes`
    winning_proposal_id: ProposalId,
}

impl VotingWorkflow {
    /// Create a new workflow administered by the given address
    pub fn new(administrator: Address) -> Self {
        Self {
            administrator,
            phase: WorkflowPhase::RegisteringVoters,
            voters: HashMap::new(),
            proposals: Vec::new(),
            winning_proposal_id: 0,
        }
    }

    /// The administrator address
    pub fn administrator(&self) -> Address {
        self.administrator
    }

    /// Current phase (unrestricted read)
    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    /// Winning proposal id; 0 until votes are tallied (unrestricted read)
    pub fn winner(&self) -> ProposalId {
        self.winning_proposal_id
    }

    /// Number of proposals submitted so far, sentinel included
    /// (unrestricted read, so clients never enumerate by trial failure)
    pub fn proposal_count(&self) -> u32 {
        self.proposals.len() as u32
    }

    /// Register a voter. Admin-only, during voter registration only.
    pub fn register_voter(&mut self, caller: Address, voter: Address) -> EngineResult<BallotEvent> {
        self.require_admin(caller)?;
        self.require_phase(WorkflowPhase::RegisteringVoters)?;

        if self.voters.contains_key(&voter) {
            return Err(EngineError::AlreadyRegistered(voter));
        }

        self.voters.insert(voter, VoterRecord::registered());
        info!(voter = %voter, "voter registered");

        Ok(BallotEvent::VoterRegistered { voter })
    }

    /// Open proposal registration and seed the GENESIS sentinel at index 0
    pub fn start_proposals_registration(&mut self, caller: Address) -> EngineResult<BallotEvent> {
        self.require_admin(caller)?;
        self.require_phase(WorkflowPhase::RegisteringVoters)?;

        self.proposals.push(Proposal::genesis());
        Ok(self.transition_to(WorkflowPhase::ProposalsRegistrationStarted))
    }

    /// Close proposal registration
    pub fn end_proposals_registration(&mut self, caller: Address) -> EngineResult<BallotEvent> {
        self.require_admin(caller)?;
        self.require_phase(WorkflowPhase::ProposalsRegistrationStarted)?;

        Ok(self.transition_to(WorkflowPhase::ProposalsRegistrationEnded))
    }

    /// Open the voting session
    pub fn start_voting_session(&mut self, caller: Address) -> EngineResult<BallotEvent> {
        self.require_admin(caller)?;
        self.require_phase(WorkflowPhase::ProposalsRegistrationEnded)?;

        Ok(self.transition_to(WorkflowPhase::VotingSessionStarted))
    }

    /// Close the voting session
    pub fn end_voting_session(&mut self, caller: Address) -> EngineResult<BallotEvent> {
        self.require_admin(caller)?;
        self.require_phase(WorkflowPhase::VotingSessionStarted)?;

        Ok(self.transition_to(WorkflowPhase::VotingSessionEnded))
    }

    /// Tally votes and finalize the winner.
    ///
    /// Forward linear scan with strictly-greater replacement: the lowest
    /// index among the maximum vote counts wins ties. Calling this twice is
    /// impossible because the required phase no longer holds afterwards.
    pub fn tally_votes(&mut self, caller: Address) -> EngineResult<BallotEvent> {
        self.require_admin(caller)?;
        self.require_phase(WorkflowPhase::VotingSessionEnded)?;

        let mut winning_id: ProposalId = 0;
        let mut best_count: u64 = 0;
        for (index, proposal) in self.proposals.iter().enumerate() {
            if proposal.vote_count > best_count {
                best_count = proposal.vote_count;
                winning_id = index as ProposalId;
            }
        }

        self.winning_proposal_id = winning_id;
        info!(winner = winning_id, votes = best_count, "votes tallied");

        Ok(self.transition_to(WorkflowPhase::VotesTallied))
    }

    /// Submit a proposal. Voters only, while proposal registration is open.
    pub fn submit_proposal(
        &mut self,
        caller: Address,
        description: String,
    ) -> EngineResult<BallotEvent> {
        self.require_voter(caller)?;
        self.require_phase(WorkflowPhase::ProposalsRegistrationStarted)?;

        if description.is_empty() {
            return Err(EngineError::EmptyProposal);
        }

        let proposal_id = self.proposals.len() as ProposalId;
        self.proposals.push(Proposal::new(description));
        info!(proposal_id, voter = %caller, "proposal registered");

        Ok(BallotEvent::ProposalRegistered { proposal_id })
    }

    /// Cast a vote. Voters only, once, while the voting session is open.
    pub fn cast_vote(&mut self, caller: Address, proposal_id: ProposalId) -> EngineResult<BallotEvent> {
        self.require_voter(caller)?;
        self.require_phase(WorkflowPhase::VotingSessionStarted)?;

        let record = self
            .voters
            .get(&caller)
            .copied()
            .ok_or(EngineError::NotAVoter(caller))?;
        if record.has_voted {
            return Err(EngineError::AlreadyVoted(caller));
        }
        if proposal_id as usize >= self.proposals.len() {
            return Err(EngineError::ProposalNotFound(proposal_id));
        }

        // All preconditions hold; commit both sides of the vote
        if let Some(record) = self.voters.get_mut(&caller) {
            record.has_voted = true;
            record.voted_proposal_id = proposal_id;
        }
        self.proposals[proposal_id as usize].vote_count += 1;
        info!(voter = %caller, proposal_id, "vote cast");

        Ok(BallotEvent::Voted {
            voter: caller,
            proposal_id,
        })
    }

    /// Get a voter record by value. Any registered voter may query any
    /// address; a never-registered address yields the default record.
    pub fn voter_of(&self, caller: Address, address: Address) -> EngineResult<VoterRecord> {
        self.require_voter(caller)?;
        Ok(self.voters.get(&address).copied().unwrap_or_default())
    }

    /// Get a proposal by value. Registered voters only.
    pub fn proposal(&self, caller: Address, proposal_id: ProposalId) -> EngineResult<Proposal> {
        self.require_voter(caller)?;
        self.proposals
            .get(proposal_id as usize)
            .cloned()
            .ok_or(EngineError::ProposalNotFound(proposal_id))
    }

    fn require_admin(&self, caller: Address) -> EngineResult<()> {
        if caller != self.administrator {
            return Err(EngineError::Unauthorized { caller });
        }
        Ok(())
    }

    fn require_phase(&self, expected: WorkflowPhase) -> EngineResult<()> {
        if self.phase != expected {
            return Err(EngineError::PhaseMismatch {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    fn require_voter(&self, caller: Address) -> EngineResult<()> {
        let registered = self
            .voters
            .get(&caller)
            .is_some_and(|record| record.is_registered);
        if !registered {
            return Err(EngineError::NotAVoter(caller));
        }
        Ok(())
    }

    fn transition_to(&mut self, next: WorkflowPhase) -> BallotEvent {
        let previous = self.phase;
        self.phase = next;
        debug!(%previous, %next, "workflow phase advanced");
        BallotEvent::WorkflowStatusChange { previous, next }
    }
}
