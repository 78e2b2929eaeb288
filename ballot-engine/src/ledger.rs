//! Ledger: the workflow plus its event log and caller nonces
//!
//! The execution model this workflow was designed for serializes all
//! state-changing calls globally. Outside such an environment the same
//! guarantee has to come from a single write lock, which is what
//! [`SharedLedger`] provides: one call completes before the next begins,
//! and reads only ever observe committed state.

use crate::workflow::VotingWorkflow;
use ballot_core::{
    Address, BallotEvent, CallNonce, EventSequence, Proposal, ProposalId, VoterRecord,
    WorkflowPhase,
};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::EngineResult;

/// An event committed to the log, with its position and wall-clock time
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EventRecord {
    /// 1-based position in the log
    pub sequence: EventSequence,
    /// When the node recorded the event
    pub recorded_at: DateTime<Utc>,
    /// The event itself
    pub event: BallotEvent,
}

/// The workflow together with the envelope bookkeeping around it
#[derive(Debug, Clone)]
pub struct Ledger {
    workflow: VotingWorkflow,
    /// Next expected call nonce per caller
    nonces: HashMap<Address, CallNonce>,
    /// Append-only event log
    events: Vec<EventRecord>,
}

impl Ledger {
    /// Create a ledger administered by the given address
    pub fn new(administrator: Address) -> Self {
        Self {
            workflow: VotingWorkflow::new(administrator),
            nonces: HashMap::new(),
            events: Vec::new(),
        }
    }

    /// The workflow state
    pub fn workflow(&self) -> &VotingWorkflow {
        &self.workflow
    }

    pub(crate) fn workflow_mut(&mut self) -> &mut VotingWorkflow {
        &mut self.workflow
    }

    /// Next expected call nonce for a caller (0 for a caller never seen)
    pub fn nonce_of(&self, caller: &Address) -> CallNonce {
        self.nonces.get(caller).copied().unwrap_or(0)
    }

    pub(crate) fn bump_nonce(&mut self, caller: Address) {
        *self.nonces.entry(caller).or_insert(0) += 1;
    }

    /// Append an event to the log and return the committed record
    pub(crate) fn record_event(&mut self, event: BallotEvent) -> EventRecord {
        let record = EventRecord {
            sequence: self.events.len() as EventSequence + 1,
            recorded_at: Utc::now(),
            event,
        };
        self.events.push(record.clone());
        record
    }

    /// All committed events, oldest first
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Events with a sequence strictly greater than `since`, oldest first.
    /// `since = 0` returns the whole log.
    pub fn events_since(&self, since: EventSequence) -> Vec<EventRecord> {
        self.events
            .iter()
            .filter(|record| record.sequence > since)
            .cloned()
            .collect()
    }
}

/// Thread-safe ledger handle; the single-writer lock all state-changing
/// calls funnel through
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    /// Create a shared ledger administered by the given address
    pub fn new(administrator: Address) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Ledger::new(administrator))),
        }
    }

    pub(crate) fn write(&self) -> parking_lot::RwLockWriteGuard<'_, Ledger> {
        self.inner.write()
    }

    /// The administrator address
    pub fn administrator(&self) -> Address {
        self.inner.read().workflow().administrator()
    }

    /// Current phase (unrestricted read)
    pub fn phase(&self) -> WorkflowPhase {
        self.inner.read().workflow().phase()
    }

    /// Winning proposal id (unrestricted read)
    pub fn winner(&self) -> ProposalId {
        self.inner.read().workflow().winner()
    }

    /// Number of proposals (unrestricted read)
    pub fn proposal_count(&self) -> u32 {
        self.inner.read().workflow().proposal_count()
    }

    /// Voter record lookup, gated on the caller being a registered voter
    pub fn voter_of(&self, caller: Address, address: Address) -> EngineResult<VoterRecord> {
        self.inner.read().workflow().voter_of(caller, address)
    }

    /// Proposal lookup, gated on the caller being a registered voter
    pub fn proposal(&self, caller: Address, proposal_id: ProposalId) -> EngineResult<Proposal> {
        self.inner.read().workflow().proposal(caller, proposal_id)
    }

    /// Next expected call nonce for a caller
    pub fn nonce_of(&self, caller: &Address) -> CallNonce {
        self.inner.read().nonce_of(caller)
    }

    /// Events with a sequence strictly greater than `since`
    pub fn events_since(&self, since: EventSequence) -> Vec<EventRecord> {
        self.inner.read().events_since(since)
    }
}

impl Clone for SharedLedger {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
