//! Signed call verification and dispatch
//!
//! The executor is the only path by which external callers mutate the
//! workflow: it recovers the caller address from the call signature, checks
//! the replay nonce, dispatches the operation under the ledger's write
//! lock, and commits the emitted event and nonce bump only if the operation
//! succeeded.

use crate::ledger::{EventRecord, SharedLedger};
use crate::{EngineError, EngineResult};
use ballot_core::{Address, Call, Hash, SignedCall};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Receipt returned for an applied call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallReceipt {
    /// Hash of the applied call, signature included
    pub call_hash: Hash,
    /// Caller recovered from the signature
    pub caller: Address,
    /// Operation name
    pub operation: String,
    /// Events committed by this call
    pub events: Vec<EventRecord>,
}

/// Applies signed calls to a shared ledger
pub struct CallExecutor {
    ledger: SharedLedger,
}

impl CallExecutor {
    /// Create an executor over the given ledger
    pub fn new(ledger: SharedLedger) -> Self {
        Self { ledger }
    }

    /// The underlying ledger handle
    pub fn ledger(&self) -> &SharedLedger {
        &self.ledger
    }

    /// Verify and apply one signed call.
    ///
    /// Fails with a typed [`EngineError`] and no state change if the
    /// signature is missing or unrecoverable, the nonce does not match, or
    /// the operation's own preconditions reject it. Nothing is retried.
    pub fn execute(&self, signed: &SignedCall) -> EngineResult<CallReceipt> {
        let caller = signed.sender()?;
        let call_hash = signed.hash()?;
        debug!(%caller, op = signed.call.name(), nonce = signed.nonce, "executing call");

        let mut ledger = self.ledger.write();

        let expected = ledger.nonce_of(&caller);
        if signed.nonce != expected {
            warn!(%caller, expected, actual = signed.nonce, "call nonce rejected");
            return Err(EngineError::InvalidNonce {
                expected,
                actual: signed.nonce,
            });
        }

        let event = dispatch(&mut ledger, caller, &signed.call)?;

        let record = ledger.record_event(event);
        ledger.bump_nonce(caller);
        info!(%caller, op = signed.call.name(), sequence = record.sequence, "call applied");

        Ok(CallReceipt {
            call_hash,
            caller,
            operation: signed.call.name().to_string(),
            events: vec![record],
        })
    }
}

fn dispatch(
    ledger: &mut crate::ledger::Ledger,
    caller: Address,
    call: &Call,
) -> EngineResult<ballot_core::BallotEvent> {
    let workflow = ledger.workflow_mut();
    match call {
        Call::RegisterVoter { voter } => workflow.register_voter(caller, *voter),
        Call::StartProposalsRegistration => workflow.start_proposals_registration(caller),
        Call::EndProposalsRegistration => workflow.end_proposals_registration(caller),
        Call::StartVotingSession => workflow.start_voting_session(caller),
        Call::EndVotingSession => workflow.end_voting_session(caller),
        Call::TallyVotes => workflow.tally_votes(caller),
        Call::SubmitProposal { description } => {
            workflow.submit_proposal(caller, description.clone())
        }
        Call::CastVote { proposal_id } => workflow.cast_vote(caller, *proposal_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_core::{BallotEvent, CoreError, Keypair, WorkflowPhase};

    fn executor_with_admin() -> (CallExecutor, Keypair) {
        let admin = Keypair::generate();
        let executor = CallExecutor::new(SharedLedger::new(admin.address()));
        (executor, admin)
    }

    fn signed(keypair: &Keypair, nonce: u64, call: Call) -> SignedCall {
        let mut signed = SignedCall::new(nonce, call);
        signed.sign(keypair).unwrap();
        signed
    }

    #[test]
    fn test_execute_register_voter() {
        let (executor, admin) = executor_with_admin();
        let voter = Keypair::generate();

        let call = signed(&admin, 0, Call::RegisterVoter { voter: voter.address() });
        let receipt = executor.execute(&call).unwrap();

        assert_eq!(receipt.caller, admin.address());
        assert_eq!(receipt.operation, "register_voter");
        assert_eq!(receipt.events.len(), 1);
        assert_eq!(
            receipt.events[0].event,
            BallotEvent::VoterRegistered { voter: voter.address() }
        );
        assert_eq!(executor.ledger().nonce_of(&admin.address()), 1);
    }

    #[test]
    fn test_unsigned_call_rejected() {
        let (executor, _admin) = executor_with_admin();
        let call = SignedCall::new(0, Call::StartProposalsRegistration);

        let err = executor.execute(&call).unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::InvalidSignature)));
    }

    #[test]
    fn test_replayed_call_rejected() {
        let (executor, admin) = executor_with_admin();
        let voter = Keypair::generate();

        let call = signed(&admin, 0, Call::RegisterVoter { voter: voter.address() });
        executor.execute(&call).unwrap();

        // Re-submitting the identical envelope must fail, not no-op
        let err = executor.execute(&call).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidNonce { expected: 1, actual: 0 }
        ));
    }

    #[test]
    fn test_failed_call_does_not_consume_nonce() {
        let (executor, _admin) = executor_with_admin();
        let outsider = Keypair::generate();

        // An outsider cannot open proposal registration
        let call = signed(&outsider, 0, Call::StartProposalsRegistration);
        let err = executor.execute(&call).unwrap_err();
        assert!(matches!(err, EngineError::Unauthorized { .. }));

        assert_eq!(executor.ledger().nonce_of(&outsider.address()), 0);
        assert!(executor.ledger().events_since(0).is_empty());
        assert_eq!(executor.ledger().phase(), WorkflowPhase::RegisteringVoters);
    }

    #[test]
    fn test_receipt_wire_shape() {
        let (executor, admin) = executor_with_admin();
        let voter = Keypair::generate();

        let call = signed(&admin, 0, Call::RegisterVoter { voter: voter.address() });
        let receipt = executor.execute(&call).unwrap();

        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["operation"], "register_voter");
        assert_eq!(json["caller"], admin.address().to_string());
        assert_eq!(json["events"][0]["sequence"], 1);
        assert_eq!(json["events"][0]["event"]["event"], "voter_registered");
        assert_eq!(
            json["events"][0]["event"]["voter"],
            voter.address().to_string()
        );
    }

    #[test]
    fn test_nonce_orders_calls_per_caller() {
        let (executor, admin) = executor_with_admin();
        let voter = Keypair::generate();

        executor
            .execute(&signed(&admin, 0, Call::RegisterVoter { voter: voter.address() }))
            .unwrap();

        // A stale nonce is rejected even for an otherwise valid call
        let stale = signed(&admin, 0, Call::StartProposalsRegistration);
        assert!(matches!(
            executor.execute(&stale),
            Err(EngineError::InvalidNonce { expected: 1, actual: 0 })
        ));

        // The correct nonce goes through; the voter's own nonce still starts at 0
        executor
            .execute(&signed(&admin, 1, Call::StartProposalsRegistration))
            .unwrap();
        executor
            .execute(&signed(
                &voter,
                0,
                Call::SubmitProposal { description: "A".to_string() },
            ))
            .unwrap();

        assert_eq!(executor.ledger().proposal_count(), 2);
    }
}
