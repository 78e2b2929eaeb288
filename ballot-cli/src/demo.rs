//! Scripted demo election
//!
//! Plays the canonical scenario against an in-process engine: three voters,
//! two proposals, a 2-1 vote, and a tally. Useful as a smoke test and as a
//! worked example of the call surface.

use anyhow::Context;
use ballot_core::{Call, Keypair, SignedCall};
use ballot_engine::{CallExecutor, SharedLedger};

pub fn run() -> anyhow::Result<()> {
    let admin = Keypair::generate();
    let voters: Vec<Keypair> = (0..3).map(|_| Keypair::generate()).collect();

    println!("administrator: {}", admin.address());
    for (i, voter) in voters.iter().enumerate() {
        println!("voter {}:       {}", i + 1, voter.address());
    }
    println!();

    let executor = CallExecutor::new(SharedLedger::new(admin.address()));

    let apply = |keypair: &Keypair, call: Call| -> anyhow::Result<()> {
        let nonce = executor.ledger().nonce_of(&keypair.address());
        let mut signed = SignedCall::new(nonce, call);
        signed.sign(keypair)?;
        let receipt = executor
            .execute(&signed)
            .with_context(|| format!("call by {}", keypair.address()))?;
        for record in &receipt.events {
            println!("[{}] {}", record.sequence, record.event);
        }
        Ok(())
    };

    for voter in &voters {
        apply(&admin, Call::RegisterVoter { voter: voter.address() })?;
    }

    apply(&admin, Call::StartProposalsRegistration)?;
    apply(&voters[0], Call::SubmitProposal { description: "Proposal A".to_string() })?;
    apply(&voters[1], Call::SubmitProposal { description: "Proposal B".to_string() })?;
    apply(&admin, Call::EndProposalsRegistration)?;
    apply(&admin, Call::StartVotingSession)?;

    apply(&voters[0], Call::CastVote { proposal_id: 1 })?;
    apply(&voters[1], Call::CastVote { proposal_id: 1 })?;
    apply(&voters[2], Call::CastVote { proposal_id: 2 })?;

    apply(&admin, Call::EndVotingSession)?;
    apply(&admin, Call::TallyVotes)?;

    let ledger = executor.ledger();
    let winner_id = ledger.winner();
    let winner = ledger.proposal(voters[0].address(), winner_id)?;
    println!();
    println!(
        "winner: proposal {} ({:?}) with {} votes",
        winner_id, winner.description, winner.vote_count
    );

    Ok(())
}
