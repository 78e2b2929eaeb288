//! Example demonstrating the signed call envelope

use ballot_core::{Call, Keypair, SignedCall};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Ballot envelope demo");
    println!("====================");

    // Create identities
    println!("\n1. Generating keypairs...");
    let admin = Keypair::generate();
    let voter = Keypair::generate();

    println!("   Admin address: {}", admin.address());
    println!("   Voter address: {}", voter.address());

    // The admin registers the voter
    println!("\n2. Signing a register_voter call...");
    let mut call = SignedCall::new(
        0,
        Call::RegisterVoter {
            voter: voter.address(),
        },
    );
    call.sign(&admin)?;

    println!("   Call hash: {}", call.hash()?);
    println!("   Recovered sender: {}", call.sender()?);
    assert_eq!(call.sender()?, admin.address());

    // This is the JSON a wallet would POST to the node
    println!("\n3. Wire form:");
    println!("{}", serde_json::to_string_pretty(&call)?);

    Ok(())
}
