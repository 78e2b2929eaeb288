//! Signed call envelope for state-changing operations
//!
//! Every operation that mutates the workflow travels as a [`SignedCall`]:
//! the (nonce, call) pair is bincode-encoded, Keccak-256 hashed, and signed
//! with a recoverable secp256k1 signature. The engine recovers the caller
//! address from the signature, so no ambient identity exists anywhere in
//! the core.

use crate::{Address, CallNonce, CoreError, CoreResult, Hash, Keypair, ProposalId};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

/// A state-changing operation on the voting workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Call {
    /// Admin-only: register a voter while voter registration is open
    RegisterVoter { voter: Address },
    /// Admin-only: open proposal registration (seeds the GENESIS proposal)
    StartProposalsRegistration,
    /// Admin-only: close proposal registration
    EndProposalsRegistration,
    /// Admin-only: open the voting session
    StartVotingSession,
    /// Admin-only: close the voting session
    EndVotingSession,
    /// Admin-only: tally votes and finalize the winner
    TallyVotes,
    /// Voter: submit a proposal while proposal registration is open
    SubmitProposal { description: String },
    /// Voter: cast a vote while the voting session is open
    CastVote { proposal_id: ProposalId },
}

impl Call {
    /// Short operation name, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Call::RegisterVoter { .. } => "register_voter",
            Call::StartProposalsRegistration => "start_proposals_registration",
            Call::EndProposalsRegistration => "end_proposals_registration",
            Call::StartVotingSession => "start_voting_session",
            Call::EndVotingSession => "end_voting_session",
            Call::TallyVotes => "tally_votes",
            Call::SubmitProposal { .. } => "submit_proposal",
            Call::CastVote { .. } => "cast_vote",
        }
    }
}

/// Call signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode)]
pub struct Signature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub v: u8,
}

impl Signature {
    /// Create new signature
    pub fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Self { r, s, v }
    }

    /// Convert to bytes (65 bytes total)
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[0..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }

    /// Create from bytes
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        if bytes.len() != 65 {
            return Err(CoreError::InvalidSignature);
        }

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[0..32]);
        s.copy_from_slice(&bytes[32..64]);
        let v = bytes[64];

        Ok(Self { r, s, v })
    }
}

/// A call plus the replay nonce and signature that authenticate it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode)]
pub struct SignedCall {
    /// Caller's call sequence number (number of calls applied so far)
    pub nonce: CallNonce,
    /// The operation to perform
    pub call: Call,
    /// Recoverable signature over (nonce, call)
    pub signature: Option<Signature>,
}

impl SignedCall {
    /// Create a new, not yet signed call
    pub fn new(nonce: CallNonce, call: Call) -> Self {
        Self {
            nonce,
            call,
            signature: None,
        }
    }

    /// Encode the call for hashing (without signature)
    pub fn encode_for_signing(&self) -> CoreResult<Vec<u8>> {
        let payload = CallForSigning {
            nonce: self.nonce,
            call: self.call.clone(),
        };

        bincode::encode_to_vec(&payload, bincode::config::standard())
            .map_err(|e| CoreError::Bincode(e.to_string()))
    }

    /// Calculate the call hash (including signature), used in receipts
    pub fn hash(&self) -> CoreResult<Hash> {
        let encoded = bincode::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| CoreError::Bincode(e.to_string()))?;
        let hash_bytes = Keccak256::digest(&encoded);
        Ok(Hash::from_slice(hash_bytes.as_slice()))
    }

    /// Calculate the hash that gets signed (without signature)
    pub fn signing_hash(&self) -> CoreResult<Hash> {
        let encoded = self.encode_for_signing()?;
        let hash_bytes = Keccak256::digest(&encoded);
        Ok(Hash::from_slice(hash_bytes.as_slice()))
    }

    /// Sign the call with the given keypair
    pub fn sign(&mut self, keypair: &Keypair) -> CoreResult<()> {
        let signing_hash = self.signing_hash()?;

        let secp = secp256k1::Secp256k1::new();
        let message = secp256k1::Message::from_digest_slice(signing_hash.as_bytes())
            .map_err(|e| CoreError::Crypto(e.to_string()))?;

        let sig = secp.sign_ecdsa_recoverable(message, keypair.secret_key());
        let (recovery_id, sig_bytes) = sig.serialize_compact();

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&sig_bytes[0..32]);
        s.copy_from_slice(&sig_bytes[32..64]);
        let v = recovery_id as u8;

        self.signature = Some(Signature::new(r, s, v));
        Ok(())
    }

    /// Recover the caller address from the signature
    pub fn sender(&self) -> CoreResult<Address> {
        let signature = match &self.signature {
            Some(sig) => sig,
            None => return Err(CoreError::InvalidSignature),
        };

        let signing_hash = self.signing_hash()?;

        let secp = secp256k1::Secp256k1::new();

        let recovery_id = secp256k1::ecdsa::RecoveryId::from_u8_masked(signature.v);

        let mut sig_bytes = [0u8; 64];
        sig_bytes[0..32].copy_from_slice(&signature.r);
        sig_bytes[32..64].copy_from_slice(&signature.s);

        let recoverable_sig =
            secp256k1::ecdsa::RecoverableSignature::from_compact(&sig_bytes, recovery_id)
                .map_err(|e| CoreError::Crypto(e.to_string()))?;

        let message = secp256k1::Message::from_digest_slice(signing_hash.as_bytes())
            .map_err(|e| CoreError::Crypto(e.to_string()))?;

        let public_key = secp
            .recover_ecdsa(message, &recoverable_sig)
            .map_err(|e| CoreError::Crypto(e.to_string()))?;

        Ok(crate::keys::address_from_public_key(&public_key))
    }
}

/// Helper struct for encoding the signed portion of a call
#[derive(Serialize, bincode::Encode)]
struct CallForSigning {
    nonce: CallNonce,
    call: Call,
}
