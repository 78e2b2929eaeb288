//! Caller keypairs and address derivation

use crate::{Address, CoreError, CoreResult};
use sha3::{Digest, Keccak256};

/// A secp256k1 keypair identifying a caller (the administrator or a voter).
///
/// Addresses are derived the same way the signed call envelope recovers
/// them: Keccak-256 of the uncompressed public key, last 20 bytes.
pub struct Keypair {
    secret: secp256k1::SecretKey,
}

impl Keypair {
    /// Generate a fresh random keypair
    pub fn generate() -> Self {
        let secp = secp256k1::Secp256k1::new();
        let (secret, _public) = secp.generate_keypair(&mut rand::rng());
        Self { secret }
    }

    /// Load a keypair from a hex-encoded secret, with or without a 0x prefix
    pub fn from_secret_hex(hex_str: &str) -> CoreResult<Self> {
        let hex_str = hex_str.trim();
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(hex_str)?;
        let secret = secp256k1::SecretKey::from_slice(&bytes)
            .map_err(|e| CoreError::Crypto(e.to_string()))?;
        Ok(Self { secret })
    }

    /// Hex encoding of the secret key
    pub fn secret_hex(&self) -> String {
        hex::encode(self.secret.secret_bytes())
    }

    /// The address this keypair signs as
    pub fn address(&self) -> Address {
        let secp = secp256k1::Secp256k1::new();
        let public = self.secret.public_key(&secp);
        address_from_public_key(&public)
    }

    pub(crate) fn secret_key(&self) -> &secp256k1::SecretKey {
        &self.secret
    }
}

/// Derive an address from a public key (last 20 bytes of the Keccak-256
/// hash of the uncompressed key, skipping the 0x04 tag byte)
pub fn address_from_public_key(public: &secp256k1::PublicKey) -> Address {
    let pubkey_bytes = public.serialize_uncompressed();
    let pubkey_hash = Keccak256::digest(&pubkey_bytes[1..]);
    let mut addr_bytes = [0u8; 20];
    addr_bytes.copy_from_slice(&pubkey_hash[12..32]);
    Address::new(addr_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_generation() {
        let keypair = Keypair::generate();
        let other = Keypair::generate();
        assert_ne!(keypair.address(), other.address());
        assert_ne!(keypair.address(), Address::zero());
    }

    #[test]
    fn test_keypair_hex_round_trip() {
        let keypair = Keypair::generate();
        let restored = Keypair::from_secret_hex(&keypair.secret_hex()).unwrap();
        assert_eq!(keypair.address(), restored.address());

        let prefixed = Keypair::from_secret_hex(&format!("0x{}", keypair.secret_hex())).unwrap();
        assert_eq!(keypair.address(), prefixed.address());
    }

    #[test]
    fn test_bad_secret_hex() {
        assert!(Keypair::from_secret_hex("not hex").is_err());
        // All-zero secret is not a valid scalar
        let zeros = "0".repeat(64);
        assert!(Keypair::from_secret_hex(&zeros).is_err());
    }
}
