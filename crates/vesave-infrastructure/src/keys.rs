//! Ephemeral secp256k1 keypairs with Ethereum-style addresses.
//!
//! VeChain derives addresses exactly like Ethereum, so one routine serves
//! both sides of a session.

use k256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use sha3::{Digest, Keccak256};
use vesave_core::session::{KeyPair, SecretKeyHex};
use vesave_core::{Result, VeSaveError};

/// Generates a fresh random keypair.
pub fn generate_keypair() -> KeyPair {
    let signing_key = SigningKey::random(&mut OsRng);
    keypair_from_signing_key(&signing_key)
}

/// Rebuilds a keypair from a 32-byte secret scalar.
pub fn keypair_from_secret(secret: &[u8]) -> Result<KeyPair> {
    let signing_key = SigningKey::from_slice(secret)
        .map_err(|e| VeSaveError::invalid_input(format!("Invalid secp256k1 secret key: {}", e)))?;
    Ok(keypair_from_signing_key(&signing_key))
}

fn keypair_from_signing_key(signing_key: &SigningKey) -> KeyPair {
    KeyPair {
        address: address_of(signing_key.verifying_key()),
        private_key: SecretKeyHex::new(format!("0x{}", hex::encode(signing_key.to_bytes()))),
    }
}

/// Keccak-256 of the uncompressed public key, last 20 bytes, checksummed.
fn address_of(verifying_key: &VerifyingKey) -> String {
    let point = verifying_key.to_encoded_point(false);
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    to_checksum_address(&hash[12..])
}

/// EIP-55 mixed-case encoding of a 20-byte address.
pub fn to_checksum_address(address: &[u8]) -> String {
    let lower = hex::encode(address);
    let hash = Keccak256::digest(lower.as_bytes());

    let mut checksummed = String::with_capacity(lower.len() + 2);
    checksummed.push_str("0x");
    for (index, ch) in lower.chars().enumerate() {
        let byte = hash[index / 2];
        let nibble = if index % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if ch.is_ascii_alphabetic() && nibble >= 8 {
            checksummed.push(ch.to_ascii_uppercase());
        } else {
            checksummed.push(ch);
        }
    }
    checksummed
}
