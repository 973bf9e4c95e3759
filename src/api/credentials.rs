//! Credential utilities
//!
//! API key generation and hashing. Only sha256 digests are stored; the
//! plaintext key is returned once at registration and never again.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Prefix on generated API keys, handy for spotting them in configs
const API_KEY_PREFIX: &str = "pp_";

/// Hex-encoded sha256 digest of the input
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a fresh API key (returned to the caller in plaintext once)
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{}{}", API_KEY_PREFIX, hex::encode(bytes))
}

/// Generate a random password salt
pub fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a password with its salt
pub fn hash_password(password: &str, salt: &str) -> String {
    sha256_hex(&format!("{}:{}", salt, password))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_vector() {
        // sha256("abc")
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_api_keys_are_unique() {
        let a = generate_api_key();
        let b = generate_api_key();
        assert_ne!(a, b);
        assert!(a.starts_with(API_KEY_PREFIX));
        assert_eq!(a.len(), API_KEY_PREFIX.len() + 48);
    }

    #[test]
    fn test_password_hash_depends_on_salt() {
        let h1 = hash_password("password123", "salt-a");
        let h2 = hash_password("password123", "salt-b");
        assert_ne!(h1, h2);
        assert_eq!(h1, hash_password("password123", "salt-a"));
    }
}
