//! Cryptographic operations for Ed25519 key and address generation.
//!
//! This module provides:
//! - Secure random key generation from pluggable seed sources
//! - Base32 address encoding, full and truncated
//! - Tor v3 onion hostnames for found keys

mod address;
mod keypair;

pub use address::{
    encode_prefix, onion_hostname, prefix_bytes_for, EncodedAddress, ALPHABET, ENCODED_LEN,
    PUBLIC_KEY_LEN,
};
pub use keypair::{
    KeyGenerator, KeyPair, KeygenError, OsSeedSource, SeedSequence, SeedSource, SECRET_KEY_LEN,
    SEED_LEN,
};
