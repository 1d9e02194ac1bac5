//! Ed25519 keypair generation.

use std::collections::VecDeque;
use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;

use super::address::{EncodedAddress, PUBLIC_KEY_LEN};

/// Length of an Ed25519 seed in bytes.
pub const SEED_LEN: usize = 32;

/// Length of the expanded secret key (`seed || public key`).
pub const SECRET_KEY_LEN: usize = 64;

/// Errors raised while generating keys.
#[derive(Debug, thiserror::Error)]
pub enum KeygenError {
    #[error("secure random source failed: {0}")]
    Entropy(#[from] rand::Error),

    #[error("seed source exhausted")]
    Exhausted,
}

/// A source of secret seeds, one per key attempt.
pub trait SeedSource: Send {
    /// Fills `seed` with fresh secret bytes.
    fn fill_seed(&mut self, seed: &mut [u8; SEED_LEN]) -> Result<(), KeygenError>;
}

/// The operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSeedSource;

impl SeedSource for OsSeedSource {
    #[inline]
    fn fill_seed(&mut self, seed: &mut [u8; SEED_LEN]) -> Result<(), KeygenError> {
        OsRng.try_fill_bytes(seed)?;
        Ok(())
    }
}

/// A fixed, ordered list of seeds. Yields each seed once, then reports
/// [`KeygenError::Exhausted`].
#[derive(Debug, Clone, Default)]
pub struct SeedSequence {
    seeds: VecDeque<[u8; SEED_LEN]>,
}

impl SeedSequence {
    pub fn new(seeds: impl IntoIterator<Item = [u8; SEED_LEN]>) -> Self {
        Self {
            seeds: seeds.into_iter().collect(),
        }
    }

    /// Returns how many seeds are left.
    pub fn remaining(&self) -> usize {
        self.seeds.len()
    }
}

impl SeedSource for SeedSequence {
    fn fill_seed(&mut self, seed: &mut [u8; SEED_LEN]) -> Result<(), KeygenError> {
        *seed = self.seeds.pop_front().ok_or(KeygenError::Exhausted)?;
        Ok(())
    }
}

/// An Ed25519 keypair.
#[derive(Clone)]
pub struct KeyPair {
    /// `seed || public key`
    secret_key: [u8; SECRET_KEY_LEN],
    public_key: [u8; PUBLIC_KEY_LEN],
}

impl KeyPair {
    /// Derives a keypair from a seed.
    pub fn from_seed(seed: &[u8; SEED_LEN]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        let public_key = signing_key.verifying_key().to_bytes();

        let mut secret_key = [0u8; SECRET_KEY_LEN];
        secret_key[..SEED_LEN].copy_from_slice(seed);
        secret_key[SEED_LEN..].copy_from_slice(&public_key);

        Self {
            secret_key,
            public_key,
        }
    }

    /// Returns the raw public key.
    #[inline]
    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_key
    }

    /// Returns the 64-byte secret key (`seed || public key`).
    pub fn secret_key(&self) -> &[u8; SECRET_KEY_LEN] {
        &self.secret_key
    }

    /// Returns the seed half of the secret key.
    pub fn seed(&self) -> &[u8] {
        &self.secret_key[..SEED_LEN]
    }

    /// Returns the full encoded address of the public key.
    #[inline]
    pub fn address(&self) -> EncodedAddress {
        EncodedAddress::encode(&self.public_key)
    }

    /// Returns the secret key in padded standard base64.
    pub fn secret_key_base64(&self) -> String {
        STANDARD.encode(self.secret_key)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Produces fresh keypairs from a seed source.
#[derive(Debug, Default)]
pub struct KeyGenerator<S = OsSeedSource> {
    source: S,
}

impl KeyGenerator<OsSeedSource> {
    /// Creates a generator backed by the operating system CSPRNG.
    pub fn os() -> Self {
        Self::new(OsSeedSource)
    }
}

impl<S: SeedSource> KeyGenerator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Generates a keypair from a fresh seed.
    ///
    /// A failing seed source is never retried; the error is returned to the
    /// caller as-is.
    #[inline]
    pub fn generate(&mut self) -> Result<KeyPair, KeygenError> {
        let mut seed = [0u8; SEED_LEN];
        self.source.fill_seed(&mut seed)?;
        Ok(KeyPair::from_seed(&seed))
    }

    /// Returns the underlying seed source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenSource;

    impl SeedSource for BrokenSource {
        fn fill_seed(&mut self, _seed: &mut [u8; SEED_LEN]) -> Result<(), KeygenError> {
            Err(KeygenError::Entropy(rand::Error::new(std::io::Error::other(
                "no entropy",
            ))))
        }
    }

    #[test]
    fn test_keypair_generation() {
        let mut generator = KeyGenerator::os();
        let a = generator.generate().unwrap();
        let b = generator.generate().unwrap();
        assert_ne!(a.public_key(), b.public_key());
        assert_eq!(a.secret_key().len(), SECRET_KEY_LEN);
    }

    #[test]
    fn test_deterministic() {
        let seed = [7u8; 32];
        let a = KeyPair::from_seed(&seed);
        let b = KeyPair::from_seed(&seed);
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn test_rfc8032_vector() {
        // RFC 8032, section 7.1, TEST 1
        let seed: [u8; 32] = [
            0x9d, 0x61, 0xb1, 0x9d, 0xef, 0xfd, 0x5a, 0x60, 0xba, 0x84, 0x4a, 0xf4, 0x92, 0xec,
            0x2c, 0xc4, 0x44, 0x49, 0xc5, 0x69, 0x7b, 0x32, 0x69, 0x19, 0x70, 0x3b, 0xac, 0x03,
            0x1c, 0xae, 0x7f, 0x60,
        ];
        let public: [u8; 32] = [
            0xd7, 0x5a, 0x98, 0x01, 0x82, 0xb1, 0x0a, 0xb7, 0xd5, 0x4b, 0xfe, 0xd3, 0xc9, 0x64,
            0x07, 0x3a, 0x0e, 0xe1, 0x72, 0xf3, 0xda, 0xa6, 0x23, 0x25, 0xaf, 0x02, 0x1a, 0x68,
            0xf7, 0x07, 0x51, 0x1a,
        ];
        let keypair = KeyPair::from_seed(&seed);
        assert_eq!(keypair.public_key(), &public);
        assert_eq!(keypair.seed(), &seed[..]);
        assert_eq!(&keypair.secret_key()[32..], &public[..]);
    }

    #[test]
    fn test_secret_key_base64() {
        let keypair = KeyPair::from_seed(&[0u8; 32]);
        let encoded = keypair.secret_key_base64();
        // 64 bytes -> 88 characters, two of them padding
        assert_eq!(encoded.len(), 88);
        assert!(encoded.ends_with("=="));
        assert_eq!(STANDARD.decode(&encoded).unwrap(), keypair.secret_key().to_vec());
    }

    #[test]
    fn test_seed_sequence_exhausts() {
        let mut generator = KeyGenerator::new(SeedSequence::new([[1u8; 32], [2u8; 32]]));
        assert_eq!(generator.generate().unwrap().seed(), &[1u8; 32][..]);
        assert_eq!(generator.generate().unwrap().seed(), &[2u8; 32][..]);
        assert_eq!(generator.source().remaining(), 0);
        assert!(matches!(generator.generate(), Err(KeygenError::Exhausted)));
    }

    #[test]
    fn test_entropy_failure_propagates() {
        let mut generator = KeyGenerator::new(BrokenSource);
        assert!(matches!(generator.generate(), Err(KeygenError::Entropy(_))));
    }
}
