//! Base32 address encoding for Ed25519 public keys.

use std::fmt;

use base32::Alphabet;
use tiny_keccak::{Hasher, Sha3};

/// Length of a raw Ed25519 public key in bytes.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Length of an encoded address (unpadded base32 of 32 bytes).
pub const ENCODED_LEN: usize = 52;

/// Base32 alphabet used by addresses (RFC 4648, upper case).
pub const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

const CODEC: Alphabet = Alphabet::RFC4648 { padding: false };

const ONION_CHECKSUM_PREFIX: &[u8] = b".onion checksum";
const ONION_VERSION: u8 = 3;

/// The canonical text form of a public key: unpadded upper-case base32.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EncodedAddress(String);

impl EncodedAddress {
    /// Encodes a raw public key.
    #[inline]
    pub fn encode(public_key: &[u8; PUBLIC_KEY_LEN]) -> Self {
        Self(base32::encode(CODEC, public_key))
    }

    /// Returns the address as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the address, returning the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for EncodedAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EncodedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedAddress({})", self.0)
    }
}

impl fmt::Display for EncodedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Number of raw bytes whose encoding fully determines the first `chars`
/// characters of the address.
#[inline]
pub const fn prefix_bytes_for(chars: usize) -> usize {
    let bytes = (chars * 5 + 7) / 8;
    if bytes > PUBLIC_KEY_LEN {
        PUBLIC_KEY_LEN
    } else {
        bytes
    }
}

/// Encodes only as much of the key as needed to produce the first `chars`
/// characters of the address.
///
/// The result is always identical to the first `min(chars, ENCODED_LEN)`
/// characters of [`EncodedAddress::encode`]. Bits past the cut are zero-filled
/// by the encoder, so the tail of the partial encoding is discarded.
#[inline]
pub fn encode_prefix(public_key: &[u8; PUBLIC_KEY_LEN], chars: usize) -> String {
    let chars = chars.min(ENCODED_LEN);
    let mut encoded = base32::encode(CODEC, &public_key[..prefix_bytes_for(chars)]);
    encoded.truncate(chars);
    encoded
}

/// Returns the Tor v3 onion hostname for a public key.
///
/// `base32(pubkey || checksum || version).onion` where checksum is the first
/// two bytes of `SHA3-256(".onion checksum" || pubkey || version)`.
pub fn onion_hostname(public_key: &[u8; PUBLIC_KEY_LEN]) -> String {
    let mut hasher = Sha3::v256();
    hasher.update(ONION_CHECKSUM_PREFIX);
    hasher.update(public_key);
    hasher.update(&[ONION_VERSION]);
    let mut checksum = [0u8; 32];
    hasher.finalize(&mut checksum);

    let mut onion = [0u8; PUBLIC_KEY_LEN + 3];
    onion[..PUBLIC_KEY_LEN].copy_from_slice(public_key);
    onion[PUBLIC_KEY_LEN..PUBLIC_KEY_LEN + 2].copy_from_slice(&checksum[..2]);
    onion[PUBLIC_KEY_LEN + 2] = ONION_VERSION;

    format!("{}.onion", base32::encode(CODEC, &onion).to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        for (i, b) in key.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(37).wrapping_add(11);
        }
        key
    }

    #[test]
    fn test_zero_key() {
        let addr = EncodedAddress::encode(&[0u8; 32]);
        assert_eq!(addr.as_str(), "A".repeat(ENCODED_LEN));
    }

    #[test]
    fn test_known_vector() {
        // "foobar" test vector from RFC 4648, padded out to a full key
        let mut key = [0u8; 32];
        key[..6].copy_from_slice(b"foobar");
        let addr = EncodedAddress::encode(&key);
        assert!(addr.as_str().starts_with("MZXW6YTBOI"));
    }

    #[test]
    fn test_encoding_shape() {
        let addr = EncodedAddress::encode(&sample_key());
        assert_eq!(addr.as_str().len(), ENCODED_LEN);
        assert!(addr.as_str().chars().all(|c| ALPHABET.contains(c)));
        assert!(!addr.as_str().contains('='));
    }

    #[test]
    fn test_deterministic() {
        let key = sample_key();
        assert_eq!(EncodedAddress::encode(&key), EncodedAddress::encode(&key));
    }

    #[test]
    fn test_prefix_consistency() {
        for key in [[0u8; 32], [0xffu8; 32], sample_key()] {
            let full = EncodedAddress::encode(&key);
            for k in 0..=ENCODED_LEN {
                assert_eq!(encode_prefix(&key, k), &full.as_str()[..k], "k = {}", k);
            }
        }
    }

    #[test]
    fn test_prefix_clamped() {
        let key = sample_key();
        let full = EncodedAddress::encode(&key);
        assert_eq!(encode_prefix(&key, 100), full.as_str());
    }

    #[test]
    fn test_prefix_bytes() {
        assert_eq!(prefix_bytes_for(0), 0);
        assert_eq!(prefix_bytes_for(1), 1);
        assert_eq!(prefix_bytes_for(3), 2);
        assert_eq!(prefix_bytes_for(8), 5);
        assert_eq!(prefix_bytes_for(52), 32);
        assert_eq!(prefix_bytes_for(60), 32);
    }

    #[test]
    fn test_onion_format() {
        let key = sample_key();
        let onion = onion_hostname(&key);
        assert!(onion.ends_with(".onion"));
        assert_eq!(onion.len(), 56 + 6);
        // 35 bytes encode to exactly 56 characters, the last carries the version
        assert_eq!(onion.as_bytes()[55], b'd');
        let addr = EncodedAddress::encode(&key).into_string().to_ascii_lowercase();
        assert_eq!(&onion[..50], &addr[..50]);
    }
}
