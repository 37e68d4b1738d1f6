//! Authenticated encryption using ChaCha20-Poly1305.

use crate::error::{CryptoError, CryptoResult};
use crate::key::SecretKey;
use base64::{engine::general_purpose::STANDARD, Engine};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;

/// Size of nonce in bytes (96 bits for ChaCha20-Poly1305).
pub const NONCE_SIZE: usize = 12;

/// Size of authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Ciphertext with the nonce needed to open it.
#[derive(Clone, Debug)]
struct Sealed {
    nonce: [u8; NONCE_SIZE],
    /// Auth tag appended.
    ciphertext: Vec<u8>,
}

impl Sealed {
    fn to_base64(&self) -> String {
        let mut bytes = Vec::with_capacity(NONCE_SIZE + self.ciphertext.len());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        STANDARD.encode(&bytes)
    }

    fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CryptoError::Decryption(format!("invalid base64: {e}")))?;

        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::Decryption("data too short".to_string()));
        }

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&bytes[..NONCE_SIZE]);
        let ciphertext = bytes[NONCE_SIZE..].to_vec();

        Ok(Self { nonce, ciphertext })
    }
}

fn seal(key: &SecretKey, plaintext: &[u8]) -> CryptoResult<Sealed> {
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(Sealed {
        nonce: nonce_bytes,
        ciphertext,
    })
}

fn open(key: &SecretKey, sealed: &Sealed) -> CryptoResult<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());
    let nonce = Nonce::from_slice(&sealed.nonce);

    cipher
        .decrypt(nonce, sealed.ciphertext.as_ref())
        .map_err(|_| {
            CryptoError::Decryption("decryption failed (wrong key or tampered data)".to_string())
        })
}

/// Encrypts a string under `key` with a fresh random nonce.
///
/// Returns `base64(nonce || ciphertext || tag)`.
pub fn encrypt_string(key: &SecretKey, plaintext: &str) -> CryptoResult<String> {
    Ok(seal(key, plaintext.as_bytes())?.to_base64())
}

/// Decrypts the output of [`encrypt_string`]. Surrounding whitespace is ignored.
pub fn decrypt_string(key: &SecretKey, encoded: &str) -> CryptoResult<String> {
    let sealed = Sealed::from_base64(encoded)?;
    let plaintext = open(key, &sealed)?;
    String::from_utf8(plaintext)
        .map_err(|e| CryptoError::Decryption(format!("invalid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::generate_random_key;

    #[test]
    fn ciphertext_carries_tag() {
        let key = generate_random_key();
        let sealed = seal(&key, b"abc").unwrap();
        assert_eq!(sealed.ciphertext.len(), 3 + TAG_SIZE);
    }

    #[test]
    fn tampered_nonce_fails() {
        let key = generate_random_key();
        let mut sealed = seal(&key, b"Secret").unwrap();
        sealed.nonce[0] ^= 0x01;
        assert!(open(&key, &sealed).is_err());
    }

    #[test]
    fn same_plaintext_gets_fresh_nonce() {
        let key = generate_random_key();
        let a = seal(&key, b"Same").unwrap();
        let b = seal(&key, b"Same").unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn too_short_is_rejected() {
        let short = STANDARD.encode([0u8; NONCE_SIZE + TAG_SIZE - 1]);
        assert!(Sealed::from_base64(&short).is_err());
    }
}
