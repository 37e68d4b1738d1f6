//! Property-based tests for the crypto module.
//!
//! These tests verify security properties that must always hold:
//! - Encryption is reversible with the correct key
//! - Tampering with any byte is detected

use base64::{engine::general_purpose::STANDARD, Engine};
use marketjournal_crypto::{decrypt_string, encrypt_string, generate_random_key};
use proptest::prelude::*;

proptest! {
    #[test]
    fn secret_strings_survive_encryption(plaintext in "[ -~]{1,200}") {
        let key = generate_random_key();
        let encoded = encrypt_string(&key, &plaintext).unwrap();
        prop_assert_eq!(decrypt_string(&key, &encoded).unwrap(), plaintext);
    }

    #[test]
    fn any_flipped_bit_is_detected(
        plaintext in "[ -~]{1,200}",
        index in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let key = generate_random_key();
        let mut raw = STANDARD.decode(encrypt_string(&key, &plaintext).unwrap()).unwrap();

        let i = index.index(raw.len());
        raw[i] ^= 1 << bit;

        prop_assert!(decrypt_string(&key, &STANDARD.encode(raw)).is_err());
    }
}
