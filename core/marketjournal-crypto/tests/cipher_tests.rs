use base64::{engine::general_purpose::STANDARD, Engine};
use marketjournal_crypto::{
    decrypt_string, encrypt_string, generate_random_key, NONCE_SIZE, TAG_SIZE,
};

#[test]
fn encrypt_decrypt_license_key() {
    let key = generate_random_key();
    let encoded = encrypt_string(&key, "0b7c2f7e-1d9a-4c55-9a53-7f0e2f1b6c11").unwrap();
    assert_eq!(
        decrypt_string(&key, &encoded).unwrap(),
        "0b7c2f7e-1d9a-4c55-9a53-7f0e2f1b6c11"
    );
}

#[test]
fn encoded_length_is_nonce_ciphertext_and_tag() {
    let key = generate_random_key();
    let encoded = encrypt_string(&key, "abc").unwrap();
    let raw = STANDARD.decode(encoded).unwrap();
    assert_eq!(raw.len(), NONCE_SIZE + 3 + TAG_SIZE);
}

#[test]
fn wrong_key_fails_decryption() {
    let k1 = generate_random_key();
    let k2 = generate_random_key();
    let encoded = encrypt_string(&k1, "secret").unwrap();
    assert!(decrypt_string(&k2, &encoded).is_err());
}

#[test]
fn tampered_ciphertext_fails_decryption() {
    let key = generate_random_key();
    let mut raw = STANDARD
        .decode(encrypt_string(&key, "Secret").unwrap())
        .unwrap();
    raw[NONCE_SIZE] ^= 0xFF;
    assert!(decrypt_string(&key, &STANDARD.encode(raw)).is_err());
}

#[test]
fn same_plaintext_encodes_differently() {
    let key = generate_random_key();
    assert_ne!(
        encrypt_string(&key, "Same").unwrap(),
        encrypt_string(&key, "Same").unwrap()
    );
}

// ── Base64 framing ───────────────────────────────────────────────

#[test]
fn base64_too_short_fails() {
    let key = generate_random_key();
    let short = STANDARD.encode([0u8; NONCE_SIZE + TAG_SIZE - 1]);
    assert!(decrypt_string(&key, &short).is_err());
}

#[test]
fn base64_invalid_fails() {
    let key = generate_random_key();
    assert!(decrypt_string(&key, "!!!not-base64!!!").is_err());
}

#[test]
fn base64_tolerates_trailing_newline() {
    let key = generate_random_key();
    let encoded = encrypt_string(&key, "k").unwrap();
    assert_eq!(decrypt_string(&key, &format!("{encoded}\n")).unwrap(), "k");
}

#[test]
fn string_encrypt_decrypt_unicode() {
    let key = generate_random_key();
    let plaintext = "Hello, 世界! 🌍";
    let encoded = encrypt_string(&key, plaintext).unwrap();
    assert_eq!(decrypt_string(&key, &encoded).unwrap(), plaintext);
}
