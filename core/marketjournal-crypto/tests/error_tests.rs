use marketjournal_crypto::CryptoError;

#[test]
fn error_display_encryption() {
    let err = CryptoError::Encryption("oops".into());
    assert!(format!("{err}").contains("encryption failed"));
}

#[test]
fn error_display_decryption() {
    let err = CryptoError::Decryption("tampered".into());
    assert!(format!("{err}").contains("decryption failed"));
}

#[test]
fn error_display_invalid_key() {
    let err = CryptoError::InvalidKey("short".into());
    let msg = format!("{err}");
    assert!(msg.contains("invalid key"));
    assert!(msg.contains("short"));
}

#[test]
fn error_from_io() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: CryptoError = io.into();
    assert!(format!("{err}").contains("IO error"));
}
