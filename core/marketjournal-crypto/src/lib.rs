//! Local secret encryption for Market Journal.
//!
//! Secrets the client keeps at rest (the activated license key, the market
//! data API key) are encrypted with ChaCha20-Poly1305 under a random key that
//! lives in its own owner-only key file.
//!
//! # Layout on disk
//!
//! - Key file: `base64(32 random bytes)`, mode 0600
//! - Secret file: `base64(nonce || ciphertext || tag)`, mode 0600

mod cipher;
mod error;
mod file;
mod key;

pub use cipher::{decrypt_string, encrypt_string, NONCE_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use file::{KeyFile, SecretFile};
pub use key::{generate_random_key, SecretKey, KEY_SIZE};
