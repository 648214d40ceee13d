//! Hybrid-encrypted text envelopes for dumped state.
//!
//! A payload is serialized to JSON and sealed with a one-shot AES-128-GCM key
//! (the "nonce"). The nonce itself is wrapped with RSA-OAEP for the holder of
//! the private key. The result travels as base64 text between marker lines so
//! it can be pasted into bug reports or log files.

mod armor;
mod codec;
mod keys;

use std::path::PathBuf;

pub use armor::{wrap, Armor, Block, Scanner};
pub use codec::{decrypt_from_string, encrypt_to_string, pad, unpad, BLOCK_SIZE, NONCE_LEN};
pub use keys::{
    fingerprint, load_private_key, load_public_key, parse_private_key, parse_public_key,
    DEFAULT_PUBLIC_KEY,
};

/// Errors produced while sealing or opening an envelope.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("failed to read key file '{}': {source}", .path.display())]
    KeyFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid public key: {0}")]
    PublicKey(String),

    #[error("invalid private key: {0}")]
    PrivateKey(String),

    #[error("RSA operation failed: {0}")]
    Rsa(#[from] rsa::Error),

    #[error("symmetric cipher failed (wrong key or corrupted data)")]
    Cipher,

    #[error("recovered key has length {0}, expected 16 bytes")]
    NonceLength(usize),

    #[error("invalid padding")]
    Padding,

    #[error("envelope is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no encrypted block found in input")]
    NoBlock,
}
