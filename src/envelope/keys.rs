//! RSA key loading for envelopes.

use std::path::Path;

use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use super::EnvelopeError;

/// Recipient key used when no `--public-key` is given. Dumps sealed with it
/// can only be read by the project maintainers.
pub const DEFAULT_PUBLIC_KEY: &str = "-----BEGIN PUBLIC KEY-----
MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEA1oYXnbQPxREiVPUIRkgk
h+ehjxHnwz34NsjhjgN1oSKmHpf4cL4L/V4tMnj5NELEmLyTrzAZbeewUMwyiwXO
3l+cSjjoDKcPBSj4uxjWsq74Q5TLHGjOtkFwaqqxtvsVn3fGFWBO405xpvp7jPUc
BOvBQaUBUaR9Tbw5anMOzeavUwUTRp2rjtbWyj2P7PEp49Ixzw0w+RjIVrzzevAo
AD7SVb6U8P77fht4k9krbIFckC/ByY48HhmF+edh1GZAgLCHuf43tGg2upuH5wf+
AGv/Xlc+9ScTjEp37uPiCpHcB1ur83AFTjcceDIm+VDKF4zQrj88zmL7JqZy+Upx
UQIDAQAB
-----END PUBLIC KEY-----
";

const ENCRYPTED_PKCS8_LABEL: &str = "ENCRYPTED PRIVATE KEY";

/// Load the recipient key from `path`, or the built-in key when `None`.
pub fn load_public_key(path: Option<&Path>) -> Result<RsaPublicKey, EnvelopeError> {
    let key = match path {
        Some(path) => parse_public_key(&read_key_file(path)?)?,
        None => parse_public_key(DEFAULT_PUBLIC_KEY)?,
    };
    if let Some(fp) = fingerprint(&key) {
        log::debug!("encrypting for public key {}", fp);
    }
    Ok(key)
}

/// Parse a SubjectPublicKeyInfo (`BEGIN PUBLIC KEY`) or PKCS#1
/// (`BEGIN RSA PUBLIC KEY`) PEM document.
pub fn parse_public_key(pem: &str) -> Result<RsaPublicKey, EnvelopeError> {
    let pem = pem.trim();
    RsaPublicKey::from_public_key_pem(pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
        .map_err(|e| EnvelopeError::PublicKey(e.to_string()))
}

/// Load the private key at `path`, decrypting it with `pass_phrase` when the
/// file holds an encrypted PKCS#8 document.
pub fn load_private_key(
    path: &Path,
    pass_phrase: Option<&str>,
) -> Result<RsaPrivateKey, EnvelopeError> {
    parse_private_key(&read_key_file(path)?, pass_phrase)
}

/// Parse a PKCS#8 (plain or encrypted) or PKCS#1 private key PEM document.
///
/// A pass-phrase supplied for an unencrypted key is ignored.
pub fn parse_private_key(
    pem: &str,
    pass_phrase: Option<&str>,
) -> Result<RsaPrivateKey, EnvelopeError> {
    let pem = pem.trim();
    let parsed = if pem.contains(ENCRYPTED_PKCS8_LABEL) {
        let pass = pass_phrase.ok_or_else(|| {
            EnvelopeError::PrivateKey("key is encrypted; supply --pass-phrase".to_string())
        })?;
        RsaPrivateKey::from_pkcs8_encrypted_pem(pem, pass.as_bytes()).map_err(|e| e.to_string())
    } else {
        RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| e.to_string())
    };
    parsed.map_err(EnvelopeError::PrivateKey)
}

/// Short SHA-256 fingerprint of the DER-encoded public key.
pub fn fingerprint(key: &RsaPublicKey) -> Option<String> {
    let der = key.to_public_key_der().ok()?;
    let digest = Sha256::digest(der.as_bytes());
    Some(hex::encode(&digest[..8]))
}

fn read_key_file(path: &Path) -> Result<String, EnvelopeError> {
    std::fs::read_to_string(path).map_err(|source| EnvelopeError::KeyFile {
        path: path.to_path_buf(),
        source,
    })
}
