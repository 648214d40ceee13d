//! Seal and open payloads.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes128Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::EnvelopeError;

/// Payloads are padded to a multiple of this many bytes.
pub const BLOCK_SIZE: usize = 16;

/// Length of the per-envelope symmetric key.
pub const NONCE_LEN: usize = 16;

/// Length of the GCM initialisation vector stored in front of the ciphertext.
const IV_LEN: usize = 12;

/// Column at which the base64 text is wrapped.
const LINE_WIDTH: usize = 76;

/// The serialized envelope: `n` is the wrapped nonce, `o` is `iv || ciphertext`.
#[derive(Debug, Serialize, Deserialize)]
struct Sealed {
    #[serde(with = "base64_field")]
    n: Vec<u8>,
    #[serde(with = "base64_field")]
    o: Vec<u8>,
}

mod base64_field {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD
            .decode(text.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// Apply PKCS#7 padding up to the next multiple of [`BLOCK_SIZE`].
///
/// A buffer that is already aligned grows by one full block, so the padding
/// length can always be read back from the last byte.
pub fn pad(buf: &mut Vec<u8>) {
    let fill = BLOCK_SIZE - buf.len() % BLOCK_SIZE;
    buf.resize(buf.len() + fill, fill as u8);
}

/// Strip PKCS#7 padding added by [`pad`].
pub fn unpad(buf: &mut Vec<u8>) -> Result<(), EnvelopeError> {
    let fill = *buf.last().ok_or(EnvelopeError::Padding)? as usize;
    if fill == 0 || fill > BLOCK_SIZE || fill > buf.len() || buf.len() % BLOCK_SIZE != 0 {
        return Err(EnvelopeError::Padding);
    }
    let start = buf.len() - fill;
    if !buf[start..].iter().all(|&b| b as usize == fill) {
        return Err(EnvelopeError::Padding);
    }
    buf.truncate(start);
    Ok(())
}

/// Serialize `obj`, encrypt it for the owner of `key`, and return base64 text.
///
/// Every call draws a fresh nonce, so sealing the same object twice gives
/// different text.
pub fn encrypt_to_string<T>(obj: &T, key: &RsaPublicKey) -> Result<String, EnvelopeError>
where
    T: Serialize + ?Sized,
{
    let mut payload = serde_json::to_vec(obj)?;
    pad(&mut payload);

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let cipher = Aes128Gcm::new_from_slice(&nonce).map_err(|_| EnvelopeError::Cipher)?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), payload.as_slice())
        .map_err(|_| EnvelopeError::Cipher)?;

    let mut sealed = Vec::with_capacity(IV_LEN + ciphertext.len());
    sealed.extend_from_slice(&iv);
    sealed.extend_from_slice(&ciphertext);

    let wrapped = key.encrypt(&mut OsRng, Oaep::new::<Sha256>(), &nonce)?;
    log::debug!(
        "sealed {} payload bytes into {} ciphertext bytes",
        payload.len(),
        sealed.len()
    );

    let envelope = serde_json::to_vec(&Sealed {
        n: wrapped,
        o: sealed,
    })?;
    Ok(encode_lines(&envelope).trim_end().to_string())
}

/// Inverse of [`encrypt_to_string`]. Whitespace inside `text` is ignored.
pub fn decrypt_from_string<T>(text: &str, key: &RsaPrivateKey) -> Result<T, EnvelopeError>
where
    T: DeserializeOwned,
{
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let envelope = STANDARD.decode(compact.as_bytes())?;
    let sealed: Sealed = serde_json::from_slice(&envelope)?;

    let nonce = key.decrypt(Oaep::new::<Sha256>(), &sealed.n)?;
    if nonce.len() != NONCE_LEN {
        return Err(EnvelopeError::NonceLength(nonce.len()));
    }
    if sealed.o.len() < IV_LEN {
        return Err(EnvelopeError::Cipher);
    }
    let (iv, ciphertext) = sealed.o.split_at(IV_LEN);

    let cipher = Aes128Gcm::new_from_slice(&nonce).map_err(|_| EnvelopeError::Cipher)?;
    let mut payload = cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| EnvelopeError::Cipher)?;
    unpad(&mut payload)?;

    Ok(serde_json::from_slice(&payload)?)
}

fn encode_lines(bytes: &[u8]) -> String {
    let encoded = STANDARD.encode(bytes);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / LINE_WIDTH + 1);
    for (i, c) in encoded.chars().enumerate() {
        if i > 0 && i % LINE_WIDTH == 0 {
            out.push('\n');
        }
        out.push(c);
    }
    out
}
