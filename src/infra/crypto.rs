use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

const NONCE_LEN: usize = 12;

/// Ciphertext of a serialized claims object, hex-encoded. `iv` is drawn
/// fresh for every encryption and travels with the ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedBlob {
    pub iv: String,
    pub content: String,
}

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("blob field `{0}` is not valid hex")]
    Encoding(&'static str),

    #[error("iv must decode to {NONCE_LEN} bytes")]
    IvLength,

    #[error("encryption failed")]
    Encrypt,

    #[error("decryption failed")]
    Decrypt,

    #[error("decrypted claims are not valid UTF-8")]
    Utf8,
}

/// Hashes an arbitrary-length secret down to an AES-256 key.
pub fn derive_key(secret: &str) -> aes_gcm::Key<Aes256Gcm> {
    let digest = Sha256::digest(secret.as_bytes());
    *aes_gcm::Key::<Aes256Gcm>::from_slice(&digest)
}

/// AES-256-GCM cipher for claim blobs, keyed from the shared encryption secret.
#[derive(Clone)]
pub struct ClaimsCipher {
    key: aes_gcm::Key<Aes256Gcm>,
}

impl ClaimsCipher {
    pub fn new(secret: &SecretString) -> Self {
        Self {
            key: derive_key(secret.expose_secret()),
        }
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<EncryptedBlob, CryptoError> {
        let cipher = Aes256Gcm::new(&self.key);
        let nonce_bytes = rand::random::<[u8; NONCE_LEN]>();
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::Encrypt)?;
        Ok(EncryptedBlob {
            iv: hex::encode(nonce_bytes),
            content: hex::encode(ciphertext),
        })
    }

    pub fn decrypt(&self, blob: &EncryptedBlob) -> Result<String, CryptoError> {
        let iv = hex::decode(&blob.iv).map_err(|_| CryptoError::Encoding("iv"))?;
        if iv.len() != NONCE_LEN {
            return Err(CryptoError::IvLength);
        }
        let content = hex::decode(&blob.content).map_err(|_| CryptoError::Encoding("content"))?;
        let cipher = Aes256Gcm::new(&self.key);
        let plaintext = cipher
            .decrypt(Nonce::from_slice(&iv), content.as_ref())
            .map_err(|_| CryptoError::Decrypt)?;
        String::from_utf8(plaintext).map_err(|_| CryptoError::Utf8)
    }
}
