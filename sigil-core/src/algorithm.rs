//! Signature algorithms.

use crate::{HashFunction, SignerError};

/// Computes and checks the raw signature over a message with a derived key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum SignatureAlgorithm {
    /// Produces empty signatures and accepts every signature.
    ///
    /// # Security
    ///
    /// This provides no integrity at all. It only exists for testing and debugging.
    None,
    /// HMAC over the given hash function.
    Hmac(HashFunction),
}

impl Default for SignatureAlgorithm {
    fn default() -> Self {
        SignatureAlgorithm::Hmac(HashFunction::default())
    }
}

impl SignatureAlgorithm {
    pub fn get_signature(&self, key: &[u8], message: &[u8]) -> Vec<u8> {
        match self {
            SignatureAlgorithm::None => Vec::new(),
            SignatureAlgorithm::Hmac(hash) => hash.hmac(key, message),
        }
    }

    /// Verify `signature` over `message`.
    ///
    /// The HMAC comparison is constant-time.
    pub fn verify_signature(
        &self,
        key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), SignerError> {
        match self {
            SignatureAlgorithm::None => Ok(()),
            SignatureAlgorithm::Hmac(hash) => hash
                .verify_hmac(key, message, signature)
                .map_err(|_| SignerError::BadSignature(signature.to_vec())),
        }
    }
}
