//! Signer settings as they appear in a config file.
//!
//! ```json
//! {
//!     "salt": "password-reset",
//!     "hash": "sha256",
//!     "key_derivation": { "hmac": "sha256" },
//!     "max_age_secs": 3600
//! }
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::{
    HashFunction, KeyDerivation, SignatureAlgorithm, Signer, SignerBuilder, SignerError,
    TimestampSigner,
};

/// Every field is optional and falls back to the [`Signer`] defaults.
///
/// The secret key is deliberately not part of the config; it is passed in when
/// building the signer.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignerConfig {
    pub separator: Option<String>,
    pub salt: Option<String>,
    pub hash: Option<HashFunction>,
    pub algorithm: Option<SignatureAlgorithm>,
    pub key_derivation: Option<KeyDerivation>,
    /// Only used by [`TimestampSigner`]s. Unset means tokens never expire.
    pub max_age_secs: Option<u64>,
}

impl SignerConfig {
    pub fn builder(&self, secret: impl AsRef<[u8]>) -> SignerBuilder {
        let mut builder = Signer::builder(secret);
        if let Some(separator) = &self.separator {
            builder = builder.separator(separator);
        }
        if let Some(salt) = &self.salt {
            builder = builder.salt(salt);
        }
        if let Some(hash) = self.hash {
            builder = builder.hash(hash);
        }
        if let Some(algorithm) = self.algorithm {
            builder = builder.algorithm(algorithm);
        }
        if let Some(key_derivation) = self.key_derivation {
            builder = builder.key_derivation(key_derivation);
        }
        builder
    }

    pub fn signer(&self, secret: impl AsRef<[u8]>) -> Result<Signer, SignerError> {
        self.builder(secret).build()
    }

    pub fn timestamp_signer(
        &self,
        secret: impl AsRef<[u8]>,
    ) -> Result<TimestampSigner, SignerError> {
        let max_age = self.max_age_secs.map(Duration::from_secs);
        Ok(TimestampSigner::new(self.signer(secret)?, max_age))
    }
}
