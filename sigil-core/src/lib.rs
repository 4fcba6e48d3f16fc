//! Tamper-evident signing of opaque byte payloads.
//!
//! A [`Signer`] binds a payload to an HMAC signature and produces a URL-safe token
//! of the form `payload.signature`. A [`TimestampSigner`] additionally embeds the
//! signing time, `payload.timestamp.signature`, and can reject tokens that are older
//! than a configured max-age.
//!
//! Payloads are not encrypted. Anyone holding a token can read the payload; they just
//! can't change it without the change being detected.
//!
//! ```
//! use std::time::Duration;
//! use sigil_core::{Sign, Signer, TimestampSigner};
//!
//! let signer = Signer::builder(b"secret-key").salt(b"activate").build().unwrap();
//!
//! let token = signer.sign(b"user-42");
//! assert_eq!(signer.unsign(&token).unwrap(), b"user-42");
//!
//! // tampering is detected
//! let mut forged = token.clone();
//! forged[5] = b'3';
//! assert!(signer.unsign(&forged).unwrap_err().is_bad_signature());
//!
//! // tokens can carry the time they were signed at
//! let timed = TimestampSigner::new(signer, Some(Duration::from_secs(3600)));
//! let token = timed.sign(b"user-42");
//! assert_eq!(timed.unsign(&token).unwrap(), b"user-42");
//! ```

pub mod algorithm;
pub mod base64;
#[cfg(feature = "serde")]
pub mod config;
pub mod encodings;
pub mod hash;
pub mod key_derivation;
pub mod serializer;
pub mod signer;
pub mod timestamp;

use std::error::Error;

pub use algorithm::SignatureAlgorithm;
#[cfg(feature = "serde")]
pub use config::SignerConfig;
pub use encodings::{Payload, bytes_to_int, int_to_bytes};
pub use hash::HashFunction;
pub use key_derivation::KeyDerivation;
pub use serializer::{Serializer, SimpleSerializer, TimedSerializer};
pub use signer::{Sign, Signer, SignerBuilder};
pub use timestamp::{EPOCH, TimestampSigner};

/// Error returned for all signing and verification operations that can fail
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SignerError {
    /// The token was structurally malformed, or the payload could not be decoded.
    #[error("bad data - {reason}")]
    BadData {
        reason: &'static str,
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },
    /// The signature did not match. Carries the rejected signature bytes.
    #[error("bad signature - {}", hex::encode(.0))]
    BadSignature(Vec<u8>),
    /// The signature was valid but the timestamp was missing or expired.
    #[error("bad timestamp signature - {0}")]
    BadTimestampSignature(&'static str),
    /// The separator was empty or overlapped the base64url alphabet.
    #[error("separator must be non-empty and must not contain base64url characters")]
    InvalidSeparator,
    /// There was an error encoding a structured payload
    #[error("payload could not be encoded: {0}")]
    Payload(#[source] Box<dyn Error + Send + Sync>),
}

impl SignerError {
    pub(crate) fn bad_data(reason: &'static str) -> Self {
        SignerError::BadData {
            reason,
            source: None,
        }
    }

    pub fn is_bad_data(&self) -> bool {
        matches!(self, SignerError::BadData { .. })
    }

    pub fn is_bad_signature(&self) -> bool {
        matches!(self, SignerError::BadSignature(_))
    }

    pub fn is_bad_timestamp(&self) -> bool {
        matches!(self, SignerError::BadTimestampSignature(_))
    }
}
