//! The base signer: `payload || separator || base64url(signature)`.

use std::borrow::Cow;
use std::fmt;

use tracing::{debug, trace};

use crate::{HashFunction, KeyDerivation, SignatureAlgorithm, SignerError, base64};

/// Salt used when none is configured.
pub const DEFAULT_SALT: &[u8] = b"itsdangerous.Signer";
/// Separator used when none is configured.
pub const DEFAULT_SEPARATOR: &[u8] = b".";

/// Something that turns payloads into tokens and back.
pub trait Sign {
    /// Sign the payload, returning the token.
    fn sign(&self, payload: &[u8]) -> Vec<u8>;

    /// Verify the token, returning the payload it carries.
    fn unsign<'a>(&self, token: &'a [u8]) -> Result<&'a [u8], SignerError>;

    /// Verify the token, discarding the payload.
    fn validate(&self, token: &[u8]) -> Result<(), SignerError> {
        self.unsign(token).map(drop)
    }
}

/// Signs payloads with a secret key.
///
/// All configuration is fixed at construction, so a `Signer` can be shared
/// freely between threads.
#[derive(Clone)]
pub struct Signer {
    secret: Box<[u8]>,
    separator: Box<[u8]>,
    salt: Box<[u8]>,
    algorithm: SignatureAlgorithm,
    key_derivation: KeyDerivation,
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("secret", &"<redacted>")
            .field("separator", &self.separator.escape_ascii().to_string())
            .field("salt", &self.salt.escape_ascii().to_string())
            .field("algorithm", &self.algorithm)
            .field("key_derivation", &self.key_derivation)
            .finish()
    }
}

impl Signer {
    /// Create a signer with every option at its default.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Signer {
            secret: secret.as_ref().into(),
            separator: DEFAULT_SEPARATOR.into(),
            salt: DEFAULT_SALT.into(),
            algorithm: SignatureAlgorithm::default(),
            key_derivation: KeyDerivation::default(),
        }
    }

    pub fn builder(secret: impl AsRef<[u8]>) -> SignerBuilder {
        SignerBuilder {
            secret: secret.as_ref().into(),
            separator: None,
            salt: None,
            hash: HashFunction::default(),
            algorithm: None,
            key_derivation: None,
        }
    }

    pub fn separator(&self) -> &[u8] {
        &self.separator
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    pub fn key_derivation(&self) -> KeyDerivation {
        self.key_derivation
    }

    fn derive_key(&self) -> Cow<'_, [u8]> {
        self.key_derivation.derive_key(&self.secret, &self.salt)
    }

    /// `left || separator || right`
    pub(crate) fn join(&self, left: &[u8], right: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(left.len() + self.separator.len() + right.len());
        out.extend_from_slice(left);
        out.extend_from_slice(&self.separator);
        out.extend_from_slice(right);
        out
    }

    /// Split on the last occurrence of the separator.
    pub(crate) fn split<'a>(&self, value: &'a [u8]) -> Option<(&'a [u8], &'a [u8])> {
        let idx = value
            .windows(self.separator.len())
            .rposition(|w| w == &*self.separator)?;
        Some((&value[..idx], &value[idx + self.separator.len()..]))
    }
}

impl Sign for Signer {
    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let key = self.derive_key();
        let signature = self.algorithm.get_signature(&key, payload);
        trace!(payload_len = payload.len(), "signing payload");

        let mut token = Vec::with_capacity(
            payload.len() + self.separator.len() + base64::encoded_len(signature.len()),
        );
        token.extend_from_slice(payload);
        token.extend_from_slice(&self.separator);
        base64::encode_into(&signature, &mut token);
        token
    }

    fn unsign<'a>(&self, token: &'a [u8]) -> Result<&'a [u8], SignerError> {
        let Some((payload, encoded)) = self.split(token) else {
            debug!(token_len = token.len(), "rejecting token without a separator");
            return Err(SignerError::bad_data("no signature found"));
        };

        let signature = base64::decode(encoded).inspect_err(|_| {
            debug!(signature_len = encoded.len(), "rejecting malformed signature");
        })?;

        let key = self.derive_key();
        self.algorithm
            .verify_signature(&key, payload, &signature)
            .inspect_err(|_| debug!(payload_len = payload.len(), "rejecting bad signature"))?;

        Ok(payload)
    }
}

/// Configures a [`Signer`]. Options left unset take their defaults.
pub struct SignerBuilder {
    secret: Box<[u8]>,
    separator: Option<Box<[u8]>>,
    salt: Option<Box<[u8]>>,
    hash: HashFunction,
    algorithm: Option<SignatureAlgorithm>,
    key_derivation: Option<KeyDerivation>,
}

impl SignerBuilder {
    /// Defaults to `.`
    pub fn separator(mut self, separator: impl AsRef<[u8]>) -> Self {
        self.separator = Some(separator.as_ref().into());
        self
    }

    /// Defaults to [`DEFAULT_SALT`]
    pub fn salt(mut self, salt: impl AsRef<[u8]>) -> Self {
        self.salt = Some(salt.as_ref().into());
        self
    }

    /// The hash used by the default algorithm and key derivation. Defaults to SHA-1.
    pub fn hash(mut self, hash: HashFunction) -> Self {
        self.hash = hash;
        self
    }

    /// Defaults to HMAC over the configured [`hash`](Self::hash).
    pub fn algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Defaults to [`KeyDerivation::DjangoConcat`] over the configured [`hash`](Self::hash).
    pub fn key_derivation(mut self, key_derivation: KeyDerivation) -> Self {
        self.key_derivation = Some(key_derivation);
        self
    }

    /// Build the signer.
    ///
    /// Fails if the separator is empty or shares a byte with the base64url alphabet,
    /// as the signature segment could then not be told apart from the payload.
    pub fn build(self) -> Result<Signer, SignerError> {
        let separator = self.separator.unwrap_or_else(|| DEFAULT_SEPARATOR.into());
        if separator.is_empty() || separator.iter().copied().any(base64::is_alphabet) {
            return Err(SignerError::InvalidSeparator);
        }

        Ok(Signer {
            secret: self.secret,
            separator,
            salt: self.salt.unwrap_or_else(|| DEFAULT_SALT.into()),
            algorithm: self
                .algorithm
                .unwrap_or(SignatureAlgorithm::Hmac(self.hash)),
            key_derivation: self
                .key_derivation
                .unwrap_or(KeyDerivation::DjangoConcat(self.hash)),
        })
    }
}
