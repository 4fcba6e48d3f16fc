//! Derivation of per-purpose signing keys from a long-lived secret.

use std::borrow::Cow;

use crate::HashFunction;

/// Literal mixed in by [`KeyDerivation::DjangoConcat`]. Part of the token format.
const DJANGO_CONCAT_LITERAL: &[u8] = b"signer";

/// How the secret key and salt are combined into the key handed to the
/// [`SignatureAlgorithm`](crate::SignatureAlgorithm).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum KeyDerivation {
    /// Use the secret key as-is, ignoring the salt.
    None,
    /// `hash(secret || salt)`
    Concat(HashFunction),
    /// `hash(secret || "signer" || salt)`
    ///
    /// The legacy scheme, and the default. Tokens issued by other itsdangerous
    /// implementations are signed with keys derived this way.
    DjangoConcat(HashFunction),
    /// `HMAC(secret, salt)`
    Hmac(HashFunction),
}

impl Default for KeyDerivation {
    fn default() -> Self {
        KeyDerivation::DjangoConcat(HashFunction::default())
    }
}

impl KeyDerivation {
    pub fn derive_key<'a>(&self, secret: &'a [u8], salt: &[u8]) -> Cow<'a, [u8]> {
        match self {
            KeyDerivation::None => Cow::Borrowed(secret),
            KeyDerivation::Concat(hash) => Cow::Owned(hash.digest(&[secret, salt])),
            KeyDerivation::DjangoConcat(hash) => {
                Cow::Owned(hash.digest(&[secret, DJANGO_CONCAT_LITERAL, salt]))
            }
            KeyDerivation::Hmac(hash) => Cow::Owned(hash.hmac(secret, salt)),
        }
    }
}
