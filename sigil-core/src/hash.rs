//! Hash functions available to signature algorithms and key derivation.

use digest::Digest;
use digest::core_api::BlockSizeUser;
use hmac::{Mac, SimpleHmac};

/// A hash function.
///
/// SHA-1 is the default, as it is what existing tokens in the wild are signed with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum HashFunction {
    #[default]
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashFunction {
    /// Size of the digest in bytes
    pub fn output_len(self) -> usize {
        match self {
            HashFunction::Sha1 => 20,
            HashFunction::Sha224 => 28,
            HashFunction::Sha256 => 32,
            HashFunction::Sha384 => 48,
            HashFunction::Sha512 => 64,
        }
    }

    /// Hash the concatenation of `parts`.
    pub fn digest(self, parts: &[&[u8]]) -> Vec<u8> {
        match self {
            HashFunction::Sha1 => digest_parts::<sha1::Sha1>(parts),
            HashFunction::Sha224 => digest_parts::<sha2::Sha224>(parts),
            HashFunction::Sha256 => digest_parts::<sha2::Sha256>(parts),
            HashFunction::Sha384 => digest_parts::<sha2::Sha384>(parts),
            HashFunction::Sha512 => digest_parts::<sha2::Sha512>(parts),
        }
    }

    /// `HMAC(key, message)` over this hash.
    pub fn hmac(self, key: &[u8], message: &[u8]) -> Vec<u8> {
        match self {
            HashFunction::Sha1 => hmac_tag::<sha1::Sha1>(key, message),
            HashFunction::Sha224 => hmac_tag::<sha2::Sha224>(key, message),
            HashFunction::Sha256 => hmac_tag::<sha2::Sha256>(key, message),
            HashFunction::Sha384 => hmac_tag::<sha2::Sha384>(key, message),
            HashFunction::Sha512 => hmac_tag::<sha2::Sha512>(key, message),
        }
    }

    /// Check `tag` against `HMAC(key, message)` in constant time.
    pub fn verify_hmac(self, key: &[u8], message: &[u8], tag: &[u8]) -> Result<(), digest::MacError> {
        match self {
            HashFunction::Sha1 => hmac_verify::<sha1::Sha1>(key, message, tag),
            HashFunction::Sha224 => hmac_verify::<sha2::Sha224>(key, message, tag),
            HashFunction::Sha256 => hmac_verify::<sha2::Sha256>(key, message, tag),
            HashFunction::Sha384 => hmac_verify::<sha2::Sha384>(key, message, tag),
            HashFunction::Sha512 => hmac_verify::<sha2::Sha512>(key, message, tag),
        }
    }
}

fn digest_parts<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
    let mut ctx = D::new();
    for part in parts {
        ctx.update(part);
    }
    ctx.finalize().to_vec()
}

fn new_hmac<D: Digest + BlockSizeUser>(key: &[u8], message: &[u8]) -> SimpleHmac<D> {
    let mut mac =
        <SimpleHmac<D> as Mac>::new_from_slice(key).expect("hmac accepts keys of any length");
    Mac::update(&mut mac, message);
    mac
}

fn hmac_tag<D: Digest + BlockSizeUser>(key: &[u8], message: &[u8]) -> Vec<u8> {
    new_hmac::<D>(key, message).finalize().into_bytes().to_vec()
}

fn hmac_verify<D: Digest + BlockSizeUser>(
    key: &[u8],
    message: &[u8],
    tag: &[u8],
) -> Result<(), digest::MacError> {
    new_hmac::<D>(key, message).verify_slice(tag)
}
