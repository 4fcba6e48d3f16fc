//! Payload encodings and the compact integer codec used for timestamps.

use std::error::Error;

/// A structured value that can be carried in a token.
///
/// Raw bytes and strings are supported out of the box. For serde types, see the
/// `sigil-json` crate.
pub trait Payload: Sized {
    /// Encode the value to the bytes that get signed
    fn encode(&self) -> Result<Vec<u8>, Box<dyn Error + Send + Sync>>;

    /// Decode the value from verified bytes
    fn decode(payload: &[u8]) -> Result<Self, Box<dyn Error + Send + Sync>>;
}

impl Payload for Vec<u8> {
    fn encode(&self) -> Result<Vec<u8>, Box<dyn Error + Send + Sync>> {
        Ok(self.clone())
    }

    fn decode(payload: &[u8]) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(payload.to_owned())
    }
}

impl Payload for String {
    fn encode(&self) -> Result<Vec<u8>, Box<dyn Error + Send + Sync>> {
        Ok(self.as_bytes().to_owned())
    }

    fn decode(payload: &[u8]) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(std::str::from_utf8(payload)?.to_owned())
    }
}

/// Encode `num` as big-endian bytes, with no leading zero bytes.
///
/// Zero encodes as the empty slice.
pub fn int_to_bytes(num: u64) -> Vec<u8> {
    let skip = (num.leading_zeros() / 8) as usize;
    num.to_be_bytes()[skip..].to_vec()
}

/// Decode big-endian bytes. Returns `None` if the value does not fit in a `u64`.
pub fn bytes_to_int(bytes: &[u8]) -> Option<u64> {
    let start = 8usize.checked_sub(bytes.len())?;
    let mut buf = [0; 8];
    buf[start..].copy_from_slice(bytes);
    Some(u64::from_be_bytes(buf))
}
