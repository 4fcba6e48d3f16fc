//! JSON payloads for sigil tokens.
//!
//! ```
//! use std::time::Duration;
//! use sigil_core::{Signer, TimestampSigner};
//! use sigil_json::{Json, TimedJsonSerializer};
//!
//! let signer = TimestampSigner::new(Signer::new(b"secret-key"), Some(Duration::from_secs(3600)));
//! let serializer = TimedJsonSerializer::<Vec<u32>>::new(signer);
//!
//! let token = serializer.marshal(&Json(vec![1, 2, 3])).unwrap();
//! assert!(token.starts_with(b"[1,2,3]."));
//!
//! let Json(value) = serializer.unmarshal(&token).unwrap();
//! assert_eq!(value, [1, 2, 3]);
//! ```

#![forbid(unsafe_code)]

use std::error::Error;

use serde_core::Serialize;
use serde_core::de::DeserializeOwned;
use sigil_core::encodings::Payload;
use sigil_core::serializer::{SimpleSerializer, TimedSerializer};

/// `Json` is a type wrapper to implement [`Payload`] for all types that implement
/// [`serde_core::Serialize`] and [`serde_core::Deserialize`]
///
/// The payload of a token is readable by whoever holds it, so don't put anything
/// secret in here.
///
/// Decoding only happens after the signature was verified, but you should still
/// parse into a known struct layout and avoid arbitrary key-value mappings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

/// Signs JSON values as `json.signature`
pub type JsonSerializer<T> = SimpleSerializer<Json<T>>;
/// Signs JSON values as `json.timestamp.signature`
pub type TimedJsonSerializer<T> = TimedSerializer<Json<T>>;

impl<T: Serialize + DeserializeOwned> Payload for Json<T> {
    fn encode(&self) -> Result<Vec<u8>, Box<dyn Error + Send + Sync>> {
        serde_json::to_vec(&self.0).map_err(|err| Box::new(err) as _)
    }

    fn decode(payload: &[u8]) -> Result<Self, Box<dyn Error + Send + Sync>> {
        serde_json::from_slice(payload)
            .map_err(From::from)
            .map(Self)
    }
}
