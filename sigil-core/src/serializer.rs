//! Signing of structured values.

use std::marker::PhantomData;

use crate::{Payload, Sign, Signer, SignerError, TimestampSigner};

/// Encodes values with their [`Payload`] implementation, then signs them.
pub struct Serializer<S, M> {
    signer: S,
    _payload: PhantomData<fn() -> M>,
}

/// A [`Serializer`] producing `payload.signature` tokens
pub type SimpleSerializer<M> = Serializer<Signer, M>;
/// A [`Serializer`] producing `payload.timestamp.signature` tokens
pub type TimedSerializer<M> = Serializer<TimestampSigner, M>;

impl<S: Clone, M> Clone for Serializer<S, M> {
    fn clone(&self) -> Self {
        Serializer {
            signer: self.signer.clone(),
            _payload: PhantomData,
        }
    }
}

impl<S: Sign, M: Payload> Serializer<S, M> {
    pub fn new(signer: S) -> Self {
        Serializer {
            signer,
            _payload: PhantomData,
        }
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }

    #[doc(alias = "dumps")]
    pub fn marshal(&self, value: &M) -> Result<Vec<u8>, SignerError> {
        let payload = value.encode().map_err(SignerError::Payload)?;
        Ok(self.signer.sign(&payload))
    }

    /// Verify the token with every check of the underlying signer, then decode it.
    #[doc(alias = "loads")]
    pub fn unmarshal(&self, token: &[u8]) -> Result<M, SignerError> {
        let payload = self.signer.unsign(token)?;
        M::decode(payload).map_err(|source| SignerError::BadData {
            reason: "payload could not be decoded",
            source: Some(source),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::time::Duration;

    use super::{SimpleSerializer, TimedSerializer};
    use crate::{Payload, Sign, Signer, SignerError, TimestampSigner};

    #[derive(Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
    }

    // id:name
    impl Payload for User {
        fn encode(&self) -> Result<Vec<u8>, Box<dyn Error + Send + Sync>> {
            if self.name.contains(':') {
                return Err("name must not contain ':'".into());
            }
            Ok(format!("{}:{}", self.id, self.name).into_bytes())
        }

        fn decode(payload: &[u8]) -> Result<Self, Box<dyn Error + Send + Sync>> {
            let s = std::str::from_utf8(payload)?;
            let (id, name) = s.split_once(':').ok_or("missing ':'")?;
            Ok(User {
                id: id.parse()?,
                name: name.to_owned(),
            })
        }
    }

    #[test]
    fn simple() {
        let serializer = SimpleSerializer::<User>::new(Signer::new("itsdangerous.Key"));
        let user = User {
            id: 2015,
            name: "itsdangerous".to_owned(),
        };

        let token = serializer.marshal(&user).unwrap();
        assert!(token.starts_with(b"2015:itsdangerous."));
        assert_eq!(serializer.unmarshal(&token).unwrap(), user);
    }

    #[test]
    fn timed() {
        let signer = TimestampSigner::new(
            Signer::new("itsdangerous.Key"),
            Some(Duration::from_secs(60)),
        );
        let serializer = TimedSerializer::<User>::new(signer);
        let user = User {
            id: 7,
            name: "sigil".to_owned(),
        };

        let token = serializer.marshal(&user).unwrap();
        assert_eq!(serializer.unmarshal(&token).unwrap(), user);

        let expired = serializer.signer().clone().with_max_age(Some(Duration::ZERO));
        let expired = TimedSerializer::<User>::new(expired);
        assert!(expired.unmarshal(&token).unwrap_err().is_bad_timestamp());
    }

    #[test]
    fn errors() {
        let signer = Signer::new("itsdangerous.Key");
        let serializer = SimpleSerializer::<User>::new(signer.clone());

        let err = serializer
            .marshal(&User {
                id: 1,
                name: "a:b".to_owned(),
            })
            .unwrap_err();
        assert!(matches!(err, SignerError::Payload(_)));

        // validly signed, but not a user
        let token = signer.sign(b"not-a-user");
        let err = serializer.unmarshal(&token).unwrap_err();
        assert!(err.is_bad_data());
        assert!(err.source().is_some());

        let mut token = serializer
            .marshal(&User {
                id: 1,
                name: "a".to_owned(),
            })
            .unwrap();
        token[0] = b'2';
        assert!(serializer.unmarshal(&token).unwrap_err().is_bad_signature());
    }
}
