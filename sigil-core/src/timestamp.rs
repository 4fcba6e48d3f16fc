//! The timestamped signer: `payload || sep || base64url(timestamp) || sep || base64url(signature)`.

use std::time::Duration;

use jiff::Timestamp;
use tracing::debug;

use crate::{Sign, Signer, SignerError, base64, bytes_to_int, int_to_bytes};

/// Timestamps are counted in seconds from 2011-01-01T00:00:00Z.
pub const EPOCH: i64 = 1_293_840_000;

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// A [`Signer`] that also records when each token was signed, and optionally
/// rejects tokens older than a max-age.
///
/// The outer signature covers the timestamp, so it is always checked before the
/// timestamp is looked at.
#[derive(Clone, Debug)]
pub struct TimestampSigner {
    signer: Signer,
    max_age: Option<Duration>,
}

impl TimestampSigner {
    /// `max_age` of `None` means tokens never expire.
    pub fn new(signer: Signer, max_age: Option<Duration>) -> Self {
        TimestampSigner { signer, max_age }
    }

    pub fn with_max_age(self, max_age: Option<Duration>) -> Self {
        TimestampSigner { max_age, ..self }
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    /// Sign the payload as if the current time were `now`.
    pub fn sign_at(&self, payload: &[u8], now: Timestamp) -> Vec<u8> {
        // clocks set before the epoch sign as the epoch itself
        let timestamp = u64::try_from(now.as_second() - EPOCH).unwrap_or(0);
        let encoded = base64::encode(&int_to_bytes(timestamp));
        self.signer.sign(&self.signer.join(payload, &encoded))
    }

    /// Verify the token as if the current time were `now`.
    pub fn unsign_at<'a>(&self, token: &'a [u8], now: Timestamp) -> Result<&'a [u8], SignerError> {
        self.unsign_inner(token, now).map(|(payload, _)| payload)
    }

    /// Verify the token, returning the payload along with the time it was signed.
    pub fn unsign_with_timestamp<'a>(
        &self,
        token: &'a [u8],
    ) -> Result<(&'a [u8], Timestamp), SignerError> {
        let (payload, timestamp) = self.unsign_inner(token, Timestamp::now())?;

        let signed_at = i64::try_from(timestamp)
            .ok()
            .and_then(|t| t.checked_add(EPOCH))
            .and_then(|t| Timestamp::from_second(t).ok())
            .ok_or_else(|| SignerError::bad_data("timestamp out of range"))?;

        Ok((payload, signed_at))
    }

    fn unsign_inner<'a>(
        &self,
        token: &'a [u8],
        now: Timestamp,
    ) -> Result<(&'a [u8], u64), SignerError> {
        let value = self.signer.unsign(token)?;

        let Some((payload, encoded)) = self.signer.split(value) else {
            debug!("rejecting token without a timestamp");
            return Err(SignerError::BadTimestampSignature("no timestamp found"));
        };

        let timestamp = bytes_to_int(&base64::decode(encoded)?)
            .ok_or_else(|| SignerError::bad_data("timestamp out of range"))?;

        if let Some(max_age) = self.max_age {
            let signed_at = (i128::from(timestamp) + i128::from(EPOCH)) * NANOS_PER_SECOND;
            let age = now.as_nanosecond() - signed_at;
            let max_age = i128::try_from(max_age.as_nanos()).unwrap_or(i128::MAX);
            if age > max_age {
                debug!(age_ns = %age, max_age_ns = %max_age, "rejecting expired token");
                return Err(SignerError::BadTimestampSignature("signature expired"));
            }
        }

        Ok((payload, timestamp))
    }
}

impl Sign for TimestampSigner {
    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        self.sign_at(payload, Timestamp::now())
    }

    fn unsign<'a>(&self, token: &'a [u8]) -> Result<&'a [u8], SignerError> {
        self.unsign_at(token, Timestamp::now())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use jiff::{SignedDuration, Timestamp};

    use super::{EPOCH, TimestampSigner};
    use crate::{HashFunction, KeyDerivation, Sign, SignatureAlgorithm, Signer, SignerError};

    const KEY: &[u8] = b"itsdangerous.Key";

    fn signer(algorithm: SignatureAlgorithm, key_derivation: KeyDerivation) -> Signer {
        Signer::builder(KEY)
            .separator("|")
            .salt("itsdangerous.Salt")
            .algorithm(algorithm)
            .key_derivation(key_derivation)
            .build()
            .unwrap()
    }

    fn at(second: i64) -> Timestamp {
        Timestamp::from_second(second).unwrap()
    }

    #[test]
    fn round_trip_all_combinations() {
        for algorithm in [
            SignatureAlgorithm::None,
            SignatureAlgorithm::Hmac(HashFunction::Sha1),
        ] {
            for key_derivation in [
                KeyDerivation::None,
                KeyDerivation::Concat(HashFunction::Sha1),
                KeyDerivation::DjangoConcat(HashFunction::Sha1),
                KeyDerivation::Hmac(HashFunction::Sha1),
            ] {
                let signer = TimestampSigner::new(
                    signer(algorithm, key_derivation),
                    Some(Duration::from_secs(60)),
                );
                let value = b"itsdangerous.Value";

                let signed = signer.sign(value);
                assert_eq!(signer.unsign(&signed).unwrap(), value);
                signer.validate(&signed).unwrap();
            }
        }
    }

    #[test]
    fn wire_format() {
        let signer = TimestampSigner::new(Signer::new(KEY), None);
        // 0x0100 seconds after the epoch
        let signed = signer.sign_at(b"value", at(EPOCH + 256));
        assert!(signed.starts_with(b"value.AQA."));
        assert_eq!(signed.iter().filter(|&&b| b == b'.').count(), 2);

        // the inner value is what the base signer signed
        let inner = signer.signer().unsign(&signed).unwrap();
        assert_eq!(inner, b"value.AQA");

        // at the epoch itself the timestamp segment is empty
        let signed = signer.sign_at(b"value", at(EPOCH));
        assert!(signed.starts_with(b"value.."));
        assert_eq!(signer.unsign_at(&signed, at(EPOCH)).unwrap(), b"value");
    }

    #[test]
    fn expiry() {
        let base = signer(
            SignatureAlgorithm::Hmac(HashFunction::Sha1),
            KeyDerivation::None,
        );
        let signer = TimestampSigner::new(base, Some(Duration::from_secs(60)));
        let signed = signer.sign_at(b"value", at(1_700_000_000));

        assert_eq!(signer.unsign_at(&signed, at(1_700_000_000)).unwrap(), b"value");
        assert_eq!(signer.unsign_at(&signed, at(1_700_000_060)).unwrap(), b"value");

        let err = signer.unsign_at(&signed, at(1_700_000_061)).unwrap_err();
        assert!(matches!(err, SignerError::BadTimestampSignature("signature expired")));

        // tokens from the future are not expired
        signer.unsign_at(&signed, at(1_600_000_000)).unwrap();

        // no max-age, no expiry
        let forever = signer.clone().with_max_age(None);
        forever.unsign_at(&signed, at(2_000_000_000)).unwrap();
    }

    #[test]
    fn zero_max_age() {
        let base = signer(
            SignatureAlgorithm::Hmac(HashFunction::Sha1),
            KeyDerivation::None,
        );
        let signer = TimestampSigner::new(base, Some(Duration::ZERO));

        let now = at(1_700_000_000) + SignedDuration::from_millis(250);
        let signed = signer.sign_at(b"value", now);

        // the outer signature is fine
        signer.signer().validate(&signed).unwrap();

        // but the token was already a quarter second old
        let err = signer.unsign_at(&signed, now).unwrap_err();
        assert!(err.is_bad_timestamp());

        let signed = signer.sign(b"value");
        assert!(signer.validate(&signed).unwrap_err().is_bad_timestamp());
    }

    #[test]
    fn signature_is_checked_before_timestamp() {
        let base = signer(
            SignatureAlgorithm::Hmac(HashFunction::Sha1),
            KeyDerivation::Hmac(HashFunction::Sha1),
        );
        let signer = TimestampSigner::new(base, Some(Duration::from_secs(60)));

        // a forged, malformed timestamp under a bad signature reports the signature
        let forged = b"value|***|AAAA";
        assert!(signer.unsign(forged).unwrap_err().is_bad_signature());

        // a token from the base signer has no timestamp at all
        let untimed = signer.signer().sign(b"value");
        let err = signer.unsign(&untimed).unwrap_err();
        assert!(matches!(err, SignerError::BadTimestampSignature("no timestamp found")));
    }

    #[test]
    fn malformed_timestamp_under_valid_signature() {
        let base = signer(
            SignatureAlgorithm::Hmac(HashFunction::Sha1),
            KeyDerivation::None,
        );
        let signer = TimestampSigner::new(base, None);

        let signed = signer.signer().sign(b"value|*");
        assert!(signer.unsign(&signed).unwrap_err().is_bad_data());

        // nine bytes of timestamp
        let signed = signer.signer().sign(b"value|AQEBAQEBAQEB");
        assert!(signer.unsign(&signed).unwrap_err().is_bad_data());
    }

    #[test]
    fn returns_timestamp() {
        let signer = TimestampSigner::new(Signer::new(KEY), None);
        let before = Timestamp::now().as_second();
        let signed = signer.sign(b"value");

        let (payload, signed_at) = signer.unsign_with_timestamp(&signed).unwrap();
        assert_eq!(payload, b"value");
        assert!(signed_at.as_second() >= before);
        assert!(signed_at.as_second() <= Timestamp::now().as_second());

        let signed = signer.sign_at(b"value", at(1_700_000_000));
        let (_, signed_at) = signer.unsign_with_timestamp(&signed).unwrap();
        assert_eq!(signed_at, at(1_700_000_000));
    }

    #[test]
    fn before_epoch() {
        let signer = TimestampSigner::new(Signer::new(KEY), None);
        let signed = signer.sign_at(b"value", at(0));
        let (_, signed_at) = signer.unsign_with_timestamp(&signed).unwrap();
        assert_eq!(signed_at, at(EPOCH));
    }

    #[test]
    fn separator_inside_payload() {
        let signer = TimestampSigner::new(Signer::new(KEY), Some(Duration::from_secs(60)));
        let signed = signer.sign(b"a.b.c");
        assert_eq!(signer.unsign(&signed).unwrap(), b"a.b.c");
        assert_eq!(signed.iter().filter(|&&b| b == b'.').count(), 4);
    }
}
