use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Decimal user id.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    SignatureInvalid,
    #[error("token has expired")]
    Expired,
    #[error("token is not valid yet")]
    NotYetValid,
    #[error("token lifetime is out of range")]
    LifetimeOutOfRange,
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates HS256 identity tokens. Stateless: validity depends
/// only on the signature and the embedded timestamps.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        // Expiry and not-before are checked against the injected clock below,
        // so the library only verifies structure, algorithm and signature.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            clock,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            config.jwt_expiration(),
            Arc::new(SystemClock),
        )
    }

    pub fn issue(&self, user_id: i64) -> Result<IssuedToken, TokenError> {
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or(TokenError::LifetimeOutOfRange)?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            nbf: None,
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(TokenError::Signing)?;
        tracing::debug!(user_id, exp = claims.exp, "issued token");

        Ok(IssuedToken { token, expires_at })
    }

    /// Returns the user id carried by `token`.
    pub fn validate(&self, token: &str) -> Result<i64, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|err| classify(err.kind()))?
            .claims;

        let now = self.clock.now().timestamp();
        if now > claims.exp {
            return Err(TokenError::Expired);
        }
        if claims.nbf.is_some_and(|nbf| now < nbf) {
            return Err(TokenError::NotYetValid);
        }

        claims.sub.parse().map_err(|_| TokenError::Malformed)
    }
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::SignatureInvalid,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::ImmatureSignature => TokenError::NotYetValid,
        _ => TokenError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::clock::ManualClock;

    const SECRET: &str = "league-test-secret";

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn service(clock: Arc<ManualClock>) -> TokenService {
        TokenService::new(SECRET, Duration::hours(1), clock)
    }

    fn sign(claims: &Claims, header: Header, secret: &str) -> String {
        encode(&header, claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn issued_token_validates_to_its_subject() {
        let clock = Arc::new(ManualClock::new(start()));
        let tokens = service(clock);

        for user_id in [1, 42, i64::MAX] {
            let issued = tokens.issue(user_id).unwrap();
            assert_eq!(tokens.validate(&issued.token).unwrap(), user_id);
        }
    }

    #[test]
    fn expiry_is_issue_time_plus_ttl() {
        let clock = Arc::new(ManualClock::new(start()));
        let issued = service(clock).issue(7).unwrap();
        assert_eq!(issued.expires_at, start() + Duration::hours(1));
    }

    #[test]
    fn oversized_lifetime_is_an_error() {
        let clock = Arc::new(ManualClock::new(start()));
        let tokens = TokenService::new(SECRET, Duration::hours(100_000_000_000), clock);
        assert!(matches!(tokens.issue(1), Err(TokenError::LifetimeOutOfRange)));

        let tokens = TokenService::new(SECRET, Duration::MAX, Arc::new(ManualClock::new(start())));
        assert!(matches!(tokens.issue(1), Err(TokenError::LifetimeOutOfRange)));
    }

    #[test]
    fn token_expires_after_ttl() {
        let clock = Arc::new(ManualClock::new(start()));
        let tokens = service(clock.clone());

        let issued = tokens.issue(42).unwrap();
        assert_eq!(tokens.validate(&issued.token).unwrap(), 42);

        clock.advance(Duration::hours(2));
        assert!(matches!(
            tokens.validate(&issued.token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn token_is_valid_up_to_its_expiry_second() {
        let clock = Arc::new(ManualClock::new(start()));
        let tokens = service(clock.clone());
        let issued = tokens.issue(3).unwrap();

        clock.advance(Duration::hours(1));
        assert_eq!(tokens.validate(&issued.token).unwrap(), 3);

        clock.advance(Duration::seconds(1));
        assert!(matches!(
            tokens.validate(&issued.token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn token_signed_with_another_key_is_rejected() {
        let clock = Arc::new(ManualClock::new(start()));
        let other = TokenService::new("some-other-secret", Duration::hours(1), clock.clone());
        let issued = other.issue(42).unwrap();

        assert!(matches!(
            service(clock).validate(&issued.token),
            Err(TokenError::SignatureInvalid)
        ));
    }

    #[test]
    fn flipped_signature_is_rejected() {
        let clock = Arc::new(ManualClock::new(start()));
        let tokens = service(clock);
        let issued = tokens.issue(42).unwrap();

        let (unsigned, signature) = issued.token.rsplit_once('.').unwrap();
        let mut bytes = signature.as_bytes().to_vec();
        bytes[4] = if bytes[4] == b'A' { b'B' } else { b'A' };
        let tampered = format!("{unsigned}.{}", String::from_utf8(bytes).unwrap());

        assert!(matches!(
            tokens.validate(&tampered),
            Err(TokenError::SignatureInvalid)
        ));
    }

    #[test]
    fn unexpected_algorithm_is_rejected_even_with_the_right_key() {
        let clock = Arc::new(ManualClock::new(start()));
        let tokens = service(clock);
        let claims = Claims {
            sub: "42".into(),
            iat: start().timestamp(),
            exp: (start() + Duration::hours(1)).timestamp(),
            nbf: None,
        };
        let token = sign(&claims, Header::new(Algorithm::HS512), SECRET);

        assert!(matches!(
            tokens.validate(&token),
            Err(TokenError::SignatureInvalid)
        ));
    }

    #[test]
    fn unsigned_none_algorithm_is_rejected() {
        let clock = Arc::new(ManualClock::new(start()));
        let tokens = service(clock);
        let issued = tokens.issue(42).unwrap();

        // {"alg":"none","typ":"JWT"}
        let header = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0";
        let payload = issued.token.split('.').nth(1).unwrap();
        let forged = format!("{header}.{payload}.");

        let err = tokens.validate(&forged).unwrap_err();
        assert!(matches!(
            err,
            TokenError::Malformed | TokenError::SignatureInvalid
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        let clock = Arc::new(ManualClock::new(start()));
        let tokens = service(clock);

        for token in ["", "not-a-token", "a.b", "a.b.c"] {
            assert!(
                matches!(tokens.validate(token), Err(TokenError::Malformed)),
                "{token:?} should be malformed"
            );
        }
    }

    #[test]
    fn non_numeric_subject_is_malformed() {
        let clock = Arc::new(ManualClock::new(start()));
        let tokens = service(clock);
        let claims = Claims {
            sub: "alice".into(),
            iat: start().timestamp(),
            exp: (start() + Duration::hours(1)).timestamp(),
            nbf: None,
        };
        let token = sign(&claims, Header::new(Algorithm::HS256), SECRET);

        assert!(matches!(
            tokens.validate(&token),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn not_before_is_enforced() {
        let clock = Arc::new(ManualClock::new(start()));
        let tokens = service(clock.clone());
        let claims = Claims {
            sub: "42".into(),
            iat: start().timestamp(),
            exp: (start() + Duration::hours(2)).timestamp(),
            nbf: Some((start() + Duration::minutes(30)).timestamp()),
        };
        let token = sign(&claims, Header::new(Algorithm::HS256), SECRET);

        assert!(matches!(
            tokens.validate(&token),
            Err(TokenError::NotYetValid)
        ));

        clock.advance(Duration::minutes(30));
        assert_eq!(tokens.validate(&token).unwrap(), 42);
    }
}
