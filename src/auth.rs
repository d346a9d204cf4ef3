use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

// Claims carried by an access token: the owning username and a unix expiry.
#[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// Bad signature, malformed token, or past expiry.
    InvalidToken,
    /// The token decoded but carries no usable subject claim.
    InvalidSubject,
}

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

pub fn verify_password(password: &str, hashed: &str) -> bool {
    bcrypt::verify(password, hashed).unwrap_or(false)
}

// Issues an HS256 token for `username`. Expiry is now + ttl; callers that
// don't care get the 15 minute default, the HTTP layer passes the
// configured lifetime.
pub fn create_token(
    username: &str,
    secret: &str,
    ttl: Option<Duration>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let expire = Utc::now() + ttl.unwrap_or_else(|| Duration::minutes(15));
    let claims = Claims {
        sub: username.to_string(),
        exp: expire.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // No leeway so a token expires exactly at its `exp` timestamp.
    validation.leeway = 0;

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => Ok(data.claims),
        Err(err) => match err.kind() {
            ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => {
                Err(AuthError::InvalidSubject)
            }
            _ => Err(AuthError::InvalidToken),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "test-secret";

    #[test]
    fn hashing_is_salted_and_verifiable() {
        let first = hash_password("pw1").unwrap();
        let second = hash_password("pw1").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("pw1", &first));
        assert!(verify_password("pw1", &second));
        assert!(!verify_password("pw2", &first));
    }

    #[test]
    fn verify_rejects_malformed_hash_without_panicking() {
        assert!(!verify_password("pw1", "not-a-bcrypt-hash"));
    }

    #[test]
    fn token_round_trips_subject() {
        let token = create_token("alice", SECRET, None).unwrap();
        let claims = decode_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "alice");
    }

    #[test]
    fn expired_token_is_invalid() {
        let token = create_token("alice", SECRET, Some(Duration::seconds(-10))).unwrap();
        assert_eq!(decode_token(&token, SECRET), Err(AuthError::InvalidToken));
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = create_token("alice", SECRET, None).unwrap();
        assert_eq!(
            decode_token(&token, "other-secret"),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn garbage_token_is_invalid() {
        assert_eq!(
            decode_token("definitely.not.a-jwt", SECRET),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn missing_subject_claim_is_invalid_subject() {
        let exp = (Utc::now() + Duration::minutes(5)).timestamp();
        let token = encode(
            &Header::default(),
            &json!({ "exp": exp }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(decode_token(&token, SECRET), Err(AuthError::InvalidSubject));
    }
}
