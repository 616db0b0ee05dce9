use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use jobboard_core::UserId;

use crate::Role;

/// Which half of a credential pair a token is.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl core::fmt::Display for TokenType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TokenType::Access => f.write_str("access"),
            TokenType::Refresh => f.write_str("refresh"),
        }
    }
}

/// JWT claims model.
///
/// Timestamps are unix seconds so the standard `exp`/`iat` checks of any JWT
/// library apply unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the account the token was issued to.
    pub sub: UserId,

    /// Role at issue time. Informational; requests re-read the account.
    pub role: Role,

    pub token_type: TokenType,

    /// Unique token id, the key used for blacklisting.
    pub jti: Uuid,

    pub iss: String,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}

impl JwtClaims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("expected a {expected} token, got {found}")]
    WrongType { expected: TokenType, found: TokenType },
}

/// Deterministically validate decoded claims.
///
/// Signature checking happens in the token service; this only looks at the
/// claim values themselves.
pub fn validate_claims(
    claims: &JwtClaims,
    expected: TokenType,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.token_type != expected {
        return Err(TokenValidationError::WrongType {
            expected,
            found: claims.token_type,
        });
    }
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(token_type: TokenType, iat: DateTime<Utc>, ttl: Duration) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(),
            role: Role::Company,
            token_type,
            jti: Uuid::now_v7(),
            iss: "jobboard".into(),
            iat: iat.timestamp(),
            exp: (iat + ttl).timestamp(),
        }
    }

    #[test]
    fn accepts_token_inside_window() {
        let now = Utc::now();
        let c = claims(TokenType::Access, now, Duration::minutes(5));
        assert_eq!(validate_claims(&c, TokenType::Access, now), Ok(()));
    }

    #[test]
    fn rejects_expired() {
        let issued = Utc::now() - Duration::hours(2);
        let c = claims(TokenType::Refresh, issued, Duration::hours(1));
        assert_eq!(
            validate_claims(&c, TokenType::Refresh, Utc::now()),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn rejects_future_issue() {
        let issued = Utc::now() + Duration::hours(1);
        let c = claims(TokenType::Access, issued, Duration::hours(1));
        assert_eq!(
            validate_claims(&c, TokenType::Access, Utc::now()),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn rejects_type_confusion() {
        let now = Utc::now();
        let c = claims(TokenType::Access, now, Duration::minutes(5));
        assert_eq!(
            validate_claims(&c, TokenType::Refresh, now),
            Err(TokenValidationError::WrongType {
                expected: TokenType::Refresh,
                found: TokenType::Access,
            })
        );
    }

    #[test]
    fn rejects_inverted_window() {
        let now = Utc::now();
        let mut c = claims(TokenType::Access, now, Duration::minutes(5));
        c.exp = c.iat;
        assert_eq!(
            validate_claims(&c, TokenType::Access, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }
}
