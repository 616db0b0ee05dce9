//! Token service: issues and verifies HS256 access/refresh credentials.
//!
//! Revocation is not handled here. A refresh token's `jti` is what callers
//! record in their blacklist; this service only proves a token is authentic,
//! unexpired and of the expected type.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use uuid::Uuid;

use jobboard_core::UserId;

use crate::claims::{validate_claims, JwtClaims, TokenType, TokenValidationError};
use crate::Role;

/// Process-wide token settings, injected at startup.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub issuer: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: "jobboard".to_string(),
            access_ttl: Duration::minutes(5),
            refresh_ttl: Duration::hours(24),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token encoding failed: {0}")]
    Encoding(String),

    #[error("token is invalid: {0}")]
    Invalid(String),

    #[error("token has expired")]
    Expired,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// A freshly issued credential pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    pub refresh_claims: JwtClaims,
}

pub struct TokenService {
    config: TokenConfig,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.config.issuer)
            .field("access_ttl", &self.config.access_ttl)
            .field("refresh_ttl", &self.config.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        let encoding = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding,
            decoding,
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Issue a short-lived access token and a long-lived refresh token.
    pub fn issue_pair(&self, user_id: UserId, role: Role) -> Result<TokenPair, TokenError> {
        let now = Utc::now();
        let access = self.sign(&self.claims(user_id, role, TokenType::Access, now))?;
        let refresh_claims = self.claims(user_id, role, TokenType::Refresh, now);
        let refresh = self.sign(&refresh_claims)?;
        Ok(TokenPair {
            access,
            refresh,
            refresh_claims,
        })
    }

    /// Mint a new access token for the subject of verified refresh claims.
    pub fn refresh_access(&self, refresh: &JwtClaims) -> Result<String, TokenError> {
        if refresh.token_type != TokenType::Refresh {
            return Err(TokenValidationError::WrongType {
                expected: TokenType::Refresh,
                found: refresh.token_type,
            }
            .into());
        }
        self.sign(&self.claims(refresh.sub, refresh.role, TokenType::Access, Utc::now()))
    }

    /// Verify signature, issuer, expiry and token type.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<JwtClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let data = decode::<JwtClaims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            }
        })?;

        validate_claims(&data.claims, expected, Utc::now()).map_err(|e| match e {
            TokenValidationError::Expired => TokenError::Expired,
            other => TokenError::Claims(other),
        })?;

        Ok(data.claims)
    }

    /// Sign arbitrary claims with the configured secret.
    pub fn sign(&self, claims: &JwtClaims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    fn claims(
        &self,
        user_id: UserId,
        role: Role,
        token_type: TokenType,
        now: DateTime<Utc>,
    ) -> JwtClaims {
        let ttl = match token_type {
            TokenType::Access => self.config.access_ttl,
            TokenType::Refresh => self.config.refresh_ttl,
        };
        JwtClaims {
            sub: user_id,
            role,
            token_type,
            jti: Uuid::now_v7(),
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(TokenConfig::new("test-secret"))
    }

    #[test]
    fn issued_pair_verifies_by_type() {
        let svc = service();
        let user = UserId::new();
        let pair = svc.issue_pair(user, Role::Company).unwrap();

        let access = svc.verify(&pair.access, TokenType::Access).unwrap();
        assert_eq!(access.sub, user);
        assert_eq!(access.role, Role::Company);

        let refresh = svc.verify(&pair.refresh, TokenType::Refresh).unwrap();
        assert_eq!(refresh, pair.refresh_claims);
        assert_ne!(access.jti, refresh.jti);
    }

    #[test]
    fn access_token_is_not_a_refresh_token() {
        let svc = service();
        let pair = svc.issue_pair(UserId::new(), Role::Admin).unwrap();
        assert!(matches!(
            svc.verify(&pair.access, TokenType::Refresh),
            Err(TokenError::Claims(TokenValidationError::WrongType { .. }))
        ));
        assert!(svc.verify(&pair.refresh, TokenType::Access).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let pair = service().issue_pair(UserId::new(), Role::Company).unwrap();
        let other = TokenService::new(TokenConfig::new("another-secret"));
        assert!(matches!(
            other.verify(&pair.access, TokenType::Access),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let svc = service();
        let now = Utc::now();
        let claims = JwtClaims {
            sub: UserId::new(),
            role: Role::Company,
            token_type: TokenType::Refresh,
            jti: Uuid::now_v7(),
            iss: "jobboard".into(),
            iat: (now - Duration::hours(3)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = svc.sign(&claims).unwrap();
        assert_eq!(svc.verify(&token, TokenType::Refresh), Err(TokenError::Expired));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(
            service().verify("not.a.jwt", TokenType::Access),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn refresh_access_keeps_subject() {
        let svc = service();
        let user = UserId::new();
        let pair = svc.issue_pair(user, Role::Company).unwrap();
        let access = svc.refresh_access(&pair.refresh_claims).unwrap();
        let claims = svc.verify(&access, TokenType::Access).unwrap();
        assert_eq!(claims.sub, user);
    }
}
