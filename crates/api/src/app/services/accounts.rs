use chrono::Utc;

use jobboard_auth::{
    hash_password, normalize_email, validate_password, verify_password, NewAccount, Principal,
    TokenPair, TokenType, UserAccount,
};
use jobboard_infra::StoreError;

use super::AppServices;
use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

const INVALID_CREDENTIALS: &str = "Invalid credentials or inactive user";
const INVALID_REFRESH: &str = "Invalid or expired token";
const DUPLICATE_EMAIL: &str = "user with this email already exists.";

impl AppServices {
    /// Public sign-up. Always creates a company account.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        requested_role: Option<&str>,
    ) -> Result<UserAccount, ApiError> {
        let new = NewAccount::company(email, full_name, requested_role)?;
        let user = self.create_account(new, password).await?;
        tracing::info!(user_id = %user.id, "company registered");
        Ok(user)
    }

    /// Operator path for creating a staff admin.
    pub async fn provision_admin(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<UserAccount, ApiError> {
        let new = NewAccount::admin(email, full_name)?;
        let user = self.create_account(new, password).await?;
        tracing::info!(user_id = %user.id, "admin provisioned");
        Ok(user)
    }

    async fn create_account(&self, new: NewAccount, password: &str) -> Result<UserAccount, ApiError> {
        validate_password(password)?;

        if self.store.find_user_by_email(&new.email).await?.is_some() {
            return Err(ApiError::Validation(DUPLICATE_EMAIL.into()));
        }

        let hash = hash_password(password, self.bcrypt_cost).await?;
        // The pre-check above can race; the unique index has the final word.
        self.store
            .insert_user(new.into_account(hash, Utc::now()))
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => ApiError::Validation(DUPLICATE_EMAIL.into()),
                other => other.into(),
            })
    }

    /// Check credentials and issue a token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<(UserAccount, TokenPair), ApiError> {
        let email = normalize_email(email);
        let Some(user) = self.store.find_user_by_email(&email).await? else {
            tracing::warn!("login rejected: unknown account");
            return Err(ApiError::Unauthenticated(INVALID_CREDENTIALS.into()));
        };

        if !verify_password(password, &user.password_hash).await? || !user.can_authenticate() {
            tracing::warn!(user_id = %user.id, "login rejected: bad password or inactive account");
            return Err(ApiError::Unauthenticated(INVALID_CREDENTIALS.into()));
        }

        let pair = self.tokens.issue_pair(user.id, user.role)?;
        tracing::info!(user_id = %user.id, role = %user.role, "user logged in");
        Ok((user, pair))
    }

    /// Revoke a refresh token. Every failure reads the same to the caller.
    pub async fn logout(&self, principal: &PrincipalContext, refresh: &str) -> Result<(), ApiError> {
        let claims = self
            .tokens
            .verify(refresh, TokenType::Refresh)
            .map_err(|_| ApiError::Validation(INVALID_REFRESH.into()))?;

        if claims.sub != principal.user_id() {
            tracing::warn!(user_id = %principal.user_id(), "revoking a refresh token issued to another user");
        }

        let newly_revoked = self
            .store
            .blacklist_token(claims.jti, claims.expires_at())
            .await?;
        if !newly_revoked {
            return Err(ApiError::Validation(INVALID_REFRESH.into()));
        }

        tracing::info!(user_id = %claims.sub, "user logged out");
        Ok(())
    }

    /// Mint a new access token from a live refresh token.
    pub async fn refresh_access(&self, refresh: &str) -> Result<String, ApiError> {
        let claims = self
            .tokens
            .verify(refresh, TokenType::Refresh)
            .map_err(|_| ApiError::Unauthenticated("Token is invalid or expired".into()))?;

        if self.store.is_token_blacklisted(claims.jti).await? {
            return Err(ApiError::Unauthenticated("Token is blacklisted".into()));
        }

        match self.store.get_user(claims.sub).await? {
            Some(user) if user.can_authenticate() => {}
            Some(_) => return Err(ApiError::Unauthenticated("User is inactive".into())),
            None => return Err(ApiError::Unauthenticated("User not found".into())),
        }

        Ok(self.tokens.refresh_access(&claims)?)
    }

    /// Resolve a bearer access token to the current state of its account.
    pub async fn authenticate(&self, access: &str) -> Result<Principal, ApiError> {
        let claims = self.tokens.verify(access, TokenType::Access)?;

        let user = self
            .store
            .get_user(claims.sub)
            .await?
            .ok_or_else(|| ApiError::Unauthenticated("User not found".into()))?;
        if !user.can_authenticate() {
            return Err(ApiError::Unauthenticated("User is inactive".into()));
        }

        Ok(Principal::from(&user))
    }

    /// Forget revocations of tokens that have expired anyway.
    pub async fn flush_expired_tokens(&self) -> Result<u64, ApiError> {
        let purged = self.store.purge_expired_tokens(Utc::now()).await?;
        tracing::info!(purged, "expired blacklist entries flushed");
        Ok(purged)
    }

    pub async fn profile(&self, principal: &PrincipalContext) -> Result<UserAccount, ApiError> {
        self.store
            .get_user(principal.user_id())
            .await?
            .ok_or_else(ApiError::not_found)
    }

    /// Only the display name can change; `None` leaves the profile as is.
    pub async fn update_profile(
        &self,
        principal: &PrincipalContext,
        full_name: Option<&str>,
    ) -> Result<UserAccount, ApiError> {
        match full_name {
            Some(name) => Ok(self
                .store
                .update_full_name(principal.user_id(), name.trim())
                .await?),
            None => self.profile(principal).await,
        }
    }
}
