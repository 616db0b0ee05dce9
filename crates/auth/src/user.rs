//! User accounts for identity management.
//!
//! Accounts come from two paths only: public registration (always a company)
//! and operator provisioning (always an admin). After that the only mutable
//! field is the display name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use jobboard_core::{DomainError, Entity, UserId};

use crate::Role;

// ─────────────────────────────────────────────────────────────────────────────
// Stored account
// ─────────────────────────────────────────────────────────────────────────────

/// A persisted user account.
///
/// # Invariants
/// - `email` is unique across all accounts and stored normalized.
/// - `role` never changes after creation.
/// - Companies are never staff; provisioned admins always are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
}

impl Entity for UserAccount {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl UserAccount {
    /// Whether the account may obtain or use credentials.
    pub fn can_authenticate(&self) -> bool {
        self.is_active
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// New accounts
// ─────────────────────────────────────────────────────────────────────────────

/// A validated account waiting for its password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_staff: bool,
}

impl NewAccount {
    /// Validate a public registration.
    ///
    /// The role is forced to `company`; a caller may echo it back but any
    /// other value is rejected rather than silently downgraded.
    pub fn company(
        email: &str,
        full_name: &str,
        requested_role: Option<&str>,
    ) -> Result<Self, DomainError> {
        if let Some(role) = requested_role {
            if role != Role::Company.as_str() {
                return Err(DomainError::validation(
                    "Only 'company' role can register via API",
                ));
            }
        }

        Ok(Self {
            email: checked_email(email)?,
            full_name: full_name.trim().to_string(),
            role: Role::Company,
            is_staff: false,
        })
    }

    /// Validate an operator-provisioned admin account.
    pub fn admin(email: &str, full_name: &str) -> Result<Self, DomainError> {
        Ok(Self {
            email: checked_email(email)?,
            full_name: full_name.trim().to_string(),
            role: Role::Admin,
            is_staff: true,
        })
    }

    pub fn into_account(self, password_hash: String, now: DateTime<Utc>) -> UserAccount {
        UserAccount {
            id: UserId::new(),
            email: self.email,
            password_hash,
            full_name: self.full_name,
            role: self.role,
            is_active: true,
            is_staff: self.is_staff,
            date_joined: now,
        }
    }
}

/// Normalize an email address for storage and lookup.
///
/// Surrounding whitespace is dropped and the domain part is lower-cased; the
/// local part is kept as typed since some mail hosts treat it case-sensitively.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

fn checked_email(email: &str) -> Result<String, DomainError> {
    let normalized = normalize_email(email);
    if normalized.is_empty() {
        return Err(DomainError::validation("Email is required."));
    }
    if !normalized.validate_email() {
        return Err(DomainError::validation("Enter a valid email address."));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_forces_company_role() {
        let account = NewAccount::company("hr@Acme.COM", "Acme", None).unwrap();
        assert_eq!(account.role, Role::Company);
        assert!(!account.is_staff);
        assert_eq!(account.email, "hr@acme.com");
    }

    #[test]
    fn registration_accepts_explicit_company_role() {
        assert!(NewAccount::company("hr@acme.com", "Acme", Some("company")).is_ok());
    }

    #[test]
    fn registration_rejects_any_other_role() {
        for role in ["admin", "Company", "", "superuser"] {
            let err = NewAccount::company("hr@acme.com", "Acme", Some(role)).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "role {role:?} accepted");
        }
    }

    #[test]
    fn registration_rejects_malformed_email() {
        for email in ["", "   ", "not-an-email", "a@", "@b.com"] {
            let err = NewAccount::company(email, "x", None).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "email {email:?} accepted");
        }
    }

    #[test]
    fn provisioned_admins_are_staff() {
        let account = NewAccount::admin("root@example.com", "Root")
            .unwrap()
            .into_account("hash".into(), Utc::now());
        assert_eq!(account.role, Role::Admin);
        assert!(account.is_staff);
        assert!(account.is_active);
    }

    #[test]
    fn normalize_keeps_local_part_case() {
        assert_eq!(normalize_email("  John.Doe@EXAMPLE.org "), "John.Doe@example.org");
    }
}
