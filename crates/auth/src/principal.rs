use serde::Serialize;

use jobboard_core::UserId;

use crate::{Role, UserAccount};

/// The authenticated identity making a request.
///
/// Built from a stored account after its access token has been verified, so
/// the flags reflect the account as it is now, not as it was at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub is_staff: bool,
    pub is_active: bool,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin && self.is_staff
    }

    pub fn is_company(&self) -> bool {
        self.role == Role::Company
    }
}

impl From<&UserAccount> for Principal {
    fn from(account: &UserAccount) -> Self {
        Self {
            user_id: account.id,
            email: account.email.clone(),
            role: account.role,
            is_staff: account.is_staff,
            is_active: account.is_active,
        }
    }
}
