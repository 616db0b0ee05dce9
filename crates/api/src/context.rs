use jobboard_auth::{Principal, Role};
use jobboard_core::UserId;

/// Authenticated caller for a request, inserted by the auth middleware.
///
/// Built from the stored account on every request, so role and active flag
/// are current rather than whatever the token claimed at issue time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    pub fn role(&self) -> Role {
        self.principal.role
    }
}
