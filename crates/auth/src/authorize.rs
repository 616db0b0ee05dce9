use thiserror::Error;

use jobboard_core::UserId;

use crate::Principal;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("Authentication credentials were not provided.")]
    Unauthenticated,

    #[error("You do not have permission to perform this action.")]
    Forbidden { rule: &'static str },
}

/// A single authorization predicate.
///
/// Rules are independent of each other and of storage; a route lists the
/// ones it needs and [`authorize`] checks them in order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Rule {
    /// A principal is present.
    Authenticated,
    /// Role is admin and the account carries the staff flag.
    IsAdmin,
    /// Role is company.
    IsCompany,
    /// The principal is the given owner.
    IsOwner(UserId),
}

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Authenticated => "authenticated",
            Rule::IsAdmin => "is_admin",
            Rule::IsCompany => "is_company",
            Rule::IsOwner(_) => "is_owner",
        }
    }

    pub fn check(&self, principal: Option<&Principal>) -> Result<(), AuthzError> {
        let Some(principal) = principal else {
            return Err(AuthzError::Unauthenticated);
        };

        let allowed = match self {
            Rule::Authenticated => true,
            Rule::IsAdmin => principal.is_admin(),
            Rule::IsCompany => principal.is_company(),
            Rule::IsOwner(owner) => principal.user_id == *owner,
        };

        if allowed {
            Ok(())
        } else {
            Err(AuthzError::Forbidden { rule: self.name() })
        }
    }
}

/// Evaluate rules in sequence; the first failure wins.
///
/// - No IO
/// - No panics
pub fn authorize(principal: Option<&Principal>, rules: &[Rule]) -> Result<(), AuthzError> {
    for rule in rules {
        if let Err(e) = rule.check(principal) {
            tracing::debug!(rule = rule.name(), "authorization rule rejected principal");
            return Err(e);
        }
    }
    Ok(())
}

/// Rule sets shared by the HTTP routes.
pub mod policy {
    use super::Rule;
    use jobboard_core::UserId;

    pub const COMPANY: &[Rule] = &[Rule::Authenticated, Rule::IsCompany];

    pub const ADMIN: &[Rule] = &[Rule::Authenticated, Rule::IsAdmin];

    pub fn owning_company(owner: UserId) -> [Rule; 3] {
        [Rule::Authenticated, Rule::IsCompany, Rule::IsOwner(owner)]
    }
}
