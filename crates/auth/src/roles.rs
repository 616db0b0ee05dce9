use core::str::FromStr;

use serde::{Deserialize, Serialize};

use jobboard_core::DomainError;

/// Role of a user account.
///
/// The job board has exactly two: admins review postings, companies own them.
/// A role is fixed when the account is created.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Company,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Company => "company",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "company" => Ok(Role::Company),
            other => Err(DomainError::validation(format!("unknown role '{other}'"))),
        }
    }
}
