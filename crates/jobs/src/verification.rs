//! Admin verification actions.

use core::str::FromStr;

use serde::Serialize;

use jobboard_core::DomainError;

use crate::job::JobStatus;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VerifyAction {
    Approve,
    Reject,
}

impl VerifyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyAction::Approve => "approve",
            VerifyAction::Reject => "reject",
        }
    }

    pub fn target_status(&self) -> JobStatus {
        match self {
            VerifyAction::Approve => JobStatus::Approved,
            VerifyAction::Reject => JobStatus::Rejected,
        }
    }
}

impl FromStr for VerifyAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(VerifyAction::Approve),
            "reject" => Ok(VerifyAction::Reject),
            _ => Err(DomainError::validation("Invalid action")),
        }
    }
}

/// Confirmation returned to the admin after a verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationOutcome {
    pub message: String,
    pub status: JobStatus,
}

impl VerificationOutcome {
    pub fn new(action: VerifyAction, status: JobStatus) -> Self {
        Self {
            message: format!("Job {}d successfully", action.as_str()),
            status,
        }
    }
}
