//! API-side authorization guard.
//!
//! Services call [`require`] before touching the store; the rules
//! themselves live in `jobboard_auth::authorize`.

use jobboard_auth::{authorize, Rule};

use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

pub fn require(principal: &PrincipalContext, rules: &[Rule]) -> Result<(), ApiError> {
    authorize(Some(principal.principal()), rules)?;
    Ok(())
}
