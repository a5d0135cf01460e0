//! Correlates repeat visits from one client.
//!
//! A presented token is reused verbatim without checking that it was ever
//! issued. Holding the token value is all it takes to act as that owner.

use crate::models::identifier::{IdGenerator, OwnerToken};

pub fn resolve_owner(
    existing: Option<OwnerToken>,
    ids: &dyn IdGenerator,
) -> Result<OwnerToken, rand::Error> {
    match existing {
        Some(token) => Ok(token),
        None => ids.new_id().map(OwnerToken::new),
    }
}
