//! Organization-scoped authorization.
//!
//! Every resource in the data model carries an `organization_id`. Since a
//! caller's JWT already states which organization it was issued for,
//! authorization reduces to a single equality check against the resource
//! being accessed — there is no role or permission matrix to consult.

use uuid::Uuid;

use crate::extract::auth::TRACING_TARGET_AUTHORIZATION;
use crate::handler::{ErrorKind, Result};

/// Provides the organization scope of an authenticated caller.
pub trait AuthProvider {
    /// Returns the organization this caller is authenticated as.
    fn organization_id(&self) -> Uuid;

    /// Checks that `resource_organization_id` matches this caller's
    /// organization, returning [`ErrorKind::Forbidden`] otherwise.
    fn authorize_organization(&self, resource_organization_id: Uuid) -> Result<()> {
        if self.organization_id() == resource_organization_id {
            Ok(())
        } else {
            tracing::warn!(
                target: TRACING_TARGET_AUTHORIZATION,
                caller_organization_id = %self.organization_id(),
                resource_organization_id = %resource_organization_id,
                "cross-organization access denied"
            );
            Err(ErrorKind::Forbidden
                .with_message("You do not have access to this resource")
                .with_context("The resource belongs to a different organization")
                .with_resource("authorization"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestCaller(Uuid);

    impl AuthProvider for TestCaller {
        fn organization_id(&self) -> Uuid {
            self.0
        }
    }

    #[test]
    fn allows_matching_organization() {
        let org = Uuid::new_v4();
        let caller = TestCaller(org);
        assert!(caller.authorize_organization(org).is_ok());
    }

    #[test]
    fn denies_mismatched_organization() {
        let caller = TestCaller(Uuid::new_v4());
        assert!(caller.authorize_organization(Uuid::new_v4()).is_err());
    }
}
