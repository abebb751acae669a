//! Enforcement: one question, one answer.
//!
//! Every protected operation funnels through [`AccessGuard::authorize`].
//! The guard fails closed: no principal is a deny, an unreachable store is
//! a deny. It never panics on a policy problem.

use std::sync::Arc;

use crate::catalog::Permission;
use crate::principal::Principal;
use crate::resolver::Resolver;

/// Outcome of an access check.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// No authenticated principal was presented.
    Unauthenticated,
    /// The principal's effective set lacks the permission.
    MissingPermission(Permission),
    /// Policy could not be loaded; denying is the safe answer.
    PolicyUnavailable,
}

/// The single enforcement point.
pub struct AccessGuard {
    resolver: Arc<Resolver>,
}

impl AccessGuard {
    pub fn new(resolver: Arc<Resolver>) -> Self {
        Self { resolver }
    }

    /// Decide whether `principal` may exercise `permission`.
    ///
    /// Emits one audit event per decision: the permission, the caller and
    /// the outcome. No business payloads.
    pub async fn authorize(
        &self,
        principal: Option<&Principal>,
        permission: Permission,
    ) -> Decision {
        let Some(principal) = principal else {
            tracing::warn!(permission = %permission, "access denied: unauthenticated");
            return Decision::Deny(DenyReason::Unauthenticated);
        };

        match self
            .resolver
            .resolve(principal.role, principal.user_id, permission)
            .await
        {
            Ok(true) => {
                tracing::debug!(
                    permission = %permission,
                    user = %principal.user_id,
                    role = %principal.role,
                    "access allowed"
                );
                Decision::Allow
            }
            Ok(false) => {
                tracing::warn!(
                    permission = %permission,
                    user = %principal.user_id,
                    role = %principal.role,
                    "access denied: missing permission"
                );
                Decision::Deny(DenyReason::MissingPermission(permission))
            }
            Err(err) => {
                tracing::error!(
                    permission = %permission,
                    user = %principal.user_id,
                    error = %err,
                    "access denied: policy unavailable"
                );
                Decision::Deny(DenyReason::PolicyUnavailable)
            }
        }
    }
}
