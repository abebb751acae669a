use tillgate_access::Principal;

/// Per-request identity, inserted by the auth middleware.
///
/// `None` means the request carried no credentials. Such requests still
/// reach handlers; the guard turns the missing principal into a deny at
/// the enforcement point, so the response shape is the same as for any
/// other refused check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext(Option<Principal>);

impl AuthContext {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self(Some(principal))
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}
