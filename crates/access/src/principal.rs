use serde::{Deserialize, Serialize};

use tillgate_core::{BusinessId, UserId};

use crate::catalog::Role;

/// An authenticated caller, as established by the session layer.
///
/// The engine trusts this value; producing it (credentials, tokens,
/// sessions) happens outside. `business_id` names the retail account the
/// caller acts within and is carried for audit context; policy records are
/// deployment-wide.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
    pub business_id: BusinessId,
}
