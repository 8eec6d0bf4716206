use serde::{Deserialize, Serialize};

/// Authorization status for the capture resource.
///
/// Resolved once per process run by the
/// [`PermissionGate`](crate::session::permission::PermissionGate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationState {
    Undetermined,
    Granted,
    Denied,
}

impl AuthorizationState {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Undetermined)
    }
}
