//! Acting user identity

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Identity of the user on whose behalf a gateway call is made.
///
/// Every mutation takes the acting user explicitly; there is no ambient
/// "logged-in user".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Creates a user id from a raw UUID.
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generates a random user id.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
