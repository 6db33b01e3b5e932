//! Pantry

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// A named collection of inventory rows, tracked by one or more users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pantry {
    pub id: Uuid,
    pub name: String,
}

impl Pantry {
    /// Creates a pantry with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}
