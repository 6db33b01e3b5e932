//! Pantry domain library
//!
//! Domain model, error taxonomy, input validation and the remote gateway
//! used by the pantry inventory table.

pub mod error;
pub mod gateway;
pub mod model;
pub mod validation;

pub use error::Error;
pub use gateway::*;
