//! Domain model types

mod field;
mod ingredient;
mod item;
mod pantry;
mod user;

pub use field::*;
pub use ingredient::*;
pub use item::*;
pub use pantry::*;
pub use user::*;
