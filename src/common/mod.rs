mod canonical;
mod comparison;
mod config;
mod corrections;
mod error;
mod models;
pub mod names;
mod reconcile;
mod registry;

pub use canonical::*;
pub use comparison::*;
pub(crate) use config::*;
pub use corrections::*;
pub use error::*;
pub use models::*;
pub use reconcile::*;
pub use registry::*;
