mod config;
mod models;
mod service;

pub use config::*;
pub use models::*;
pub use service::*;
