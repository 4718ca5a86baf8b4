pub mod common;
pub mod config;
pub mod jsonfile;
pub mod ns1;
pub mod service;

pub use config::*;

/// TTL given to declared records which do not set one.
pub const DEFAULT_TTL: u32 = 300;
