pub mod backup;
pub mod config;
pub mod copy;
pub mod diff;
pub mod digest;
pub mod error;
pub mod filter;
pub mod history;
pub mod localize;
pub mod manifest;
pub mod path_safety;
pub mod scan;
pub mod store;
pub mod verify;

pub use error::{Error, Result};
