pub mod config;
pub mod error;
pub mod types;

pub use config::TomeConfig;
pub use error::{Result, TomeError};
pub use types::*;
