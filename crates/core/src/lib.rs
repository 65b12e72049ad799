// Core types for the Polarion MCP server: tokens, token storage, auth state

pub mod error;
pub mod storage;
pub mod types;
pub mod vault;

pub use error::{PolarionError, PolarionResult};
pub use types::*;
pub use vault::TokenVault;
