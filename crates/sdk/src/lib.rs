//! # Polarion SDK
//!
//! Async client for the Siemens Polarion REST API, built around a shared
//! [`TokenVault`](polarion_core::TokenVault).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use polarion_core::storage::FileTokenStore;
//! use polarion_core::TokenVault;
//! use polarion_sdk::{PolarionClient, PolarionResult};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> PolarionResult<()> {
//!     let vault = Arc::new(
//!         TokenVault::initialize(Arc::new(FileTokenStore::in_dir(".")), None).await,
//!     );
//!
//!     let client = PolarionClient::builder()
//!         .base_url("https://polarion.example.com/polarion")
//!         .vault(vault)
//!         .build()?;
//!
//!     // Log in through the browser, then hand the generated token over
//!     let login = client.auth().open_login().await;
//!     println!("Visit {}", login.token_page_url);
//!     client.auth().set_token("generated-token").await?;
//!     client.auth().verify().await?;
//!
//!     let projects = client.projects().list(Some(5)).await?;
//!     println!("Found {} projects", projects.len());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use api::Resource;
pub use client::{PolarionClient, PolarionClientBuilder};
pub use config::ClientConfig;
pub use error::{PolarionError, PolarionResult};

// Re-export core types for convenience
pub use polarion_core::{
    AuthState, ConnectionState, ConnectivityReport, StatusReport, Token, TokenSource, TokenVault,
};
