//! Status and reachability checks. Neither ever mutates token state.

use crate::client::PolarionClient;
use polarion_core::{ConnectionState, ConnectivityReport, StatusReport};
use std::time::Instant;

/// Health API for checking token status and Polarion reachability.
pub struct HealthApi<'a> {
    client: &'a PolarionClient,
}

impl<'a> HealthApi<'a> {
    pub(crate) fn new(client: &'a PolarionClient) -> Self {
        Self { client }
    }

    /// Whether a token is held, where it came from and when it was last
    /// verified.
    pub async fn check_status(&self) -> StatusReport {
        self.client.vault.status().await
    }

    /// Low-cost unauthenticated probe of the base URL.
    pub async fn check_connectivity(&self) -> ConnectivityReport {
        let started = Instant::now();
        let result = self.client.http.probe().await;
        let latency_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(status) => {
                let connection = if self.client.vault.current().await.is_some() {
                    ConnectionState::Authenticated
                } else {
                    ConnectionState::Unauthenticated
                };
                tracing::info!(status = status.as_u16(), latency_ms, "Polarion reachable");
                ConnectivityReport {
                    reachable: true,
                    latency_ms,
                    status: Some(status.as_u16()),
                    error: None,
                    connection,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, latency_ms, "Polarion unreachable");
                ConnectivityReport {
                    reachable: false,
                    latency_ms,
                    status: None,
                    error: Some(e.to_string()),
                    connection: ConnectionState::Unreachable,
                }
            }
        }
    }
}
