//! # Chat Engine Server
//!
//! Lifecycle wrapper around a [`ChatCoordinator`]: builds it from
//! configuration, runs the session monitor in the background and exposes the
//! HTTP router.
//!
//! ```rust,no_run
//! use chatdesk_chat_engine::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let mut server = ChatEngineServerBuilder::new()
//!     .with_config(ChatEngineConfig::default())
//!     .build()?;
//!
//! server.start()?;
//!
//! let listener = tokio::net::TcpListener::bind(&server.config().general.bind_addr).await?;
//! axum::serve(listener, server.router()).await?;
//!
//! server.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use axum::Router;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::agent::Roster;
use crate::api;
use crate::clock::{Clock, SystemClock};
use crate::config::ChatEngineConfig;
use crate::error::{ChatEngineError, Result};
use crate::monitoring::SessionMonitor;
use crate::orchestrator::ChatCoordinator;

/// A chat engine with its background reconciliation loop
pub struct ChatEngineServer {
    /// The coordinator shared with the HTTP handlers
    coordinator: Arc<ChatCoordinator>,

    /// Server configuration
    config: ChatEngineConfig,

    /// Cancels the monitor task
    cancel_token: CancellationToken,

    /// Handle to the monitor task while running
    monitor_handle: Option<JoinHandle<()>>,
}

impl ChatEngineServer {
    /// Create a server from configuration, on the system clock
    pub fn new(config: ChatEngineConfig) -> Result<Self> {
        let roster = Roster::from_config(&config.roster);
        Self::with_parts(config, roster, Arc::new(SystemClock))
    }

    fn with_parts(config: ChatEngineConfig, roster: Roster, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        info!("🚀 Creating chat engine '{}' with {} agents", config.general.app_name, roster.len());
        let coordinator = Arc::new(ChatCoordinator::new(roster, clock));

        Ok(Self {
            coordinator,
            config,
            cancel_token: CancellationToken::new(),
            monitor_handle: None,
        })
    }

    /// Start the session monitor. Must be called inside a tokio runtime.
    pub fn start(&mut self) -> Result<()> {
        if self.monitor_handle.is_some() {
            return Err(ChatEngineError::internal("chat engine server already running"));
        }

        self.cancel_token = CancellationToken::new();
        let monitor = SessionMonitor::new(self.coordinator.clone());
        let handle = tokio::spawn(monitor.run(self.cancel_token.clone()));
        self.monitor_handle = Some(handle);

        info!("✅ Chat engine started on {}", self.config.general.bind_addr);
        Ok(())
    }

    /// Stop the session monitor and wait for it to finish
    pub async fn stop(&mut self) -> Result<()> {
        info!("🛑 Stopping chat engine server...");

        self.cancel_token.cancel();
        if let Some(handle) = self.monitor_handle.take() {
            if let Err(e) = handle.await {
                error!("Session monitor task ended abnormally: {}", e);
                return Err(ChatEngineError::internal(format!("monitor task failed: {}", e)));
            }
        }

        info!("✅ Chat engine server stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.monitor_handle.is_some()
    }

    /// HTTP routes bound to this server's coordinator
    pub fn router(&self) -> Router {
        api::router(self.coordinator.clone())
    }

    pub fn coordinator(&self) -> &Arc<ChatCoordinator> {
        &self.coordinator
    }

    pub fn config(&self) -> &ChatEngineConfig {
        &self.config
    }
}

/// Builder for ChatEngineServer with fluent API
pub struct ChatEngineServerBuilder {
    config: Option<ChatEngineConfig>,
    roster: Option<Roster>,
    clock: Option<Arc<dyn Clock>>,
}

impl ChatEngineServerBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            roster: None,
            clock: None,
        }
    }

    /// Set the configuration
    pub fn with_config(mut self, config: ChatEngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use this roster instead of the one in the configuration
    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.roster = Some(roster);
        self
    }

    /// Use a custom time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the server
    pub fn build(self) -> Result<ChatEngineServer> {
        let config = self
            .config
            .ok_or_else(|| ChatEngineError::config("Configuration not provided"))?;
        let roster = self
            .roster
            .unwrap_or_else(|| Roster::from_config(&config.roster));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        ChatEngineServer::with_parts(config, roster, clock)
    }
}

impl Default for ChatEngineServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_config() {
        let result = ChatEngineServerBuilder::new().build();
        assert!(matches!(result, Err(ChatEngineError::Config(_))));
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let mut config = ChatEngineConfig::default();
        config.general.bind_addr = "not an address".to_string();

        let result = ChatEngineServerBuilder::new().with_config(config).build();

        assert!(matches!(result, Err(ChatEngineError::Config(_))));
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let mut server = ChatEngineServerBuilder::new()
            .with_config(ChatEngineConfig::default())
            .build()
            .unwrap();

        server.start().unwrap();
        assert!(server.is_running());
        assert!(server.start().is_err());

        server.stop().await.unwrap();
        assert!(!server.is_running());

        server.start().unwrap();
        server.stop().await.unwrap();
    }
}
