//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the agent adapter,
//! the connection registry and the backing sources of the dashboard endpoints.

use crate::{
    catalog::ModelCatalog,
    dashboard::{DashboardSource, MockDashboardSource},
    logs::LogSource,
    system::{SysinfoProbe, SystemProbe},
    ws::ConnectionRegistry,
};
use std::path::PathBuf;
use std::sync::Arc;
use voice_agent_core::agent::AgentAdapter;

/// The shared application state, created once at startup and passed to all handlers.
/// All fields are public to be accessible from other modules.
#[derive(Clone)]
pub struct AppState {
    pub agent: AgentAdapter,
    pub registry: ConnectionRegistry,
    pub dashboard: Arc<dyn DashboardSource>,
    pub catalog: Arc<ModelCatalog>,
    pub probe: Arc<dyn SystemProbe>,
    pub logs: Arc<LogSource>,
}

impl AppState {
    /// Builds the state with the default backing sources: mock dashboard data,
    /// the default model catalog and a live host probe.
    pub fn new(agent: AgentAdapter, logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            agent,
            registry: ConnectionRegistry::new(),
            dashboard: Arc::new(MockDashboardSource),
            catalog: Arc::new(ModelCatalog::with_defaults()),
            probe: Arc::new(SysinfoProbe),
            logs: Arc::new(LogSource::new(logs_dir)),
        }
    }
}
