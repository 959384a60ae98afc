//! Application state shared by all handlers.

use std::sync::{Arc, Mutex};

use faceswap_core::Config;
use faceswap_processing::{MediaClassifier, ModelHandle, WorkspaceManager};
use faceswap_storage::Storage;
use sysinfo::System;
use tokio::sync::Semaphore;

pub struct AppState {
    pub config: Config,
    pub models: Arc<ModelHandle>,
    /// `None` when no storage backend is configured
    pub storage: Option<Arc<dyn Storage>>,
    pub workspaces: WorkspaceManager,
    pub classifier: MediaClassifier,
    /// Bounds concurrent adapter invocations
    pub swap_permits: Arc<Semaphore>,
    pub monitor: ProcessMonitor,
}

impl AppState {
    pub fn new(
        config: Config,
        models: Arc<ModelHandle>,
        storage: Option<Arc<dyn Storage>>,
    ) -> Self {
        let workspaces = WorkspaceManager::from_config(config.workspace());
        let swap_permits = Arc::new(Semaphore::new(config.max_concurrent_swaps()));

        Self {
            config,
            models,
            storage,
            workspaces,
            classifier: MediaClassifier::new(),
            swap_permits,
            monitor: ProcessMonitor::new(),
        }
    }

    /// `healthy` once models are loaded, `initializing` before
    pub fn status(&self) -> &'static str {
        if self.models.is_loaded() {
            "healthy"
        } else {
            "initializing"
        }
    }
}

/// Resident memory of this process
pub struct ProcessMonitor {
    system: Mutex<System>,
}

impl ProcessMonitor {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }

    /// Current resident set size in MiB, `0.0` when it cannot be read
    pub fn memory_usage_mb(&self) -> f64 {
        let Ok(pid) = sysinfo::get_current_pid() else {
            return 0.0;
        };
        let mut system = match self.system.lock() {
            Ok(system) => system,
            Err(e) => {
                tracing::error!(error = %e, "Failed to acquire system lock for memory check");
                return 0.0;
            }
        };
        system.refresh_process(pid);
        system
            .process(pid)
            .map(|process| process.memory() as f64 / (1024.0 * 1024.0))
            .unwrap_or(0.0)
    }
}

impl Default for ProcessMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_usage_is_reported() {
        let monitor = ProcessMonitor::new();
        assert!(monitor.memory_usage_mb() > 0.0);
    }
}
