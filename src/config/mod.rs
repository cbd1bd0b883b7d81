//! Configuration models for workers.

use serde::{Deserialize, Serialize};

use crate::os::Priority;

/// Construction-time settings for a worker: the backing thread's name and
/// scheduling priority. Both can still be changed later through the worker
/// itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Thread name applied to the backing native thread.
    #[serde(default)]
    pub name: String,
    /// Scheduling priority applied before the worker loop starts.
    #[serde(default)]
    pub priority: Priority,
}

impl WorkerConfig {
    /// Create a configuration with defaults: unnamed thread, host-default
    /// priority.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the thread name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the scheduling priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.contains('\0') {
            return Err("thread name must not contain NUL bytes".into());
        }
        self.priority.validate().map_err(|e| e.to_string())?;
        Ok(())
    }

    /// Parse a worker configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
