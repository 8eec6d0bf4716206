use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::device::CapturePreset;
use super::error::CaptureError;

/// Bounds on automatic graph restarts after reset-class runtime errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartPolicy {
    /// Restarts allowed inside one window (default: 1).
    pub max_attempts: u32,

    /// Sliding window length in seconds (default: 10).
    pub window_secs: f64,
}

impl RestartPolicy {
    /// Window as a `Duration`; saturates for values `validate` rejects.
    pub fn window(&self) -> Duration {
        Duration::try_from_secs_f64(self.window_secs).unwrap_or(Duration::MAX)
    }
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            window_secs: 10.0,
        }
    }
}

/// Configuration for a capture session controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfiguration {
    /// Quality preset set inside the first configuration bracket (default: high).
    pub preset: CapturePreset,

    /// Attach the default microphone if one can be opened (default: true).
    pub enable_audio: bool,

    pub restart_policy: RestartPolicy,

    /// Name of the session worker thread (default: "session queue").
    pub worker_label: String,
}

impl SessionConfiguration {
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.restart_policy.max_attempts == 0 {
            return Err(CaptureError::InvalidConfiguration(
                "restart max_attempts must be at least 1".into(),
            ));
        }
        let window = self.restart_policy.window_secs;
        if !window.is_finite() || window <= 0.0 || Duration::try_from_secs_f64(window).is_err() {
            return Err(CaptureError::InvalidConfiguration(format!(
                "restart window must be positive, got {window}"
            )));
        }
        if self.worker_label.trim().is_empty() {
            return Err(CaptureError::InvalidConfiguration(
                "worker label must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Parses and validates a JSON configuration. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, CaptureError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CaptureError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for SessionConfiguration {
    fn default() -> Self {
        Self {
            preset: CapturePreset::High,
            enable_audio: true,
            restart_policy: RestartPolicy::default(),
            worker_label: "session queue".into(),
        }
    }
}
