use serde::{Deserialize, Serialize};

/// Why the session was interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptionReason {
    /// Another client holds the capture hardware.
    ResourceBusyOtherClient,
    /// The hardware is unavailable while multiple apps are in the foreground.
    ResourceUnavailableMultiApp,
    /// The hardware was shut down because of system pressure (thermal, power).
    ResourceUnavailableSystemPressure,
    Unknown,
}

impl InterruptionReason {
    /// Whether the user can reasonably try to resume the session.
    pub fn offers_resume(&self) -> bool {
        matches!(
            self,
            Self::ResourceBusyOtherClient | Self::ResourceUnavailableMultiApp
        )
    }
}

/// Reason code attached to an asynchronous runtime error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeErrorCode {
    /// The media services daemon restarted; the graph can be started again.
    MediaServicesReset,
    Other(String),
}

impl RuntimeErrorCode {
    pub fn is_reset(&self) -> bool {
        matches!(self, Self::MediaServicesReset)
    }
}

/// Notification raised by the capture backend about the running session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    SubjectAreaChanged,
    RuntimeError(RuntimeErrorCode),
    Interrupted(InterruptionReason),
    InterruptionEnded,
}
