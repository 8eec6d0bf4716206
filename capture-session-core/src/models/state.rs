use serde::{Deserialize, Serialize};

/// Outcome of session setup.
///
/// Written once on the session worker. Anything other than `Success` is
/// terminal for the controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupResult {
    Success,
    NotAuthorized,
    ConfigurationFailed,
}

impl SetupResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Controller lifecycle phase.
///
/// ```text
/// idle → resolving permission → configuring → ready
///                     ↓               ↓
///                auth denied     config failed
/// ```
/// Teardown returns any phase to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerPhase {
    Idle,
    ResolvingPermission,
    Configuring,
    Ready,
    AuthDenied,
    ConfigFailed,
}

impl ControllerPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::AuthDenied | Self::ConfigFailed)
    }
}

/// Running state of the session graph as seen by the UI.
///
/// Always derived from the tracked running flag plus outstanding
/// interruption and affordance state; never stored independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunningState {
    Stopped,
    Running,
    Interrupted,
    AwaitingUserResume,
}

impl RunningState {
    pub fn derive(session_running: bool, interrupted: bool, resume_visible: bool) -> Self {
        if interrupted {
            Self::Interrupted
        } else if session_running {
            Self::Running
        } else if resume_visible {
            Self::AwaitingUserResume
        } else {
            Self::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}
