use thiserror::Error;

/// Errors that can occur while configuring or driving a capture session.
///
/// None of these cross the configuration bracket: the controller converts
/// them into a [`SetupResult`](super::state::SetupResult) or a logged
/// degradation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("device not available")]
    DeviceNotAvailable,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("could not attach device input: {0}")]
    AttachFailed(String),

    #[error("could not lock device for configuration: {0}")]
    DeviceLockFailed(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("session worker unavailable")]
    WorkerUnavailable,
}
