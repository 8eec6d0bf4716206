//! # capture-session-core
//!
//! Platform-agnostic lifecycle controller for a live capture session.
//!
//! Acquires permission, wires input devices into the session graph,
//! starts and stops capture, and recovers from asynchronous interruptions
//! without corrupting graph state. Platform backends implement the
//! `CaptureSession`, `DeviceProvider` and `CaptureAuthorizer` traits and
//! plug into the generic `CaptureController`.
//!
//! ## Architecture
//!
//! ```text
//! capture-session-core (this crate)
//! ├── traits/     ← CaptureSession, DeviceProvider, CaptureAuthorizer, CaptureDelegate, PreferenceStore, PresentationContext
//! ├── models/     ← CaptureError, SetupResult, RunningState, SessionEvent, DeviceHandle, SessionConfiguration
//! ├── dispatch/   ← SerialQueue, EventBus, Subscription
//! └── session/    ← CaptureController, SessionGraph, PermissionGate, DeviceResolver, InterruptionMonitor, OrientationCoordinator
//! ```

pub mod dispatch;
pub mod models;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use dispatch::event_bus::EventBus;
pub use dispatch::serial_queue::{Job, QueueHandle, SerialQueue};
pub use dispatch::subscription::Subscription;
pub use models::authorization::AuthorizationState;
pub use models::config::{RestartPolicy, SessionConfiguration};
pub use models::device::{
    CapturePreset, DeviceCapabilities, DeviceFormat, DeviceHandle, DeviceInput, DevicePosition,
    ExposureMode, FocusMode, FocusPoint, FocusSettings, MediaType,
};
pub use models::error::CaptureError;
pub use models::events::{InterruptionReason, RuntimeErrorCode, SessionEvent};
pub use models::state::{ControllerPhase, RunningState, SetupResult};
pub use session::controller::{CaptureController, Collaborators, SessionToken};
pub use session::graph::SessionGraph;
pub use traits::authorizer::{AccessCompletion, CaptureAuthorizer};
pub use traits::capture_delegate::CaptureDelegate;
pub use traits::capture_session::CaptureSession;
pub use traits::device_provider::{
    DeviceProvider, PreferredDeviceCallback, RotationCallback, RotationCoordinator,
};
pub use traits::preferences::PreferenceStore;
pub use traits::presentation::{DisplaySurface, PresentationContext};
