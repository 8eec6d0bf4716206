//! # capture-session-virtual
//!
//! In-process backend for capture-session-core.
//!
//! Provides:
//! - `VirtualSession`: a capture session that tracks its inputs and raises
//!   runtime errors and interruptions on demand
//! - `VirtualDeviceEnumerator`: a device catalogue with availability,
//!   preferred-camera and rotation controls
//! - `ScriptedAuthorizer`: a consent prompt answered by script
//! - `MemoryPreferences` / `JsonFilePreferences`: preference stores
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use capture_session_core::{CaptureController, Collaborators, SerialQueue, SessionConfiguration};
//! use capture_session_virtual::*;
//!
//! let main = Arc::new(SerialQueue::new("main")?);
//! let controller = CaptureController::new(
//!     Collaborators {
//!         session: VirtualSession::new(),
//!         devices: Arc::new(VirtualDeviceEnumerator::with_default_devices()),
//!         authorizer: Arc::new(ScriptedAuthorizer::granted()),
//!         preferences: Arc::new(MemoryPreferences::new()),
//!         delegate,
//!         presenter: main,
//!         display_surface: None,
//!     },
//!     SessionConfiguration::default(),
//! )?;
//! controller.activate();
//! controller.request_start();
//! ```

pub mod device_enumerator;
pub mod permissions;
pub mod preferences;
pub mod virtual_session;

pub use device_enumerator::{camera, microphone, VirtualDeviceEnumerator, VirtualRotation};
pub use permissions::ScriptedAuthorizer;
pub use preferences::{JsonFilePreferences, MemoryPreferences, PreferencesError};
pub use virtual_session::{VirtualSession, VirtualSessionControl};
