use crate::dispatch::serial_queue::Job;
use crate::session::controller::SessionToken;

/// The UI-responsive execution context.
///
/// Presentation side effects (delegate callbacks, display updates) are
/// handed to it; they never run inline with graph mutation.
pub trait PresentationContext: Send + Sync + 'static {
    fn execute(&self, task: Job);
}

/// The surface that renders preview frames.
///
/// Held weakly by the controller: it never keeps the surface alive.
pub trait DisplaySurface: Send + Sync {
    /// Hands the surface the read-only token for the session it displays.
    fn bind_session(&self, _token: SessionToken) {}

    fn set_rotation_angle(&self, angle: f64);

    fn set_video_mirrored(&self, _mirrored: bool) {}
}
