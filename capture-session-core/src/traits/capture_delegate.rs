use crate::models::state::{RunningState, SetupResult};

/// UI collaborator notified of lifecycle changes.
///
/// Every method is invoked on the presentation context handed to the
/// controller, never on the session worker.
pub trait CaptureDelegate: Send + Sync {
    /// Called once setup finishes, and again when a start request arrives
    /// after a non-success setup.
    fn on_setup_result(&self, result: SetupResult);

    /// Called when the derived running state changes.
    fn on_running_state_changed(&self, state: RunningState);

    /// Show or hide the manual resume control.
    fn on_resume_affordance(&self, visible: bool);

    /// Show or hide the "capture unavailable" notice.
    fn on_degraded_availability(&self, visible: bool);

    /// Called with each new rotation angle, in degrees.
    fn on_rotation_angle_changed(&self, angle: f64);

    /// A user-requested resume could not restart the session.
    fn on_resume_failed(&self) {}
}
