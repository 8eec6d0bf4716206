use crate::models::authorization::AuthorizationState;

pub type AccessCompletion = Box<dyn FnOnce(bool) + Send + 'static>;

/// Platform permission API for the capture resource.
pub trait CaptureAuthorizer: Send + Sync + 'static {
    /// Current status without prompting.
    fn status(&self) -> AuthorizationState;

    /// Prompt the user. `completion` receives `true` when access is granted
    /// and may be invoked on any thread.
    fn request_access(&self, completion: AccessCompletion);
}
