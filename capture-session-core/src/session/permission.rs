use std::sync::Arc;

use parking_lot::Mutex;

use crate::dispatch::serial_queue::QueueHandle;
use crate::models::authorization::AuthorizationState;
use crate::traits::authorizer::CaptureAuthorizer;

struct GateState {
    resolved: Option<AuthorizationState>,
    prompt_issued: bool,
}

/// Resolves and caches authorization for the capture resource.
///
/// When the platform status is undetermined, [`check_authorization`]
/// suspends the session worker and prompts once; the worker resumes when
/// the prompt resolves, so no queued configuration can run before it.
///
/// [`check_authorization`]: PermissionGate::check_authorization
pub struct PermissionGate {
    authorizer: Arc<dyn CaptureAuthorizer>,
    state: Mutex<GateState>,
}

impl PermissionGate {
    pub fn new(authorizer: Arc<dyn CaptureAuthorizer>) -> Arc<Self> {
        Arc::new(Self {
            authorizer,
            state: Mutex::new(GateState {
                resolved: None,
                prompt_issued: false,
            }),
        })
    }

    /// Returns the cached or platform status. If undetermined, suspends
    /// `worker` and issues the prompt (at most once per gate).
    pub fn check_authorization(self: &Arc<Self>, worker: &QueueHandle) -> AuthorizationState {
        let mut state = self.state.lock();
        if let Some(resolved) = state.resolved {
            return resolved;
        }

        match self.authorizer.status() {
            AuthorizationState::Undetermined => {
                if state.prompt_issued {
                    return AuthorizationState::Undetermined;
                }
                state.prompt_issued = true;
                drop(state);

                log::info!("capture access undetermined; prompting");
                worker.suspend();
                let gate = Arc::clone(self);
                let worker = worker.clone();
                self.authorizer.request_access(Box::new(move |granted| {
                    gate.resolve(granted, &worker);
                }));
                AuthorizationState::Undetermined
            }
            status => {
                log::debug!("capture access already {:?}", status);
                state.resolved = Some(status);
                status
            }
        }
    }

    /// The resolved status, or `Undetermined` while the prompt is outstanding.
    pub fn resolved(&self) -> AuthorizationState {
        self.state
            .lock()
            .resolved
            .unwrap_or(AuthorizationState::Undetermined)
    }

    fn resolve(&self, granted: bool, worker: &QueueHandle) {
        {
            let mut state = self.state.lock();
            if state.resolved.is_some() {
                log::warn!("ignoring repeated permission completion");
                return;
            }
            state.resolved = Some(if granted {
                AuthorizationState::Granted
            } else {
                AuthorizationState::Denied
            });
        }
        log::info!("capture access {}", if granted { "granted" } else { "denied" });
        worker.resume();
    }
}
