//! Scripted capture permission.
//!
//! Stands in for the platform consent dialog. The status is fixed up front
//! or left undetermined, in which case prompts are answered either by the
//! caller through [`ScriptedAuthorizer::respond`] or automatically from a
//! background thread.

use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

use parking_lot::Mutex;

use capture_session_core::models::authorization::AuthorizationState;
use capture_session_core::traits::authorizer::{AccessCompletion, CaptureAuthorizer};

enum Answer {
    Manual,
    Automatic(bool),
}

/// Virtual implementation of [`CaptureAuthorizer`].
pub struct ScriptedAuthorizer {
    status: Mutex<AuthorizationState>,
    answer: Answer,
    pending: Mutex<Vec<AccessCompletion>>,
    prompts: AtomicU32,
}

impl ScriptedAuthorizer {
    fn with(status: AuthorizationState, answer: Answer) -> Self {
        Self {
            status: Mutex::new(status),
            answer,
            pending: Mutex::new(Vec::new()),
            prompts: AtomicU32::new(0),
        }
    }

    /// Access was granted in an earlier run.
    pub fn granted() -> Self {
        Self::with(AuthorizationState::Granted, Answer::Manual)
    }

    /// Access was denied in an earlier run.
    pub fn denied() -> Self {
        Self::with(AuthorizationState::Denied, Answer::Manual)
    }

    /// Never asked; prompts stay open until [`respond`](Self::respond).
    pub fn undetermined() -> Self {
        Self::with(AuthorizationState::Undetermined, Answer::Manual)
    }

    /// Never asked; the user answers `granted` shortly after each prompt.
    pub fn answering(granted: bool) -> Self {
        Self::with(AuthorizationState::Undetermined, Answer::Automatic(granted))
    }

    /// Answers every open prompt.
    pub fn respond(&self, granted: bool) {
        self.record(granted);
        let pending: Vec<_> = self.pending.lock().drain(..).collect();
        for completion in pending {
            completion(granted);
        }
    }

    pub fn prompt_count(&self) -> u32 {
        self.prompts.load(Ordering::SeqCst)
    }

    pub fn has_pending_prompt(&self) -> bool {
        !self.pending.lock().is_empty()
    }

    fn record(&self, granted: bool) {
        *self.status.lock() = if granted {
            AuthorizationState::Granted
        } else {
            AuthorizationState::Denied
        };
    }
}

impl CaptureAuthorizer for ScriptedAuthorizer {
    fn status(&self) -> AuthorizationState {
        *self.status.lock()
    }

    fn request_access(&self, completion: AccessCompletion) {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        match self.answer {
            Answer::Manual => self.pending.lock().push(completion),
            Answer::Automatic(granted) => {
                self.record(granted);
                let spawned = thread::Builder::new()
                    .name("consent prompt".into())
                    .spawn(move || completion(granted));
                if let Err(e) = spawned {
                    log::error!("failed to answer consent prompt: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn manual_prompt_waits_for_respond() {
        let authorizer = ScriptedAuthorizer::undetermined();
        let (tx, rx) = mpsc::channel();
        authorizer.request_access(Box::new(move |granted| tx.send(granted).unwrap()));

        assert!(authorizer.has_pending_prompt());
        assert!(rx.try_recv().is_err());

        authorizer.respond(false);
        assert!(!rx.recv().unwrap());
        assert_eq!(authorizer.status(), AuthorizationState::Denied);
        assert_eq!(authorizer.prompt_count(), 1);
    }

    #[test]
    fn automatic_prompt_answers_from_another_thread() {
        let authorizer = ScriptedAuthorizer::answering(true);
        let (tx, rx) = mpsc::channel();
        authorizer.request_access(Box::new(move |granted| {
            tx.send((granted, thread::current().name().map(str::to_string)))
                .unwrap()
        }));

        let (granted, name) = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(granted);
        assert_eq!(name.as_deref(), Some("consent prompt"));
    }
}
