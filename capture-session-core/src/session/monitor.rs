//! Interruption & error monitor.
//!
//! Translates backend notifications into recovery decisions and affordance
//! changes. The monitor owns no threads: the controller feeds it events on
//! the session worker and applies the returned [`Reaction`].
//!
//! | state   | event                         | result                                  |
//! |---------|-------------------------------|-----------------------------------------|
//! | running | runtime error, reset          | restart once (rate limited)             |
//! | stopped | runtime error, reset          | resume affordance                       |
//! | any     | runtime error, other          | resume affordance                       |
//! | any     | interrupted, busy / multi-app | interrupted + resume affordance         |
//! | any     | interrupted, system pressure  | interrupted + degraded notice           |
//! | any     | interruption ended            | clear interruption and both affordances |

use std::time::Instant;

use crate::dispatch::event_bus::EventBus;
use crate::dispatch::subscription::Subscription;
use crate::models::config::RestartPolicy;
use crate::models::events::{InterruptionReason, SessionEvent};
use crate::models::state::RunningState;

use super::restart::RestartLimiter;

/// What the controller must do in response to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    None,
    /// Start the graph again right away.
    Restart,
    /// Re-issue continuous focus/exposure at the frame centre.
    Refocus,
}

/// Outcome of feeding one event to the monitor.
///
/// Affordance fields are `Some` only when visibility changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reaction {
    pub recovery: Recovery,
    pub resume_affordance: Option<bool>,
    pub degraded_availability: Option<bool>,
}

impl Reaction {
    /// Combines with a reaction that happened afterwards; later visibility wins.
    pub fn merge(self, later: Reaction) -> Reaction {
        Reaction {
            recovery: self.recovery,
            resume_affordance: later.resume_affordance.or(self.resume_affordance),
            degraded_availability: later.degraded_availability.or(self.degraded_availability),
        }
    }
}

impl Default for Reaction {
    fn default() -> Self {
        Self {
            recovery: Recovery::None,
            resume_affordance: None,
            degraded_availability: None,
        }
    }
}

pub struct InterruptionMonitor {
    interrupted: bool,
    resume_visible: bool,
    degraded_visible: bool,
    limiter: RestartLimiter,
    subscription: Option<Subscription>,
}

impl InterruptionMonitor {
    pub fn new(policy: &RestartPolicy) -> Self {
        Self {
            interrupted: false,
            resume_visible: false,
            degraded_visible: false,
            limiter: RestartLimiter::new(policy),
            subscription: None,
        }
    }

    /// Subscribes `deliver` to `bus`. A second call while subscribed is a no-op.
    pub fn subscribe(
        &mut self,
        bus: &EventBus,
        deliver: impl Fn(&SessionEvent) + Send + Sync + 'static,
    ) {
        if self.is_subscribed() {
            return;
        }
        self.subscription = Some(bus.subscribe(deliver));
    }

    pub fn unsubscribe(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    pub fn resume_visible(&self) -> bool {
        self.resume_visible
    }

    pub fn degraded_visible(&self) -> bool {
        self.degraded_visible
    }

    pub fn running_state(&self, session_running: bool) -> RunningState {
        RunningState::derive(session_running, self.interrupted, self.resume_visible)
    }

    /// `session_running` is the controller's tracked flag: whether the last
    /// start succeeded and no stop has been requested since.
    pub fn handle(&mut self, event: &SessionEvent, session_running: bool, now: Instant) -> Reaction {
        match event {
            SessionEvent::SubjectAreaChanged => Reaction {
                recovery: Recovery::Refocus,
                ..Reaction::default()
            },
            SessionEvent::RuntimeError(code) => {
                log::error!("capture session runtime error: {:?}", code);
                if code.is_reset() && session_running {
                    if self.limiter.try_acquire(now) {
                        log::info!("media services reset; restarting session");
                        return Reaction {
                            recovery: Recovery::Restart,
                            ..Reaction::default()
                        };
                    }
                    log::warn!("automatic restart limit reached; awaiting user resume");
                }
                Reaction {
                    resume_affordance: self.set_resume(true),
                    ..Reaction::default()
                }
            }
            SessionEvent::Interrupted(reason) => {
                log::info!("capture session interrupted: {:?}", reason);
                self.interrupted = true;
                match reason {
                    r if r.offers_resume() => Reaction {
                        resume_affordance: self.set_resume(true),
                        ..Reaction::default()
                    },
                    InterruptionReason::ResourceUnavailableSystemPressure => {
                        log::warn!("session stopped due to system pressure");
                        Reaction {
                            degraded_availability: self.set_degraded(true),
                            ..Reaction::default()
                        }
                    }
                    _ => Reaction::default(),
                }
            }
            SessionEvent::InterruptionEnded => {
                log::info!("capture session interruption ended");
                self.interrupted = false;
                self.clear_affordances()
            }
        }
    }

    /// The automatic restart did not bring the session back.
    pub fn restart_failed(&mut self) -> Reaction {
        Reaction {
            resume_affordance: self.set_resume(true),
            ..Reaction::default()
        }
    }

    /// The session is running again after a start or resume request.
    pub fn resumed(&mut self) -> Reaction {
        Reaction {
            resume_affordance: self.set_resume(false),
            ..Reaction::default()
        }
    }

    /// Forgets interruption and affordance state, e.g. on stop or teardown.
    pub fn reset(&mut self) -> Reaction {
        self.interrupted = false;
        self.limiter.reset();
        self.clear_affordances()
    }

    fn clear_affordances(&mut self) -> Reaction {
        Reaction {
            recovery: Recovery::None,
            resume_affordance: self.set_resume(false),
            degraded_availability: self.set_degraded(false),
        }
    }

    fn set_resume(&mut self, visible: bool) -> Option<bool> {
        (self.resume_visible != visible).then(|| {
            self.resume_visible = visible;
            visible
        })
    }

    fn set_degraded(&mut self, visible: bool) -> Option<bool> {
        (self.degraded_visible != visible).then(|| {
            self.degraded_visible = visible;
            visible
        })
    }
}
