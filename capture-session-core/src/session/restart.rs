use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::models::config::RestartPolicy;

/// Sliding-window limit on automatic restarts.
#[derive(Debug, Clone)]
pub struct RestartLimiter {
    max_attempts: u32,
    window: Duration,
    attempts: VecDeque<Instant>,
}

impl RestartLimiter {
    pub fn new(policy: &RestartPolicy) -> Self {
        Self {
            max_attempts: policy.max_attempts,
            window: policy.window(),
            attempts: VecDeque::new(),
        }
    }

    /// Records an attempt at `now` if the window has room.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        while let Some(&oldest) = self.attempts.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                self.attempts.pop_front();
            } else {
                break;
            }
        }
        if self.attempts.len() >= self.max_attempts as usize {
            return false;
        }
        self.attempts.push_back(now);
        true
    }

    pub fn reset(&mut self) {
        self.attempts.clear();
    }
}
