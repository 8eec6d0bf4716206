//! Simulated capture session.
//!
//! Behaves like platform hardware: it tracks the attached inputs, refuses
//! to start while interrupted, and publishes runtime notifications on its
//! [`EventBus`]. A [`VirtualSessionControl`] lets tests and demos inspect
//! it and inject hardware events from any thread.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use capture_session_core::dispatch::event_bus::EventBus;
use capture_session_core::models::device::{CapturePreset, DeviceInput, MediaType};
use capture_session_core::models::error::CaptureError;
use capture_session_core::models::events::{InterruptionReason, RuntimeErrorCode, SessionEvent};
use capture_session_core::traits::capture_session::CaptureSession;

#[derive(Default)]
struct SessionInner {
    running: bool,
    running_before_interruption: bool,
    interrupted: bool,
    config_depth: u32,
    commits: u32,
    inputs: Vec<DeviceInput>,
    preset: Option<CapturePreset>,
    start_calls: u32,
    stop_calls: u32,
    mutations_outside_bracket: u32,
    rejected_devices: HashSet<String>,
    start_failure: Option<CaptureError>,
}

impl SessionInner {
    fn check_bracket(&mut self, op: &str) {
        if self.config_depth == 0 {
            log::error!("{} outside a configuration bracket", op);
            self.mutations_outside_bracket += 1;
        }
    }
}

/// Virtual capture session implementing [`CaptureSession`].
pub struct VirtualSession {
    inner: Arc<Mutex<SessionInner>>,
    bus: EventBus,
}

impl VirtualSession {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner::default())),
            bus: EventBus::new(),
        }
    }

    /// A handle for inspecting the session and raising hardware events.
    pub fn control(&self) -> VirtualSessionControl {
        VirtualSessionControl {
            inner: Arc::clone(&self.inner),
            bus: self.bus.clone(),
        }
    }
}

impl Default for VirtualSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSession for VirtualSession {
    fn begin_configuration(&mut self) {
        self.inner.lock().config_depth += 1;
    }

    fn commit_configuration(&mut self) {
        let mut inner = self.inner.lock();
        if inner.config_depth == 0 {
            log::error!("commit without matching begin");
            return;
        }
        inner.config_depth -= 1;
        inner.commits += 1;
    }

    fn can_add_input(&self, input: &DeviceInput) -> bool {
        let inner = self.inner.lock();
        !inner.rejected_devices.contains(&input.device.id)
            && !inner.inputs.iter().any(|i| i.device.id == input.device.id)
    }

    fn add_input(&mut self, input: &DeviceInput) {
        let mut inner = self.inner.lock();
        inner.check_bracket("add_input");
        inner.inputs.push(input.clone());
    }

    fn remove_input(&mut self, input: &DeviceInput) {
        let mut inner = self.inner.lock();
        inner.check_bracket("remove_input");
        inner.inputs.retain(|i| i.device.id != input.device.id);
    }

    fn set_preset(&mut self, preset: CapturePreset) {
        let mut inner = self.inner.lock();
        inner.check_bracket("set_preset");
        inner.preset = Some(preset);
    }

    fn start_running(&mut self) -> Result<(), CaptureError> {
        let mut inner = self.inner.lock();
        inner.start_calls += 1;
        if inner.interrupted {
            return Err(CaptureError::DeviceNotAvailable);
        }
        if let Some(err) = inner.start_failure.clone() {
            return Err(err);
        }
        if !inner.inputs.iter().any(|i| i.media() == MediaType::Video) {
            return Err(CaptureError::ConfigurationFailed("no video input".into()));
        }
        inner.running = true;
        log::debug!("virtual session running");
        Ok(())
    }

    fn stop_running(&mut self) {
        let mut inner = self.inner.lock();
        inner.stop_calls += 1;
        inner.running = false;
        inner.running_before_interruption = false;
    }

    fn is_running(&self) -> bool {
        self.inner.lock().running
    }

    fn events(&self) -> EventBus {
        self.bus.clone()
    }
}

/// Inspection and fault-injection handle for a [`VirtualSession`].
#[derive(Clone)]
pub struct VirtualSessionControl {
    inner: Arc<Mutex<SessionInner>>,
    bus: EventBus,
}

impl VirtualSessionControl {
    pub fn is_running(&self) -> bool {
        self.inner.lock().running
    }

    pub fn start_calls(&self) -> u32 {
        self.inner.lock().start_calls
    }

    pub fn stop_calls(&self) -> u32 {
        self.inner.lock().stop_calls
    }

    pub fn commits(&self) -> u32 {
        self.inner.lock().commits
    }

    /// Open configuration brackets; zero whenever the session is consistent.
    pub fn config_depth(&self) -> u32 {
        self.inner.lock().config_depth
    }

    pub fn mutations_outside_bracket(&self) -> u32 {
        self.inner.lock().mutations_outside_bracket
    }

    pub fn inputs(&self) -> Vec<DeviceInput> {
        self.inner.lock().inputs.clone()
    }

    pub fn input_ids(&self) -> Vec<String> {
        self.inner.lock().inputs.iter().map(|i| i.device.id.clone()).collect()
    }

    pub fn preset(&self) -> Option<CapturePreset> {
        self.inner.lock().preset
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }

    /// Makes the hardware refuse inputs from `device_id`.
    pub fn reject_device(&self, device_id: &str) {
        self.inner.lock().rejected_devices.insert(device_id.to_string());
    }

    /// Makes every start fail with `error` until cleared with `None`.
    pub fn fail_starts_with(&self, error: Option<CaptureError>) {
        self.inner.lock().start_failure = error;
    }

    /// The pipeline stops and a runtime error is reported.
    pub fn raise_runtime_error(&self, code: RuntimeErrorCode) {
        self.inner.lock().running = false;
        self.bus.publish(SessionEvent::RuntimeError(code));
    }

    /// The pipeline is suspended by the platform.
    pub fn interrupt(&self, reason: InterruptionReason) {
        {
            let mut inner = self.inner.lock();
            if !inner.interrupted {
                inner.running_before_interruption = inner.running;
            }
            inner.interrupted = true;
            inner.running = false;
        }
        self.bus.publish(SessionEvent::Interrupted(reason));
    }

    /// The platform lifts the interruption; a session that was running resumes.
    pub fn end_interruption(&self) {
        {
            let mut inner = self.inner.lock();
            inner.interrupted = false;
            inner.running = inner.running_before_interruption;
        }
        self.bus.publish(SessionEvent::InterruptionEnded);
    }

    pub fn change_subject_area(&self) {
        self.bus.publish(SessionEvent::SubjectAreaChanged);
    }
}
