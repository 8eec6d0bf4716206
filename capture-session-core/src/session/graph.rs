//! The mutable capture topology and its configuration bracket.
//!
//! Topology changes go through a [`Configuration`] obtained from
//! [`SessionGraph::begin_configuration`]. The guard commits when it is
//! dropped, so every exit path (including early returns on failure) closes
//! the bracket exactly once. Mutation outside a bracket is not expressible.

use crate::models::device::{CapturePreset, DeviceInput, MediaType};
use crate::models::error::CaptureError;
use crate::traits::capture_session::CaptureSession;

/// Session graph: zero-or-one video input, zero-or-one audio input, a preset.
pub struct SessionGraph<S: CaptureSession> {
    session: S,
    video_input: Option<DeviceInput>,
    audio_input: Option<DeviceInput>,
    preset: Option<CapturePreset>,
}

impl<S: CaptureSession> SessionGraph<S> {
    pub fn new(session: S) -> Self {
        Self {
            session,
            video_input: None,
            audio_input: None,
            preset: None,
        }
    }

    pub fn begin_configuration(&mut self) -> Configuration<'_, S> {
        self.session.begin_configuration();
        Configuration {
            graph: self,
            committed: false,
        }
    }

    pub fn video_input(&self) -> Option<&DeviceInput> {
        self.video_input.as_ref()
    }

    pub fn audio_input(&self) -> Option<&DeviceInput> {
        self.audio_input.as_ref()
    }

    pub fn preset(&self) -> Option<CapturePreset> {
        self.preset
    }

    pub fn has_inputs(&self) -> bool {
        self.video_input.is_some() || self.audio_input.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    /// Starts the hardware. A no-op if already running.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.session.is_running() {
            log::debug!("session already running");
            return Ok(());
        }
        self.session.start_running()
    }

    /// Stops the hardware. A no-op if already stopped.
    pub fn stop(&mut self) {
        if !self.session.is_running() {
            log::debug!("session already stopped");
            return;
        }
        self.session.stop_running();
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    fn slot(&mut self, media: MediaType) -> &mut Option<DeviceInput> {
        match media {
            MediaType::Video => &mut self.video_input,
            MediaType::Audio => &mut self.audio_input,
        }
    }
}

/// An open configuration bracket. Commits on drop.
pub struct Configuration<'a, S: CaptureSession> {
    graph: &'a mut SessionGraph<S>,
    committed: bool,
}

impl<S: CaptureSession> Configuration<'_, S> {
    /// Whether `input` may be added: its media slot must be empty and the
    /// hardware must accept it.
    pub fn can_add_input(&self, input: &DeviceInput) -> bool {
        let occupied = match input.media() {
            MediaType::Video => self.graph.video_input.is_some(),
            MediaType::Audio => self.graph.audio_input.is_some(),
        };
        !occupied && self.graph.session.can_add_input(input)
    }

    /// Adds `input` if allowed. On `false` the input is dropped and the
    /// topology is unchanged.
    pub fn add_input(&mut self, input: DeviceInput) -> bool {
        if !self.can_add_input(&input) {
            log::warn!("session rejected {:?} input {}", input.media(), input.device.id);
            return false;
        }
        let media = input.media();
        self.graph.session.add_input(&input);
        log::debug!("attached {:?} input {}", media, input.device.id);
        *self.graph.slot(media) = Some(input);
        true
    }

    /// Detaches and returns the input in `media`'s slot, if any.
    pub fn remove_input(&mut self, media: MediaType) -> Option<DeviceInput> {
        let input = self.graph.slot(media).take()?;
        self.graph.session.remove_input(&input);
        log::debug!("detached {:?} input {}", media, input.device.id);
        Some(input)
    }

    pub fn set_preset(&mut self, preset: CapturePreset) {
        self.graph.session.set_preset(preset);
        self.graph.preset = Some(preset);
    }

    /// Read access to the graph while the bracket is open.
    pub fn graph(&self) -> &SessionGraph<S> {
        self.graph
    }

    /// Closes the bracket now rather than at end of scope.
    pub fn commit(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if !self.committed {
            self.committed = true;
            self.graph.session.commit_configuration();
        }
    }
}

impl<S: CaptureSession> Drop for Configuration<'_, S> {
    fn drop(&mut self) {
        self.finish();
    }
}
