use crate::dispatch::event_bus::EventBus;
use crate::models::device::{CapturePreset, DeviceInput};
use crate::models::error::CaptureError;

/// Platform capture session: the hardware side of the session graph.
///
/// Only [`SessionGraph`](crate::session::graph::SessionGraph) calls the
/// mutating methods, and only between `begin_configuration` and
/// `commit_configuration`. All calls happen on the session worker.
pub trait CaptureSession: Send + 'static {
    fn begin_configuration(&mut self);

    fn commit_configuration(&mut self);

    /// Whether the hardware accepts `input` given the current topology.
    fn can_add_input(&self, input: &DeviceInput) -> bool;

    fn add_input(&mut self, input: &DeviceInput);

    fn remove_input(&mut self, input: &DeviceInput);

    fn set_preset(&mut self, preset: CapturePreset);

    /// Bring the hardware up. Blocks until the pipeline is running or fails.
    fn start_running(&mut self) -> Result<(), CaptureError>;

    /// Tear the pipeline down. Blocks until stopped.
    fn stop_running(&mut self);

    fn is_running(&self) -> bool;

    /// Bus on which the platform publishes runtime notifications.
    fn events(&self) -> EventBus;
}
