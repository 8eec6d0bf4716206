use std::sync::Arc;

use crate::dispatch::subscription::Subscription;
use crate::models::device::{DeviceHandle, DeviceInput, DevicePosition, FocusSettings, MediaType};
use crate::models::error::CaptureError;

pub type PreferredDeviceCallback = Arc<dyn Fn(DeviceHandle) + Send + Sync + 'static>;

pub type RotationCallback = Arc<dyn Fn(f64) + Send + Sync + 'static>;

/// Platform device catalogue and per-device control.
pub trait DeviceProvider: Send + Sync + 'static {
    /// The platform's current preferred camera, if any.
    fn system_preferred_device(&self) -> Option<DeviceHandle>;

    /// Records `device` as the user's preferred camera at the platform level.
    fn set_user_preferred_device(&self, device: &DeviceHandle);

    /// Observe changes of the platform's preferred camera.
    fn observe_preferred_device(&self, callback: PreferredDeviceCallback) -> Subscription;

    fn device_with_id(&self, id: &str) -> Option<DeviceHandle>;

    /// Currently connected devices of `media` at `position`, best match first.
    fn discover(&self, media: MediaType, position: DevicePosition) -> Vec<DeviceHandle>;

    fn default_device(&self, media: MediaType) -> Option<DeviceHandle>;

    fn is_available(&self, device: &DeviceHandle) -> bool;

    /// Open an input for `device`, negotiating its format.
    fn open_input(&self, device: &DeviceHandle) -> Result<DeviceInput, CaptureError>;

    /// Lock `device`, apply `settings`, unlock. Blocks while the device is locked.
    fn apply_focus(&self, device: &DeviceHandle, settings: &FocusSettings) -> Result<(), CaptureError>;

    /// Rotation source for level-horizon preview of `device`.
    fn rotation_coordinator(&self, device: &DeviceHandle) -> Box<dyn RotationCoordinator>;
}

/// Derives the preview rotation angle from device and interface orientation.
pub trait RotationCoordinator: Send + Sync {
    /// Angle in degrees that keeps the preview horizon level.
    fn horizon_level_preview_angle(&self) -> f64;

    /// Observe angle changes until the subscription is cancelled.
    fn observe(&self, callback: RotationCallback) -> Subscription;
}
