use std::sync::Arc;

use crate::dispatch::subscription::Subscription;
use crate::models::device::{DeviceHandle, DevicePosition, MediaType};
use crate::traits::device_provider::DeviceProvider;
use crate::traits::preferences::PreferenceStore;

/// Set once the fallback device has been chosen and persisted.
pub const INITIAL_PREFERRED_DEVICE_SET_KEY: &str = "initial_preferred_device_set";

/// Identifier of the user's preferred video device.
pub const PREFERRED_DEVICE_ID_KEY: &str = "preferred_device_id";

/// Chooses the input devices to attach.
pub struct DeviceResolver<D: DeviceProvider> {
    devices: Arc<D>,
    preferences: Arc<dyn PreferenceStore>,
}

impl<D: DeviceProvider> DeviceResolver<D> {
    pub fn new(devices: Arc<D>, preferences: Arc<dyn PreferenceStore>) -> Self {
        Self {
            devices,
            preferences,
        }
    }

    /// Picks the video device.
    ///
    /// The stored or platform-preferred device wins while it is available
    /// and the initial preference has been set. Otherwise the first
    /// back-facing device is chosen and persisted, so later runs skip
    /// discovery. `None` means there is no usable camera.
    pub fn resolve_video_device(&self) -> Option<DeviceHandle> {
        let initial_set = self.preferences.bool(INITIAL_PREFERRED_DEVICE_SET_KEY);
        if initial_set {
            if let Some(device) = self.preferred_device() {
                log::debug!("using preferred video device {}", device.id);
                return Some(device);
            }
        }

        let fallback = self
            .devices
            .discover(MediaType::Video, DevicePosition::Back)
            .into_iter()
            .find(|d| self.devices.is_available(d));

        match &fallback {
            Some(device) => {
                log::info!("selected fallback video device {} ({})", device.id, device.name);
                self.persist_preference(device);
            }
            None => log::warn!("no back-facing video device available"),
        }
        self.preferences.set_bool(INITIAL_PREFERRED_DEVICE_SET_KEY, true);
        fallback
    }

    /// Best effort: the default microphone, if it is available.
    pub fn resolve_audio_device(&self) -> Option<DeviceHandle> {
        self.devices
            .default_device(MediaType::Audio)
            .filter(|d| self.devices.is_available(d))
    }

    /// Records `device` as preferred with the platform and in preferences.
    pub fn persist_preference(&self, device: &DeviceHandle) {
        self.devices.set_user_preferred_device(device);
        self.preferences.set_string(PREFERRED_DEVICE_ID_KEY, &device.id);
    }

    /// Observe changes of the preferred video device.
    pub fn on_preferred_device_changed(
        &self,
        callback: impl Fn(DeviceHandle) + Send + Sync + 'static,
    ) -> Subscription {
        self.devices.observe_preferred_device(Arc::new(callback))
    }

    fn preferred_device(&self) -> Option<DeviceHandle> {
        let stored = self
            .preferences
            .string(PREFERRED_DEVICE_ID_KEY)
            .and_then(|id| self.devices.device_with_id(&id));

        stored
            .into_iter()
            .chain(self.devices.system_preferred_device())
            .find(|d| d.is_video() && self.devices.is_available(d))
    }
}
