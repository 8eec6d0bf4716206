//! Virtual device catalogue.
//!
//! Holds a mutable list of cameras and microphones with per-device
//! availability and failure injection. Preferred-camera changes and
//! rotation updates are pushed to observers the way the platform would.

use std::collections::HashSet;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use capture_session_core::dispatch::subscription::Subscription;
use capture_session_core::models::device::{
    DeviceCapabilities, DeviceFormat, DeviceHandle, DeviceInput, DevicePosition, FocusSettings,
    MediaType,
};
use capture_session_core::models::error::CaptureError;
use capture_session_core::traits::device_provider::{
    DeviceProvider, PreferredDeviceCallback, RotationCallback, RotationCoordinator,
};

/// A camera with every focus and exposure capability.
pub fn camera(id: &str, name: &str, position: DevicePosition) -> DeviceHandle {
    DeviceHandle {
        id: id.to_string(),
        name: name.to_string(),
        media: MediaType::Video,
        position,
        capabilities: DeviceCapabilities::full(),
    }
}

pub fn microphone(id: &str, name: &str) -> DeviceHandle {
    DeviceHandle {
        id: id.to_string(),
        name: name.to_string(),
        media: MediaType::Audio,
        position: DevicePosition::Unspecified,
        capabilities: DeviceCapabilities::default(),
    }
}

/// Observer list shared with the subscriptions it hands out.
struct Observers<T: ?Sized> {
    next_id: u64,
    entries: Vec<(u64, Arc<T>)>,
}

impl<T: ?Sized> Observers<T> {
    fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

fn register<T: ?Sized + Send + Sync + 'static>(
    observers: &Arc<Mutex<Observers<T>>>,
    callback: Arc<T>,
) -> Subscription {
    let id = {
        let mut guard = observers.lock();
        let id = guard.next_id;
        guard.next_id += 1;
        guard.entries.push((id, callback));
        id
    };
    let weak: Weak<Mutex<Observers<T>>> = Arc::downgrade(observers);
    Subscription::new(move || {
        if let Some(observers) = weak.upgrade() {
            observers.lock().entries.retain(|(entry, _)| *entry != id);
        }
    })
}

fn snapshot<T: ?Sized>(observers: &Mutex<Observers<T>>) -> Vec<Arc<T>> {
    observers
        .lock()
        .entries
        .iter()
        .map(|(_, cb)| Arc::clone(cb))
        .collect()
}

#[derive(Default)]
struct Catalog {
    devices: Vec<DeviceHandle>,
    unavailable: HashSet<String>,
    open_failures: HashSet<String>,
    lock_failures: HashSet<String>,
    system_preferred: Option<String>,
    user_preferred: Option<String>,
    focus_log: Vec<(String, FocusSettings)>,
}

/// Virtual implementation of [`DeviceProvider`].
pub struct VirtualDeviceEnumerator {
    catalog: Mutex<Catalog>,
    preferred_observers: Arc<Mutex<Observers<dyn Fn(DeviceHandle) + Send + Sync>>>,
    rotation: VirtualRotation,
}

impl VirtualDeviceEnumerator {
    /// An empty catalogue.
    pub fn new() -> Self {
        Self {
            catalog: Mutex::new(Catalog::default()),
            preferred_observers: Arc::new(Mutex::new(Observers::new())),
            rotation: VirtualRotation::new(90.0),
        }
    }

    /// A back camera, a front camera and a built-in microphone.
    pub fn with_default_devices() -> Self {
        let enumerator = Self::new();
        enumerator.add_device(camera("back-wide", "Back Camera", DevicePosition::Back));
        enumerator.add_device(camera("front", "Front Camera", DevicePosition::Front));
        enumerator.add_device(microphone("builtin-mic", "Built-in Microphone"));
        enumerator
    }

    pub fn add_device(&self, device: DeviceHandle) {
        let mut catalog = self.catalog.lock();
        catalog.devices.retain(|d| d.id != device.id);
        catalog.devices.push(device);
    }

    pub fn remove_device(&self, id: &str) {
        let mut catalog = self.catalog.lock();
        catalog.devices.retain(|d| d.id != id);
    }

    pub fn set_available(&self, id: &str, available: bool) {
        let mut catalog = self.catalog.lock();
        if available {
            catalog.unavailable.remove(id);
        } else {
            catalog.unavailable.insert(id.to_string());
        }
    }

    /// Opening an input for `id` fails with `AttachFailed`.
    pub fn fail_open(&self, id: &str) {
        self.catalog.lock().open_failures.insert(id.to_string());
    }

    /// Locking `id` for focus configuration fails.
    pub fn fail_lock(&self, id: &str) {
        self.catalog.lock().lock_failures.insert(id.to_string());
    }

    pub fn set_system_preferred(&self, id: Option<&str>) {
        self.catalog.lock().system_preferred = id.map(str::to_string);
    }

    /// The platform switches its preferred camera and notifies observers.
    pub fn change_system_preferred(&self, id: &str) {
        let device = {
            let mut catalog = self.catalog.lock();
            catalog.system_preferred = Some(id.to_string());
            catalog.devices.iter().find(|d| d.id == id).cloned()
        };
        match device {
            Some(device) => self.notify_preferred(device),
            None => log::warn!("preferred device {} is not in the catalogue", id),
        }
    }

    pub fn user_preferred(&self) -> Option<String> {
        self.catalog.lock().user_preferred.clone()
    }

    /// Focus settings applied so far, oldest first.
    pub fn focus_log(&self) -> Vec<(String, FocusSettings)> {
        self.catalog.lock().focus_log.clone()
    }

    pub fn preferred_observer_count(&self) -> usize {
        self.preferred_observers.lock().entries.len()
    }

    /// The rotation source shared by every device.
    pub fn rotation(&self) -> VirtualRotation {
        self.rotation.clone()
    }

    fn notify_preferred(&self, device: DeviceHandle) {
        for callback in snapshot(&self.preferred_observers) {
            callback(device.clone());
        }
    }

    fn format_for(device: &DeviceHandle) -> DeviceFormat {
        match device.media {
            MediaType::Video => DeviceFormat::Video {
                width: 1920,
                height: 1080,
                frame_rate: 30.0,
            },
            MediaType::Audio => DeviceFormat::Audio {
                sample_rate: 48000.0,
                channels: 1,
            },
        }
    }
}

impl Default for VirtualDeviceEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceProvider for VirtualDeviceEnumerator {
    fn system_preferred_device(&self) -> Option<DeviceHandle> {
        let catalog = self.catalog.lock();
        let id = catalog.system_preferred.as_deref()?;
        catalog.devices.iter().find(|d| d.id == id).cloned()
    }

    fn set_user_preferred_device(&self, device: &DeviceHandle) {
        {
            let mut catalog = self.catalog.lock();
            catalog.user_preferred = Some(device.id.clone());
            catalog.system_preferred = Some(device.id.clone());
        }
        log::debug!("user preferred camera set to {}", device.id);
        self.notify_preferred(device.clone());
    }

    fn observe_preferred_device(&self, callback: PreferredDeviceCallback) -> Subscription {
        register(&self.preferred_observers, callback)
    }

    fn device_with_id(&self, id: &str) -> Option<DeviceHandle> {
        self.catalog.lock().devices.iter().find(|d| d.id == id).cloned()
    }

    fn discover(&self, media: MediaType, position: DevicePosition) -> Vec<DeviceHandle> {
        let catalog = self.catalog.lock();
        catalog
            .devices
            .iter()
            .filter(|d| d.media == media)
            .filter(|d| position == DevicePosition::Unspecified || d.position == position)
            .filter(|d| !catalog.unavailable.contains(&d.id))
            .cloned()
            .collect()
    }

    fn default_device(&self, media: MediaType) -> Option<DeviceHandle> {
        let catalog = self.catalog.lock();
        catalog
            .devices
            .iter()
            .find(|d| d.media == media && !catalog.unavailable.contains(&d.id))
            .cloned()
    }

    fn is_available(&self, device: &DeviceHandle) -> bool {
        let catalog = self.catalog.lock();
        catalog.devices.iter().any(|d| d.id == device.id) && !catalog.unavailable.contains(&device.id)
    }

    fn open_input(&self, device: &DeviceHandle) -> Result<DeviceInput, CaptureError> {
        let catalog = self.catalog.lock();
        if catalog.unavailable.contains(&device.id)
            || !catalog.devices.iter().any(|d| d.id == device.id)
        {
            return Err(CaptureError::DeviceNotAvailable);
        }
        if catalog.open_failures.contains(&device.id) {
            return Err(CaptureError::AttachFailed(format!(
                "{} refused to open",
                device.id
            )));
        }
        Ok(DeviceInput::new(device.clone(), Self::format_for(device)))
    }

    fn apply_focus(&self, device: &DeviceHandle, settings: &FocusSettings) -> Result<(), CaptureError> {
        let mut catalog = self.catalog.lock();
        if catalog.lock_failures.contains(&device.id) {
            return Err(CaptureError::DeviceLockFailed(format!(
                "{} is locked by another client",
                device.id
            )));
        }
        catalog.focus_log.push((device.id.clone(), *settings));
        Ok(())
    }

    fn rotation_coordinator(&self, _device: &DeviceHandle) -> Box<dyn RotationCoordinator> {
        Box::new(self.rotation.clone())
    }
}

/// Rotation source driven by [`VirtualRotation::rotate`].
#[derive(Clone)]
pub struct VirtualRotation {
    angle: Arc<Mutex<f64>>,
    observers: Arc<Mutex<Observers<dyn Fn(f64) + Send + Sync>>>,
}

impl VirtualRotation {
    pub fn new(initial_angle: f64) -> Self {
        Self {
            angle: Arc::new(Mutex::new(initial_angle)),
            observers: Arc::new(Mutex::new(Observers::new())),
        }
    }

    /// The device turns; observers receive the new preview angle.
    pub fn rotate(&self, angle: f64) {
        *self.angle.lock() = angle;
        for callback in snapshot(&self.observers) {
            callback(angle);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock().entries.len()
    }
}

impl RotationCoordinator for VirtualRotation {
    fn horizon_level_preview_angle(&self) -> f64 {
        *self.angle.lock()
    }

    fn observe(&self, callback: RotationCallback) -> Subscription {
        register(&self.observers, callback)
    }
}
