use serde::{Deserialize, Serialize};

/// Kind of media a device produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Audio,
}

/// Physical placement of a capture device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePosition {
    Back,
    Front,
    External,
    Unspecified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusMode {
    Locked,
    AutoFocus,
    ContinuousAutoFocus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureMode {
    Locked,
    AutoExpose,
    ContinuousAutoExposure,
}

/// What the hardware lets us adjust on a device.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    pub focus_point_of_interest: bool,
    pub exposure_point_of_interest: bool,
    pub focus_modes: Vec<FocusMode>,
    pub exposure_modes: Vec<ExposureMode>,
}

impl DeviceCapabilities {
    /// Capabilities of a typical rear camera: every mode, both points of interest.
    pub fn full() -> Self {
        Self {
            focus_point_of_interest: true,
            exposure_point_of_interest: true,
            focus_modes: vec![
                FocusMode::Locked,
                FocusMode::AutoFocus,
                FocusMode::ContinuousAutoFocus,
            ],
            exposure_modes: vec![
                ExposureMode::Locked,
                ExposureMode::AutoExpose,
                ExposureMode::ContinuousAutoExposure,
            ],
        }
    }

    pub fn supports_focus(&self, mode: FocusMode) -> bool {
        self.focus_point_of_interest && self.focus_modes.contains(&mode)
    }

    pub fn supports_exposure(&self, mode: ExposureMode) -> bool {
        self.exposure_point_of_interest && self.exposure_modes.contains(&mode)
    }
}

/// Reference to a physical capture device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceHandle {
    pub id: String,
    pub name: String,
    pub media: MediaType,
    pub position: DevicePosition,
    #[serde(default)]
    pub capabilities: DeviceCapabilities,
}

impl DeviceHandle {
    pub fn is_video(&self) -> bool {
        self.media == MediaType::Video
    }
}

/// Format negotiated when a device input is opened.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeviceFormat {
    Video { width: u32, height: u32, frame_rate: f64 },
    Audio { sample_rate: f64, channels: u16 },
}

/// A device attached (or attachable) to the session graph.
///
/// Owned by the graph once added; dropped when removed.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInput {
    pub device: DeviceHandle,
    pub format: DeviceFormat,
}

impl DeviceInput {
    pub fn new(device: DeviceHandle, format: DeviceFormat) -> Self {
        Self { device, format }
    }

    pub fn media(&self) -> MediaType {
        self.device.media
    }
}

/// Capture quality preset applied to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapturePreset {
    #[default]
    High,
    Medium,
    Low,
    Photo,
}

/// Normalized point in device coordinates, (0,0) top-left to (1,1) bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusPoint {
    pub x: f64,
    pub y: f64,
}

impl FocusPoint {
    pub const CENTER: FocusPoint = FocusPoint { x: 0.5, y: 0.5 };

    /// Builds a point, clamping both coordinates into the unit square.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        }
    }
}

/// Settings applied to a device while it is locked for configuration.
///
/// `None` leaves the corresponding mode untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusSettings {
    pub point: FocusPoint,
    pub focus_mode: Option<FocusMode>,
    pub exposure_mode: Option<ExposureMode>,
    pub monitor_subject_area_change: bool,
}

impl FocusSettings {
    /// Resolves requested modes against what the device supports.
    pub fn for_device(
        device: &DeviceHandle,
        point: FocusPoint,
        focus_mode: FocusMode,
        exposure_mode: ExposureMode,
        monitor_subject_area_change: bool,
    ) -> Self {
        let caps = &device.capabilities;
        Self {
            point,
            focus_mode: caps.supports_focus(focus_mode).then_some(focus_mode),
            exposure_mode: caps.supports_exposure(exposure_mode).then_some(exposure_mode),
            monitor_subject_area_change,
        }
    }
}
