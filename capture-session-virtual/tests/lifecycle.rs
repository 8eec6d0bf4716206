//! End-to-end lifecycle tests: a `CaptureController` driving the virtual
//! backend, with a dedicated "main" queue standing in for the UI context.

use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use capture_session_core::{
    AuthorizationState, CaptureController, CaptureDelegate, CaptureError, Collaborators,
    ControllerPhase, DeviceProvider, DisplaySurface, ExposureMode, FocusMode, FocusPoint,
    InterruptionReason, PreferenceStore, RunningState, RuntimeErrorCode, SerialQueue,
    SessionConfiguration, SessionToken, SetupResult,
};
use capture_session_virtual::{
    microphone, JsonFilePreferences, MemoryPreferences, ScriptedAuthorizer, VirtualDeviceEnumerator,
    VirtualSession, VirtualSessionControl,
};

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Setup(SetupResult),
    Running(RunningState),
    Resume(bool),
    Degraded(bool),
    Angle(f64),
    ResumeFailed,
}

#[derive(Default)]
struct RecordingDelegate {
    calls: Mutex<Vec<Call>>,
    off_main: Mutex<Vec<String>>,
}

impl RecordingDelegate {
    fn record(&self, call: Call) {
        let thread = thread::current();
        if thread.name() != Some("main") {
            self.off_main.lock().push(format!("{:?} on {:?}", call, thread.name()));
        }
        self.calls.lock().push(call);
    }

    /// Everything except rotation updates.
    fn lifecycle(&self) -> Vec<Call> {
        self.calls
            .lock()
            .iter()
            .filter(|c| !matches!(c, Call::Angle(_)))
            .cloned()
            .collect()
    }

    fn angles(&self) -> Vec<f64> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Angle(a) => Some(*a),
                _ => None,
            })
            .collect()
    }
}

impl CaptureDelegate for RecordingDelegate {
    fn on_setup_result(&self, result: SetupResult) {
        self.record(Call::Setup(result));
    }

    fn on_running_state_changed(&self, state: RunningState) {
        self.record(Call::Running(state));
    }

    fn on_resume_affordance(&self, visible: bool) {
        self.record(Call::Resume(visible));
    }

    fn on_degraded_availability(&self, visible: bool) {
        self.record(Call::Degraded(visible));
    }

    fn on_rotation_angle_changed(&self, angle: f64) {
        self.record(Call::Angle(angle));
    }

    fn on_resume_failed(&self) {
        self.record(Call::ResumeFailed);
    }
}

#[derive(Default)]
struct RecordingSurface {
    angles: Mutex<Vec<f64>>,
    mirrored: Mutex<Option<bool>>,
    token: Mutex<Option<SessionToken>>,
}

impl DisplaySurface for RecordingSurface {
    fn bind_session(&self, token: SessionToken) {
        *self.token.lock() = Some(token);
    }

    fn set_rotation_angle(&self, angle: f64) {
        self.angles.lock().push(angle);
    }

    fn set_video_mirrored(&self, mirrored: bool) {
        *self.mirrored.lock() = Some(mirrored);
    }
}

struct Rig {
    controller: CaptureController<VirtualSession, VirtualDeviceEnumerator>,
    control: VirtualSessionControl,
    devices: Arc<VirtualDeviceEnumerator>,
    authorizer: Arc<ScriptedAuthorizer>,
    delegate: Arc<RecordingDelegate>,
    surface: Arc<RecordingSurface>,
    main: Arc<SerialQueue>,
}

impl Rig {
    fn build(
        devices: VirtualDeviceEnumerator,
        authorizer: ScriptedAuthorizer,
        preferences: Arc<dyn PreferenceStore>,
        config: SessionConfiguration,
    ) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let session = VirtualSession::new();
        let control = session.control();
        let devices = Arc::new(devices);
        let authorizer = Arc::new(authorizer);
        let delegate = Arc::new(RecordingDelegate::default());
        let surface = Arc::new(RecordingSurface::default());
        let main = Arc::new(SerialQueue::new("main").unwrap());

        let surface_dyn: Arc<dyn DisplaySurface> = surface.clone();
        let display_surface: Weak<dyn DisplaySurface> = Arc::downgrade(&surface_dyn);

        let controller = CaptureController::new(
            Collaborators {
                session,
                devices: Arc::clone(&devices),
                authorizer: authorizer.clone(),
                preferences,
                delegate: delegate.clone(),
                presenter: main.clone(),
                display_surface: Some(display_surface),
            },
            config,
        )
        .unwrap();

        Self {
            controller,
            control,
            devices,
            authorizer,
            delegate,
            surface,
            main,
        }
    }

    fn with_authorizer(authorizer: ScriptedAuthorizer) -> Self {
        Self::build(
            VirtualDeviceEnumerator::with_default_devices(),
            authorizer,
            Arc::new(MemoryPreferences::new()),
            SessionConfiguration::default(),
        )
    }

    fn with_devices(devices: VirtualDeviceEnumerator) -> Self {
        Self::build(
            devices,
            ScriptedAuthorizer::granted(),
            Arc::new(MemoryPreferences::new()),
            SessionConfiguration::default(),
        )
    }

    fn granted() -> Self {
        Self::with_authorizer(ScriptedAuthorizer::granted())
    }

    /// Waits for the worker and the main queue, twice, since each may
    /// queue work on the other.
    fn settle(&self) {
        for _ in 0..2 {
            assert!(self.controller.wait_until_idle(TIMEOUT), "session worker stalled");
            assert!(self.main.wait_until_idle(TIMEOUT), "main queue stalled");
        }
    }

    fn running(self) -> Self {
        self.controller.activate();
        self.controller.request_start();
        self.settle();
        assert_eq!(self.controller.running_state(), RunningState::Running);
        self
    }

    fn assert_graph_consistent(&self) {
        assert_eq!(self.control.config_depth(), 0);
        assert_eq!(self.control.mutations_outside_bracket(), 0);
        let off_main = self.delegate.off_main.lock().clone();
        assert!(off_main.is_empty(), "callbacks off the main queue: {:?}", off_main);
    }
}

// --- Setup ---

#[test]
fn granted_session_configures_and_runs() {
    let rig = Rig::granted().running();

    assert_eq!(
        rig.delegate.lifecycle(),
        vec![Call::Setup(SetupResult::Success), Call::Running(RunningState::Running)]
    );
    assert_eq!(rig.controller.phase(), ControllerPhase::Ready);
    assert_eq!(rig.controller.authorization(), AuthorizationState::Granted);
    assert_eq!(rig.control.input_ids(), vec!["back-wide", "builtin-mic"]);
    assert_eq!(rig.control.preset(), Some(Default::default()));
    assert_eq!(rig.control.start_calls(), 1);
    rig.assert_graph_consistent();
}

#[test]
fn configuration_waits_for_the_permission_prompt() {
    let rig = Rig::with_authorizer(ScriptedAuthorizer::undetermined());
    rig.controller.activate();
    rig.controller.request_start();

    assert!(!rig.controller.wait_until_idle(Duration::from_millis(100)));
    assert_eq!(rig.controller.phase(), ControllerPhase::ResolvingPermission);
    assert!(rig.authorizer.has_pending_prompt());
    assert_eq!(rig.control.commits(), 0);
    assert!(rig.control.inputs().is_empty());

    rig.authorizer.respond(true);
    rig.settle();

    assert_eq!(rig.authorizer.prompt_count(), 1);
    assert_eq!(rig.controller.setup_result(), Some(SetupResult::Success));
    assert_eq!(rig.controller.running_state(), RunningState::Running);
    assert_eq!(
        rig.delegate.lifecycle(),
        vec![Call::Setup(SetupResult::Success), Call::Running(RunningState::Running)]
    );
    assert!(!rig.controller.resume_affordance_visible());
    assert!(!rig.controller.degraded_availability_visible());
    rig.assert_graph_consistent();
}

#[test]
fn previously_denied_access_never_touches_the_graph() {
    let rig = Rig::with_authorizer(ScriptedAuthorizer::denied());
    rig.controller.activate();
    rig.controller.request_start();
    rig.settle();

    assert_eq!(rig.controller.phase(), ControllerPhase::AuthDenied);
    assert_eq!(
        rig.delegate.lifecycle(),
        vec![
            Call::Setup(SetupResult::NotAuthorized),
            Call::Setup(SetupResult::NotAuthorized),
        ]
    );
    assert_eq!(rig.authorizer.prompt_count(), 0);
    assert_eq!(rig.control.commits(), 0);
    assert_eq!(rig.control.start_calls(), 0);
}

#[test]
fn denied_prompt_reports_not_authorized() {
    let rig = Rig::with_authorizer(ScriptedAuthorizer::answering(false));
    rig.controller.activate();
    rig.settle();

    assert_eq!(rig.controller.setup_result(), Some(SetupResult::NotAuthorized));
    assert_eq!(rig.controller.authorization(), AuthorizationState::Denied);
    assert!(rig.control.inputs().is_empty());
}

#[test]
fn missing_camera_fails_configuration_terminally() {
    let devices = VirtualDeviceEnumerator::new();
    devices.add_device(microphone("mic", "Microphone"));
    let rig = Rig::with_devices(devices);
    rig.controller.activate();
    rig.settle();

    assert_eq!(rig.controller.phase(), ControllerPhase::ConfigFailed);
    assert!(rig.controller.phase().is_terminal());
    assert!(rig.control.inputs().is_empty());
    assert_eq!(rig.control.commits(), 1);

    rig.controller.request_start();
    rig.settle();
    assert_eq!(rig.control.start_calls(), 0);
    assert_eq!(
        rig.delegate.lifecycle(),
        vec![
            Call::Setup(SetupResult::ConfigurationFailed),
            Call::Setup(SetupResult::ConfigurationFailed),
        ]
    );
    rig.assert_graph_consistent();
}

#[test]
fn video_input_open_failure_fails_configuration() {
    let devices = VirtualDeviceEnumerator::with_default_devices();
    devices.fail_open("back-wide");
    let rig = Rig::with_devices(devices);
    rig.controller.activate();
    rig.settle();

    assert_eq!(rig.controller.setup_result(), Some(SetupResult::ConfigurationFailed));
    assert!(rig.control.inputs().is_empty());
    rig.assert_graph_consistent();
}

#[test]
fn audio_failure_degrades_to_video_only() {
    let devices = VirtualDeviceEnumerator::with_default_devices();
    devices.fail_open("builtin-mic");
    let rig = Rig::with_devices(devices).running();

    assert_eq!(rig.controller.setup_result(), Some(SetupResult::Success));
    assert_eq!(rig.control.input_ids(), vec!["back-wide"]);
}

#[test]
fn audio_can_be_disabled_by_configuration() {
    let config = SessionConfiguration {
        enable_audio: false,
        ..Default::default()
    };
    let rig = Rig::build(
        VirtualDeviceEnumerator::with_default_devices(),
        ScriptedAuthorizer::granted(),
        Arc::new(MemoryPreferences::new()),
        config,
    )
    .running();

    assert_eq!(rig.control.input_ids(), vec!["back-wide"]);
}

// --- Start / stop ---

#[test]
fn start_and_stop_are_idempotent() {
    let rig = Rig::granted().running();
    rig.controller.request_start();
    rig.settle();
    assert_eq!(rig.control.start_calls(), 1);

    rig.controller.request_stop();
    rig.controller.request_stop();
    rig.settle();

    assert_eq!(rig.control.stop_calls(), 1);
    assert_eq!(rig.controller.running_state(), RunningState::Stopped);
    assert_eq!(rig.control.subscriber_count(), 0);
    assert_eq!(
        rig.delegate.lifecycle(),
        vec![
            Call::Setup(SetupResult::Success),
            Call::Running(RunningState::Running),
            Call::Running(RunningState::Stopped),
        ]
    );
}

#[test]
fn events_after_stop_are_ignored() {
    let rig = Rig::granted().running();
    rig.controller.request_stop();
    rig.settle();

    rig.control.raise_runtime_error(RuntimeErrorCode::Other("late".into()));
    rig.control.change_subject_area();
    rig.settle();

    assert_eq!(rig.controller.running_state(), RunningState::Stopped);
    assert!(!rig.controller.resume_affordance_visible());
    assert!(rig.devices.focus_log().is_empty());
}

// --- Interruptions ---

#[test]
fn busy_interruption_offers_resume_until_it_ends() {
    let rig = Rig::granted().running();

    rig.control.interrupt(InterruptionReason::ResourceBusyOtherClient);
    rig.settle();
    assert_eq!(rig.controller.running_state(), RunningState::Interrupted);
    assert!(rig.controller.resume_affordance_visible());

    rig.control.end_interruption();
    rig.settle();

    assert_eq!(rig.controller.running_state(), RunningState::Running);
    assert_eq!(rig.control.start_calls(), 1);
    assert_eq!(
        rig.delegate.lifecycle(),
        vec![
            Call::Setup(SetupResult::Success),
            Call::Running(RunningState::Running),
            Call::Resume(true),
            Call::Running(RunningState::Interrupted),
            Call::Resume(false),
            Call::Running(RunningState::Running),
        ]
    );
}

#[test]
fn system_pressure_shows_only_the_degraded_notice() {
    let rig = Rig::granted().running();

    rig.control.interrupt(InterruptionReason::ResourceUnavailableSystemPressure);
    rig.settle();
    assert!(rig.controller.degraded_availability_visible());
    assert!(!rig.controller.resume_affordance_visible());

    rig.control.end_interruption();
    rig.settle();

    assert_eq!(
        rig.delegate.lifecycle()[2..],
        [
            Call::Degraded(true),
            Call::Running(RunningState::Interrupted),
            Call::Degraded(false),
            Call::Running(RunningState::Running),
        ]
    );
}

#[test]
fn resume_while_interrupted_reports_failure() {
    let rig = Rig::granted().running();
    rig.control.interrupt(InterruptionReason::ResourceUnavailableMultiApp);
    rig.settle();

    rig.controller.request_resume();
    rig.settle();

    assert!(rig.delegate.lifecycle().contains(&Call::ResumeFailed));
    assert_eq!(rig.controller.running_state(), RunningState::Interrupted);
    assert!(rig.controller.resume_affordance_visible());
}

#[test]
fn interruption_ending_after_failed_resume_reports_running() {
    let rig = Rig::granted().running();
    rig.control.interrupt(InterruptionReason::ResourceBusyOtherClient);
    rig.settle();
    rig.controller.request_resume();
    rig.settle();
    assert_eq!(rig.controller.running_state(), RunningState::Interrupted);

    rig.control.end_interruption();
    rig.settle();

    assert!(rig.control.is_running());
    assert_eq!(rig.controller.running_state(), RunningState::Running);
    assert!(!rig.controller.resume_affordance_visible());
    assert_eq!(rig.delegate.lifecycle().last(), Some(&Call::Running(RunningState::Running)));
}

#[test]
fn start_requested_during_interruption_recovers_when_it_ends() {
    let rig = Rig::granted().running();
    rig.control.interrupt(InterruptionReason::ResourceUnavailableSystemPressure);
    rig.settle();
    rig.controller.request_start();
    rig.settle();
    assert_eq!(rig.controller.running_state(), RunningState::Interrupted);

    rig.control.end_interruption();
    rig.settle();

    assert_eq!(rig.controller.running_state(), RunningState::Running);
    assert!(!rig.controller.degraded_availability_visible());
}

// --- Runtime errors ---

#[test]
fn media_reset_while_running_restarts_once() {
    let rig = Rig::granted().running();

    rig.control.raise_runtime_error(RuntimeErrorCode::MediaServicesReset);
    rig.settle();

    assert_eq!(rig.control.start_calls(), 2);
    assert!(rig.control.is_running());
    assert_eq!(rig.controller.running_state(), RunningState::Running);
    assert_eq!(
        rig.delegate.lifecycle(),
        vec![Call::Setup(SetupResult::Success), Call::Running(RunningState::Running)]
    );
}

#[test]
fn repeated_media_resets_are_rate_limited() {
    let rig = Rig::granted().running();

    rig.control.raise_runtime_error(RuntimeErrorCode::MediaServicesReset);
    rig.settle();
    rig.control.raise_runtime_error(RuntimeErrorCode::MediaServicesReset);
    rig.settle();

    assert_eq!(rig.control.start_calls(), 2);
    assert_eq!(rig.controller.running_state(), RunningState::AwaitingUserResume);
    assert!(rig.controller.resume_affordance_visible());
}

#[test]
fn restart_budget_comes_from_configuration() {
    let config =
        SessionConfiguration::from_json_str(r#"{ "restart_policy": { "max_attempts": 2 } }"#)
            .unwrap();
    let rig = Rig::build(
        VirtualDeviceEnumerator::with_default_devices(),
        ScriptedAuthorizer::granted(),
        Arc::new(MemoryPreferences::new()),
        config,
    )
    .running();

    for _ in 0..3 {
        rig.control.raise_runtime_error(RuntimeErrorCode::MediaServicesReset);
        rig.settle();
    }

    assert_eq!(rig.control.start_calls(), 3);
    assert_eq!(rig.controller.running_state(), RunningState::AwaitingUserResume);
}

#[test]
fn media_reset_after_failed_start_offers_resume() {
    let rig = Rig::granted();
    rig.control.fail_starts_with(Some(CaptureError::DeviceNotAvailable));
    rig.controller.activate();
    rig.controller.request_start();
    rig.settle();
    assert_eq!(rig.controller.running_state(), RunningState::Stopped);

    rig.control.raise_runtime_error(RuntimeErrorCode::MediaServicesReset);
    rig.settle();
    assert_eq!(rig.control.start_calls(), 1);
    assert_eq!(rig.controller.running_state(), RunningState::AwaitingUserResume);

    rig.control.fail_starts_with(None);
    rig.controller.request_resume();
    rig.settle();

    assert_eq!(rig.controller.running_state(), RunningState::Running);
    assert_eq!(
        rig.delegate.lifecycle(),
        vec![
            Call::Setup(SetupResult::Success),
            Call::Resume(true),
            Call::Running(RunningState::AwaitingUserResume),
            Call::Resume(false),
            Call::Running(RunningState::Running),
        ]
    );
}

#[test]
fn other_runtime_error_awaits_user_resume() {
    let rig = Rig::granted().running();

    rig.control.raise_runtime_error(RuntimeErrorCode::Other("pipeline fault".into()));
    rig.settle();
    assert_eq!(rig.control.start_calls(), 1);
    assert_eq!(rig.controller.running_state(), RunningState::AwaitingUserResume);

    rig.controller.request_resume();
    rig.settle();

    assert_eq!(rig.control.start_calls(), 2);
    assert_eq!(rig.controller.running_state(), RunningState::Running);
    assert!(!rig.controller.resume_affordance_visible());
}

// --- Focus ---

#[test]
fn subject_area_change_refocuses_at_center() {
    let rig = Rig::granted().running();

    rig.control.change_subject_area();
    rig.settle();

    let log = rig.devices.focus_log();
    assert_eq!(log.len(), 1);
    let (device, settings) = &log[0];
    assert_eq!(device, "back-wide");
    assert_eq!(settings.point, FocusPoint::CENTER);
    assert_eq!(settings.focus_mode, Some(FocusMode::ContinuousAutoFocus));
    assert_eq!(settings.exposure_mode, Some(ExposureMode::ContinuousAutoExposure));
    assert!(!settings.monitor_subject_area_change);
}

#[test]
fn one_shot_focus_enables_subject_area_monitoring() {
    let rig = Rig::granted().running();

    rig.controller
        .request_focus_and_expose(FocusPoint::new(0.25, 0.75), false);
    rig.settle();

    let (_, settings) = rig.devices.focus_log().pop().unwrap();
    assert_eq!(settings.point, FocusPoint { x: 0.25, y: 0.75 });
    assert_eq!(settings.focus_mode, Some(FocusMode::AutoFocus));
    assert_eq!(settings.exposure_mode, Some(ExposureMode::AutoExpose));
    assert!(settings.monitor_subject_area_change);
}

#[test]
fn focus_lock_failure_is_not_fatal() {
    let rig = Rig::granted().running();
    rig.devices.fail_lock("back-wide");

    rig.controller.request_focus_and_expose(FocusPoint::CENTER, true);
    rig.settle();

    assert!(rig.devices.focus_log().is_empty());
    assert_eq!(rig.controller.running_state(), RunningState::Running);
}

// --- Devices ---

#[test]
fn preferred_device_change_swaps_video_input() {
    let rig = Rig::granted().running();

    rig.devices.change_system_preferred("front");
    rig.settle();

    assert_eq!(rig.control.input_ids(), vec!["builtin-mic", "front"]);
    assert_eq!(rig.controller.setup_result(), Some(SetupResult::Success));
    rig.assert_graph_consistent();
}

#[test]
fn rejected_preferred_device_restores_previous_input() {
    let rig = Rig::granted().running();
    rig.control.reject_device("front");

    rig.devices.change_system_preferred("front");
    rig.settle();

    assert!(rig.control.input_ids().contains(&"back-wide".to_string()));
    assert_eq!(rig.controller.setup_result(), Some(SetupResult::Success));
    assert_eq!(rig.controller.running_state(), RunningState::Running);
    rig.assert_graph_consistent();
}

#[test]
fn unrecoverable_device_change_degrades_setup() {
    let rig = Rig::granted().running();
    rig.control.reject_device("front");
    rig.control.reject_device("back-wide");

    rig.devices.change_system_preferred("front");
    rig.settle();

    assert_eq!(rig.controller.phase(), ControllerPhase::ConfigFailed);
    assert_eq!(rig.controller.running_state(), RunningState::Stopped);
    assert_eq!(rig.devices.preferred_observer_count(), 0);
    assert!(rig
        .delegate
        .lifecycle()
        .ends_with(&[Call::Setup(SetupResult::ConfigurationFailed), Call::Running(RunningState::Stopped)]));
    rig.assert_graph_consistent();
}

#[test]
fn user_preferred_device_persists_across_runs() {
    let path = std::env::temp_dir().join(format!("capture-lifecycle-{}.json", uuid::Uuid::new_v4()));

    {
        let prefs = Arc::new(JsonFilePreferences::open(&path).unwrap());
        let rig = Rig::build(
            VirtualDeviceEnumerator::with_default_devices(),
            ScriptedAuthorizer::granted(),
            prefs,
            SessionConfiguration::default(),
        )
        .running();

        let front = rig.devices.device_with_id("front").unwrap();
        rig.controller.set_user_preferred_device(front);
        rig.settle();
        assert!(rig.control.input_ids().contains(&"front".to_string()));
        assert_eq!(rig.devices.user_preferred().as_deref(), Some("front"));
    }

    let prefs = Arc::new(JsonFilePreferences::open(&path).unwrap());
    let rig = Rig::build(
        VirtualDeviceEnumerator::with_default_devices(),
        ScriptedAuthorizer::granted(),
        prefs,
        SessionConfiguration::default(),
    )
    .running();

    assert_eq!(rig.control.input_ids()[0], "front");
    drop(rig);
    std::fs::remove_file(&path).unwrap();
}

// --- Presentation ---

#[test]
fn rotation_reaches_surface_and_delegate() {
    let rig = Rig::granted().running();

    rig.devices.rotation().rotate(0.0);
    rig.settle();

    assert_eq!(rig.surface.angles.lock().last(), Some(&0.0));
    assert_eq!(rig.delegate.angles().last(), Some(&0.0));
    assert_eq!(rig.delegate.angles()[0], 90.0);
    assert_eq!(*rig.surface.mirrored.lock(), Some(false));
    assert_eq!(*rig.surface.token.lock(), Some(rig.controller.session_token()));
}

// --- Teardown ---

#[test]
fn teardown_is_idempotent() {
    let rig = Rig::granted().running();

    rig.controller.request_teardown();
    rig.controller.request_teardown();
    rig.settle();

    assert_eq!(rig.controller.phase(), ControllerPhase::Idle);
    assert_eq!(rig.controller.running_state(), RunningState::Stopped);
    assert!(rig.control.inputs().is_empty());
    assert_eq!(rig.control.stop_calls(), 1);
    assert_eq!(rig.control.subscriber_count(), 0);
    assert_eq!(rig.devices.preferred_observer_count(), 0);
    assert_eq!(rig.devices.rotation().observer_count(), 0);
    rig.assert_graph_consistent();

    rig.controller.request_start();
    rig.settle();
    assert_eq!(rig.control.start_calls(), 1);
}

#[test]
fn teardown_before_activation_leaves_session_idle() {
    let rig = Rig::granted();
    rig.controller.request_teardown();
    rig.controller.activate();
    rig.settle();

    assert_eq!(rig.controller.phase(), ControllerPhase::Idle);
    assert_eq!(rig.controller.setup_result(), None);
    assert_eq!(rig.control.commits(), 0);
}

#[test]
fn dropping_the_controller_removes_every_observer() {
    let rig = Rig::granted().running();
    let Rig {
        controller,
        control,
        devices,
        ..
    } = rig;

    drop(controller);

    assert!(!control.is_running());
    assert!(control.inputs().is_empty());
    assert_eq!(control.subscriber_count(), 0);
    assert_eq!(devices.preferred_observer_count(), 0);
    assert_eq!(devices.rotation().observer_count(), 0);
}
