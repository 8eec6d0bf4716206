//! Capture session lifecycle controller.
//!
//! Orchestrates permission, device resolution, graph configuration,
//! start/stop and interruption recovery on one serialized session worker:
//!
//! ```text
//! activate ─→ PermissionGate (suspends worker while prompting)
//!                 ↓
//!          [session worker] configure ─→ DeviceResolver ─→ SessionGraph
//!                 ↓                                           ↓
//!          OrientationCoordinator                      EventBus (backend)
//!                                                             ↓
//!          [session worker] InterruptionMonitor ←─────────────┘
//!                 ↓
//!          [presentation context] CaptureDelegate / DisplaySurface
//! ```
//!
//! Every inbound request only enqueues work and returns. Graph state lives
//! in [`WorkerState`] and is touched exclusively by jobs on the worker; the
//! UI side reads a published snapshot and receives delegate callbacks on
//! its presentation context.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dispatch::serial_queue::{QueueHandle, SerialQueue};
use crate::dispatch::subscription::Subscription;
use crate::models::authorization::AuthorizationState;
use crate::models::config::SessionConfiguration;
use crate::models::device::{DeviceHandle, ExposureMode, FocusMode, FocusPoint, FocusSettings, MediaType};
use crate::models::error::CaptureError;
use crate::models::events::SessionEvent;
use crate::models::state::{ControllerPhase, RunningState, SetupResult};
use crate::traits::authorizer::CaptureAuthorizer;
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::capture_session::CaptureSession;
use crate::traits::device_provider::DeviceProvider;
use crate::traits::preferences::PreferenceStore;
use crate::traits::presentation::{DisplaySurface, PresentationContext};

use super::graph::{Configuration, SessionGraph};
use super::monitor::{InterruptionMonitor, Reaction, Recovery};
use super::orientation::OrientationCoordinator;
use super::permission::PermissionGate;
use super::resolver::DeviceResolver;

/// Read-only capability identifying a controller's session.
///
/// The UI side holds this instead of any reference to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(Uuid);

impl SessionToken {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Everything a controller talks to.
pub struct Collaborators<S: CaptureSession, D: DeviceProvider> {
    pub session: S,
    pub devices: Arc<D>,
    pub authorizer: Arc<dyn CaptureAuthorizer>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub delegate: Arc<dyn CaptureDelegate>,
    /// UI-responsive context for delegate callbacks and display updates.
    pub presenter: Arc<dyn PresentationContext>,
    pub display_surface: Option<Weak<dyn DisplaySurface>>,
}

/// State published for readers off the worker.
#[derive(Debug, Clone, Copy)]
struct Snapshot {
    phase: ControllerPhase,
    setup_result: Option<SetupResult>,
    running_state: RunningState,
    authorization: AuthorizationState,
    resume_visible: bool,
    degraded_visible: bool,
}

/// Owned by the session worker; never locked from any other thread.
struct WorkerState<S: CaptureSession> {
    graph: SessionGraph<S>,
    setup_result: Option<SetupResult>,
    /// Whether the last start left the graph running (tracked, not queried).
    session_running: bool,
    running_state: RunningState,
    monitor: InterruptionMonitor,
    orientation: OrientationCoordinator,
    preferred_device_observation: Option<Subscription>,
    torn_down: bool,
}

struct Core<S: CaptureSession, D: DeviceProvider> {
    worker: QueueHandle,
    state: Mutex<WorkerState<S>>,
    snapshot: Mutex<Snapshot>,
    permission: Arc<PermissionGate>,
    resolver: DeviceResolver<D>,
    devices: Arc<D>,
    delegate: Arc<dyn CaptureDelegate>,
    presenter: Arc<dyn PresentationContext>,
    display_surface: Option<Weak<dyn DisplaySurface>>,
    config: SessionConfiguration,
    activated: AtomicBool,
    token: SessionToken,
}

/// Lifecycle controller for one capture session.
///
/// Dropping the controller tears the session down and joins its worker.
pub struct CaptureController<S: CaptureSession, D: DeviceProvider> {
    core: Arc<Core<S, D>>,
    worker: SerialQueue,
}

impl<S: CaptureSession, D: DeviceProvider> CaptureController<S, D> {
    pub fn new(
        collaborators: Collaborators<S, D>,
        config: SessionConfiguration,
    ) -> Result<Self, CaptureError> {
        config.validate()?;
        let worker = SerialQueue::new(&config.worker_label)?;

        let Collaborators {
            session,
            devices,
            authorizer,
            preferences,
            delegate,
            presenter,
            display_surface,
        } = collaborators;

        let token = SessionToken::new();
        let core = Arc::new(Core {
            worker: worker.handle(),
            state: Mutex::new(WorkerState {
                graph: SessionGraph::new(session),
                setup_result: None,
                session_running: false,
                running_state: RunningState::Stopped,
                monitor: InterruptionMonitor::new(&config.restart_policy),
                orientation: OrientationCoordinator::new(),
                preferred_device_observation: None,
                torn_down: false,
            }),
            snapshot: Mutex::new(Snapshot {
                phase: ControllerPhase::Idle,
                setup_result: None,
                running_state: RunningState::Stopped,
                authorization: AuthorizationState::Undetermined,
                resume_visible: false,
                degraded_visible: false,
            }),
            permission: PermissionGate::new(authorizer),
            resolver: DeviceResolver::new(Arc::clone(&devices), preferences),
            devices,
            delegate,
            presenter,
            display_surface,
            config,
            activated: AtomicBool::new(false),
            token,
        });

        log::debug!("created capture controller {}", token);
        Ok(Self { core, worker })
    }

    /// Resolves permission and queues session configuration. Only the first
    /// call has an effect.
    pub fn activate(&self) {
        if self.core.activated.swap(true, Ordering::SeqCst) {
            log::warn!("controller {} already activated", self.core.token);
            return;
        }
        self.core.activate();
    }

    pub fn request_start(&self) {
        self.core.enqueue(|core, st| core.start_session(st));
    }

    pub fn request_stop(&self) {
        self.core.enqueue(|core, st| core.stop_session(st));
    }

    /// User-initiated restart after an interruption or runtime error.
    pub fn request_resume(&self) {
        self.core.enqueue(|core, st| core.resume_session(st));
    }

    /// Focus and expose at `point`. One-shot requests also enable
    /// subject-area monitoring so the device refocuses when the scene changes.
    pub fn request_focus_and_expose(&self, point: FocusPoint, continuous: bool) {
        let (focus, exposure, monitor) = if continuous {
            (FocusMode::ContinuousAutoFocus, ExposureMode::ContinuousAutoExposure, false)
        } else {
            (FocusMode::AutoFocus, ExposureMode::AutoExpose, true)
        };
        self.core
            .enqueue(move |core, st| core.focus(st, point, focus, exposure, monitor));
    }

    /// Stops the session, detaches all inputs and removes all observers.
    /// Safe to call repeatedly.
    pub fn request_teardown(&self) {
        self.core.enqueue(|core, st| core.teardown(st));
    }

    pub fn set_user_preferred_device(&self, device: DeviceHandle) {
        self.core.enqueue(move |core, st| {
            if st.torn_down {
                return;
            }
            core.resolver.persist_preference(&device);
            core.switch_video_device(st, device);
        });
    }

    /// Blocks until all work queued so far has run on the session worker.
    pub fn wait_until_idle(&self, timeout: Duration) -> bool {
        self.worker.wait_until_idle(timeout)
    }

    pub fn phase(&self) -> ControllerPhase {
        self.core.snapshot.lock().phase
    }

    pub fn setup_result(&self) -> Option<SetupResult> {
        self.core.snapshot.lock().setup_result
    }

    pub fn running_state(&self) -> RunningState {
        self.core.snapshot.lock().running_state
    }

    pub fn authorization(&self) -> AuthorizationState {
        self.core.snapshot.lock().authorization
    }

    pub fn resume_affordance_visible(&self) -> bool {
        self.core.snapshot.lock().resume_visible
    }

    pub fn degraded_availability_visible(&self) -> bool {
        self.core.snapshot.lock().degraded_visible
    }

    pub fn session_token(&self) -> SessionToken {
        self.core.token
    }

    pub fn configuration(&self) -> &SessionConfiguration {
        &self.core.config
    }
}

impl<S: CaptureSession, D: DeviceProvider> Drop for CaptureController<S, D> {
    fn drop(&mut self) {
        self.core.enqueue(|core, st| core.teardown(st));
        self.worker.shutdown();
    }
}

impl<S: CaptureSession, D: DeviceProvider> Core<S, D> {
    fn enqueue(
        self: &Arc<Self>,
        job: impl FnOnce(&Arc<Self>, &mut WorkerState<S>) + Send + 'static,
    ) {
        let core = Arc::clone(self);
        let queued = self.worker.dispatch(move || {
            let mut state = core.state.lock();
            job(&core, &mut state);
        });
        if !queued {
            log::warn!("session worker is shut down; dropping request");
        }
    }

    fn present(&self, callback: impl FnOnce(&dyn CaptureDelegate) + Send + 'static) {
        let delegate = Arc::clone(&self.delegate);
        self.presenter
            .execute(Box::new(move || callback(delegate.as_ref())));
    }

    fn update_snapshot(&self, update: impl FnOnce(&mut Snapshot)) {
        update(&mut self.snapshot.lock());
    }

    // --- Setup ---

    fn activate(self: &Arc<Self>) {
        if let Some(surface) = self.display_surface.clone() {
            let token = self.token;
            self.presenter.execute(Box::new(move || {
                if let Some(surface) = surface.upgrade() {
                    surface.bind_session(token);
                }
            }));
        }

        let authorization = self.permission.check_authorization(&self.worker);
        self.update_snapshot(|s| {
            s.authorization = authorization;
            if !authorization.is_resolved() {
                s.phase = ControllerPhase::ResolvingPermission;
            }
        });

        self.enqueue(|core, st| core.configure_session(st));
    }

    fn configure_session(self: &Arc<Self>, st: &mut WorkerState<S>) {
        if st.torn_down {
            log::debug!("skipping configuration; controller torn down");
            return;
        }
        if st.setup_result.is_some() {
            return;
        }

        let authorization = self.permission.resolved();
        self.update_snapshot(|s| s.authorization = authorization);
        match authorization {
            AuthorizationState::Granted => {}
            AuthorizationState::Denied => {
                log::warn!("capture access denied; session will not be configured");
                self.finish_setup(st, SetupResult::NotAuthorized);
                return;
            }
            AuthorizationState::Undetermined => {
                log::warn!("permission unresolved at configuration time; skipping");
                return;
            }
        }

        self.update_snapshot(|s| s.phase = ControllerPhase::Configuring);
        let result = self.build_graph(st);
        self.finish_setup(st, result);

        if result.is_success() {
            self.observe_preferred_device(st);
            self.attach_orientation(st);
        }
    }

    fn build_graph(&self, st: &mut WorkerState<S>) -> SetupResult {
        let mut configuration = st.graph.begin_configuration();
        configuration.set_preset(self.config.preset);

        let Some(video_device) = self.resolver.resolve_video_device() else {
            log::error!("default video device is unavailable");
            return SetupResult::ConfigurationFailed;
        };

        let video_input = match self.devices.open_input(&video_device) {
            Ok(input) => input,
            Err(e) => {
                log::error!("couldn't create video device input: {}", e);
                return SetupResult::ConfigurationFailed;
            }
        };

        if !configuration.add_input(video_input) {
            log::error!("couldn't add video device input to the session");
            return SetupResult::ConfigurationFailed;
        }

        if self.config.enable_audio {
            self.attach_audio(&mut configuration);
        }

        configuration.commit();
        log::info!("capture session configured with {}", video_device.name);
        SetupResult::Success
    }

    fn attach_audio(&self, configuration: &mut Configuration<'_, S>) {
        let Some(device) = self.resolver.resolve_audio_device() else {
            log::warn!("no audio device available; capturing video only");
            return;
        };
        match self.devices.open_input(&device) {
            Ok(input) => {
                if !configuration.add_input(input) {
                    log::warn!("could not add audio device input to the session");
                }
            }
            Err(e) => log::warn!("could not create audio device input: {}", e),
        }
    }

    fn finish_setup(&self, st: &mut WorkerState<S>, result: SetupResult) {
        st.setup_result = Some(result);
        let phase = match result {
            SetupResult::Success => ControllerPhase::Ready,
            SetupResult::NotAuthorized => ControllerPhase::AuthDenied,
            SetupResult::ConfigurationFailed => ControllerPhase::ConfigFailed,
        };
        self.update_snapshot(|s| {
            s.setup_result = Some(result);
            s.phase = phase;
        });
        log::info!("session setup finished: {:?}", result);
        self.present(move |d| d.on_setup_result(result));
    }

    fn observe_preferred_device(self: &Arc<Self>, st: &mut WorkerState<S>) {
        let weak = Arc::downgrade(self);
        let subscription = self.resolver.on_preferred_device_changed(move |device| {
            if let Some(core) = weak.upgrade() {
                core.enqueue(move |core, st| core.switch_video_device(st, device));
            }
        });
        st.preferred_device_observation = Some(subscription);
    }

    fn attach_orientation(&self, st: &mut WorkerState<S>) {
        let Some(input) = st.graph.video_input() else {
            return;
        };
        let coordinator = self.devices.rotation_coordinator(&input.device);
        st.orientation.attach(
            coordinator,
            self.display_surface.clone(),
            Arc::clone(&self.delegate),
            Arc::clone(&self.presenter),
        );
    }

    // --- Running ---

    fn start_session(self: &Arc<Self>, st: &mut WorkerState<S>) {
        if st.torn_down {
            log::warn!("start requested after teardown");
            return;
        }
        match st.setup_result {
            Some(SetupResult::Success) => {}
            Some(result) => {
                log::debug!("not starting; setup result is {:?}", result);
                self.present(move |d| d.on_setup_result(result));
                return;
            }
            None => {
                log::warn!("start requested before session setup");
                return;
            }
        }

        self.add_observers(st);
        if let Err(e) = st.graph.start() {
            log::error!("failed to start capture session: {}", e);
        }
        st.session_running = st.graph.is_running();

        let reaction = if st.session_running {
            st.monitor.resumed()
        } else {
            Reaction::default()
        };
        self.settle(st, reaction);
    }

    fn stop_session(&self, st: &mut WorkerState<S>) {
        if st.torn_down || st.setup_result != Some(SetupResult::Success) {
            return;
        }
        st.graph.stop();
        st.session_running = st.graph.is_running();
        st.monitor.unsubscribe();
        let reaction = st.monitor.reset();
        self.settle(st, reaction);
    }

    fn resume_session(&self, st: &mut WorkerState<S>) {
        if st.torn_down || st.setup_result != Some(SetupResult::Success) {
            return;
        }
        if let Err(e) = st.graph.start() {
            log::warn!("resume failed: {}", e);
        }
        st.session_running = st.graph.is_running();

        let reaction = if st.session_running {
            log::info!("capture session resumed");
            st.monitor.resumed()
        } else {
            log::warn!("unable to resume capture session");
            self.present(|d| d.on_resume_failed());
            Reaction::default()
        };
        self.settle(st, reaction);
    }

    fn add_observers(self: &Arc<Self>, st: &mut WorkerState<S>) {
        let weak = Arc::downgrade(self);
        let bus = st.graph.session().events();
        st.monitor.subscribe(&bus, move |event| {
            if let Some(core) = weak.upgrade() {
                let event = event.clone();
                core.enqueue(move |core, st| core.handle_event(st, event));
            }
        });
    }

    fn handle_event(&self, st: &mut WorkerState<S>, event: SessionEvent) {
        if st.torn_down || !st.monitor.is_subscribed() {
            log::debug!("dropping {:?}; observers removed", event);
            return;
        }

        let mut reaction = st.monitor.handle(&event, st.session_running, Instant::now());
        match reaction.recovery {
            Recovery::None => {}
            Recovery::Refocus => self.focus(
                st,
                FocusPoint::CENTER,
                FocusMode::ContinuousAutoFocus,
                ExposureMode::ContinuousAutoExposure,
                false,
            ),
            Recovery::Restart => {
                if let Err(e) = st.graph.start() {
                    log::error!("automatic restart failed: {}", e);
                }
                if !st.graph.is_running() {
                    reaction = reaction.merge(st.monitor.restart_failed());
                }
            }
        }
        if matches!(
            event,
            SessionEvent::RuntimeError(_) | SessionEvent::InterruptionEnded
        ) {
            st.session_running = st.graph.is_running();
        }
        self.settle(st, reaction);
    }

    fn focus(
        &self,
        st: &mut WorkerState<S>,
        point: FocusPoint,
        focus_mode: FocusMode,
        exposure_mode: ExposureMode,
        monitor_subject_area_change: bool,
    ) {
        if st.torn_down {
            return;
        }
        let Some(input) = st.graph.video_input() else {
            log::debug!("no video input to focus");
            return;
        };
        let settings = FocusSettings::for_device(
            &input.device,
            point,
            focus_mode,
            exposure_mode,
            monitor_subject_area_change,
        );
        if let Err(e) = self.devices.apply_focus(&input.device, &settings) {
            log::warn!("could not lock device for configuration: {}", e);
        }
    }

    /// Presents affordance changes, then republishes the derived running state.
    fn settle(&self, st: &mut WorkerState<S>, reaction: Reaction) {
        if let Some(visible) = reaction.resume_affordance {
            self.present(move |d| d.on_resume_affordance(visible));
        }
        if let Some(visible) = reaction.degraded_availability {
            self.present(move |d| d.on_degraded_availability(visible));
        }

        let running_state = st.monitor.running_state(st.session_running);
        let changed = running_state != st.running_state;
        st.running_state = running_state;
        self.update_snapshot(|s| {
            s.running_state = running_state;
            s.resume_visible = st.monitor.resume_visible();
            s.degraded_visible = st.monitor.degraded_visible();
        });

        if changed {
            log::debug!("running state → {:?}", running_state);
            self.present(move |d| d.on_running_state_changed(running_state));
        }
    }

    // --- Device changes ---

    fn switch_video_device(&self, st: &mut WorkerState<S>, device: DeviceHandle) {
        if st.torn_down || st.setup_result != Some(SetupResult::Success) {
            return;
        }
        if !device.is_video() {
            log::warn!("ignoring non-video preferred device {}", device.id);
            return;
        }
        if st.graph.video_input().is_some_and(|i| i.device.id == device.id) {
            log::debug!("already using video device {}", device.id);
            return;
        }

        let new_input = match self.devices.open_input(&device) {
            Ok(input) => input,
            Err(e) => {
                log::warn!("couldn't open preferred device {}: {}", device.id, e);
                return;
            }
        };

        st.orientation.detach();
        let attached = {
            let mut configuration = st.graph.begin_configuration();
            let previous = configuration.remove_input(MediaType::Video);
            if configuration.add_input(new_input) {
                log::info!("switched video device to {}", device.name);
                true
            } else {
                log::warn!("session rejected {}; restoring previous input", device.id);
                previous.is_some_and(|previous| configuration.add_input(previous))
            }
        };

        if attached {
            self.attach_orientation(st);
        } else {
            log::error!("no video input attached after device change");
            self.degrade_setup(st);
        }
    }

    fn degrade_setup(&self, st: &mut WorkerState<S>) {
        self.finish_setup(st, SetupResult::ConfigurationFailed);
        st.graph.stop();
        st.session_running = false;
        st.monitor.unsubscribe();
        if let Some(mut observation) = st.preferred_device_observation.take() {
            observation.cancel();
        }
        let reaction = st.monitor.reset();
        self.settle(st, reaction);
    }

    // --- Teardown ---

    fn teardown(&self, st: &mut WorkerState<S>) {
        if st.torn_down {
            log::debug!("teardown requested; already idle");
            return;
        }
        st.torn_down = true;

        st.graph.stop();
        st.session_running = false;
        st.monitor.unsubscribe();
        if let Some(mut observation) = st.preferred_device_observation.take() {
            observation.cancel();
        }
        st.orientation.detach();

        if st.graph.has_inputs() {
            let mut configuration = st.graph.begin_configuration();
            configuration.remove_input(MediaType::Video);
            configuration.remove_input(MediaType::Audio);
        }

        let reaction = st.monitor.reset();
        self.settle(st, reaction);
        self.update_snapshot(|s| s.phase = ControllerPhase::Idle);
        log::info!("capture session {} torn down", self.token);
    }
}
