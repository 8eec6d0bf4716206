use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::dispatch::subscription::Subscription;
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::device_provider::RotationCoordinator;
use crate::traits::presentation::{DisplaySurface, PresentationContext};

struct Pending {
    latest: Option<f64>,
    scheduled: bool,
    active: bool,
}

/// Coalesces angle updates so only the newest reaches the presentation context.
struct AnglePublisher {
    pending: Mutex<Pending>,
    surface: Option<Weak<dyn DisplaySurface>>,
    delegate: Arc<dyn CaptureDelegate>,
    presenter: Arc<dyn PresentationContext>,
}

impl AnglePublisher {
    fn publish(self: &Arc<Self>, angle: f64) {
        {
            let mut pending = self.pending.lock();
            if !pending.active {
                return;
            }
            pending.latest = Some(angle);
            if pending.scheduled {
                return;
            }
            pending.scheduled = true;
        }

        let publisher = Arc::clone(self);
        self.presenter.execute(Box::new(move || publisher.flush()));
    }

    fn flush(&self) {
        let angle = {
            let mut pending = self.pending.lock();
            pending.scheduled = false;
            if !pending.active {
                return;
            }
            pending.latest.take()
        };
        let Some(angle) = angle else {
            return;
        };

        if let Some(surface) = self.surface.as_ref().and_then(Weak::upgrade) {
            surface.set_rotation_angle(angle);
        }
        self.delegate.on_rotation_angle_changed(angle);
    }

    fn deactivate(&self) {
        let mut pending = self.pending.lock();
        pending.active = false;
        pending.latest = None;
    }
}

/// Keeps the display surface's rotation in step with the video device.
///
/// Holds the surface weakly and cancels its observation explicitly on
/// [`detach`](Self::detach).
pub struct OrientationCoordinator {
    coordinator: Option<Box<dyn RotationCoordinator>>,
    observation: Option<Subscription>,
    publisher: Option<Arc<AnglePublisher>>,
}

impl OrientationCoordinator {
    pub fn new() -> Self {
        Self {
            coordinator: None,
            observation: None,
            publisher: None,
        }
    }

    /// Publishes the current angle and starts observing changes.
    /// Replaces any previous attachment.
    pub fn attach(
        &mut self,
        coordinator: Box<dyn RotationCoordinator>,
        surface: Option<Weak<dyn DisplaySurface>>,
        delegate: Arc<dyn CaptureDelegate>,
        presenter: Arc<dyn PresentationContext>,
    ) {
        self.detach();

        let publisher = Arc::new(AnglePublisher {
            pending: Mutex::new(Pending {
                latest: None,
                scheduled: false,
                active: true,
            }),
            surface,
            delegate,
            presenter,
        });

        if let Some(surface) = publisher.surface.clone() {
            publisher.presenter.execute(Box::new(move || {
                if let Some(surface) = surface.upgrade() {
                    surface.set_video_mirrored(false);
                }
            }));
        }

        let initial = coordinator.horizon_level_preview_angle();
        log::debug!("initial preview rotation {}°", initial);
        publisher.publish(initial);

        let observer = Arc::downgrade(&publisher);
        self.observation = Some(coordinator.observe(Arc::new(move |angle| {
            if let Some(publisher) = observer.upgrade() {
                publisher.publish(angle);
            }
        })));
        self.coordinator = Some(coordinator);
        self.publisher = Some(publisher);
    }

    /// Cancels the observation; angle updates still queued are discarded.
    pub fn detach(&mut self) {
        if let Some(mut observation) = self.observation.take() {
            observation.cancel();
        }
        if let Some(publisher) = self.publisher.take() {
            publisher.deactivate();
        }
        self.coordinator = None;
    }

    pub fn is_attached(&self) -> bool {
        self.coordinator.is_some()
    }

    pub fn current_angle(&self) -> Option<f64> {
        self.coordinator
            .as_ref()
            .map(|c| c.horizon_level_preview_angle())
    }
}

impl Default for OrientationCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for OrientationCoordinator {
    fn drop(&mut self) {
        self.detach();
    }
}
