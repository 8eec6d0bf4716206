//! Strictly serialized execution context backed by a dedicated thread.
//!
//! Jobs run one at a time in submission order. The queue can be suspended
//! so that already-queued jobs wait (used while a permission prompt is
//! outstanding); suspension takes effect between jobs, never mid-job.

use std::ops::Deref;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};

use crate::models::error::CaptureError;
use crate::traits::presentation::PresentationContext;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

enum Message {
    Run(Job),
    Shutdown,
}

struct GateState {
    suspend_count: u32,
    closing: bool,
}

struct SuspendGate {
    state: Mutex<GateState>,
    resumed: Condvar,
}

impl SuspendGate {
    fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                suspend_count: 0,
                closing: false,
            }),
            resumed: Condvar::new(),
        }
    }

    fn wait_until_resumed(&self) {
        let mut state = self.state.lock();
        while state.suspend_count > 0 && !state.closing {
            self.resumed.wait(&mut state);
        }
    }
}

/// Cloneable submitting side of a [`SerialQueue`].
#[derive(Clone)]
pub struct QueueHandle {
    label: Arc<str>,
    tx: Sender<Message>,
    gate: Arc<SuspendGate>,
}

impl QueueHandle {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Enqueues `job`. Returns `false` if the queue has shut down.
    pub fn dispatch(&self, job: impl FnOnce() + Send + 'static) -> bool {
        self.tx.send(Message::Run(Box::new(job))).is_ok()
    }

    /// Holds back queued jobs until a matching [`resume`](Self::resume).
    pub fn suspend(&self) {
        self.gate.state.lock().suspend_count += 1;
        log::debug!("{} suspended", self.label);
    }

    pub fn resume(&self) {
        let mut state = self.gate.state.lock();
        if state.suspend_count == 0 {
            log::warn!("unbalanced resume on {}", self.label);
            return;
        }
        state.suspend_count -= 1;
        if state.suspend_count == 0 {
            self.gate.resumed.notify_all();
            log::debug!("{} resumed", self.label);
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.gate.state.lock().suspend_count > 0
    }

    /// Whether the calling thread is this queue's worker.
    pub fn is_current(&self) -> bool {
        thread::current().name() == Some(&*self.label)
    }

    /// Blocks until every job queued before this call has run.
    ///
    /// Returns `false` on timeout or if the queue has shut down.
    pub fn wait_until_idle(&self, timeout: Duration) -> bool {
        let (tx, rx) = bounded(1);
        if !self.dispatch(move || {
            let _ = tx.send(());
        }) {
            return false;
        }
        rx.recv_timeout(timeout).is_ok()
    }
}

impl PresentationContext for QueueHandle {
    fn execute(&self, task: Job) {
        if !self.dispatch(task) {
            log::debug!("{} is shut down; dropping presentation task", self.label);
        }
    }
}

/// Owner of a serial worker thread. Dropping it drains and joins the thread.
pub struct SerialQueue {
    handle: QueueHandle,
    thread: Mutex<Option<thread::JoinHandle<()>>>,
}

impl SerialQueue {
    pub fn new(label: &str) -> Result<Self, CaptureError> {
        let (tx, rx) = unbounded();
        let gate = Arc::new(SuspendGate::new());
        let worker_gate = Arc::clone(&gate);
        let worker_label = label.to_string();

        let thread = thread::Builder::new()
            .name(label.to_string())
            .spawn(move || run_loop(&worker_label, rx, &worker_gate))
            .map_err(|e| {
                log::error!("failed to spawn {}: {}", label, e);
                CaptureError::WorkerUnavailable
            })?;

        Ok(Self {
            handle: QueueHandle {
                label: Arc::from(label),
                tx,
                gate,
            },
            thread: Mutex::new(Some(thread)),
        })
    }

    pub fn handle(&self) -> QueueHandle {
        self.handle.clone()
    }

    /// Lifts any suspension, runs the jobs already queued, and joins the thread.
    ///
    /// Idempotent. Called from the worker itself it only signals the exit.
    pub fn shutdown(&self) {
        let Some(thread) = self.thread.lock().take() else {
            return;
        };

        {
            let mut state = self.handle.gate.state.lock();
            state.closing = true;
        }
        self.handle.gate.resumed.notify_all();
        let _ = self.handle.tx.send(Message::Shutdown);

        if self.handle.is_current() {
            return;
        }
        if thread.join().is_err() {
            log::error!("{} worker panicked during shutdown", self.handle.label);
        }
    }
}

impl Deref for SerialQueue {
    type Target = QueueHandle;

    fn deref(&self) -> &QueueHandle {
        &self.handle
    }
}

impl PresentationContext for SerialQueue {
    fn execute(&self, task: Job) {
        self.handle.execute(task);
    }
}

impl Drop for SerialQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop(label: &str, rx: Receiver<Message>, gate: &SuspendGate) {
    for message in rx.iter() {
        gate.wait_until_resumed();
        match message {
            Message::Run(job) => {
                if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                    log::error!("job on {} panicked", label);
                }
            }
            Message::Shutdown => break,
        }
    }
    log::debug!("{} exited", label);
}
