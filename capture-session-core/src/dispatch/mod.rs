pub mod event_bus;
pub mod serial_queue;
pub mod subscription;
