//! Captured GPU validation errors.
//!
//! wgpu reports validation failures asynchronously through the device's
//! uncaptured-error handler. [`GpuErrorQueue`] collects them so that
//! [`check_gpu`] can drain and log them at a point the caller chooses,
//! tagged with what the caller was doing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use super::render_context::RenderContext;

/// Errors the device reported since the last drain.
///
/// Cloning shares the queue; the device's error handler holds one clone.
#[derive(Debug, Clone, Default)]
pub struct GpuErrorQueue {
    inner: Arc<Mutex<VecDeque<String>>>,
}

impl GpuErrorQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `device`'s uncaptured errors into this queue.
    pub fn install(&self, device: &wgpu::Device) {
        let queue = self.clone();
        device.on_uncaptured_error(Box::new(move |error: wgpu::Error| {
            queue.push(error.to_string());
        }));
    }

    /// Record one error.
    pub fn push(&self, message: String) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(message);
    }

    /// Take every recorded error, oldest first.
    pub fn drain(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    /// Number of errors waiting.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no errors are waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drain the context's captured errors and log each tagged with `msg`.
///
/// Returns how many errors were reported since the previous check.
pub fn check_gpu(ctx: &RenderContext, msg: &str) -> usize {
    report(&ctx.errors, msg)
}

fn report(queue: &GpuErrorQueue, msg: &str) -> usize {
    let errors = queue.drain();
    for error in &errors {
        log::error!("GPU error at '{msg}': {error}");
    }
    errors.len()
}

/// Validation scope around a block of GPU calls.
///
/// Errors raised inside the scope are returned by [`ErrorScope::check`]
/// instead of reaching the uncaptured-error handler.
#[must_use = "an error scope must be closed with `check`"]
pub struct ErrorScope<'a> {
    device: &'a wgpu::Device,
    label: String,
}

impl<'a> ErrorScope<'a> {
    /// Open a validation scope on `device`.
    pub fn push(device: &'a wgpu::Device, label: impl Into<String>) -> Self {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        Self {
            device,
            label: label.into(),
        }
    }

    /// Close the scope, logging and returning its error if one occurred.
    pub fn check(self) -> Option<wgpu::Error> {
        let error = pollster::block_on(self.device.pop_error_scope());
        if let Some(e) = &error {
            log::error!("GPU error in '{}': {e}", self.label);
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_drains_exactly_once() {
        let queue = GpuErrorQueue::new();
        queue.push("bad bind group".to_owned());
        queue.push("bad pipeline".to_owned());
        assert_eq!(queue.len(), 2);

        assert_eq!(report(&queue, "frame"), 2);
        assert!(queue.is_empty());
        assert_eq!(report(&queue, "frame"), 0);
    }

    #[test]
    fn clones_share_storage() {
        let queue = GpuErrorQueue::new();
        let handler_side = queue.clone();
        handler_side.push("lost".to_owned());
        assert_eq!(queue.drain(), vec!["lost".to_owned()]);
    }

    #[test]
    fn handler_thread_can_push() {
        let queue = GpuErrorQueue::new();
        let remote = queue.clone();
        std::thread::spawn(move || remote.push("from device thread".to_owned()))
            .join()
            .unwrap();
        assert_eq!(queue.len(), 1);
    }
}
