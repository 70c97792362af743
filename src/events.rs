//! Structured kernel events.
//!
//! The kernel reports configuration, parameter, and transport changes as
//! [`KernelEvent`] values pushed into an injected [`EventSink`]. Events are
//! emitted only from the control entry points (`configure`, `set_parameter`,
//! `set_rendering`), never from the render loop, so a sink attached to a
//! kernel driven by a real-time thread sees no per-frame traffic.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::effect::ParameterId;

// =============================================================================
// Events
// =============================================================================

/// A state change reported by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum KernelEvent {
    /// The kernel was rebuilt for a new stream format.
    Configured {
        channels: usize,
        sample_rate: f64,
        max_delay_ms: f32,
        voices: usize,
    },

    /// A parameter began moving toward a new target.
    ParameterChanged {
        id: ParameterId,
        value: f32,
        duration_frames: u32,
    },

    /// The host started or stopped rendering.
    RenderingChanged { rendering: bool },
}

/// Receiver for kernel events.
///
/// Implementations must not block: the control entry points that emit may be
/// called from the same thread that renders.
pub trait EventSink: Send {
    /// Record one event.
    fn emit(&mut self, event: KernelEvent);
}

// =============================================================================
// Shared Event Log
// =============================================================================

/// Thread-safe event buffer.
///
/// Clone one handle into the kernel and keep another on the host side; both
/// refer to the same underlying log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<KernelEvent>>>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy out the events recorded so far.
    pub fn snapshot(&self) -> Vec<KernelEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => Vec::new(),
        }
    }

    /// Remove and return all recorded events.
    pub fn drain(&self) -> Vec<KernelEvent> {
        match self.events.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => Vec::new(),
        }
    }

    /// Number of events currently recorded.
    pub fn len(&self) -> usize {
        self.events.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: KernelEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
