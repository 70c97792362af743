//! # Chorale: Real-Time Chorus Effect Kernel
//!
//! `chorale` is the DSP core of a chorus/ensemble effect: a bank of slowly
//! drifting delay taps reads a circular buffer behind the incoming signal,
//! and the modulated copies blend with the dry signal to thicken and widen
//! it. The kernel is built to sit inside a hard real-time audio callback:
//! after configuration it never allocates, blocks, or panics while
//! rendering.
//!
//! ## Architecture
//!
//! Small leaves, one orchestrator:
//!
//! - **Ramped parameters** - every control glides linearly to its target so
//!   changes never click
//! - **Oscillator bank** - up to 50 voices staggered evenly across the
//!   modulation cycle, each with a quadrature companion value for stereo
//!   widening
//! - **Delay lines** - one circular buffer per channel with 4-point cubic
//!   interpolated fractional reads
//! - **Kernel** - the per-block renderer, switching between a per-frame
//!   ramping regime and a cheaper settled regime
//!
//! ## Quick Start
//!
//! ```rust
//! use chorale::prelude::*;
//!
//! let mut kernel = ChorusKernel::new();
//! kernel
//!     .configure(KernelConfig {
//!         channels: 2,
//!         sample_rate: 48_000.0,
//!         max_frames_per_render: 512,
//!         max_delay_ms: 30.0,
//!         voices: 6,
//!     })
//!     .unwrap();
//!
//! // Thicken the signal and widen the stereo image.
//! kernel.set_parameter(ParameterId::Depth, 0.4, DEFAULT_RAMP_FRAMES);
//! kernel.set_parameter(ParameterId::Odd90, 1.0, 0);
//!
//! // Per-channel sample slices, one render call per block.
//! let left = vec![0.0_f32; 512];
//! let right = vec![0.0_f32; 512];
//! let mut out_left = vec![0.0_f32; 512];
//! let mut out_right = vec![0.0_f32; 512];
//!
//! let input: Vec<&[f32]> = vec![&left, &right];
//! let mut output: Vec<&mut [f32]> = vec![&mut out_left, &mut out_right];
//! kernel.render(0, &input, &mut output, 512);
//! ```

pub mod delay;
pub mod effect;
pub mod ensemble;
pub mod events;
pub mod kernel;
pub mod lfo;
pub mod params;

/// Prelude module for convenient imports
pub mod prelude {
    // Parameters and modulation
    pub use crate::lfo::{Lfo, Waveform, MAX_RATE_HZ, MIN_RATE_HZ};
    pub use crate::params::RampedParam;

    // Delay and tap computation
    pub use crate::delay::DelayLine;
    pub use crate::ensemble::{Ensemble, Tap, MAX_VOICES};

    // The kernel and its host-facing surface
    pub use crate::effect::{
        descriptor, descriptors, Effect, ParamDescriptor, ParamUnit, ParameterId,
        UnknownParameter, DEFAULT_MAX_DELAY_MS, DEFAULT_RAMP_FRAMES,
    };
    pub use crate::events::{EventLog, EventSink, KernelEvent};
    pub use crate::kernel::{ChorusKernel, ConfigError, KernelConfig};
}

// Re-export key types at crate root for convenience
pub use prelude::*;
