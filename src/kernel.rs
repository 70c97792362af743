//! The chorus kernel.
//!
//! [`ChorusKernel`] ties the leaves together: one [`DelayLine`] per channel,
//! a bank of staggered oscillators, and the six ramped parameters. Each
//! render call picks one of two regimes. While any parameter is mid-ramp the
//! kernel re-reads every parameter per frame; once all ramps have settled it
//! samples them once for the whole block. Both regimes share the same
//! per-frame core: compute taps, read each delay line at the averaged taps,
//! write the input sample, mix wet and dry into the output.

use serde::{Deserialize, Serialize};

use crate::delay::DelayLine;
use crate::effect::{descriptor, Effect, ParameterId, DEFAULT_MAX_DELAY_MS};
use crate::ensemble::{Ensemble, MAX_VOICES};
use crate::events::{EventSink, KernelEvent};
use crate::lfo::Waveform;
use crate::params::RampedParam;

// =============================================================================
// Configuration
// =============================================================================

/// Stream format and sizing negotiated with the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Number of audio channels; each gets its own delay line.
    pub channels: usize,
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Largest frame count a single render call may request.
    pub max_frames_per_render: u32,
    /// Widest nominal delay the kernel must honor, in milliseconds. The
    /// delay lines allocate twice this span so modulation can swing the tap
    /// on both sides of the nominal position.
    pub max_delay_ms: f32,
    /// Number of modulation voices, `1..=MAX_VOICES`.
    pub voices: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 44_100.0,
            max_frames_per_render: 512,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            voices: 10,
        }
    }
}

impl KernelConfig {
    /// Check every field, reporting the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels == 0 {
            return Err(ConfigError::NoChannels);
        }
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(ConfigError::InvalidSampleRate);
        }
        if self.max_frames_per_render == 0 {
            return Err(ConfigError::ZeroMaxFrames);
        }
        if !self.max_delay_ms.is_finite() || self.max_delay_ms <= 0.0 {
            return Err(ConfigError::InvalidMaxDelay);
        }
        if self.voices == 0 {
            return Err(ConfigError::NoVoices);
        }
        if self.voices > MAX_VOICES {
            return Err(ConfigError::TooManyVoices {
                requested: self.voices,
                max: MAX_VOICES,
            });
        }
        Ok(())
    }
}

/// Error types for kernel configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    NoChannels,
    InvalidSampleRate,
    ZeroMaxFrames,
    InvalidMaxDelay,
    NoVoices,
    TooManyVoices { requested: usize, max: usize },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoChannels => write!(f, "Channel count must be at least 1"),
            ConfigError::InvalidSampleRate => {
                write!(f, "Sample rate must be positive and finite")
            }
            ConfigError::ZeroMaxFrames => {
                write!(f, "Maximum frames per render must be at least 1")
            }
            ConfigError::InvalidMaxDelay => {
                write!(f, "Maximum delay must be positive and finite")
            }
            ConfigError::NoVoices => write!(f, "Voice count must be at least 1"),
            ConfigError::TooManyVoices { requested, max } => {
                write!(f, "Voice count {} exceeds the limit of {}", requested, max)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// Kernel
// =============================================================================

/// The modulated-delay effect core.
///
/// Create one with [`ChorusKernel::new`], then [`configure`](Self::configure)
/// it for the host's stream format before rendering. `configure` is the only
/// entry point that allocates; `render`, the parameter calls, and
/// `set_rendering` stay allocation-free so the kernel can live on a
/// real-time audio thread.
pub struct ChorusKernel {
    config: KernelConfig,
    samples_per_ms: f32,
    waveform: Waveform,
    rate: RampedParam,
    depth: RampedParam,
    delay: RampedParam,
    dry_mix: RampedParam,
    wet_mix: RampedParam,
    odd90: RampedParam,
    ensemble: Ensemble,
    lines: Vec<DelayLine>,
    sink: Option<Box<dyn EventSink>>,
}

impl ChorusKernel {
    /// Build a kernel with the default stream format. The result renders
    /// immediately; call [`configure`](Self::configure) once the host's
    /// actual format is known.
    pub fn new() -> Self {
        let config = KernelConfig::default();
        let rate = Self::param_for(ParameterId::Rate);
        let mut kernel = Self {
            config,
            samples_per_ms: 0.0,
            waveform: Waveform::Sinusoid,
            ensemble: Ensemble::new(
                config.voices,
                config.sample_rate,
                rate.value(),
                Waveform::Sinusoid,
            ),
            rate,
            depth: Self::param_for(ParameterId::Depth),
            delay: Self::param_for(ParameterId::Delay),
            dry_mix: Self::param_for(ParameterId::DryMix),
            wet_mix: Self::param_for(ParameterId::WetMix),
            odd90: RampedParam::toggle(false),
            lines: Vec::new(),
            sink: None,
        };
        kernel.apply(config);
        kernel
    }

    fn param_for(id: ParameterId) -> RampedParam {
        let d = descriptor(id);
        RampedParam::bounded(d.default, d.min, d.max)
    }

    /// Rebuild the kernel for a new stream format.
    ///
    /// Validates every field before touching any state; on error the
    /// previous configuration keeps rendering. On success all in-flight
    /// ramps stop, the oscillators restart at their staggered phases, and
    /// the delay lines come back cleared. Must only be called between
    /// render calls.
    pub fn configure(&mut self, config: KernelConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.apply(config);
        self.emit(KernelEvent::Configured {
            channels: config.channels,
            sample_rate: config.sample_rate,
            max_delay_ms: config.max_delay_ms,
            voices: config.voices,
        });
        Ok(())
    }

    fn apply(&mut self, config: KernelConfig) {
        self.config = config;
        self.samples_per_ms = (config.sample_rate / 1000.0) as f32;
        self.stop_all_ramps();
        self.delay.set_bounds(0.0, config.max_delay_ms);
        self.ensemble = Ensemble::new(
            config.voices,
            config.sample_rate,
            self.rate.value(),
            self.waveform,
        );
        let capacity = DelayLine::capacity_for(config.max_delay_ms, self.samples_per_ms);
        self.lines = (0..config.channels)
            .map(|_| DelayLine::new(capacity))
            .collect();
    }

    /// The active configuration.
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Samples per millisecond at the configured sample rate.
    pub fn samples_per_ms(&self) -> f32 {
        self.samples_per_ms
    }

    /// The oscillator bank, for inspection.
    pub fn ensemble(&self) -> &Ensemble {
        &self.ensemble
    }

    /// The active modulation waveform.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Choose the modulation waveform for every voice. Survives
    /// reconfiguration.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
        self.ensemble.set_waveform(waveform);
    }

    /// Attach a sink for structured events, or detach with `None`.
    pub fn set_event_sink(&mut self, sink: Option<Box<dyn EventSink>>) {
        self.sink = sink;
    }

    /// Change a parameter, gliding over `duration_frames` samples (zero
    /// snaps immediately). Hosts without an opinion on ramp length pass
    /// [`DEFAULT_RAMP_FRAMES`](crate::effect::DEFAULT_RAMP_FRAMES). Values
    /// outside the parameter's bounds are clamped. A rate change also
    /// starts the same glide on every oscillator, so the audible modulation
    /// speed never jumps.
    pub fn set_parameter(&mut self, id: ParameterId, value: f32, duration_frames: u32) {
        self.param_mut(id).set(value, duration_frames);
        if id == ParameterId::Rate {
            let hz = self.rate.target();
            self.ensemble.set_frequency(hz, duration_frames);
        }
        let value = self.param(id).target();
        self.emit(KernelEvent::ParameterChanged {
            id,
            value,
            duration_frames,
        });
    }

    /// Current value of a parameter, mid-ramp values included.
    pub fn get_parameter(&self, id: ParameterId) -> f32 {
        self.param(id).value()
    }

    /// True while any parameter still has ramp steps pending.
    pub fn is_ramping(&self) -> bool {
        ParameterId::ALL.iter().any(|&id| self.param(id).is_ramping())
    }

    /// Host notification that rendering is starting or stopping. Stopping
    /// snaps every in-flight ramp to its target, the oscillators' frequency
    /// glides included, so no stale trajectory resumes on restart.
    pub fn set_rendering(&mut self, is_rendering: bool) {
        if !is_rendering {
            self.stop_all_ramps();
        }
        self.emit(KernelEvent::RenderingChanged {
            rendering: is_rendering,
        });
    }

    /// Render `frames` samples from `input` into `output`, one slice per
    /// channel. The kernel drives a single output bus; a nonzero
    /// `output_bus`, a frame count above the configured maximum, or slices
    /// shorter than `frames` are caller errors: asserted in debug builds,
    /// clamped to a best-effort render in release builds.
    pub fn render(
        &mut self,
        output_bus: usize,
        input: &[&[f32]],
        output: &mut [&mut [f32]],
        frames: u32,
    ) {
        debug_assert_eq!(output_bus, 0, "single-bus kernel, got bus {}", output_bus);
        debug_assert!(frames <= self.config.max_frames_per_render);
        debug_assert_eq!(input.len(), self.config.channels);
        debug_assert_eq!(output.len(), self.config.channels);

        let channels = self.lines.len().min(input.len()).min(output.len());
        let mut frames = frames.min(self.config.max_frames_per_render) as usize;
        for channel in 0..channels {
            frames = frames.min(input[channel].len()).min(output[channel].len());
        }

        if self.is_ramping() {
            self.render_ramping(input, output, channels, frames);
        } else {
            self.render_steady(input, output, channels, frames);
        }
    }

    /// Per-frame regime: every ramped parameter advances one step per
    /// sample, so a mid-block ramp glides instead of stepping at block
    /// boundaries.
    fn render_ramping(
        &mut self,
        input: &[&[f32]],
        output: &mut [&mut [f32]],
        channels: usize,
        frames: usize,
    ) {
        let odd90 = self.odd90.is_on();
        for frame in 0..frames {
            // The oscillators carry their own frequency glide; advancing
            // the visible rate parameter keeps the two in step.
            self.rate.frame_value();
            let nominal_ms = self.delay.frame_value();
            let depth = self.depth.frame_value();
            let wet = self.wet_mix.frame_value();
            let dry = self.dry_mix.frame_value();
            let displacement_ms = (self.config.max_delay_ms - nominal_ms) * depth;
            self.ensemble
                .compute_taps(nominal_ms, displacement_ms, odd90, self.samples_per_ms);
            self.write_frame(input, output, channels, frame, wet, dry);
        }
    }

    /// Block regime: parameters are settled, so they are sampled once. The
    /// oscillators still advance every frame.
    fn render_steady(
        &mut self,
        input: &[&[f32]],
        output: &mut [&mut [f32]],
        channels: usize,
        frames: usize,
    ) {
        let odd90 = self.odd90.is_on();
        let nominal_ms = self.delay.value();
        let depth = self.depth.normalized();
        let wet = self.wet_mix.normalized();
        let dry = self.dry_mix.normalized();
        let displacement_ms = (self.config.max_delay_ms - nominal_ms) * depth;
        for frame in 0..frames {
            self.ensemble
                .compute_taps(nominal_ms, displacement_ms, odd90, self.samples_per_ms);
            self.write_frame(input, output, channels, frame, wet, dry);
        }
    }

    fn write_frame(
        &mut self,
        input: &[&[f32]],
        output: &mut [&mut [f32]],
        channels: usize,
        frame: usize,
        wet: f32,
        dry: f32,
    ) {
        for channel in 0..channels {
            let sample = input[channel][frame];
            let delayed = self.ensemble.averaged_read(&self.lines[channel], channel);
            self.lines[channel].write(sample);
            output[channel][frame] = wet * delayed + dry * sample;
        }
    }

    fn stop_all_ramps(&mut self) {
        self.rate.stop_ramping();
        self.depth.stop_ramping();
        self.delay.stop_ramping();
        self.dry_mix.stop_ramping();
        self.wet_mix.stop_ramping();
        self.odd90.stop_ramping();
        self.ensemble.stop_ramping();
    }

    fn emit(&mut self, event: KernelEvent) {
        if let Some(sink) = self.sink.as_mut() {
            sink.emit(event);
        }
    }

    fn param(&self, id: ParameterId) -> &RampedParam {
        match id {
            ParameterId::Rate => &self.rate,
            ParameterId::Depth => &self.depth,
            ParameterId::Delay => &self.delay,
            ParameterId::DryMix => &self.dry_mix,
            ParameterId::WetMix => &self.wet_mix,
            ParameterId::Odd90 => &self.odd90,
        }
    }

    fn param_mut(&mut self, id: ParameterId) -> &mut RampedParam {
        match id {
            ParameterId::Rate => &mut self.rate,
            ParameterId::Depth => &mut self.depth,
            ParameterId::Delay => &mut self.delay,
            ParameterId::DryMix => &mut self.dry_mix,
            ParameterId::WetMix => &mut self.wet_mix,
            ParameterId::Odd90 => &mut self.odd90,
        }
    }
}

impl Default for ChorusKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for ChorusKernel {
    fn render(
        &mut self,
        output_bus: usize,
        input: &[&[f32]],
        output: &mut [&mut [f32]],
        frames: u32,
    ) {
        ChorusKernel::render(self, output_bus, input, output, frames);
    }

    fn get_parameter(&self, id: ParameterId) -> f32 {
        ChorusKernel::get_parameter(self, id)
    }

    fn set_parameter(&mut self, id: ParameterId, value: f32, duration_frames: u32) {
        ChorusKernel::set_parameter(self, id, value, duration_frames);
    }

    fn set_rendering(&mut self, is_rendering: bool) {
        ChorusKernel::set_rendering(self, is_rendering);
    }
}

// =============================================================================
// Tests
// =============================================================================
