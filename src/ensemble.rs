//! Ensemble Tap Bank
//!
//! One [`Lfo`] per voice, each started at an evenly staggered phase, turns
//! the nominal delay and modulation depth into concrete read offsets
//! ("taps") once per frame. A single voice gives the classic chorus; more
//! voices average more independently phased taps into a denser, smoother
//! ensemble texture at proportional compute cost. One code path serves
//! both: a voice count of one simply collapses the average.

use crate::delay::DelayLine;
use crate::lfo::{Lfo, Waveform};

/// Upper bound on ensemble voices accepted at configuration time.
pub const MAX_VOICES: usize = 50;

/// Per-voice read offsets for one frame, in samples.
///
/// Even-indexed channels always read `even`. Odd-indexed channels read
/// `odd`, which tracks the quadrature oscillator value when the odd90
/// stereo-widening mode is on and equals `even` otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tap {
    pub even: f32,
    pub odd: f32,
}

impl Tap {
    /// Offset for a channel, selected by channel parity.
    pub fn for_channel(&self, channel: usize) -> f32 {
        if channel % 2 == 0 {
            self.even
        } else {
            self.odd
        }
    }
}

/// Bank of staggered oscillators and the taps they computed this frame.
#[derive(Debug, Clone)]
pub struct Ensemble {
    lfos: Vec<Lfo>,
    taps: Vec<Tap>,
}

impl Ensemble {
    /// Build a bank of `voices` oscillators. Voice `i` of `K` starts at
    /// phase `i/K` so the taps spread evenly across the modulation cycle.
    /// A zero request rounds up to one voice; the caller validates the
    /// upper bound against [`MAX_VOICES`].
    pub fn new(voices: usize, sample_rate: f64, rate_hz: f32, waveform: Waveform) -> Self {
        let voices = voices.max(1);
        let mut lfos = Vec::with_capacity(voices);
        for index in 0..voices {
            let mut lfo = Lfo::new(sample_rate);
            lfo.set_waveform(waveform);
            lfo.set_frequency(rate_hz, 0);
            lfo.set_phase(index as f64 / voices as f64);
            lfos.push(lfo);
        }
        Self {
            taps: vec![Tap::default(); voices],
            lfos,
        }
    }

    pub fn voices(&self) -> usize {
        self.lfos.len()
    }

    /// Forward a rate change to every oscillator with the same ramp
    /// duration.
    pub fn set_frequency(&mut self, hz: f32, duration_frames: u32) {
        for lfo in &mut self.lfos {
            lfo.set_frequency(hz, duration_frames);
        }
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        for lfo in &mut self.lfos {
            lfo.set_waveform(waveform);
        }
    }

    /// Abandon pending frequency ramps on every oscillator.
    pub fn stop_ramping(&mut self) {
        for lfo in &mut self.lfos {
            lfo.stop_ramping();
        }
    }

    /// Compute this frame's tap for every voice, then advance each
    /// oscillator by one sample. `displacement_ms` is the peak bipolar
    /// excursion around `nominal_ms`; the caller derives it as
    /// `(max_delay - nominal) * depth` so the swing never leaves the
    /// delay line's allocated headroom.
    pub fn compute_taps(
        &mut self,
        nominal_ms: f32,
        displacement_ms: f32,
        odd90: bool,
        samples_per_ms: f32,
    ) {
        for (lfo, tap) in self.lfos.iter_mut().zip(self.taps.iter_mut()) {
            let even = (nominal_ms + lfo.value() * displacement_ms) * samples_per_ms;
            let odd = if odd90 {
                (nominal_ms + lfo.quad_phase_value() * displacement_ms) * samples_per_ms
            } else {
                even
            };
            lfo.increment();
            *tap = Tap { even, odd };
        }
    }

    /// Average the delayed sample across all voices' taps for one channel.
    /// Taps are clamped to the line's usable range here: a deep modulation
    /// against a short nominal delay can swing past "now", and the
    /// freshest sample is the closest physical answer. The upper bound
    /// only binds when the line is barely larger than the interpolation
    /// window itself.
    pub fn averaged_read(&self, line: &DelayLine, channel: usize) -> f32 {
        let max_offset = (line.capacity() - 3) as f32;
        let mut sum = 0.0;
        for tap in &self.taps {
            sum += line.read(tap.for_channel(channel).clamp(0.0, max_offset));
        }
        sum / self.taps.len() as f32
    }

    /// Taps computed by the most recent [`compute_taps`](Self::compute_taps).
    pub fn taps(&self) -> &[Tap] {
        &self.taps
    }

    /// The oscillators, for inspection.
    pub fn lfos(&self) -> &[Lfo] {
        &self.lfos
    }
}
