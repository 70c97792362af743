//! Low-Frequency Oscillator
//!
//! The [`Lfo`] drives the delay-tap displacement. Each instance produces a
//! periodic value in `[-1, 1]` plus a quadrature companion shifted by a
//! quarter period, which stereo-widening modes feed to odd channels. Phase
//! is accumulated in `f64` so long renders stay phase-accurate; frequency
//! changes ride the same linear ramp mechanism as every other parameter.

use crate::params::RampedParam;
use core::f64::consts::TAU;
use libm::Libm;
use serde::{Deserialize, Serialize};

/// Modulation waveform shapes, all normalized to `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    /// `sin(2π·phase)`
    Sinusoid,
    /// Piecewise-linear zigzag: -1 at phase 0, +1 at phase 0.5.
    Triangle,
}

impl Waveform {
    /// Evaluate the waveform at a normalized phase in `[0, 1)`.
    pub fn at(self, phase: f64) -> f32 {
        match self {
            Waveform::Sinusoid => Libm::<f64>::sin(TAU * phase) as f32,
            Waveform::Triangle => (1.0 - 4.0 * Libm::<f64>::fabs(phase - 0.5)) as f32,
        }
    }
}

/// Widest frequency the kernel will drive an oscillator at, in Hz.
pub const MAX_RATE_HZ: f32 = 20.0;

/// Slowest usable modulation rate, in Hz.
pub const MIN_RATE_HZ: f32 = 0.01;

/// A single modulation oscillator.
///
/// [`value`](Self::value) and [`quad_phase_value`](Self::quad_phase_value)
/// are pure functions of the current phase; [`increment`](Self::increment)
/// is the only state-mutating step and must be called exactly once per
/// rendered sample. The frequency is itself a [`RampedParam`], so a rate
/// change glides rather than jumping the modulation speed.
#[derive(Debug, Clone)]
pub struct Lfo {
    phase: f64,
    sample_rate: f64,
    waveform: Waveform,
    frequency: RampedParam,
}

impl Lfo {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            phase: 0.0,
            sample_rate,
            waveform: Waveform::Sinusoid,
            frequency: RampedParam::bounded(1.0, MIN_RATE_HZ, MAX_RATE_HZ),
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Set the oscillation frequency in Hz, ramped over `duration_frames`
    /// samples (zero snaps immediately).
    pub fn set_frequency(&mut self, hz: f32, duration_frames: u32) {
        self.frequency.set(hz, duration_frames);
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency.value()
    }

    /// Place the phase accumulator, wrapping into `[0, 1)`. Ensemble banks
    /// use this to stagger voice `i` of `K` at phase `i/K`.
    pub fn set_phase(&mut self, phase: f64) {
        self.phase = phase.fract();
        if self.phase < 0.0 {
            self.phase += 1.0;
        }
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Waveform value at the current phase.
    pub fn value(&self) -> f32 {
        self.waveform.at(self.phase)
    }

    /// Waveform value a quarter period ahead of the current phase.
    pub fn quad_phase_value(&self) -> f32 {
        self.waveform.at((self.phase + 0.25).fract())
    }

    /// Advance the phase by one sample, consuming one step of any pending
    /// frequency ramp.
    pub fn increment(&mut self) {
        let hz = self.frequency.frame_value();
        self.phase = (self.phase + f64::from(hz) / self.sample_rate).fract();
    }

    /// Abandon a pending frequency ramp, landing on its target.
    pub fn stop_ramping(&mut self) {
        self.frequency.stop_ramping();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sinusoid_endpoints() {
        assert_relative_eq!(Waveform::Sinusoid.at(0.0), 0.0);
        assert_relative_eq!(Waveform::Sinusoid.at(0.25), 1.0, epsilon = 1e-6);
        assert_relative_eq!(Waveform::Sinusoid.at(0.75), -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_triangle_shape() {
        assert_relative_eq!(Waveform::Triangle.at(0.0), -1.0);
        assert_relative_eq!(Waveform::Triangle.at(0.25), 0.0);
        assert_relative_eq!(Waveform::Triangle.at(0.5), 1.0);
        assert_relative_eq!(Waveform::Triangle.at(0.75), 0.0);
    }

    #[test]
    fn test_periodicity() {
        // After round(sample_rate / frequency) increments the oscillator
        // should return to its starting value.
        let mut lfo = Lfo::new(48_000.0);
        lfo.set_frequency(2.0, 0);
        let start = lfo.value();
        let period = (48_000.0f64 / 2.0).round() as usize;
        for _ in 0..period {
            lfo.increment();
        }
        assert_relative_eq!(lfo.value(), start, epsilon = 1e-6);
    }

    #[test]
    fn test_quadrature_relationship() {
        let mut lfo = Lfo::new(44_100.0);
        for &phase in &[0.0, 0.1, 0.3, 0.5, 0.77, 0.99] {
            lfo.set_phase(phase);
            let quad = lfo.quad_phase_value();
            lfo.set_phase((phase + 0.25) % 1.0);
            assert_relative_eq!(quad, lfo.value(), epsilon = 1e-7);
        }
    }

    #[test]
    fn test_quadrature_of_sinusoid_is_cosine() {
        let mut lfo = Lfo::new(44_100.0);
        lfo.set_phase(0.0);
        assert_relative_eq!(lfo.quad_phase_value(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_phase_wraps() {
        let mut lfo = Lfo::new(10.0);
        lfo.set_frequency(6.0, 0);
        for _ in 0..1000 {
            lfo.increment();
            assert!(lfo.phase() >= 0.0 && lfo.phase() < 1.0);
        }
    }

    #[test]
    fn test_set_phase_wraps_negative() {
        let mut lfo = Lfo::new(44_100.0);
        lfo.set_phase(-0.25);
        assert_relative_eq!(lfo.phase(), 0.75, epsilon = 1e-12);
        lfo.set_phase(1.5);
        assert_relative_eq!(lfo.phase(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_set_sample_rate_rescales_phase_step() {
        let mut lfo = Lfo::new(1000.0);
        lfo.set_frequency(10.0, 0);
        lfo.increment();
        assert_relative_eq!(lfo.phase(), 0.01, epsilon = 1e-12);
        lfo.set_sample_rate(2000.0);
        lfo.increment();
        assert_relative_eq!(lfo.phase(), 0.015, epsilon = 1e-12);
    }

    #[test]
    fn test_frequency_ramp_consumed_by_increment() {
        let mut lfo = Lfo::new(1000.0);
        lfo.set_frequency(1.0, 0);
        lfo.set_frequency(5.0, 10);
        for _ in 0..10 {
            lfo.increment();
        }
        assert_eq!(lfo.frequency(), 5.0);
    }

    #[test]
    fn test_stop_ramping_lands_on_target() {
        let mut lfo = Lfo::new(1000.0);
        lfo.set_frequency(1.0, 0);
        lfo.set_frequency(8.0, 100_000);
        lfo.increment();
        lfo.stop_ramping();
        assert_eq!(lfo.frequency(), 8.0);
    }

    #[test]
    fn test_waveform_serde_names() {
        let json = serde_json::to_string(&Waveform::Sinusoid).unwrap();
        assert_eq!(json, "\"sinusoid\"");
        let back: Waveform = serde_json::from_str("\"triangle\"").unwrap();
        assert_eq!(back, Waveform::Triangle);
    }
}
