//! Delay Line
//!
//! A fixed-capacity circular sample buffer with fractional-offset reads.
//! The write cursor advances one slot per sample; reads interpolate across
//! the four stored samples straddling the requested fractional position
//! (4-point cubic), which keeps a continuously moving tap free of the
//! aliasing a linear blend would add. Capacity is fixed at configuration
//! time; the render path never allocates or resizes.

/// Circular delay buffer for one audio channel.
///
/// The buffer starts zero-filled, so reads that reach back before any
/// samples were written return silence. That only happens transiently at
/// start-up and is deliberate: silence is the correct output for history
/// that does not exist yet.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
    capacity: usize,
}

impl DelayLine {
    /// Create a delay line holding `capacity` samples of history. The
    /// interpolation window needs four samples, so smaller requests are
    /// rounded up.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(4);
        Self {
            buffer: vec![0.0; capacity],
            write_pos: 0,
            capacity,
        }
    }

    /// Buffer size needed for a modulated tap that may swing a full
    /// `max_delay_ms` past its nominal position in either direction.
    pub fn capacity_for(max_delay_ms: f32, samples_per_ms: f32) -> usize {
        (2.0 * f64::from(max_delay_ms) * f64::from(samples_per_ms)).ceil() as usize + 1
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Store a sample at the cursor and advance. Never fails; the cursor
    /// wraps and the oldest sample is overwritten.
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.capacity;
    }

    /// Read `delay_samples` behind the cursor with 4-point cubic
    /// (Catmull-Rom) interpolation. `read(0.0)` returns the most recently
    /// written sample; at integer offsets the interpolation reduces to an
    /// exact passthrough of the stored sample.
    ///
    /// The window reaches two samples past the integer offset, so the
    /// usable range is `[0, capacity - 3]`. Offsets beyond it are a caller
    /// error: asserted in debug builds, clamped into range in release
    /// builds.
    pub fn read(&self, delay_samples: f32) -> f32 {
        debug_assert!(
            delay_samples >= 0.0 && delay_samples <= (self.capacity - 3) as f32,
            "delay offset {} outside [0, {}]",
            delay_samples,
            self.capacity - 3
        );
        let delay = delay_samples.clamp(0.0, (self.capacity - 3) as f32);
        let whole = delay.floor();
        let frac = delay - whole;
        let whole = whole as isize;

        // Four samples straddling the fractional position: p1 sits at the
        // integer offset, p2 one sample older, p0 one sample newer. The
        // fresh edge clamps to the newest sample so a sub-sample tap never
        // wraps across the cursor into the oldest slot.
        let p0 = self.sample_at((whole - 1).max(0));
        let p1 = self.sample_at(whole);
        let p2 = self.sample_at(whole + 1);
        let p3 = self.sample_at(whole + 2);

        catmull_rom(p0, p1, p2, p3, frac)
    }

    /// Refill with silence and rewind the cursor.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Sample stored at an integer delay behind the cursor.
    fn sample_at(&self, delay: isize) -> f32 {
        let capacity = self.capacity as isize;
        let index = (self.write_pos as isize - 1 - delay).rem_euclid(capacity);
        self.buffer[index as usize]
    }
}

/// Catmull-Rom spline through `p1` and `p2`, evaluated at `frac` in
/// `[0, 1)`. At `frac == 0` this returns `p1` exactly.
fn catmull_rom(p0: f32, p1: f32, p2: f32, p3: f32, frac: f32) -> f32 {
    let a = 3.0 * (p1 - p2) + p3 - p0;
    let b = 2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3;
    let c = p2 - p0;
    p1 + 0.5 * frac * (c + frac * (b + frac * a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_integer_delay_round_trip() {
        // Reading at an integer offset must return exactly the sample
        // written that many steps earlier.
        let mut line = DelayLine::new(64);
        for n in 0..32 {
            line.write(n as f32 * 0.125);
        }
        for d in 0..16u32 {
            let expected = (31 - d) as f32 * 0.125;
            assert_eq!(line.read(d as f32), expected);
        }
    }

    #[test]
    fn test_read_zero_returns_latest() {
        let mut line = DelayLine::new(16);
        line.write(0.25);
        line.write(-0.5);
        assert_eq!(line.read(0.0), -0.5);
        assert_eq!(line.read(1.0), 0.25);
    }

    #[test]
    fn test_subsample_read_stays_in_recent_history() {
        // A tap just behind the cursor interpolates within the newest
        // samples; it must not wrap to the oldest slot in the ring.
        let mut line = DelayLine::new(8);
        line.write(1.0);
        for _ in 0..7 {
            line.write(0.0);
        }
        assert_eq!(line.read(0.5), 0.0);
        assert_eq!(line.read(0.25), 0.0);
    }

    #[test]
    fn test_oldest_usable_offset_reads_exact() {
        let mut line = DelayLine::new(16);
        for n in 0..16 {
            line.write(n as f32);
        }
        // capacity - 3 anchors the oldest full interpolation window.
        assert_eq!(line.read(13.0), 2.0);
    }

    #[test]
    fn test_unwritten_buffer_reads_silence() {
        let line = DelayLine::new(32);
        for d in [0.0, 1.5, 10.0, 27.3] {
            assert_eq!(line.read(d), 0.0);
        }
    }

    #[test]
    fn test_fractional_read_on_linear_ramp() {
        // Catmull-Rom reproduces a straight line exactly, so a fractional
        // read on ramp data lands between its neighbors linearly.
        let mut line = DelayLine::new(64);
        for n in 0..32 {
            line.write(n as f32);
        }
        assert_relative_eq!(line.read(4.5), 26.5, epsilon = 1e-5);
        assert_relative_eq!(line.read(10.25), 20.75, epsilon = 1e-5);
    }

    #[test]
    fn test_cursor_wraps() {
        let mut line = DelayLine::new(8);
        for n in 0..20 {
            line.write(n as f32);
        }
        assert_eq!(line.read(0.0), 19.0);
        assert_eq!(line.read(4.0), 15.0);
    }

    #[test]
    fn test_clear_resets_history() {
        let mut line = DelayLine::new(16);
        line.write(1.0);
        line.write(0.5);
        line.clear();
        assert_eq!(line.read(0.0), 0.0);
        assert_eq!(line.read(5.0), 0.0);
    }

    #[test]
    fn test_out_of_range_clamped_in_release() {
        let mut line = DelayLine::new(16);
        for n in 0..16 {
            line.write(n as f32);
        }
        if cfg!(debug_assertions) {
            return;
        }
        // Release builds clamp instead of wrapping into nonsense.
        let clamped = line.read(500.0);
        assert_eq!(clamped, line.read(13.0));
    }

    #[test]
    fn test_minimum_capacity() {
        let line = DelayLine::new(1);
        assert_eq!(line.capacity(), 4);
    }

    #[test]
    fn test_capacity_for_bipolar_excursion() {
        // 20ms at 48kHz: 2 * 20 * 48 + 1 slots.
        assert_eq!(DelayLine::capacity_for(20.0, 48.0), 1921);
        assert!(DelayLine::capacity_for(0.1, 44.1) >= 9);
    }

    #[test]
    fn test_catmull_rom_passes_through_knots() {
        assert_eq!(catmull_rom(0.0, 0.7, -0.3, 0.1, 0.0), 0.7);
        assert_relative_eq!(catmull_rom(1.0, 2.0, 3.0, 4.0, 0.5), 2.5, epsilon = 1e-6);
    }
}
