//! Parameter Ramping
//!
//! Every user-facing control of the kernel is a [`RampedParam`]: a bounded
//! scalar that can jump to a new target instantly or glide there linearly
//! over a caller-specified number of samples. Ramping is what keeps
//! parameter automation free of audible steps ("zipper noise"): the value
//! consumed by the render loop never moves more than one ramp step between
//! adjacent samples.

/// A bounded scalar parameter with optional linear ramping.
///
/// Three flavors cover all kernel controls:
///
/// - [`RampedParam::fraction`] - percentage-style values bounded to `[0, 1]`
///   (depth, dry mix, wet mix)
/// - [`RampedParam::bounded`] - values with an explicit range, such as a
///   delay in milliseconds or a rate in Hz
/// - [`RampedParam::toggle`] - boolean controls that snap instantly; a
///   half-on chorus width switch is not a meaningful state
///
/// The ramp is consumed by calling [`frame_value`](Self::frame_value) once
/// per rendered sample. The final step lands on the target exactly, so no
/// float drift accumulates across ramps.
#[derive(Debug, Clone)]
pub struct RampedParam {
    value: f32,
    target: f32,
    step: f32,
    remaining: u32,
    min: f32,
    max: f32,
    snaps: bool,
}

impl RampedParam {
    /// Create a parameter bounded to `[min, max]`, starting at `default`.
    pub fn bounded(default: f32, min: f32, max: f32) -> Self {
        let value = default.clamp(min, max);
        Self {
            value,
            target: value,
            step: 0.0,
            remaining: 0,
            min,
            max,
            snaps: false,
        }
    }

    /// Create a `[0, 1]` fraction parameter (mix levels, depth).
    pub fn fraction(default: f32) -> Self {
        Self::bounded(default, 0.0, 1.0)
    }

    /// Create a boolean parameter. Toggles ignore ramp durations and snap
    /// immediately; intermediate values would be meaningless.
    pub fn toggle(default: bool) -> Self {
        let mut param = Self::bounded(if default { 1.0 } else { 0.0 }, 0.0, 1.0);
        param.snaps = true;
        param
    }

    /// Establish a new target, reached after `duration_frames` calls to
    /// [`frame_value`](Self::frame_value). A duration of zero (or a toggle
    /// parameter) snaps immediately. Targets are clamped to the parameter's
    /// bounds; non-finite targets are ignored.
    pub fn set(&mut self, target: f32, duration_frames: u32) {
        debug_assert!(target.is_finite());
        if !target.is_finite() {
            return;
        }
        let target = target.clamp(self.min, self.max);
        self.target = target;
        if duration_frames == 0 || self.snaps {
            self.value = target;
            self.step = 0.0;
            self.remaining = 0;
        } else {
            self.step = (target - self.value) / duration_frames as f32;
            self.remaining = duration_frames;
        }
    }

    /// Advance one ramp step and return the new value. Call exactly once
    /// per rendered sample while consuming the ramp. The last step snaps to
    /// the target exactly.
    pub fn frame_value(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.value = self.target;
            } else if self.step > 0.0 {
                self.value = (self.value + self.step).min(self.target);
            } else {
                self.value = (self.value + self.step).max(self.target);
            }
        }
        self.value
    }

    /// Current value without advancing the ramp. Used in the steady render
    /// regime where the value is sampled once per block.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Current value mapped to `[0, 1]` over the parameter's bounds,
    /// without advancing the ramp. Equal to [`value`](Self::value) for
    /// fraction parameters.
    pub fn normalized(&self) -> f32 {
        if self.max > self.min {
            (self.value - self.min) / (self.max - self.min)
        } else {
            0.0
        }
    }

    /// The value the parameter is heading toward (equal to
    /// [`value`](Self::value) when no ramp is pending).
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Abandon any pending ramp and land on the target immediately. Called
    /// when rendering stops so a stale trajectory never resumes later.
    pub fn stop_ramping(&mut self) {
        self.value = self.target;
        self.step = 0.0;
        self.remaining = 0;
    }

    /// Whether ramp steps remain to be consumed.
    pub fn is_ramping(&self) -> bool {
        self.remaining > 0
    }

    /// Whether a toggle parameter currently reads as on.
    pub fn is_on(&self) -> bool {
        self.value >= 0.5
    }

    /// Replace the bounds, clamping the current value and target into the
    /// new range. Used when reconfiguration changes the maximum delay.
    pub fn set_bounds(&mut self, min: f32, max: f32) {
        self.min = min;
        self.max = max;
        self.value = self.value.clamp(min, max);
        self.target = self.target.clamp(min, max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_set() {
        let mut param = RampedParam::fraction(0.0);
        param.set(0.8, 0);
        assert_eq!(param.value(), 0.8);
        assert!(!param.is_ramping());
    }

    #[test]
    fn test_ramp_converges_exactly() {
        let mut param = RampedParam::fraction(0.0);
        param.set(1.0, 100);
        let mut last = 0.0;
        for _ in 0..99 {
            let v = param.frame_value();
            assert!(v > last, "ramp must rise monotonically");
            assert!(v < 1.0, "ramp must stay below target until the last step");
            last = v;
        }
        assert_eq!(param.frame_value(), 1.0);
        assert!(!param.is_ramping());
    }

    #[test]
    fn test_downward_ramp_monotonic() {
        let mut param = RampedParam::bounded(10.0, 0.0, 20.0);
        param.set(2.0, 50);
        let mut last = 10.0;
        for _ in 0..50 {
            let v = param.frame_value();
            assert!(v < last);
            assert!(v >= 2.0);
            last = v;
        }
        assert_eq!(param.value(), 2.0);
    }

    #[test]
    fn test_value_does_not_advance() {
        let mut param = RampedParam::fraction(0.0);
        param.set(1.0, 10);
        let before = param.value();
        let _ = param.value();
        let _ = param.value();
        assert_eq!(param.value(), before);
        assert!(param.is_ramping());
    }

    #[test]
    fn test_stop_ramping_snaps_to_target() {
        let mut param = RampedParam::fraction(0.0);
        param.set(0.6, 1000);
        param.frame_value();
        param.stop_ramping();
        assert_eq!(param.value(), 0.6);
        assert!(!param.is_ramping());
    }

    #[test]
    fn test_target_clamped_to_bounds() {
        let mut param = RampedParam::fraction(0.5);
        param.set(3.0, 0);
        assert_eq!(param.value(), 1.0);
        param.set(-1.0, 0);
        assert_eq!(param.value(), 0.0);
    }

    #[test]
    fn test_toggle_ignores_duration() {
        let mut param = RampedParam::toggle(false);
        assert!(!param.is_on());
        param.set(1.0, 500);
        assert!(param.is_on());
        assert!(!param.is_ramping());
    }

    #[test]
    fn test_normalized_maps_bounds() {
        let param = RampedParam::bounded(5.0, 0.0, 20.0);
        assert!((param.normalized() - 0.25).abs() < 1e-7);

        let fraction = RampedParam::fraction(0.7);
        assert_eq!(fraction.normalized(), fraction.value());
    }

    #[test]
    fn test_preempting_ramp_restarts_from_current() {
        let mut param = RampedParam::fraction(0.0);
        param.set(1.0, 100);
        for _ in 0..50 {
            param.frame_value();
        }
        let midway = param.value();
        assert!(midway > 0.0 && midway < 1.0);

        // A newer event replaces the in-flight trajectory.
        param.set(0.0, 10);
        for _ in 0..10 {
            param.frame_value();
        }
        assert_eq!(param.value(), 0.0);
    }

    #[test]
    fn test_set_bounds_clamps_state() {
        let mut param = RampedParam::bounded(40.0, 0.0, 50.0);
        param.set_bounds(0.0, 20.0);
        assert_eq!(param.value(), 20.0);
        assert_eq!(param.target(), 20.0);
    }

    #[test]
    fn test_single_frame_ramp() {
        let mut param = RampedParam::fraction(0.2);
        param.set(0.9, 1);
        assert_eq!(param.frame_value(), 0.9);
        assert!(!param.is_ramping());
    }
}
