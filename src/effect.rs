//! Host-Facing Effect Interface
//!
//! The kernel is driven through the object-safe [`Effect`] trait: render,
//! parameter get/set, and the rendering-state lifecycle hook. A host
//! binding holds `&mut dyn Effect` (or a boxed one) and needs nothing
//! else from this crate. [`ParameterId`] names the kernel's six logical
//! controls; mapping an external numeric address space onto it is the
//! binding's job, helped by [`TryFrom<u32>`] and the static
//! [`descriptors`] table.

use crate::lfo::{MAX_RATE_HZ, MIN_RATE_HZ};
use serde::{Deserialize, Serialize};

/// Ramp length, in samples, applied to host parameter changes that do not
/// specify their own duration. Long enough to absorb a click, short
/// enough to feel immediate.
pub const DEFAULT_RAMP_FRAMES: u32 = 50;

/// Widest maximum-delay window a default configuration allocates, in
/// milliseconds.
pub const DEFAULT_MAX_DELAY_MS: f32 = 50.0;

/// The kernel's logical parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterId {
    /// Modulation rate in Hz.
    Rate,
    /// Modulation depth as a fraction of the available excursion, 0–1.
    Depth,
    /// Nominal delay in milliseconds.
    Delay,
    /// Unprocessed signal level in the output, 0–1.
    DryMix,
    /// Delayed signal level in the output, 0–1.
    WetMix,
    /// Stereo widening: odd channels read the quadrature oscillator value.
    /// Boolean, carried as 0.0 / 1.0.
    Odd90,
}

impl ParameterId {
    /// All parameters, in address order.
    pub const ALL: [ParameterId; 6] = [
        ParameterId::Rate,
        ParameterId::Depth,
        ParameterId::Delay,
        ParameterId::DryMix,
        ParameterId::WetMix,
        ParameterId::Odd90,
    ];
}

/// Address that does not name a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownParameter(pub u32);

impl std::fmt::Display for UnknownParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown parameter address {}", self.0)
    }
}

impl std::error::Error for UnknownParameter {}

impl TryFrom<u32> for ParameterId {
    type Error = UnknownParameter;

    fn try_from(address: u32) -> Result<Self, Self::Error> {
        ParameterId::ALL
            .get(address as usize)
            .copied()
            .ok_or(UnknownParameter(address))
    }
}

impl From<ParameterId> for u32 {
    fn from(id: ParameterId) -> Self {
        ParameterId::ALL.iter().position(|&p| p == id).unwrap_or(0) as u32
    }
}

/// Display/scaling hint for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamUnit {
    Hertz,
    Milliseconds,
    Fraction,
    Toggle,
}

/// Static description of one parameter, for building host address tables
/// and UI bindings. The `Delay` entry's `max` reflects the default
/// configuration; the kernel re-bounds it to the configured maximum delay.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParamDescriptor {
    pub id: ParameterId,
    pub name: &'static str,
    pub default: f32,
    pub min: f32,
    pub max: f32,
    pub unit: ParamUnit,
}

static DESCRIPTORS: [ParamDescriptor; 6] = [
    ParamDescriptor {
        id: ParameterId::Rate,
        name: "rate",
        default: 0.25,
        min: MIN_RATE_HZ,
        max: MAX_RATE_HZ,
        unit: ParamUnit::Hertz,
    },
    ParamDescriptor {
        id: ParameterId::Depth,
        name: "depth",
        default: 0.25,
        min: 0.0,
        max: 1.0,
        unit: ParamUnit::Fraction,
    },
    ParamDescriptor {
        id: ParameterId::Delay,
        name: "delay",
        default: 15.0,
        min: 0.0,
        max: DEFAULT_MAX_DELAY_MS,
        unit: ParamUnit::Milliseconds,
    },
    ParamDescriptor {
        id: ParameterId::DryMix,
        name: "dry_mix",
        default: 0.5,
        min: 0.0,
        max: 1.0,
        unit: ParamUnit::Fraction,
    },
    ParamDescriptor {
        id: ParameterId::WetMix,
        name: "wet_mix",
        default: 0.5,
        min: 0.0,
        max: 1.0,
        unit: ParamUnit::Fraction,
    },
    ParamDescriptor {
        id: ParameterId::Odd90,
        name: "odd90",
        default: 0.0,
        min: 0.0,
        max: 1.0,
        unit: ParamUnit::Toggle,
    },
];

/// Descriptor table covering every [`ParameterId`], in address order.
pub fn descriptors() -> &'static [ParamDescriptor; 6] {
    &DESCRIPTORS
}

/// Look up the descriptor for one parameter.
pub fn descriptor(id: ParameterId) -> &'static ParamDescriptor {
    &DESCRIPTORS[u32::from(id) as usize]
}

/// The capability set a host binding drives the kernel through.
///
/// Object-safe by design: the binding dispatches through
/// `&mut dyn Effect` with no knowledge of the concrete kernel type. All
/// four operations are real-time safe: none allocates, blocks, or
/// panics in release builds.
pub trait Effect: Send {
    /// Render `frames` samples from `input` into `output`, one slice per
    /// channel. The kernel drives a single output bus; `output_bus` other
    /// than 0 is a caller error.
    fn render(
        &mut self,
        output_bus: usize,
        input: &[&[f32]],
        output: &mut [&mut [f32]],
        frames: u32,
    );

    /// Current value of a parameter, without disturbing pending ramps.
    fn get_parameter(&self, id: ParameterId) -> f32;

    /// Change a parameter, gliding over `duration_frames` samples (zero
    /// snaps immediately).
    fn set_parameter(&mut self, id: ParameterId, value: f32, duration_frames: u32);

    /// Host notification that rendering is starting or stopping. Stopping
    /// abandons in-flight ramps so no stale trajectory resumes later.
    fn set_rendering(&mut self, is_rendering: bool);
}
