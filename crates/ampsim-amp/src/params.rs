//! Parameter store shared between the control thread and the audio thread.
//!
//! Every control is a normalized value in `[0, 1]`. [`AmpParams`] keeps one
//! `AtomicU32` (an `f32` bit pattern) per parameter, so a writer on any
//! thread and the audio thread reading at block start never see a torn
//! value and never take a lock.
//!
//! The audio thread copies all values once per block with
//! [`AmpParams::snapshot`]; stages read the copy, never the store, so a
//! change can not land in the middle of a block.
//!
//! # Parameters
//!
//! | Id | Default | Engineering value |
//! |----|---------|-------------------|
//! | `preamp_gain` | 0.5 | `1 + 19·v` (1×–20×) |
//! | `bass` | 0.5 | `(v − 0.5)·24` dB |
//! | `middle` | 0.5 | `(v − 0.5)·24` dB |
//! | `treble` | 0.5 | `(v − 0.5)·24` dB |
//! | `presence` | 0.5 | `(v − 0.5)·12` dB |
//! | `bright` | 0.0 | `v·8` dB |
//! | `drive` | 0.3 | amount `10·v`, gain `1 + 2·amount` |
//! | `master_volume` | 0.7 | `v²` |
//! | `chorus_rate` | 0.5 | `0.1 + 4.9·v` Hz |
//! | `chorus_depth` | 0.5 | `3·v` ms |
//! | `chorus_mix` | 0.5 | wet fraction `v` |
//! | `chorus_enabled` | off | switch |

use core::fmt;
use core::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use ampsim_core::linear_to_db;

use crate::config::Voicing;
use crate::error::ParamError;

/// Identifier of one amp control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamId {
    /// Preamp input gain
    PreampGain,
    /// Tone stack bass shelf
    Bass,
    /// Tone stack middle peak
    Middle,
    /// Tone stack treble shelf
    Treble,
    /// Tube voicing presence shelf
    Presence,
    /// Clean voicing bright shelf
    Bright,
    /// Second saturation stage drive
    Drive,
    /// Output level
    MasterVolume,
    /// Chorus LFO rate
    ChorusRate,
    /// Chorus modulation depth
    ChorusDepth,
    /// Chorus wet fraction
    ChorusMix,
    /// Chorus on/off switch
    ChorusEnabled,
}

impl ParamId {
    /// Number of parameters.
    pub const COUNT: usize = 12;

    /// Every parameter in store order.
    pub const ALL: [ParamId; Self::COUNT] = [
        Self::PreampGain,
        Self::Bass,
        Self::Middle,
        Self::Treble,
        Self::Presence,
        Self::Bright,
        Self::Drive,
        Self::MasterVolume,
        Self::ChorusRate,
        Self::ChorusDepth,
        Self::ChorusMix,
        Self::ChorusEnabled,
    ];

    /// Position in the store.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable string id used by presets and the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::PreampGain => "preamp_gain",
            Self::Bass => "bass",
            Self::Middle => "middle",
            Self::Treble => "treble",
            Self::Presence => "presence",
            Self::Bright => "bright",
            Self::Drive => "drive",
            Self::MasterVolume => "master_volume",
            Self::ChorusRate => "chorus_rate",
            Self::ChorusDepth => "chorus_depth",
            Self::ChorusMix => "chorus_mix",
            Self::ChorusEnabled => "chorus_enabled",
        }
    }

    /// Whether this is an on/off switch rather than a continuous control.
    pub fn is_switch(self) -> bool {
        matches!(self, Self::ChorusEnabled)
    }

    /// Display metadata.
    pub fn descriptor(self) -> ParamDescriptor {
        let (label, unit, default) = match self {
            Self::PreampGain => ("Preamp Gain", ParamUnit::Ratio, 0.5),
            Self::Bass => ("Bass", ParamUnit::Decibels, 0.5),
            Self::Middle => ("Middle", ParamUnit::Decibels, 0.5),
            Self::Treble => ("Treble", ParamUnit::Decibels, 0.5),
            Self::Presence => ("Presence", ParamUnit::Decibels, 0.5),
            Self::Bright => ("Bright", ParamUnit::Decibels, 0.0),
            Self::Drive => ("Drive", ParamUnit::Amount, 0.3),
            Self::MasterVolume => ("Master Volume", ParamUnit::Decibels, 0.7),
            Self::ChorusRate => ("Chorus Rate", ParamUnit::Hertz, 0.5),
            Self::ChorusDepth => ("Chorus Depth", ParamUnit::Milliseconds, 0.5),
            Self::ChorusMix => ("Chorus Mix", ParamUnit::Percent, 0.5),
            Self::ChorusEnabled => ("Chorus Enabled", ParamUnit::Switch, 0.0),
        };
        ParamDescriptor {
            id: self,
            label,
            unit,
            default,
        }
    }

    /// Map a normalized value to its engineering value (see module table).
    pub fn plain_value(self, normalized: f32) -> f32 {
        let v = normalized.clamp(0.0, 1.0);
        match self {
            Self::PreampGain => preamp_gain(v),
            Self::Bass | Self::Middle | Self::Treble => bipolar_db(v, TONE_RANGE_DB),
            Self::Presence => bipolar_db(v, PRESENCE_RANGE_DB),
            Self::Bright => v * BRIGHT_MAX_DB,
            Self::Drive => drive_amount(v),
            Self::MasterVolume => linear_to_db(master_gain(v)),
            Self::ChorusRate => chorus_rate_hz(v),
            Self::ChorusDepth => chorus_depth_ms(v),
            Self::ChorusMix => v * 100.0,
            Self::ChorusEnabled => {
                if v >= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamId {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParamError::Unknown(s.to_string()))
    }
}

/// Unit of a parameter's engineering value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamUnit {
    /// Decibels
    Decibels,
    /// Hertz
    Hertz,
    /// Milliseconds
    Milliseconds,
    /// Percent
    Percent,
    /// Linear multiplier
    Ratio,
    /// Dimensionless amount
    Amount,
    /// On/off
    Switch,
}

impl ParamUnit {
    /// Returns the unit suffix string for display.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Decibels => " dB",
            Self::Hertz => " Hz",
            Self::Milliseconds => " ms",
            Self::Percent => "%",
            Self::Ratio => "x",
            Self::Amount | Self::Switch => "",
        }
    }
}

/// Display metadata for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Parameter this describes
    pub id: ParamId,
    /// Human-readable label
    pub label: &'static str,
    /// Unit of [`ParamId::plain_value`]
    pub unit: ParamUnit,
    /// Normalized default
    pub default: f32,
}

impl ParamDescriptor {
    /// Format a normalized value in engineering units.
    pub fn format_value(&self, normalized: f32) -> String {
        if self.unit == ParamUnit::Switch {
            return if normalized >= 0.5 { "on" } else { "off" }.to_string();
        }
        format!("{:.2}{}", self.id.plain_value(normalized), self.unit.suffix())
    }
}

/// Full range of the bass/middle/treble controls in dB.
pub const TONE_RANGE_DB: f32 = 24.0;
/// Full range of the presence control in dB.
pub const PRESENCE_RANGE_DB: f32 = 12.0;
/// Maximum bright boost in dB.
pub const BRIGHT_MAX_DB: f32 = 8.0;

/// `(v − 0.5)·range`; the midpoint is exactly 0 dB.
#[inline]
pub fn bipolar_db(v: f32, range_db: f32) -> f32 {
    (v - 0.5) * range_db
}

/// Preamp gain multiplier.
#[inline]
pub fn preamp_gain(v: f32) -> f32 {
    1.0 + 19.0 * v
}

/// Drive amount on a 0–10 scale.
#[inline]
pub fn drive_amount(v: f32) -> f32 {
    10.0 * v
}

/// Output gain with a squared taper.
#[inline]
pub fn master_gain(v: f32) -> f32 {
    v * v
}

/// Chorus LFO rate in Hz.
#[inline]
pub fn chorus_rate_hz(v: f32) -> f32 {
    0.1 + 4.9 * v
}

/// Chorus modulation depth in milliseconds.
#[inline]
pub fn chorus_depth_ms(v: f32) -> f32 {
    3.0 * v
}

/// Lock-free store of normalized parameter values.
///
/// Writers clamp to `[0, 1]`; NaN writes are ignored. Share it between
/// threads with an `Arc`.
///
/// # Example
///
/// ```rust
/// use ampsim_amp::{AmpParams, ParamId};
///
/// let params = AmpParams::new();
/// params.set(ParamId::Drive, 1.7);
/// assert_eq!(params.get(ParamId::Drive), 1.0);
/// ```
#[derive(Debug)]
pub struct AmpParams {
    values: [AtomicU32; ParamId::COUNT],
}

impl AmpParams {
    /// Store initialized to every parameter's default.
    pub fn new() -> Self {
        Self {
            values: ParamId::ALL.map(|id| AtomicU32::new(id.descriptor().default.to_bits())),
        }
    }

    /// Store initialized to the defaults of `voicing`.
    ///
    /// The clean voicing starts with the chorus switched on.
    pub fn for_voicing(voicing: Voicing) -> Self {
        let params = Self::new();
        if voicing == Voicing::Clean {
            params.set_switch(ParamId::ChorusEnabled, true);
        }
        params
    }

    /// Store a value, clamped to `[0, 1]`.
    #[inline]
    pub fn set(&self, id: ParamId, value: f32) {
        if value.is_nan() {
            return;
        }
        self.values[id.index()].store(value.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    /// Store an on/off value.
    #[inline]
    pub fn set_switch(&self, id: ParamId, on: bool) {
        self.set(id, if on { 1.0 } else { 0.0 });
    }

    /// Store a value by string id.
    pub fn set_by_name(&self, name: &str, value: f32) -> Result<ParamId, ParamError> {
        let id: ParamId = name.parse()?;
        self.set(id, value);
        Ok(id)
    }

    /// Last committed value.
    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        f32::from_bits(self.values[id.index()].load(Ordering::Relaxed))
    }

    /// Restore every default.
    pub fn reset_to_defaults(&self) {
        for id in ParamId::ALL {
            self.set(id, id.descriptor().default);
        }
    }

    /// Copy all values at once, for use at a block boundary.
    #[inline]
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            values: core::array::from_fn(|i| f32::from_bits(self.values[i].load(Ordering::Relaxed))),
        }
    }
}

impl Default for AmpParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain copy of every parameter, taken once per block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    values: [f32; ParamId::COUNT],
}

impl ParamSnapshot {
    /// Snapshot holding the defaults.
    pub fn defaults() -> Self {
        Self {
            values: ParamId::ALL.map(|id| id.descriptor().default),
        }
    }

    /// Normalized value of `id`.
    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        self.values[id.index()]
    }

    /// Switch state of `id`.
    #[inline]
    pub fn is_on(&self, id: ParamId) -> bool {
        self.values[id.index()] >= 0.5
    }

    /// Preamp gain multiplier.
    pub fn preamp_gain(&self) -> f32 {
        preamp_gain(self.get(ParamId::PreampGain))
    }

    /// Drive amount (0–10).
    pub fn drive_amount(&self) -> f32 {
        drive_amount(self.get(ParamId::Drive))
    }

    /// Linear output gain.
    pub fn master_gain(&self) -> f32 {
        master_gain(self.get(ParamId::MasterVolume))
    }

    /// Chorus rate in Hz.
    pub fn chorus_rate_hz(&self) -> f32 {
        chorus_rate_hz(self.get(ParamId::ChorusRate))
    }

    /// Chorus depth in ms.
    pub fn chorus_depth_ms(&self) -> f32 {
        chorus_depth_ms(self.get(ParamId::ChorusDepth))
    }

    /// Chorus wet fraction.
    pub fn chorus_mix(&self) -> f32 {
        self.get(ParamId::ChorusMix)
    }

    /// Chorus switch.
    pub fn chorus_enabled(&self) -> bool {
        self.is_on(ParamId::ChorusEnabled)
    }
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self::defaults()
    }
}
