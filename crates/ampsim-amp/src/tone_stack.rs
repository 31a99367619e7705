//! Tone-stack filter bank.
//!
//! Four user bands followed by a fixed 20 Hz high-pass that removes the DC
//! the asymmetric stages inject. Sections always run in this order:
//!
//! ```text
//! bass (low shelf) → middle (peak) → treble (high shelf) → presence/bright (high shelf) → DC high-pass
//! ```
//!
//! Coefficients are recomputed synchronously in [`ToneStack::update`], which
//! the engine calls at the start of every block, so a block never runs with
//! coefficients older than the last committed parameter values.

use ampsim_core::{Biquad, BiquadCoefficients, FilterKind, db_to_linear};

use crate::config::Voicing;
use crate::params::{BRIGHT_MAX_DB, PRESENCE_RANGE_DB, ParamId, ParamSnapshot, TONE_RANGE_DB, bipolar_db};

/// Number of user-adjustable bands.
pub const NUM_BANDS: usize = 4;
/// Sections per channel including the DC high-pass.
pub const NUM_SECTIONS: usize = NUM_BANDS + 1;

/// DC-blocking high-pass corner.
pub const DC_BLOCK_HZ: f32 = 20.0;
const DC_BLOCK_Q: f32 = 0.707;

/// How a band's normalized value becomes a gain in dB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GainLaw {
    /// `(v − 0.5)·range_db`, unity at the midpoint
    Bipolar {
        /// Full span in dB
        range_db: f32,
    },
    /// `v·max_db`, unity at zero
    Unipolar {
        /// Boost at full scale in dB
        max_db: f32,
    },
}

impl GainLaw {
    /// Gain in dB for a normalized value.
    #[inline]
    pub fn gain_db(self, v: f32) -> f32 {
        match self {
            Self::Bipolar { range_db } => bipolar_db(v, range_db),
            Self::Unipolar { max_db } => v * max_db,
        }
    }
}

/// One user band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandSpec {
    /// Parameter driving the band gain
    pub param: ParamId,
    /// Section shape
    pub kind: FilterKind,
    /// Corner or center frequency in Hz
    pub frequency: f32,
    /// Quality factor
    pub q: f32,
    /// Normalized value to dB mapping
    pub law: GainLaw,
}

const TONE: GainLaw = GainLaw::Bipolar {
    range_db: TONE_RANGE_DB,
};

const TUBE_BANDS: [BandSpec; NUM_BANDS] = [
    BandSpec {
        param: ParamId::Bass,
        kind: FilterKind::LowShelf,
        frequency: 120.0,
        q: 0.7,
        law: TONE,
    },
    BandSpec {
        param: ParamId::Middle,
        kind: FilterKind::Peaking,
        frequency: 800.0,
        q: 1.5,
        law: TONE,
    },
    BandSpec {
        param: ParamId::Treble,
        kind: FilterKind::HighShelf,
        frequency: 3000.0,
        q: 0.7,
        law: TONE,
    },
    BandSpec {
        param: ParamId::Presence,
        kind: FilterKind::HighShelf,
        frequency: 6000.0,
        q: 0.5,
        law: GainLaw::Bipolar {
            range_db: PRESENCE_RANGE_DB,
        },
    },
];

const CLEAN_BANDS: [BandSpec; NUM_BANDS] = [
    BandSpec {
        param: ParamId::Bass,
        kind: FilterKind::LowShelf,
        frequency: 100.0,
        q: 0.7,
        law: TONE,
    },
    BandSpec {
        param: ParamId::Middle,
        kind: FilterKind::Peaking,
        frequency: 1000.0,
        q: 1.0,
        law: TONE,
    },
    BandSpec {
        param: ParamId::Treble,
        kind: FilterKind::HighShelf,
        frequency: 4000.0,
        q: 0.7,
        law: TONE,
    },
    BandSpec {
        param: ParamId::Bright,
        kind: FilterKind::HighShelf,
        frequency: 8000.0,
        q: 0.5,
        law: GainLaw::Unipolar {
            max_db: BRIGHT_MAX_DB,
        },
    },
];

/// Band layout for a voicing.
pub fn bands_for(voicing: Voicing) -> &'static [BandSpec; NUM_BANDS] {
    match voicing {
        Voicing::Tube => &TUBE_BANDS,
        Voicing::Clean => &CLEAN_BANDS,
    }
}

/// Coefficients of `band` at normalized value `value`.
///
/// Pure: identical inputs give bit-identical coefficients. A band at 0 dB
/// is exactly the identity section.
pub fn band_coefficients(band: &BandSpec, sample_rate: f64, value: f32) -> BiquadCoefficients {
    let gain = db_to_linear(band.law.gain_db(value.clamp(0.0, 1.0)));
    BiquadCoefficients::design(band.kind, sample_rate, band.frequency, band.q, gain)
}

/// Coefficients of the fixed DC high-pass.
pub fn dc_block_coefficients(sample_rate: f64) -> BiquadCoefficients {
    BiquadCoefficients::design(FilterKind::HighPass, sample_rate, DC_BLOCK_HZ, DC_BLOCK_Q, 1.0)
}

/// Per-channel cascade of the four bands and the DC high-pass.
#[derive(Debug, Clone)]
pub struct ToneStack {
    bands: &'static [BandSpec; NUM_BANDS],
    sample_rate: f64,
    coefficients: [BiquadCoefficients; NUM_SECTIONS],
    /// Last value each band was designed for; NaN until the first update.
    designed_for: [f32; NUM_BANDS],
    channels: Vec<[Biquad; NUM_SECTIONS]>,
}

impl ToneStack {
    /// Flat tone stack; call [`update`](Self::update) before processing.
    pub fn new(voicing: Voicing, sample_rate: f64, num_channels: usize) -> Self {
        let mut coefficients = [BiquadCoefficients::IDENTITY; NUM_SECTIONS];
        coefficients[NUM_BANDS] = dc_block_coefficients(sample_rate);
        let section = |i: usize| Biquad::with_coefficients(coefficients[i]);
        Self {
            bands: bands_for(voicing),
            sample_rate,
            coefficients,
            designed_for: [f32::NAN; NUM_BANDS],
            channels: (0..num_channels)
                .map(|_| core::array::from_fn(section))
                .collect(),
        }
    }

    /// Redesign every band whose parameter changed since the last call.
    ///
    /// Returns `true` if any coefficients changed. Filter history is kept.
    pub fn update(&mut self, params: &ParamSnapshot) -> bool {
        let mut changed = false;
        for (i, band) in self.bands.iter().enumerate() {
            let value = params.get(band.param);
            if value.to_bits() == self.designed_for[i].to_bits() {
                continue;
            }
            self.designed_for[i] = value;
            let coeffs = band_coefficients(band, self.sample_rate, value);
            if coeffs != self.coefficients[i] {
                self.coefficients[i] = coeffs;
                for sections in &mut self.channels {
                    sections[i].set_coefficients(coeffs);
                }
                changed = true;
            }
        }
        changed
    }

    /// Filter one channel in place.
    pub fn process_block(&mut self, channel: usize, buffer: &mut [f32]) {
        let sections = &mut self.channels[channel];
        for sample in buffer.iter_mut() {
            let mut x = *sample;
            for section in sections.iter_mut() {
                x = section.process(x);
            }
            *sample = x;
        }
    }

    /// Clear filter history on every channel.
    pub fn reset(&mut self) {
        for sections in &mut self.channels {
            for section in sections.iter_mut() {
                section.clear();
            }
        }
    }

    /// Current coefficients in cascade order.
    pub fn coefficients(&self) -> &[BiquadCoefficients; NUM_SECTIONS] {
        &self.coefficients
    }

    /// Band layout in use.
    pub fn bands(&self) -> &[BandSpec; NUM_BANDS] {
        self.bands
    }

    /// Combined magnitude response at `frequency` in linear gain.
    pub fn magnitude_at(&self, frequency: f32) -> f64 {
        self.coefficients
            .iter()
            .map(|c| c.magnitude_at(frequency, self.sample_rate))
            .product()
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }
}
