//! Cabinet stage: convolution with a loudspeaker impulse response.
//!
//! The built-in cabinets are synthesized at prepare time. A unit impulse
//! runs through a short biquad cascade modelling the speaker:
//!
//! ```text
//! high-pass (cone excursion limit)
//!   → low resonance peak
//!   → presence peak
//!   → low-pass ×2 (cone break-up)
//!   → exponential decay window
//! ```
//!
//! The response is then scaled so its peak magnitude between 40 Hz and
//! 12 kHz is 0 dB. The right channel uses resonances detuned by 3% so a
//! stereo pair is not identical.
//!
//! Short responses run through [`DirectConvolver`], longer ones through the
//! zero-latency [`PartitionedConvolver`]. Either way the stage adds no
//! latency.

use ampsim_core::{
    Biquad, BiquadCoefficients, ConvolutionError, Convolver, DirectConvolver, FilterKind,
    ImpulseResponse, PartitionedConvolver, db_to_linear,
};
use libm::{cos, exp, log, sin};

use crate::config::CabinetModel;

/// Length of the synthesized responses.
pub const CABINET_IR_SECONDS: f64 = 0.04;
/// Responses up to this many taps are convolved directly.
pub const DIRECT_MAX_TAPS: usize = 128;
/// Partition size of the FFT engine.
pub const PARTITION_SIZE: usize = 128;

/// Right-channel resonance detune.
const STEREO_DETUNE: f32 = 1.03;

const NORMALIZE_LOW_HZ: f64 = 40.0;
const NORMALIZE_HIGH_HZ: f64 = 12_000.0;
const NORMALIZE_POINTS: usize = 48;

/// Speaker model behind a built-in cabinet.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SpeakerVoice {
    high_pass_hz: f32,
    resonance_hz: f32,
    resonance_db: f32,
    presence_hz: f32,
    presence_db: f32,
    low_pass_hz: f32,
    decay_ms: f64,
}

const CLOSED_4X12: SpeakerVoice = SpeakerVoice {
    high_pass_hz: 80.0,
    resonance_hz: 110.0,
    resonance_db: 5.0,
    presence_hz: 2500.0,
    presence_db: 4.0,
    low_pass_hz: 5000.0,
    decay_ms: 8.0,
};

const OPEN_2X12: SpeakerVoice = SpeakerVoice {
    high_pass_hz: 70.0,
    resonance_hz: 95.0,
    resonance_db: 3.0,
    presence_hz: 2500.0,
    presence_db: 4.0,
    low_pass_hz: 6000.0,
    decay_ms: 12.0,
};

impl SpeakerVoice {
    fn detuned(self, ratio: f32) -> Self {
        Self {
            resonance_hz: self.resonance_hz * ratio,
            presence_hz: self.presence_hz * ratio,
            ..self
        }
    }

    fn sections(&self, sample_rate: f64) -> [Biquad; 5] {
        let design = |kind, freq, q, db| {
            Biquad::with_coefficients(BiquadCoefficients::design(
                kind,
                sample_rate,
                freq,
                q,
                db_to_linear(db),
            ))
        };
        [
            design(FilterKind::HighPass, self.high_pass_hz, 0.707, 0.0),
            design(FilterKind::Peaking, self.resonance_hz, 2.0, self.resonance_db),
            design(FilterKind::Peaking, self.presence_hz, 1.2, self.presence_db),
            design(FilterKind::LowPass, self.low_pass_hz, 0.707, 0.0),
            design(FilterKind::LowPass, self.low_pass_hz, 0.707, 0.0),
        ]
    }

    /// Un-normalized response of `len` samples.
    fn render(&self, sample_rate: f64, len: usize) -> Vec<f32> {
        let mut sections = self.sections(sample_rate);
        let decay_samples = self.decay_ms * 0.001 * sample_rate;
        (0..len)
            .map(|n| {
                let mut x = if n == 0 { 1.0 } else { 0.0 };
                for section in &mut sections {
                    x = section.process(x);
                }
                x * exp(-(n as f64) / decay_samples) as f32
            })
            .collect()
    }
}

/// Magnitude of the FIR `taps` at `frequency`.
fn fir_magnitude(taps: &[f32], frequency: f64, sample_rate: f64) -> f64 {
    let w = core::f64::consts::TAU * frequency / sample_rate;
    let (re, im) = taps.iter().enumerate().fold((0.0, 0.0), |(re, im), (n, &h)| {
        let phase = w * n as f64;
        (re + f64::from(h) * cos(phase), im - f64::from(h) * sin(phase))
    });
    (re * re + im * im).sqrt()
}

/// Peak magnitude of `taps` over a log-spaced grid from 40 Hz to 12 kHz
/// (or 45% of the sample rate, whichever is lower).
pub fn peak_magnitude(taps: &[f32], sample_rate: f64) -> f64 {
    let high = NORMALIZE_HIGH_HZ.min(0.45 * sample_rate);
    let span = log(high / NORMALIZE_LOW_HZ);
    (0..NORMALIZE_POINTS)
        .map(|i| {
            let t = i as f64 / (NORMALIZE_POINTS - 1) as f64;
            NORMALIZE_LOW_HZ * exp(span * t)
        })
        .map(|f| fir_magnitude(taps, f, sample_rate))
        .fold(0.0, f64::max)
}

fn synthesize(voice: SpeakerVoice, sample_rate: f64) -> Result<ImpulseResponse, ConvolutionError> {
    let len = ((CABINET_IR_SECONDS * sample_rate).round() as usize).max(1);
    let mut channels = vec![
        voice.render(sample_rate, len),
        voice.detuned(STEREO_DETUNE).render(sample_rate, len),
    ];

    let peak = channels
        .iter()
        .map(|taps| peak_magnitude(taps, sample_rate))
        .fold(0.0, f64::max);
    if peak > 0.0 {
        let scale = (1.0 / peak) as f32;
        for tap in channels.iter_mut().flatten() {
            *tap *= scale;
        }
    }

    ImpulseResponse::new(channels)
}

/// Response used by `model` at `sample_rate`, or `None` for no cabinet.
pub fn impulse_response(
    model: &CabinetModel,
    sample_rate: f64,
) -> Result<Option<ImpulseResponse>, ConvolutionError> {
    match model {
        CabinetModel::None => Ok(None),
        CabinetModel::Closed4x12 => synthesize(CLOSED_4X12, sample_rate).map(Some),
        CabinetModel::Open2x12 => synthesize(OPEN_2X12, sample_rate).map(Some),
        CabinetModel::Custom(ir) => Ok(Some(ir.clone())),
    }
}

/// Build the engine for one channel of a response.
pub fn make_convolver(taps: &[f32]) -> Result<Box<dyn Convolver>, ConvolutionError> {
    if taps.len() <= DIRECT_MAX_TAPS {
        Ok(Box::new(DirectConvolver::new(taps)?))
    } else {
        Ok(Box::new(PartitionedConvolver::new(taps, PARTITION_SIZE)?))
    }
}

/// Per-channel cabinet convolution.
///
/// Channels beyond the response's channel count reuse its last channel.
/// With [`CabinetModel::None`] the stage is a passthrough.
pub struct Cabinet {
    convolvers: Vec<Box<dyn Convolver>>,
    ir_len: usize,
}

impl Cabinet {
    /// Load `model` for `num_channels` channels.
    pub fn new(
        model: &CabinetModel,
        sample_rate: f64,
        num_channels: usize,
    ) -> Result<Self, ConvolutionError> {
        let Some(ir) = impulse_response(model, sample_rate)? else {
            return Ok(Self::bypass());
        };
        let convolvers = (0..num_channels)
            .map(|ch| make_convolver(ir.channel(ch)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            convolvers,
            ir_len: ir.len(),
        })
    }

    /// Passthrough cabinet.
    pub fn bypass() -> Self {
        Self {
            convolvers: Vec::new(),
            ir_len: 0,
        }
    }

    /// Whether the stage passes audio through untouched.
    pub fn is_bypassed(&self) -> bool {
        self.convolvers.is_empty()
    }

    /// Response length in samples, 0 when bypassed.
    pub fn ir_len(&self) -> usize {
        self.ir_len
    }

    /// Convolve one channel in place.
    #[inline]
    pub fn process_block(&mut self, channel: usize, buffer: &mut [f32]) {
        if let Some(convolver) = self.convolvers.get_mut(channel) {
            convolver.process_block(buffer);
        }
    }

    /// Clear convolution history.
    pub fn reset(&mut self) {
        for convolver in &mut self.convolvers {
            convolver.reset();
        }
    }

    /// Added latency in samples.
    pub fn latency_samples(&self) -> usize {
        self.convolvers
            .iter()
            .map(|c| c.latency_samples())
            .max()
            .unwrap_or(0)
    }
}

impl core::fmt::Debug for Cabinet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cabinet")
            .field("channels", &self.convolvers.len())
            .field("ir_len", &self.ir_len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 48000.0;

    #[test]
    fn builtin_responses_are_normalized() {
        for model in [CabinetModel::Closed4x12, CabinetModel::Open2x12] {
            let ir = impulse_response(&model, SR).unwrap().unwrap();
            assert_eq!(ir.num_channels(), 2);
            assert_eq!(ir.len(), 1920);
            let peak = (0..2)
                .map(|ch| peak_magnitude(ir.channel(ch), SR))
                .fold(0.0, f64::max);
            assert!((peak - 1.0).abs() < 1e-4, "{model:?} peak {peak}");
        }
    }

    #[test]
    fn response_decays() {
        let ir = impulse_response(&CabinetModel::Closed4x12, SR).unwrap().unwrap();
        let taps = ir.channel(0);
        let head: f32 = taps[..480].iter().map(|x| x * x).sum();
        let tail: f32 = taps[1440..].iter().map(|x| x * x).sum();
        assert!(tail < head * 1e-2, "head {head} tail {tail}");
    }

    #[test]
    fn stereo_channels_differ() {
        let ir = impulse_response(&CabinetModel::Open2x12, SR).unwrap().unwrap();
        assert_ne!(ir.channel(0), ir.channel(1));
    }

    #[test]
    fn cabinet_rolls_off_highs() {
        let ir = impulse_response(&CabinetModel::Closed4x12, SR).unwrap().unwrap();
        let mid = fir_magnitude(ir.channel(0), 2500.0, SR);
        let high = fir_magnitude(ir.channel(0), 15000.0, SR);
        assert!(high < mid * 0.1, "mid {mid} high {high}");
    }

    #[test]
    fn identity_response_passes_through() {
        let model = CabinetModel::Custom(ImpulseResponse::identity(1));
        let mut cab = Cabinet::new(&model, SR, 2).unwrap();
        assert!(!cab.is_bypassed());
        let input: Vec<f32> = (0..300).map(|i| libm::sinf(i as f32 * 0.1)).collect();
        for ch in 0..2 {
            let mut block = input.clone();
            cab.process_block(ch, &mut block);
            assert_eq!(block, input);
        }
    }

    #[test]
    fn no_cabinet_is_bypass() {
        let mut cab = Cabinet::new(&CabinetModel::None, SR, 2).unwrap();
        assert!(cab.is_bypassed());
        assert_eq!(cab.ir_len(), 0);
        let mut block = [0.25f32, -0.5, 1.0];
        cab.process_block(1, &mut block);
        assert_eq!(block, [0.25, -0.5, 1.0]);
    }

    #[test]
    fn long_responses_use_fft_engine_without_latency() {
        let cab = Cabinet::new(&CabinetModel::Closed4x12, SR, 2).unwrap();
        assert_eq!(cab.ir_len(), 1920);
        assert_eq!(cab.latency_samples(), 0);
    }

    #[test]
    fn reset_clears_tail() {
        let mut cab = Cabinet::new(&CabinetModel::Closed4x12, SR, 1).unwrap();
        let mut block = vec![0.5f32; 512];
        cab.process_block(0, &mut block);
        cab.reset();
        let mut silence = vec![0.0f32; 2048];
        cab.process_block(0, &mut silence);
        assert!(silence.iter().all(|&s| s == 0.0));
    }
}
