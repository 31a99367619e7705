//! Sine low-frequency oscillator for modulation.

use core::f32::consts::TAU;
use libm::sinf;

/// Phase-accumulator sine LFO.
///
/// The phase lives in `[0, 1)` and advances by `frequency / sample_rate`
/// each sample, wrapping at 1.0. A per-instance phase offset (restored on
/// [`reset`](Self::reset)) gives stereo voices their spread.
///
/// # Example
///
/// ```rust
/// use ampsim_core::Lfo;
///
/// let mut lfo = Lfo::new(48000.0, 1.0);
/// assert_eq!(lfo.next(), 0.0);
///
/// let mut right = Lfo::with_phase_offset(48000.0, 1.0, 0.5);
/// assert!(right.next().abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    /// Current phase position [0.0, 1.0)
    phase: f32,
    /// Phase increment per sample
    phase_inc: f32,
    /// Phase restored by `reset`
    phase_offset: f32,
    sample_rate: f32,
}

impl Lfo {
    /// Create an LFO starting at phase 0.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        Self::with_phase_offset(sample_rate, freq_hz, 0.0)
    }

    /// Create an LFO starting at `phase_offset` cycles (wrapped into `[0, 1)`).
    pub fn with_phase_offset(sample_rate: f32, freq_hz: f32, phase_offset: f32) -> Self {
        let phase_offset = wrap_phase(phase_offset);
        Self {
            phase: phase_offset,
            phase_inc: freq_hz / sample_rate,
            phase_offset,
            sample_rate,
        }
    }

    /// Set the oscillation frequency in Hz. Phase is preserved.
    #[inline]
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.phase_inc = freq_hz / self.sample_rate;
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.phase_inc * self.sample_rate
    }

    /// Update the sample rate, keeping the frequency in Hz.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        let freq = self.frequency();
        self.sample_rate = sample_rate;
        self.phase_inc = freq / sample_rate;
    }

    /// Current phase (0.0 - 1.0).
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Return to the configured phase offset.
    pub fn reset(&mut self) {
        self.phase = self.phase_offset;
    }

    /// Sine sample for the current phase, then advance one sample.
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> f32 {
        let output = sinf(self.phase * TAU);
        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        output
    }
}

fn wrap_phase(phase: f32) -> f32 {
    let wrapped = phase - libm::floorf(phase);
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}
