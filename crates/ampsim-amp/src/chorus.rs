//! Modulated-delay chorus.
//!
//! Per channel and per sample:
//!
//! 1. advance the rate, depth and mix ramps
//! 2. write the input into the delay line
//! 3. take the next LFO sample
//! 4. read the line at `5 ms + lfo · depth`, linearly interpolated
//! 5. crossfade dry and delayed by the mix
//!
//! Odd channels run the LFO half a cycle ahead for stereo width. All three
//! controls ramp linearly over 20 ms and the ramps carry across block
//! boundaries.

use ampsim_core::{InterpolatedDelay, LinearSmoothedParam, Lfo, ms_to_samples, wet_dry_mix};

/// Centre delay in milliseconds.
pub const BASE_DELAY_MS: f32 = 5.0;
/// Largest modulation excursion in milliseconds.
pub const MAX_DEPTH_MS: f32 = 3.0;
/// Ramp time of rate, depth and mix.
pub const SMOOTHING_MS: f32 = 20.0;

/// Headroom beyond the longest modulated delay.
const DELAY_HEADROOM_MS: f32 = 2.0;

/// One channel of the chorus.
#[derive(Debug, Clone)]
pub struct ChorusVoice {
    delay: InterpolatedDelay,
    lfo: Lfo,
    rate: LinearSmoothedParam,
    depth: LinearSmoothedParam,
    mix: LinearSmoothedParam,
    sample_rate: f32,
}

impl ChorusVoice {
    /// Voice at `sample_rate` with the LFO starting at `phase_offset` cycles.
    pub fn new(sample_rate: f32, phase_offset: f32) -> Self {
        let max_seconds = (BASE_DELAY_MS + MAX_DEPTH_MS + DELAY_HEADROOM_MS) / 1000.0;
        Self {
            delay: InterpolatedDelay::from_time(sample_rate, max_seconds),
            lfo: Lfo::with_phase_offset(sample_rate, 1.0, phase_offset),
            rate: LinearSmoothedParam::with_config(1.0, sample_rate, SMOOTHING_MS),
            depth: LinearSmoothedParam::with_config(0.0, sample_rate, SMOOTHING_MS),
            mix: LinearSmoothedParam::with_config(0.0, sample_rate, SMOOTHING_MS),
            sample_rate,
        }
    }

    /// Ramp targets: LFO rate in Hz, depth in ms, wet fraction.
    pub fn set_targets(&mut self, rate_hz: f32, depth_ms: f32, mix: f32) {
        self.rate.set_target(rate_hz.max(0.0));
        self.depth.set_target(depth_ms.clamp(0.0, MAX_DEPTH_MS));
        self.mix.set_target(mix.clamp(0.0, 1.0));
    }

    /// Finish every ramp now.
    pub fn snap(&mut self) {
        self.rate.snap_to_target();
        self.depth.snap_to_target();
        self.mix.snap_to_target();
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let rate = self.rate.advance();
        let depth = self.depth.advance();
        let mix = self.mix.advance();
        self.lfo.set_frequency(rate);

        self.delay.write(input);
        let modulation = self.lfo.next();
        let delay_samples = ms_to_samples(BASE_DELAY_MS + modulation * depth, self.sample_rate);
        let wet = self.delay.read(delay_samples);

        wet_dry_mix(input, wet, mix)
    }

    /// Clear the delay line, restart the LFO and finish the ramps.
    pub fn reset(&mut self) {
        self.delay.clear();
        self.lfo.reset();
        self.snap();
    }
}

/// Multichannel chorus with an enable switch.
///
/// While disabled the stage passes audio through and holds no state.
/// Enabling it clears the delay lines so no stale audio is replayed.
#[derive(Debug, Clone)]
pub struct Chorus {
    voices: Vec<ChorusVoice>,
    enabled: bool,
}

impl Chorus {
    /// Disabled chorus for `num_channels` channels.
    pub fn new(sample_rate: f32, num_channels: usize) -> Self {
        Self {
            voices: (0..num_channels)
                .map(|ch| ChorusVoice::new(sample_rate, if ch % 2 == 1 { 0.5 } else { 0.0 }))
                .collect(),
            enabled: false,
        }
    }

    /// Ramp targets on every channel.
    pub fn set_targets(&mut self, rate_hz: f32, depth_ms: f32, mix: f32) {
        for voice in &mut self.voices {
            voice.set_targets(rate_hz, depth_ms, mix);
        }
    }

    /// Switch the chorus on or off.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled && !self.enabled {
            self.reset();
        }
        self.enabled = enabled;
    }

    /// Whether the chorus is running.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Finish every ramp now.
    pub fn snap(&mut self) {
        for voice in &mut self.voices {
            voice.snap();
        }
    }

    /// Process one channel in place.
    pub fn process_block(&mut self, channel: usize, buffer: &mut [f32]) {
        if !self.enabled {
            return;
        }
        let voice = &mut self.voices[channel];
        for sample in buffer.iter_mut() {
            *sample = voice.process(*sample);
        }
    }

    /// Reset every voice.
    pub fn reset(&mut self) {
        for voice in &mut self.voices {
            voice.reset();
        }
    }
}
