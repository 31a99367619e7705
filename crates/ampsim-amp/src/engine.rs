//! The amplifier engine.
//!
//! [`AmpEngine`] owns every stage and runs them in a fixed order on each
//! block:
//!
//! ```text
//! params snapshot → tone-stack redesign (on change)
//!   → nonlinear chain (inside the oversampler)
//!   → tone stack → cabinet → chorus → master gain → limiter
//! ```
//!
//! All memory is allocated in [`prepare`](AmpEngine::prepare). The process
//! calls never allocate, lock or return errors. Calling them before
//! `prepare`, or with a different channel count or a longer block than was
//! prepared, is a programming error and panics.

use std::sync::Arc;

use ampsim_core::{Effect, Oversampler, SmoothedParam, threshold_saturate};

use crate::cabinet::Cabinet;
use crate::chorus::Chorus;
use crate::config::AmpConfig;
use crate::error::EngineError;
use crate::params::{AmpParams, ParamId, ParamSnapshot};
use crate::stages::NonlinearChain;
use crate::tone_stack::ToneStack;

/// Knee of the output limiter.
pub const LIMITER_THRESHOLD: f32 = 0.9;

/// Lowest base sample rate [`AmpEngine::try_prepare`] accepts, in Hz.
pub const MIN_SAMPLE_RATE: f64 = 8000.0;

const MASTER_SMOOTHING_MS: f32 = 10.0;

/// Arguments of [`AmpEngine::prepare`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    /// Base sample rate in Hz
    pub sample_rate: f64,
    /// Longest block `process` will receive
    pub max_block_size: usize,
    /// Number of audio channels
    pub num_channels: usize,
}

impl ProcessSpec {
    /// Check the arguments are usable.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.sample_rate.is_finite() || self.sample_rate < MIN_SAMPLE_RATE {
            return Err(EngineError::InvalidSampleRate(self.sample_rate));
        }
        if self.max_block_size == 0 {
            return Err(EngineError::ZeroBlockSize);
        }
        if self.num_channels == 0 {
            return Err(EngineError::ZeroChannels);
        }
        Ok(())
    }
}

/// Everything sized at prepare time.
struct Prepared {
    spec: ProcessSpec,
    tone_stack: ToneStack,
    chains: Vec<NonlinearChain>,
    oversampler: Option<Oversampler>,
    cabinet: Cabinet,
    chorus: Chorus,
    master: Vec<SmoothedParam>,
    limiter: bool,
    /// One channel of an interleaved block.
    scratch: Vec<f32>,
}

impl Prepared {
    fn new(config: &AmpConfig, spec: ProcessSpec, params: &ParamSnapshot) -> Result<Self, EngineError> {
        spec.validate()?;

        let base_rate = spec.sample_rate as f32;
        let oversampler = config
            .oversampling
            .map(|factor| Oversampler::new(factor, spec.num_channels));
        let chain_rate = base_rate * config.oversampling_factor() as f32;

        let mut prepared = Self {
            spec,
            tone_stack: ToneStack::new(config.voicing, spec.sample_rate, spec.num_channels),
            chains: (0..spec.num_channels)
                .map(|_| NonlinearChain::new(config.voicing, chain_rate))
                .collect(),
            oversampler,
            cabinet: Cabinet::new(&config.cabinet, spec.sample_rate, spec.num_channels)?,
            chorus: Chorus::new(base_rate, spec.num_channels),
            master: (0..spec.num_channels)
                .map(|_| SmoothedParam::with_config(params.master_gain(), base_rate, MASTER_SMOOTHING_MS))
                .collect(),
            limiter: config.limiter,
            scratch: vec![0.0; spec.max_block_size],
        };

        prepared.begin_block(params);
        prepared.snap();
        Ok(prepared)
    }

    /// Push one parameter snapshot into every stage.
    fn begin_block(&mut self, params: &ParamSnapshot) {
        self.tone_stack.update(params);

        let (preamp_gain, drive_amount) = (params.preamp_gain(), params.drive_amount());
        for chain in &mut self.chains {
            chain.set_targets(preamp_gain, drive_amount);
        }

        self.chorus
            .set_targets(params.chorus_rate_hz(), params.chorus_depth_ms(), params.chorus_mix());
        self.chorus.set_enabled(params.chorus_enabled());

        let master = params.master_gain();
        for gain in &mut self.master {
            gain.set_target(master);
        }
    }

    /// Finish every parameter ramp.
    fn snap(&mut self) {
        for chain in &mut self.chains {
            chain.snap();
        }
        self.chorus.snap();
        for gain in &mut self.master {
            gain.snap_to_target();
        }
    }

    fn process_channel(&mut self, channel: usize, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            if !sample.is_finite() {
                *sample = 0.0;
            }
        }

        let chain = &mut self.chains[channel];
        match self.oversampler.as_mut() {
            Some(oversampler) => oversampler.process_block(channel, buffer, |x| chain.process(x)),
            None => chain.process_block_inplace(buffer),
        }

        self.tone_stack.process_block(channel, buffer);
        self.cabinet.process_block(channel, buffer);
        self.chorus.process_block(channel, buffer);

        let master = &mut self.master[channel];
        for sample in buffer.iter_mut() {
            *sample *= master.advance();
        }
        if self.limiter {
            for sample in buffer.iter_mut() {
                *sample = threshold_saturate(*sample, LIMITER_THRESHOLD);
            }
        }
    }

    fn reset(&mut self) {
        self.tone_stack.reset();
        for chain in &mut self.chains {
            chain.reset();
        }
        if let Some(oversampler) = self.oversampler.as_mut() {
            oversampler.reset();
        }
        self.cabinet.reset();
        self.chorus.reset();
        for gain in &mut self.master {
            gain.snap_to_target();
        }
    }

    fn latency_samples(&self) -> usize {
        self.oversampler.as_ref().map_or(0, Oversampler::latency_samples)
            + self.cabinet.latency_samples()
    }
}

/// Tube amp simulator: tone stack, nonlinear chain, cabinet and chorus.
///
/// Parameters live in a shared [`AmpParams`] that any thread may write; the
/// engine reads them once at the start of each block.
///
/// # Example
///
/// ```rust
/// use ampsim_amp::{AmpConfig, AmpEngine, ParamId};
///
/// let mut engine = AmpEngine::new(AmpConfig::tube());
/// engine.prepare(48000.0, 256, 2);
/// engine.set_param(ParamId::Drive, 0.8);
///
/// let mut left = vec![0.1f32; 256];
/// let mut right = vec![-0.1f32; 256];
/// engine.process(&mut [left.as_mut_slice(), right.as_mut_slice()]);
/// assert!(left.iter().all(|s| s.abs() <= 1.0));
/// ```
pub struct AmpEngine {
    config: AmpConfig,
    params: Arc<AmpParams>,
    prepared: Option<Prepared>,
}

impl AmpEngine {
    /// Unprepared engine with the voicing's default parameters.
    pub fn new(config: AmpConfig) -> Self {
        let params = Arc::new(AmpParams::for_voicing(config.voicing));
        Self::with_params(config, params)
    }

    /// Unprepared engine reading from an existing parameter store.
    pub fn with_params(config: AmpConfig, params: Arc<AmpParams>) -> Self {
        Self {
            config,
            params,
            prepared: None,
        }
    }

    /// Shared parameter store. Clone the `Arc` to write from another thread.
    pub fn params(&self) -> &Arc<AmpParams> {
        &self.params
    }

    /// Set a normalized parameter, clamped to `[0, 1]`.
    pub fn set_param(&self, id: ParamId, value: f32) {
        self.params.set(id, value);
    }

    /// Set an on/off parameter.
    pub fn set_switch(&self, id: ParamId, on: bool) {
        self.params.set_switch(id, on);
    }

    /// Active configuration.
    pub fn config(&self) -> &AmpConfig {
        &self.config
    }

    /// Replace the configuration, re-preparing if the engine was prepared.
    ///
    /// On error the previous configuration and state are kept.
    pub fn set_config(&mut self, config: AmpConfig) -> Result<(), EngineError> {
        if let Some(spec) = self.spec() {
            self.prepared = Some(Prepared::new(&config, spec, &self.params.snapshot())?);
        }
        tracing::debug!(
            voicing = %config.voicing,
            oversampling = config.oversampling_factor(),
            cabinet = config.cabinet.name(),
            limiter = config.limiter,
            "amp configuration changed"
        );
        self.config = config;
        Ok(())
    }

    /// Allocate and initialize every stage.
    ///
    /// Preparing again rebuilds the engine from scratch with the current
    /// parameters.
    ///
    /// # Panics
    ///
    /// Panics if the arguments are invalid or the cabinet response can not
    /// be loaded. Use [`try_prepare`](Self::try_prepare) to handle these.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize, num_channels: usize) {
        if let Err(err) = self.try_prepare(sample_rate, max_block_size, num_channels) {
            panic!("AmpEngine::prepare failed: {err}");
        }
    }

    /// Checked variant of [`prepare`](Self::prepare).
    pub fn try_prepare(
        &mut self,
        sample_rate: f64,
        max_block_size: usize,
        num_channels: usize,
    ) -> Result<(), EngineError> {
        let spec = ProcessSpec {
            sample_rate,
            max_block_size,
            num_channels,
        };
        let prepared = Prepared::new(&self.config, spec, &self.params.snapshot())?;

        tracing::info!(
            sample_rate,
            max_block_size,
            num_channels,
            voicing = %self.config.voicing,
            oversampling = self.config.oversampling_factor(),
            cabinet = self.config.cabinet.name(),
            cabinet_ir_len = prepared.cabinet.ir_len(),
            "amp engine prepared"
        );

        self.prepared = Some(prepared);
        Ok(())
    }

    /// Whether `prepare` has succeeded.
    pub fn is_prepared(&self) -> bool {
        self.prepared.is_some()
    }

    /// Arguments of the last successful `prepare`.
    pub fn spec(&self) -> Option<ProcessSpec> {
        self.prepared.as_ref().map(|p| p.spec)
    }

    /// Clear all audio history. Parameters and configuration are kept and
    /// parameter ramps finish immediately.
    pub fn reset(&mut self) {
        if let Some(prepared) = self.prepared.as_mut() {
            prepared.begin_block(&self.params.snapshot());
            prepared.reset();
            tracing::debug!("amp engine reset");
        }
    }

    /// Latency in base-rate samples.
    pub fn latency_samples(&self) -> usize {
        self.prepared.as_ref().map_or(0, Prepared::latency_samples)
    }

    fn prepared_mut(&mut self) -> &mut Prepared {
        match self.prepared.as_mut() {
            Some(prepared) => prepared,
            None => panic!("AmpEngine used before prepare"),
        }
    }

    /// Process planar channels in place.
    ///
    /// # Panics
    ///
    /// Panics if the engine is not prepared, the channel count differs from
    /// the prepared one, or a channel is longer than the prepared block size.
    pub fn process(&mut self, channels: &mut [&mut [f32]]) {
        let params = self.params.snapshot();
        let prepared = self.prepared_mut();
        assert_eq!(
            channels.len(),
            prepared.spec.num_channels,
            "channel count differs from prepare"
        );
        prepared.begin_block(&params);

        for (channel, buffer) in channels.iter_mut().enumerate() {
            assert!(
                buffer.len() <= prepared.spec.max_block_size,
                "block of {} samples exceeds prepared maximum {}",
                buffer.len(),
                prepared.spec.max_block_size
            );
            prepared.process_channel(channel, buffer);
        }
    }

    /// Process an interleaved block in place.
    ///
    /// # Panics
    ///
    /// Same conditions as [`process`](Self::process), and if the buffer
    /// length is not a multiple of `num_channels`.
    pub fn process_interleaved(&mut self, buffer: &mut [f32], num_channels: usize) {
        let params = self.params.snapshot();
        let prepared = self.prepared_mut();
        assert_eq!(
            num_channels, prepared.spec.num_channels,
            "channel count differs from prepare"
        );
        assert_eq!(
            buffer.len() % num_channels,
            0,
            "interleaved buffer is not a whole number of frames"
        );
        let frames = buffer.len() / num_channels;
        assert!(
            frames <= prepared.spec.max_block_size,
            "block of {frames} frames exceeds prepared maximum {}",
            prepared.spec.max_block_size
        );
        prepared.begin_block(&params);

        let mut scratch = std::mem::take(&mut prepared.scratch);
        for channel in 0..num_channels {
            let lane = &mut scratch[..frames];
            for (dst, src) in lane.iter_mut().zip(buffer.iter().skip(channel).step_by(num_channels)) {
                *dst = *src;
            }
            prepared.process_channel(channel, lane);
            for (dst, src) in buffer.iter_mut().skip(channel).step_by(num_channels).zip(lane.iter()) {
                *dst = *src;
            }
        }
        prepared.scratch = scratch;
    }
}

impl core::fmt::Debug for AmpEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AmpEngine")
            .field("config", &self.config)
            .field("spec", &self.spec())
            .finish_non_exhaustive()
    }
}
