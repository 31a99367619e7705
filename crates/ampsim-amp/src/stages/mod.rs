//! Nonlinear stage chain.
//!
//! Every stage is an [`Effect`] processing one sample at a time with no
//! lookahead. [`NonlinearChain`] runs them in voicing order and is the
//! closure the oversampler wraps:
//!
//! ```text
//! Tube:  Preamp → DriveStage → PowerAmp → OutputTransformer
//! Clean: CleanPreamp
//! ```
//!
//! Smoothers inside the chain run at whatever rate the chain is driven at,
//! so the engine passes the oversampled rate to [`Effect::set_sample_rate`].

mod drive;
mod power_amp;
mod preamp;
mod transformer;

pub use drive::{DRIVE_CEILING, DriveStage};
pub use power_amp::PowerAmp;
pub use preamp::{CleanPreamp, Preamp};
pub use transformer::OutputTransformer;

use ampsim_core::Effect;

use crate::config::Voicing;

/// The voiced nonlinear chain for one channel.
#[derive(Debug, Clone)]
pub struct NonlinearChain {
    voicing: Voicing,
    preamp: Preamp,
    clean: CleanPreamp,
    drive: DriveStage,
    power: PowerAmp,
    transformer: OutputTransformer,
}

impl NonlinearChain {
    /// Chain for `voicing` running at `sample_rate`.
    pub fn new(voicing: Voicing, sample_rate: f32) -> Self {
        Self {
            voicing,
            preamp: Preamp::new(sample_rate),
            clean: CleanPreamp::new(),
            drive: DriveStage::new(sample_rate),
            power: PowerAmp::new(sample_rate),
            transformer: OutputTransformer::new(),
        }
    }

    /// Set the smoothed targets for the block: preamp gain multiplier and
    /// drive amount. The clean voicing has fixed gain and ignores both.
    pub fn set_targets(&mut self, preamp_gain: f32, drive_amount: f32) {
        self.preamp.set_gain(preamp_gain);
        self.drive.set_amount(drive_amount);
    }

    /// Jump every smoother to its target.
    pub fn snap(&mut self) {
        self.preamp.snap();
        self.drive.snap();
    }
}

impl Effect for NonlinearChain {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        match self.voicing {
            Voicing::Tube => {
                let x = self.preamp.process(input);
                let x = self.drive.process(x);
                let x = self.power.process(x);
                self.transformer.process(x)
            }
            Voicing::Clean => self.clean.process(input),
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.preamp.set_sample_rate(sample_rate);
        self.drive.set_sample_rate(sample_rate);
        self.power.set_sample_rate(sample_rate);
        self.transformer.set_sample_rate(sample_rate);
        self.clean.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.preamp.reset();
        self.drive.reset();
        self.power.reset();
        self.transformer.reset();
        self.clean.reset();
    }
}
