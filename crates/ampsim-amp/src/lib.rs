//! ampsim Amp - the amplifier signal chain
//!
//! Builds a complete guitar amp from the `ampsim-core` primitives:
//!
//! - [`AmpParams`] - Lock-free store of normalized controls
//! - [`ToneStack`] - Bass/middle/treble/presence bands plus a DC high-pass
//! - [`stages`] - Preamp, drive, power amp with sag and output transformer
//! - [`Cabinet`] - Loudspeaker impulse-response convolution
//! - [`Chorus`] - Modulated-delay chorus with smoothed controls
//! - [`AmpEngine`] - Wires everything together per block
//!
//! # Signal Flow
//!
//! ```text
//! input → [oversampled: nonlinear chain] → tone stack → cabinet → chorus → master → limiter
//! ```
//!
//! # Example
//!
//! ```rust
//! use ampsim_amp::{AmpConfig, AmpEngine, ParamId};
//!
//! let mut engine = AmpEngine::new(AmpConfig::clean());
//! engine.prepare(44100.0, 128, 1);
//! engine.set_param(ParamId::Treble, 0.7);
//!
//! let mut block = [0.2f32; 128];
//! engine.process(&mut [&mut block[..]]);
//! ```

pub mod cabinet;
pub mod chorus;
pub mod config;
pub mod engine;
pub mod error;
pub mod params;
pub mod stages;
pub mod tone_stack;

pub use cabinet::Cabinet;
pub use chorus::{Chorus, ChorusVoice};
pub use config::{AmpConfig, CabinetModel, Voicing, oversampling_from_factor};
pub use engine::{AmpEngine, LIMITER_THRESHOLD, MIN_SAMPLE_RATE, ProcessSpec};
pub use error::{EngineError, ParamError};
pub use params::{AmpParams, ParamDescriptor, ParamId, ParamSnapshot, ParamUnit};
pub use stages::NonlinearChain;
pub use tone_stack::ToneStack;
