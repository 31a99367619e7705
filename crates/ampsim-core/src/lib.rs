//! ampsim Core - DSP primitives for the amplifier engine
//!
//! This crate provides the building blocks the amp chain is assembled from,
//! designed for real-time audio processing with zero allocation in the audio
//! path.
//!
//! # Core Abstractions
//!
//! ## Effect System
//!
//! - [`Effect`] - Object-safe per-channel processing trait
//!
//! ## Parameter Smoothing
//!
//! - [`SmoothedParam`] - Exponential smoothing (RC-like response)
//! - [`LinearSmoothedParam`] - Linear ramps (constant rate)
//!
//! ## Filters
//!
//! - [`BiquadCoefficients`] - Pure RBJ coefficient design for every [`FilterKind`]
//! - [`Biquad`] - Direct Form I second-order section with per-channel history
//!
//! ## Delay & Modulation
//!
//! - [`InterpolatedDelay`] - Circular buffer with linear fractional reads
//! - [`Lfo`] - Sine phase-accumulator LFO with phase offset
//! - [`EnvelopeFollower`] - Asymmetric attack/release level tracking
//!
//! ## Anti-Aliasing
//!
//! - [`Oversampler`] - Polyphase up/down sampler wrapping a per-sample closure
//!
//! ## Convolution
//!
//! - [`Convolver`] - Shared contract of the FIR engines
//! - [`DirectConvolver`] - Time-domain reference engine
//! - [`PartitionedConvolver`] - Zero-latency head + FFT tail engine
//! - [`ImpulseResponse`] - Validated multichannel response
//!
//! ## Utilities
//!
//! - Math functions: [`db_to_linear`], [`linear_to_db`], [`fast_tanh`],
//!   [`asymmetric_clip`], [`threshold_saturate`], [`wet_dry_mix`], etc.
//!
//! # Example
//!
//! ```rust
//! use ampsim_core::{Biquad, BiquadCoefficients, FilterKind, db_to_linear};
//!
//! let coeffs = BiquadCoefficients::design(
//!     FilterKind::LowShelf,
//!     48000.0,
//!     120.0,
//!     0.7,
//!     db_to_linear(6.0),
//! );
//! let mut bass = Biquad::with_coefficients(coeffs);
//! let y = bass.process(0.5);
//! assert!(y.is_finite());
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: No allocations in audio processing paths
//! - **Deterministic**: All transcendental math goes through `libm`
//! - **Prepare-time sizing**: Every buffer is sized at construction

pub mod biquad;
pub mod convolution;
pub mod delay;
pub mod effect;
pub mod envelope;
pub mod lfo;
pub mod math;
pub mod oversample;
pub mod param;

// Re-export main types at crate root
pub use biquad::{Biquad, BiquadCoefficients, FilterKind};
pub use convolution::{
    ConvolutionError, Convolver, DirectConvolver, ImpulseResponse, PartitionedConvolver,
};
pub use delay::InterpolatedDelay;
pub use effect::Effect;
pub use envelope::EnvelopeFollower;
pub use lfo::Lfo;
pub use math::{
    ClipCurve, asymmetric_clip, db_to_linear, fast_tanh, flush_denormal, lerp, linear_to_db,
    ms_to_samples, threshold_saturate, wet_dry_mix,
};
pub use oversample::{OversampleFactor, Oversampler, TAPS_PER_PHASE};
pub use param::{LinearSmoothedParam, SmoothedParam};
