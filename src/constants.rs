//! Fixed engine parameters and control-surface limits
//!
//! The filter order and sample rate are compile-time constants so that all
//! per-channel state lives in fixed-size arrays and the audio path never
//! touches the heap once a speaker has been seen.

/// Nominal input sample rate in Hz.
/// The voice codecs delivered by the host all decode to 48 kHz.
pub const SAMPLE_RATE: f64 = 48_000.0;

/// Order of the Butterworth low-pass filter (samples of history per channel).
pub const FILTER_ORDER: usize = 8;

/// Number of coefficients in each of the feedforward and feedback vectors.
pub const COEFFICIENT_COUNT: usize = FILTER_ORDER + 1;

/// Lowest cutoff accepted by the control surface in Hz.
pub const MIN_CUTOFF_HZ: u32 = 0;

/// Lowest non-zero cutoff the order-8 direct form can realise at
/// `SAMPLE_RATE`. Lower settings are designed at this frequency.
pub const MIN_DESIGN_CUTOFF_HZ: u32 = 300;

/// Highest cutoff accepted by the control surface in Hz.
pub const MAX_CUTOFF_HZ: u32 = 10_000;

/// Cutoff offered for a speaker that has no setting yet.
pub const DEFAULT_CUTOFF_HZ: u32 = 4_000;

/// Granularity of the cutoff slider.
pub const CUTOFF_STEP_HZ: u32 = 100;

/// Page step of the cutoff slider.
pub const CUTOFF_PAGE_HZ: u32 = 1_000;
