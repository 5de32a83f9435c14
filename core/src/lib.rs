//! Horizontal-to-vertical spectral ratio (HVSR) core for three-component
//! microtremor records.
//!
//! A [`Record`] is cut into fixed-length windows, each channel of each window
//! is turned into a smoothed amplitude spectrum, the three spectra form one
//! H/V curve per window, and the curves of one or more records merge into a
//! single curve with log-normal bounds and a resonance peak. Every stage is a
//! pure function of immutable inputs.

pub mod math;
pub mod prelude;
pub mod processing;
pub mod record;
pub mod telemetry;

pub use prelude::{HvsrConfig, HvsrError, HvsrResult};
pub use processing::{
    compute_hvsr, compute_hvsr_with_check, merge_hvsr, HvsrAnalysis, HvsrCurve, MergeInput,
    MergedResult,
};
pub use record::{Component, Record, Window};
