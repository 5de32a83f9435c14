pub mod aggregate;
pub mod curve;
pub mod pipeline;
pub mod quality;
pub mod ratio;
pub mod spectrum;
pub mod windower;

pub use aggregate::{Aggregator, MergedResult};
pub use curve::HvsrCurve;
pub use pipeline::{compute_hvsr, compute_hvsr_with_check, merge_hvsr, HvsrAnalysis, MergeInput};
pub use quality::{AmplitudeLimit, QualityCheck, QualitySuite, QualityVerdict, StaLtaLimit};
pub use ratio::RatioComputer;
pub use spectrum::{SpectralEstimator, Spectrum};
pub use windower::{RejectReason, RejectedWindow, WindowSet, Windower};
