pub mod fft;
pub mod interp;
pub mod smoothing;
pub mod stats;
pub mod taper;

pub use fft::FftHelper;
pub use stats::{LogStats, StatsHelper};
