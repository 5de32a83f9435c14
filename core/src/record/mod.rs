pub mod capture;
pub mod window;

pub use capture::{Component, Record, T3W_CALIBRATION};
pub use window::Window;
