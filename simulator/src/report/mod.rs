pub mod csv;
pub mod model;
