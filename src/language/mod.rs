pub mod detector;
pub mod normalizer;
pub mod registry;

pub use detector::*;
pub use normalizer::*;
