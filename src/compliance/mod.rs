pub mod audit;
pub mod pii;
pub mod safety;

pub use pii::*;
pub use safety::*;
