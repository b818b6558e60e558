pub mod assembler;
pub mod curated;
pub mod error;
pub mod reference;
pub mod resolver;
pub mod types;

pub use assembler::*;
pub use curated::*;
pub use error::*;
pub use resolver::*;
pub use types::*;
