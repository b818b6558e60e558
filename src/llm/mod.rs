pub mod factory;
pub mod interface;
pub mod mapper;
pub mod openai_compatible;
#[cfg(test)]
pub mod testing;

pub use factory::*;
pub use interface::*;
pub use mapper::*;
pub use openai_compatible::*;
