pub mod manager;
pub mod registry;
pub mod tree;
pub mod types;

#[cfg(test)]
mod tests;

pub use manager::*;
pub use registry::*;
pub use tree::*;
pub use types::*;
