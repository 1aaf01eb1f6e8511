//! Command implementations.

mod mirror;

pub use mirror::execute;
