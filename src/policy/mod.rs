//! Layout placement policies.

pub mod grid;

pub use grid::GridPolicy;
