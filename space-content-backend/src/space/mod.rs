//! Aggregates everything that targets one space.

pub mod assembler;
pub mod merger;
pub mod model;
pub mod offers;
pub mod scheduling;
pub mod selector;

pub use assembler::{assemble_space, SpaceContent};
