//! # Types
//!
//! Small value types shared by the accessor, provider and resolver layers.

pub mod address;

pub use address::{Address, PointerSize};
