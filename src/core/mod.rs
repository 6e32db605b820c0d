//! Core domain models for niakrun
//!
//! This module covers the translation layer: subject range expressions,
//! Boutique descriptors, tuning files and the Octave script they all
//! feed into.

pub mod descriptor;
pub mod script;
pub mod subjects;
pub mod tuning;
pub mod value;

pub use descriptor::*;
pub use script::*;
pub use tuning::*;
pub use value::*;
