//! Type metadata module.
//!
//! Registries, descriptors and the builder used to describe assemblies.

pub use autowire_types::*;
