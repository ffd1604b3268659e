//! Resolution engine module.
//!
//! This module provides the container, the lifetime and implementation
//! search machinery, and the error types a resolution can produce.
//!
//! # Examples
//!
//! ```rust
//! use autowire::di::{Container, ContainerConfig};
//! use autowire::types::TypeRegistry;
//!
//! let config = ContainerConfig::from_toml_str("namespace_tie_break = false").unwrap();
//! let container = Container::builder(TypeRegistry::empty()).config(config).build();
//! assert!(!container.config().namespace_tie_break);
//! ```

pub use autowire_di::*;
