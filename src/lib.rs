//! # Autowire
//!
//! Zero-configuration dependency injection for Rust.
//!
//! Types describe themselves once (constructors, implemented interfaces,
//! an optional lifetime annotation) and the container works out the rest:
//! which constructor to call, which implementation of an abstract type the
//! requester should receive, and whether the result is shared or fresh.
//!
//! ## Feature Flags
//!
//! - `dev-tools` - Dependency graph visualization (DOT output, cycle report)
//! - `full` - All features enabled
//!
//! ## Quick Start
//!
//! ```rust
//! use autowire::{Container, ConstructorSpec, Lifetime, TypeRegistry, resolve};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Settings;
//!
//! struct Repository {
//!     _settings: Arc<Settings>,
//! }
//!
//! let registry = TypeRegistry::builder()
//!     .assembly("app", |asm| {
//!         asm.in_namespace("app")
//!             .concrete::<Settings, _>(|ty| {
//!                 ty.lifetime(Lifetime::Singleton)
//!                     .constructor(ConstructorSpec::default_public());
//!             })
//!             .concrete::<Repository, _>(|ty| {
//!                 ty.constructor(
//!                     ConstructorSpec::public(|a| Ok(Repository { _settings: a.take()? }))
//!                         .param::<Settings>(),
//!                 );
//!             });
//!     })
//!     .build();
//!
//! let container = Container::with_registry(registry);
//! let first = resolve!(container, Repository).unwrap();
//! let second = container.resolve::<Repository>().unwrap();
//! assert!(Arc::ptr_eq(&first, &second));
//! ```
//!
//! ## Modules
//!
//! - [`di`] - Container, lifetime inference and implementation search
//! - [`types`] - Type registry and assembly description

pub mod di;
pub mod types;

pub use autowire_di::{
	ConfigError, Container, ContainerBuilder, ContainerConfig, DiError, DiErrorKind, DiResult,
	ResolutionContext, requesting_context, resolve,
};
pub use autowire_types::{
	ConstructorSpec, Lifetime, TypeKey, TypeRegistry, declare_assembly, register_types,
};

#[cfg(feature = "dev-tools")]
pub use autowire_di::visualization::{DependencyGraph, GraphStatistics};
