//! # Autowire Dependency Injection
//!
//! Zero-configuration dependency resolution. There is no registration API:
//! the container reads type metadata from a [`TypeRegistry`](autowire_types::TypeRegistry)
//! and works everything else out.
//!
//! ## Features
//!
//! - **Constructor selection**: the public constructor with the most parameters
//! - **Closest-first search**: abstract types resolve to the implementation
//!   nearest to the requester (same assembly, then referenced assemblies, then
//!   everything loaded; namespace distance breaks ties)
//! - **Lifetime inference**: explicit annotations, then disposability, then a
//!   transient cascade through dependencies; singleton otherwise
//! - **Validation**: cycles and captive dependencies are reported, not built
//! - **Thread-safe**: one container can be shared by any number of threads;
//!   each singleton is built exactly once
//!
//! ## Development Tools (dev-tools feature)
//!
//! - **Visualization**: render the graph a resolution would build in DOT format
//!
//! ## Example
//!
//! ```rust
//! use autowire_di::{Container, resolve};
//! use autowire_types::{ConstructorSpec, Lifetime, TypeRegistry};
//! use std::sync::Arc;
//!
//! trait Mailer: Send + Sync {
//!     fn send(&self, to: &str) -> String;
//! }
//!
//! #[derive(Default)]
//! struct SmtpMailer;
//!
//! impl Mailer for SmtpMailer {
//!     fn send(&self, to: &str) -> String {
//!         format!("smtp -> {to}")
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Message;
//!
//! let registry = TypeRegistry::builder()
//!     .assembly("mail", |asm| {
//!         asm.in_namespace("mail")
//!             .interface::<dyn Mailer, _>(|_| {})
//!             .concrete::<SmtpMailer, _>(|ty| {
//!                 ty.implements::<dyn Mailer, _>(|m| m as Arc<dyn Mailer>)
//!                     .constructor(ConstructorSpec::default_public());
//!             })
//!             .concrete::<Message, _>(|ty| {
//!                 ty.lifetime(Lifetime::Transient)
//!                     .constructor(ConstructorSpec::default_public());
//!             });
//!     })
//!     .build();
//!
//! let container = Container::with_registry(registry);
//!
//! let mailer = resolve!(container, dyn Mailer).unwrap();
//! assert_eq!(mailer.send("ops"), "smtp -> ops");
//!
//! let first = container.resolve::<Message>().unwrap();
//! let second = container.resolve::<Message>().unwrap();
//! assert!(!Arc::ptr_eq(&first, &second));
//! ```

pub mod config;
pub mod constructor;
pub mod container;
pub mod context;
pub mod cycle_detection;
pub mod error;
pub mod factory;
pub mod finder;
pub mod lifetime;
pub mod scope;

#[cfg(feature = "dev-tools")]
pub mod visualization;

pub use config::{ConfigError, ContainerConfig};
pub use constructor::ConstructorSelector;
pub use container::{Container, ContainerBuilder, ResolutionPhase};
pub use context::{ResolutionContext, ResolutionSession};
pub use cycle_detection::{CycleError, ResolutionGuard, ResolutionPass, ResolutionStack};
pub use error::{DiError, DiErrorKind, DiResult};
pub use factory::{DependencyResolver, InstanceFactory};
pub use finder::ImplementationFinder;
pub use lifetime::LifetimeResolver;
pub use scope::{LifetimeCache, SingletonScope};

pub use autowire_types::Lifetime;
