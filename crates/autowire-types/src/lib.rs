//! # Autowire Types
//!
//! Type metadata consumed by the autowire resolution engine.
//!
//! Rust has no runtime reflection, so everything the engine needs to know about
//! a type is declared up front in a [`TypeRegistry`]:
//!
//! - **Identity**: [`TypeKey`] for concrete structs and `dyn Trait` targets alike
//! - **Location**: declaring assembly and [`Namespace`] path
//! - **Constructors**: parameter types, visibility and the body to invoke
//! - **Lifetime hints**: explicit [`Lifetime`] annotations (inherited through
//!   base links) and the disposal-capability flag
//! - **Assignability**: which abstract targets an implementation can be handed out as
//!
//! ## Example
//!
//! ```rust
//! use autowire_types::{ConstructorSpec, TypeKey, TypeRegistry};
//! use std::sync::Arc;
//!
//! trait Clock: Send + Sync {}
//!
//! #[derive(Default)]
//! struct SystemClock;
//! impl Clock for SystemClock {}
//!
//! let registry = TypeRegistry::builder()
//!     .assembly("core", |asm| {
//!         asm.in_namespace("core::time")
//!             .interface::<dyn Clock, _>(|_| {})
//!             .concrete::<SystemClock, _>(|ty| {
//!                 ty.implements::<dyn Clock, _>(|clock| clock as Arc<dyn Clock>)
//!                     .constructor(ConstructorSpec::default_public());
//!             });
//!     })
//!     .build();
//!
//! let clock = registry.get(TypeKey::of::<SystemClock>()).unwrap();
//! assert!(clock.is_assignable_to(TypeKey::of::<dyn Clock>()));
//! ```

pub mod arguments;
pub mod builder;
pub mod descriptor;
pub mod key;
pub mod namespace;
pub mod registry;

pub use arguments::{ArgumentError, Arguments};
pub use builder::{AbstractBuilder, AssemblyBuilder, ConcreteBuilder, ConstructorSpec};
pub use descriptor::{
	BoxError, ConstructorInfo, Handle, Instance, Lifetime, ParameterInfo, Passing, TypeDescriptor,
	TypeKind, Visibility,
};
pub use key::TypeKey;
pub use namespace::Namespace;
pub use registry::{
	Assembly, AssemblyLoadError, AssemblyRegistration, Lineage, RegistryBuilder, TypeLoadError,
	TypeRegistration, TypeRegistry,
};

// Re-exported for the registration macros
#[doc(hidden)]
pub use inventory;
