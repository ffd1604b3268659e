//! The type registry: assemblies, their references and their types
//!
//! The registry stands in for a reflective host type system. It is built once,
//! then shared read-only by every container that resolves against it.
//!
//! ## Process-wide registry
//!
//! Crates can declare their types at compile time with [`declare_assembly!`]
//! and [`register_types!`]; [`TypeRegistry::global`] collects every submission
//! linked into the process, mirroring "all assemblies currently loaded".
//!
//! [`declare_assembly!`]: crate::declare_assembly
//! [`register_types!`]: crate::register_types

use crate::builder::AssemblyBuilder;
use crate::descriptor::TypeDescriptor;
use crate::key::TypeKey;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A type whose metadata failed to load while enumerating an assembly.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Type {type_name} in assembly {assembly} failed to load: {reason}")]
pub struct TypeLoadError {
	pub assembly: String,
	pub type_name: String,
	pub reason: String,
}

/// An assembly could not be loaded.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AssemblyLoadError {
	#[error("Assembly {0} is not loaded")]
	NotFound(String),

	#[error("Assembly {name} failed to load: {reason}")]
	Failed { name: String, reason: String },
}

/// A named unit of declaration, typically one crate.
#[derive(Debug)]
pub struct Assembly {
	name: String,
	references: Vec<String>,
	types: Vec<Result<Arc<TypeDescriptor>, TypeLoadError>>,
}

impl Assembly {
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Names of directly referenced assemblies, in declaration order.
	pub fn references(&self) -> &[String] {
		&self.references
	}

	/// Every declared type, including the ones that failed to load.
	pub fn types(&self) -> impl Iterator<Item = Result<&Arc<TypeDescriptor>, &TypeLoadError>> {
		self.types.iter().map(Result::as_ref)
	}

	/// Types that loaded successfully; failures are logged and skipped.
	pub fn loadable_types(&self) -> impl Iterator<Item = &Arc<TypeDescriptor>> {
		self.types().filter_map(|entry| match entry {
			Ok(descriptor) => Some(descriptor),
			Err(error) => {
				tracing::debug!(assembly = %self.name, %error, "skipping type that failed to load");
				None
			}
		})
	}
}

/// Immutable metadata for every declared type.
#[derive(Debug, Default)]
pub struct TypeRegistry {
	assemblies: Vec<Assembly>,
	by_name: HashMap<String, usize>,
	unloadable: HashMap<String, String>,
	types: HashMap<TypeKey, Arc<TypeDescriptor>>,
}

impl TypeRegistry {
	/// # Examples
	///
	/// ```
	/// use autowire_types::{ConstructorSpec, TypeKey, TypeRegistry};
	///
	/// #[derive(Default)]
	/// struct Clock;
	///
	/// let registry = TypeRegistry::builder()
	///     .assembly("core", |asm| {
	///         asm.in_namespace("core::time").concrete::<Clock, _>(|ty| {
	///             ty.constructor(ConstructorSpec::default_public());
	///         });
	///     })
	///     .build();
	///
	/// let clock = registry.get(TypeKey::of::<Clock>()).unwrap();
	/// assert_eq!(clock.full_name(), "core::time::Clock");
	/// ```
	pub fn builder() -> RegistryBuilder {
		RegistryBuilder::new()
	}

	pub fn empty() -> Self {
		Self::default()
	}

	/// The registry assembled from every `inventory` submission in the process.
	pub fn global() -> Arc<TypeRegistry> {
		static GLOBAL: Lazy<Arc<TypeRegistry>> =
			Lazy::new(|| Arc::new(RegistryBuilder::from_inventory().build()));
		Arc::clone(&GLOBAL)
	}

	/// Metadata of a loaded type.
	pub fn get(&self, key: TypeKey) -> Option<&Arc<TypeDescriptor>> {
		self.types.get(&key)
	}

	pub fn contains(&self, key: TypeKey) -> bool {
		self.types.contains_key(&key)
	}

	/// Loads an assembly by name.
	pub fn load_assembly(&self, name: &str) -> Result<&Assembly, AssemblyLoadError> {
		if let Some(reason) = self.unloadable.get(name) {
			return Err(AssemblyLoadError::Failed {
				name: name.to_owned(),
				reason: reason.clone(),
			});
		}
		self.by_name
			.get(name)
			.map(|&index| &self.assemblies[index])
			.ok_or_else(|| AssemblyLoadError::NotFound(name.to_owned()))
	}

	/// Every loaded assembly, in load order.
	pub fn loaded_assemblies(&self) -> impl Iterator<Item = &Assembly> {
		self.assemblies.iter()
	}

	/// The type followed by its ancestors, nearest first.
	///
	/// The walk stops at the first base that is not registered, and never
	/// visits a type twice even if base links form a loop.
	pub fn lineage(&self, key: TypeKey) -> Lineage<'_> {
		Lineage {
			registry: self,
			next: Some(key),
			visited: HashSet::new(),
		}
	}
}

/// Iterator returned by [`TypeRegistry::lineage`].
pub struct Lineage<'a> {
	registry: &'a TypeRegistry,
	next: Option<TypeKey>,
	visited: HashSet<TypeKey>,
}

impl<'a> Iterator for Lineage<'a> {
	type Item = &'a Arc<TypeDescriptor>;

	fn next(&mut self) -> Option<Self::Item> {
		let key = self.next.take()?;
		if !self.visited.insert(key) {
			return None;
		}
		let descriptor = self.registry.get(key)?;
		self.next = descriptor.base();
		Some(descriptor)
	}
}

/// Builds a [`TypeRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
	assemblies: Vec<AssemblyBuilder>,
	unloadable: HashMap<String, String>,
}

impl RegistryBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Collects every [`AssemblyRegistration`] and [`TypeRegistration`] linked
	/// into the process.
	pub fn from_inventory() -> Self {
		let mut builder = Self::new();
		for registration in inventory::iter::<AssemblyRegistration>() {
			builder
				.assembly_mut(registration.name)
				.references(registration.references.iter().copied());
		}
		for registration in inventory::iter::<TypeRegistration>() {
			let assembly = builder.assembly_mut(registration.assembly);
			assembly.in_namespace(registration.namespace);
			(registration.register)(assembly);
		}
		builder
	}

	/// Declares (or extends) an assembly.
	pub fn assembly<F>(mut self, name: &str, configure: F) -> Self
	where
		F: FnOnce(&mut AssemblyBuilder),
	{
		configure(self.assembly_mut(name));
		self
	}

	/// Declares an assembly that exists but fails whenever it is loaded.
	pub fn unloadable_assembly(mut self, name: &str, reason: impl Into<String>) -> Self {
		self.unloadable.insert(name.to_owned(), reason.into());
		self
	}

	fn assembly_mut(&mut self, name: &str) -> &mut AssemblyBuilder {
		let index = match self.assemblies.iter().position(|a| a.name == name) {
			Some(index) => index,
			None => {
				self.assemblies.push(AssemblyBuilder::new(name));
				self.assemblies.len() - 1
			}
		};
		&mut self.assemblies[index]
	}

	pub fn build(self) -> TypeRegistry {
		let mut registry = TypeRegistry {
			unloadable: self.unloadable,
			..TypeRegistry::default()
		};
		for builder in self.assemblies {
			if registry.unloadable.contains_key(&builder.name) {
				tracing::debug!(assembly = %builder.name, "assembly is marked unloadable, its types are not registered");
				continue;
			}
			let mut types = Vec::with_capacity(builder.entries.len());
			for entry in builder.entries {
				match entry {
					Ok(descriptor) => {
						let descriptor = Arc::new(descriptor);
						let key = descriptor.key();
						if registry.types.contains_key(&key) {
							tracing::warn!(
								assembly = %builder.name,
								type_name = %descriptor.full_name(),
								"type declared twice, keeping the first declaration"
							);
							continue;
						}
						registry.types.insert(key, Arc::clone(&descriptor));
						types.push(Ok(descriptor));
					}
					Err(error) => types.push(Err(error)),
				}
			}
			registry
				.by_name
				.insert(builder.name.clone(), registry.assemblies.len());
			registry.assemblies.push(Assembly {
				name: builder.name,
				references: builder.references,
				types,
			});
		}
		registry
	}
}

/// Compile-time declaration of an assembly and its direct references.
///
/// Submitted with [`declare_assembly!`](crate::declare_assembly).
pub struct AssemblyRegistration {
	pub name: &'static str,
	pub references: &'static [&'static str],
}

inventory::collect!(AssemblyRegistration);

/// Compile-time declaration of types, run against the assembly builder of
/// `assembly` with `namespace` as the default namespace.
///
/// Submitted with [`register_types!`](crate::register_types).
pub struct TypeRegistration {
	pub assembly: &'static str,
	pub namespace: &'static str,
	pub register: fn(&mut AssemblyBuilder),
}

inventory::collect!(TypeRegistration);

/// Declares the current crate as an assembly of the process-wide registry.
///
/// # Example
///
/// ```rust,ignore
/// autowire_types::declare_assembly!(references = ["billing_core"]);
/// ```
#[macro_export]
macro_rules! declare_assembly {
	() => {
		$crate::declare_assembly!(references = []);
	};
	(references = [$($reference:expr),* $(,)?]) => {
		$crate::inventory::submit! {
			$crate::AssemblyRegistration {
				name: env!("CARGO_CRATE_NAME"),
				references: &[$($reference),*],
			}
		}
	};
}

/// Registers types declared in the current module with the process-wide
/// registry. The current crate is the assembly and `module_path!()` is the
/// default namespace.
///
/// # Example
///
/// ```rust,ignore
/// use autowire_types::{ConstructorSpec, register_types};
///
/// #[derive(Default)]
/// struct Clock;
///
/// register_types!(|asm| {
///     asm.concrete::<Clock, _>(|ty| {
///         ty.constructor(ConstructorSpec::default_public());
///     });
/// });
/// ```
#[macro_export]
macro_rules! register_types {
	($register:expr) => {
		$crate::inventory::submit! {
			$crate::TypeRegistration {
				assembly: env!("CARGO_CRATE_NAME"),
				namespace: module_path!(),
				register: $register,
			}
		}
	};
}
