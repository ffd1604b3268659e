//! Type descriptors: the metadata the resolution engine reads

use crate::arguments::Arguments;
use crate::key::TypeKey;
use crate::namespace::Namespace;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A built instance, type-erased. Always holds the concrete type.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// An instance viewed as some target type: a boxed `Arc<T>` where `T` may be
/// a trait object.
pub type Handle = Box<dyn Any + Send + Sync>;

/// Error type returned by constructor bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub(crate) type Invoker = Arc<dyn Fn(&mut Arguments) -> Result<Instance, BoxError> + Send + Sync>;
pub(crate) type Projector = Arc<dyn Fn(Instance) -> Option<Handle> + Send + Sync>;

/// How long a built instance lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
	/// Built once per container and shared.
	Singleton,
	/// Built on every resolution.
	Transient,
}

impl fmt::Display for Lifetime {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Lifetime::Singleton => f.write_str("singleton"),
			Lifetime::Transient => f.write_str("transient"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
	/// Has an instantiation path.
	Concrete,
	/// A trait object target.
	Interface,
	/// A base type that is never instantiated itself.
	Abstract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
	Public,
	NonPublic,
}

/// How a constructor parameter is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Passing {
	ByValue,
	/// In/out style parameter. Constructors taking one are never selected.
	ByReference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterInfo {
	pub ty: TypeKey,
	pub passing: Passing,
}

/// A declared constructor.
#[derive(Clone)]
pub struct ConstructorInfo {
	pub(crate) declaration_index: usize,
	pub(crate) visibility: Visibility,
	pub(crate) parameters: Vec<ParameterInfo>,
	pub(crate) invoker: Invoker,
}

impl ConstructorInfo {
	/// Position of this constructor among its type's declared constructors.
	pub fn declaration_index(&self) -> usize {
		self.declaration_index
	}

	pub fn visibility(&self) -> Visibility {
		self.visibility
	}

	pub fn parameters(&self) -> &[ParameterInfo] {
		&self.parameters
	}

	pub fn arity(&self) -> usize {
		self.parameters.len()
	}

	pub fn has_by_ref_parameter(&self) -> bool {
		self.parameters
			.iter()
			.any(|p| p.passing == Passing::ByReference)
	}

	/// Runs the constructor body.
	pub fn invoke(&self, mut arguments: Arguments) -> Result<Instance, BoxError> {
		(self.invoker)(&mut arguments)
	}
}

impl fmt::Debug for ConstructorInfo {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ConstructorInfo")
			.field("declaration_index", &self.declaration_index)
			.field("visibility", &self.visibility)
			.field("parameters", &self.parameters)
			.finish_non_exhaustive()
	}
}

/// Metadata for one declared type.
#[derive(Clone)]
pub struct TypeDescriptor {
	pub(crate) key: TypeKey,
	pub(crate) name: String,
	pub(crate) namespace: Namespace,
	pub(crate) assembly: String,
	pub(crate) kind: TypeKind,
	pub(crate) base: Option<TypeKey>,
	pub(crate) lifetime: Option<Lifetime>,
	pub(crate) disposable: bool,
	pub(crate) constructors: Vec<ConstructorInfo>,
	pub(crate) projections: HashMap<TypeKey, Projector>,
}

impl TypeDescriptor {
	pub fn key(&self) -> TypeKey {
		self.key
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// `namespace::Name`, or just the name in the root namespace.
	pub fn full_name(&self) -> String {
		if self.namespace.is_root() {
			self.name.clone()
		} else {
			format!("{}::{}", self.namespace, self.name)
		}
	}

	pub fn namespace(&self) -> &Namespace {
		&self.namespace
	}

	pub fn assembly(&self) -> &str {
		&self.assembly
	}

	pub fn kind(&self) -> TypeKind {
		self.kind
	}

	pub fn is_concrete(&self) -> bool {
		self.kind == TypeKind::Concrete
	}

	/// Direct base type, if one is declared.
	pub fn base(&self) -> Option<TypeKey> {
		self.base
	}

	/// Lifetime annotation declared on this type itself (not inherited).
	pub fn declared_lifetime(&self) -> Option<Lifetime> {
		self.lifetime
	}

	pub fn is_disposable(&self) -> bool {
		self.disposable
	}

	pub fn constructors(&self) -> &[ConstructorInfo] {
		&self.constructors
	}

	/// Whether instances of this type can be handed out as `target`.
	pub fn is_assignable_to(&self, target: TypeKey) -> bool {
		self.projections.contains_key(&target)
	}

	/// Abstract types this type can be handed out as, itself excluded.
	pub fn assignable_targets(&self) -> impl Iterator<Item = TypeKey> + '_ {
		self.projections.keys().copied().filter(move |k| *k != self.key)
	}

	/// Views `instance` (which must be of this type) as `target`.
	///
	/// Returns `None` when the type is not assignable to `target` or the
	/// instance is not of this type.
	pub fn project(&self, instance: Instance, target: TypeKey) -> Option<Handle> {
		let projector = self.projections.get(&target)?;
		projector(instance)
	}
}

impl fmt::Debug for TypeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeDescriptor")
			.field("name", &self.full_name())
			.field("assembly", &self.assembly)
			.field("kind", &self.kind)
			.field("lifetime", &self.lifetime)
			.field("disposable", &self.disposable)
			.field("constructors", &self.constructors.len())
			.finish_non_exhaustive()
	}
}
