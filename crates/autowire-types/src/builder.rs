//! Builders used to declare assemblies and their types

use crate::arguments::Arguments;
use crate::descriptor::{
	BoxError, ConstructorInfo, Handle, Instance, Invoker, Lifetime, ParameterInfo, Passing,
	Projector, TypeDescriptor, TypeKind, Visibility,
};
use crate::key::TypeKey;
use crate::namespace::Namespace;
use crate::registry::TypeLoadError;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

type Body<T> = Arc<dyn Fn(&mut Arguments) -> Result<T, BoxError> + Send + Sync>;

/// Declares one constructor of `T`.
///
/// # Examples
///
/// ```
/// use autowire_types::ConstructorSpec;
/// use std::sync::Arc;
///
/// struct Clock;
/// struct Scheduler {
///     clock: Arc<Clock>,
/// }
///
/// let spec = ConstructorSpec::public(|args| Ok(Scheduler { clock: args.take()? }))
///     .param::<Clock>();
/// assert_eq!(spec.arity(), 1);
/// ```
pub struct ConstructorSpec<T> {
	visibility: Visibility,
	parameters: Vec<ParameterInfo>,
	body: Body<T>,
}

impl<T: Send + Sync + 'static> ConstructorSpec<T> {
	pub fn public<F>(body: F) -> Self
	where
		F: Fn(&mut Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
	{
		Self::with_visibility(Visibility::Public, body)
	}

	/// A constructor the engine may not call.
	pub fn non_public<F>(body: F) -> Self
	where
		F: Fn(&mut Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
	{
		Self::with_visibility(Visibility::NonPublic, body)
	}

	fn with_visibility<F>(visibility: Visibility, body: F) -> Self
	where
		F: Fn(&mut Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
	{
		Self {
			visibility,
			parameters: Vec::new(),
			body: Arc::new(body),
		}
	}

	/// Declares the next parameter, passed by value.
	pub fn param<P: ?Sized + 'static>(mut self) -> Self {
		self.parameters.push(ParameterInfo {
			ty: TypeKey::of::<P>(),
			passing: Passing::ByValue,
		});
		self
	}

	/// Declares the next parameter as by-reference (in/out style).
	pub fn by_ref_param<P: ?Sized + 'static>(mut self) -> Self {
		self.parameters.push(ParameterInfo {
			ty: TypeKey::of::<P>(),
			passing: Passing::ByReference,
		});
		self
	}

	pub fn arity(&self) -> usize {
		self.parameters.len()
	}

	fn into_info(self, declaration_index: usize) -> ConstructorInfo {
		let body = self.body;
		let invoker: Invoker =
			Arc::new(move |args: &mut Arguments| body(args).map(|value| Arc::new(value) as Instance));
		ConstructorInfo {
			declaration_index,
			visibility: self.visibility,
			parameters: self.parameters,
			invoker,
		}
	}
}

impl<T: Default + Send + Sync + 'static> ConstructorSpec<T> {
	/// Public parameterless constructor backed by `Default`.
	pub fn default_public() -> Self {
		Self::public(|_| Ok(T::default()))
	}
}

/// Configures a concrete type.
pub struct ConcreteBuilder<T> {
	descriptor: TypeDescriptor,
	_marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> ConcreteBuilder<T> {
	fn new(assembly: &str, namespace: Namespace) -> Self {
		let key = TypeKey::of::<T>();
		let mut projections: HashMap<TypeKey, Projector> = HashMap::new();
		projections.insert(
			key,
			Arc::new(|instance: Instance| {
				instance
					.downcast::<T>()
					.ok()
					.map(|concrete| Box::new(concrete) as Handle)
			}),
		);
		Self {
			descriptor: TypeDescriptor {
				key,
				name: key.short_name().to_owned(),
				namespace,
				assembly: assembly.to_owned(),
				kind: TypeKind::Concrete,
				base: None,
				lifetime: None,
				disposable: false,
				constructors: Vec::new(),
				projections,
			},
			_marker: PhantomData,
		}
	}

	/// Overrides the name derived from the Rust type name.
	pub fn named(&mut self, name: impl Into<String>) -> &mut Self {
		self.descriptor.name = name.into();
		self
	}

	pub fn namespace(&mut self, namespace: impl Into<Namespace>) -> &mut Self {
		self.descriptor.namespace = namespace.into();
		self
	}

	/// Explicit lifetime annotation.
	pub fn lifetime(&mut self, lifetime: Lifetime) -> &mut Self {
		self.descriptor.lifetime = Some(lifetime);
		self
	}

	/// Marks the type as owning resources that must be released per use.
	pub fn disposable(&mut self) -> &mut Self {
		self.descriptor.disposable = true;
		self
	}

	/// Links the type to its base for annotation inheritance.
	pub fn base<B: ?Sized + 'static>(&mut self) -> &mut Self {
		self.descriptor.base = Some(TypeKey::of::<B>());
		self
	}

	/// Makes the type a candidate whenever `I` is requested.
	///
	/// `cast` turns the concrete `Arc<T>` into `Arc<I>`, usually an unsizing
	/// coercion such as `|svc| svc as Arc<dyn Mailer>`.
	pub fn implements<I, F>(&mut self, cast: F) -> &mut Self
	where
		I: ?Sized + Send + Sync + 'static,
		F: Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
	{
		let projector: Projector = Arc::new(move |instance: Instance| {
			let concrete = instance.downcast::<T>().ok()?;
			Some(Box::new(cast(concrete)) as Handle)
		});
		self.descriptor
			.projections
			.insert(TypeKey::of::<I>(), projector);
		self
	}

	/// `base::<B>()` plus `implements::<B>(cast)`.
	pub fn extends<B, F>(&mut self, cast: F) -> &mut Self
	where
		B: ?Sized + Send + Sync + 'static,
		F: Fn(Arc<T>) -> Arc<B> + Send + Sync + 'static,
	{
		self.base::<B>().implements::<B, F>(cast)
	}

	/// Declares a constructor. Declaration order is kept and used to break ties.
	pub fn constructor(&mut self, spec: ConstructorSpec<T>) -> &mut Self {
		let index = self.descriptor.constructors.len();
		self.descriptor.constructors.push(spec.into_info(index));
		self
	}

	fn finish(self) -> TypeDescriptor {
		self.descriptor
	}
}

/// Configures an interface or abstract base type.
pub struct AbstractBuilder {
	descriptor: TypeDescriptor,
}

impl AbstractBuilder {
	fn new(key: TypeKey, kind: TypeKind, assembly: &str, namespace: Namespace) -> Self {
		Self {
			descriptor: TypeDescriptor {
				key,
				name: key.short_name().to_owned(),
				namespace,
				assembly: assembly.to_owned(),
				kind,
				base: None,
				lifetime: None,
				disposable: false,
				constructors: Vec::new(),
				projections: HashMap::new(),
			},
		}
	}

	pub fn named(&mut self, name: impl Into<String>) -> &mut Self {
		self.descriptor.name = name.into();
		self
	}

	pub fn namespace(&mut self, namespace: impl Into<Namespace>) -> &mut Self {
		self.descriptor.namespace = namespace.into();
		self
	}

	/// Lifetime annotation inherited by types that declare this one as base.
	pub fn lifetime(&mut self, lifetime: Lifetime) -> &mut Self {
		self.descriptor.lifetime = Some(lifetime);
		self
	}

	pub fn base<B: ?Sized + 'static>(&mut self) -> &mut Self {
		self.descriptor.base = Some(TypeKey::of::<B>());
		self
	}

	fn finish(self) -> TypeDescriptor {
		self.descriptor
	}
}

/// Declares the types of one assembly.
pub struct AssemblyBuilder {
	pub(crate) name: String,
	pub(crate) references: Vec<String>,
	pub(crate) entries: Vec<Result<TypeDescriptor, TypeLoadError>>,
	default_namespace: Namespace,
}

impl AssemblyBuilder {
	pub(crate) fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			references: Vec::new(),
			entries: Vec::new(),
			default_namespace: Namespace::root(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Adds direct references to other assemblies.
	pub fn references<I, S>(&mut self, names: I) -> &mut Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		for name in names {
			let name = name.into();
			if !self.references.contains(&name) {
				self.references.push(name);
			}
		}
		self
	}

	/// Namespace given to types declared after this call.
	pub fn in_namespace(&mut self, namespace: impl Into<Namespace>) -> &mut Self {
		self.default_namespace = namespace.into();
		self
	}

	pub fn concrete<T, F>(&mut self, configure: F) -> &mut Self
	where
		T: Send + Sync + 'static,
		F: FnOnce(&mut ConcreteBuilder<T>),
	{
		let mut builder = ConcreteBuilder::<T>::new(&self.name, self.default_namespace.clone());
		configure(&mut builder);
		self.entries.push(Ok(builder.finish()));
		self
	}

	/// Declares a trait-object target such as `dyn Repository`.
	pub fn interface<I, F>(&mut self, configure: F) -> &mut Self
	where
		I: ?Sized + 'static,
		F: FnOnce(&mut AbstractBuilder),
	{
		self.push_abstract(TypeKey::of::<I>(), TypeKind::Interface, configure)
	}

	pub fn abstract_type<B, F>(&mut self, configure: F) -> &mut Self
	where
		B: ?Sized + 'static,
		F: FnOnce(&mut AbstractBuilder),
	{
		self.push_abstract(TypeKey::of::<B>(), TypeKind::Abstract, configure)
	}

	fn push_abstract<F>(&mut self, key: TypeKey, kind: TypeKind, configure: F) -> &mut Self
	where
		F: FnOnce(&mut AbstractBuilder),
	{
		let mut builder = AbstractBuilder::new(key, kind, &self.name, self.default_namespace.clone());
		configure(&mut builder);
		self.entries.push(Ok(builder.finish()));
		self
	}

	/// Records a type whose metadata could not be loaded.
	pub fn broken_type(&mut self, type_name: impl Into<String>, reason: impl Into<String>) -> &mut Self {
		self.entries.push(Err(TypeLoadError {
			assembly: self.name.clone(),
			type_name: type_name.into(),
			reason: reason.into(),
		}));
		self
	}
}
