//! The container: the only entry point callers use
//!
//! A resolve call walks through these phases:
//!
//! ```text
//! Requested -> ConcreteResolved -> LifetimeDecided -> CacheHit -> Done
//!                                                  -> Building -> Built -> Done
//! ```
//!
//! Any phase may end the call in `Failed`. Phases are reported as `tracing`
//! events at trace level; failures are reported at debug level.

use crate::config::ContainerConfig;
use crate::context::{ResolutionContext, ResolutionSession};
use crate::error::{DiError, DiErrorKind, DiResult};
use crate::factory::{DependencyResolver, InstanceFactory};
use crate::finder::ImplementationFinder;
use crate::lifetime::LifetimeResolver;
use crate::scope::SingletonScope;
use autowire_types::{Handle, Instance, Lifetime, TypeDescriptor, TypeKey, TypeRegistry};
use std::fmt;
use std::sync::Arc;

/// Where a resolution currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPhase {
	Requested,
	ConcreteResolved,
	LifetimeDecided,
	CacheHit,
	Building,
	Built,
	Done,
	Failed(DiErrorKind),
}

impl fmt::Display for ResolutionPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ResolutionPhase::Requested => f.write_str("requested"),
			ResolutionPhase::ConcreteResolved => f.write_str("concrete_resolved"),
			ResolutionPhase::LifetimeDecided => f.write_str("lifetime_decided"),
			ResolutionPhase::CacheHit => f.write_str("cache_hit"),
			ResolutionPhase::Building => f.write_str("building"),
			ResolutionPhase::Built => f.write_str("built"),
			ResolutionPhase::Done => f.write_str("done"),
			ResolutionPhase::Failed(kind) => write!(f, "failed({kind})"),
		}
	}
}

fn record(target: TypeKey, phase: ResolutionPhase) {
	tracing::trace!(type_name = %target, %phase, "resolution phase");
}

/// Zero-configuration dependency container.
///
/// Builds any registered type and its whole dependency graph on demand.
/// Abstract types are mapped to implementations by proximity to the
/// requester, and lifetimes are inferred from the graph itself.
///
/// A container is `Send + Sync` and meant to be shared. Singletons and
/// lifetime decisions are cached per container.
///
/// # Examples
///
/// ```
/// use autowire_di::Container;
/// use autowire_types::{ConstructorSpec, TypeRegistry};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Clock;
///
/// struct Scheduler {
///     clock: Arc<Clock>,
/// }
///
/// let registry = TypeRegistry::builder()
///     .assembly("app", |asm| {
///         asm.concrete::<Clock, _>(|ty| {
///             ty.constructor(ConstructorSpec::default_public());
///         })
///         .concrete::<Scheduler, _>(|ty| {
///             ty.constructor(
///                 ConstructorSpec::public(|args| Ok(Scheduler { clock: args.take()? }))
///                     .param::<Clock>(),
///             );
///         });
///     })
///     .build();
///
/// let container = Container::with_registry(registry);
/// let scheduler = container.resolve::<Scheduler>().unwrap();
/// let clock = container.resolve::<Clock>().unwrap();
/// assert!(Arc::ptr_eq(&scheduler.clock, &clock));
/// ```
pub struct Container {
	registry: Arc<TypeRegistry>,
	config: ContainerConfig,
	finder: ImplementationFinder,
	lifetimes: LifetimeResolver,
	factory: InstanceFactory,
	singletons: SingletonScope,
}

impl Container {
	/// A container over every type registered in the process.
	pub fn new() -> Self {
		Self::builder(TypeRegistry::global()).build()
	}

	pub fn with_registry(registry: impl Into<Arc<TypeRegistry>>) -> Self {
		Self::builder(registry).build()
	}

	pub fn builder(registry: impl Into<Arc<TypeRegistry>>) -> ContainerBuilder {
		ContainerBuilder {
			registry: registry.into(),
			config: ContainerConfig::default(),
		}
	}

	pub fn registry(&self) -> &Arc<TypeRegistry> {
		&self.registry
	}

	pub fn config(&self) -> &ContainerConfig {
		&self.config
	}

	/// Resolves `T` with no requesting context.
	///
	/// Implementation search then starts from the configured entry assembly,
	/// or from all loaded assemblies. Prefer [`resolve!`](crate::resolve),
	/// which passes the caller's location.
	pub fn resolve<T>(&self) -> DiResult<Arc<T>>
	where
		T: ?Sized + 'static,
	{
		self.resolve_with::<T>(ResolutionContext::none())
	}

	/// Resolves `T` on behalf of the registered type `R`.
	pub fn resolve_for<T, R>(&self) -> DiResult<Arc<T>>
	where
		T: ?Sized + 'static,
		R: ?Sized + 'static,
	{
		self.resolve_with::<T>(ResolutionContext::of::<R>())
	}

	pub fn resolve_with<T>(&self, context: ResolutionContext) -> DiResult<Arc<T>>
	where
		T: ?Sized + 'static,
	{
		let target = TypeKey::of::<T>();
		let session = ResolutionSession::new();
		let result = self
			.resolve_instance(target, &context, &session)
			.and_then(|(concrete, instance)| {
				let handle = project(&concrete, instance, target)?;
				handle
					.downcast::<Arc<T>>()
					.map(|resolved| *resolved)
					.map_err(|_| mismatch(&concrete, target))
			});

		match &result {
			Ok(_) => record(target, ResolutionPhase::Done),
			Err(error) => tracing::debug!(
				type_name = %target,
				%context,
				phase = %ResolutionPhase::Failed(error.kind()),
				%error,
				"resolution failed"
			),
		}
		result
	}

	/// Lifetime the container uses for `T`, analysing it if needed.
	///
	/// Nothing is built.
	pub fn lifetime_of<T>(&self) -> DiResult<Lifetime>
	where
		T: ?Sized + 'static,
	{
		let concrete = self
			.finder
			.find_concrete(TypeKey::of::<T>(), &ResolutionContext::none())?;
		self.lifetimes.determine(&concrete, &ResolutionSession::new())
	}

	/// Whether a singleton of the concrete type `T` has been built.
	pub fn is_cached<T>(&self) -> bool
	where
		T: ?Sized + 'static,
	{
		self.singletons.contains(TypeKey::of::<T>())
	}

	/// Number of singletons built so far.
	pub fn cached_singletons(&self) -> usize {
		self.singletons.len()
	}

	#[cfg(feature = "dev-tools")]
	pub(crate) fn finder(&self) -> &ImplementationFinder {
		&self.finder
	}

	#[cfg(feature = "dev-tools")]
	pub(crate) fn lifetimes(&self) -> &LifetimeResolver {
		&self.lifetimes
	}

	fn resolve_instance(
		&self,
		target: TypeKey,
		context: &ResolutionContext,
		session: &ResolutionSession,
	) -> DiResult<(Arc<TypeDescriptor>, Instance)> {
		record(target, ResolutionPhase::Requested);
		if target.is_primitive() {
			return Err(DiError::PrimitiveTypeRejected {
				type_name: target.type_name().to_owned(),
				required_by: None,
			});
		}

		let concrete = self.finder.find_concrete(target, context)?;
		record(target, ResolutionPhase::ConcreteResolved);

		let lifetime = self.lifetimes.determine(&concrete, session)?;
		record(target, ResolutionPhase::LifetimeDecided);

		let instance = match lifetime {
			Lifetime::Singleton => match self.singletons.get(concrete.key()) {
				Some(instance) => {
					record(target, ResolutionPhase::CacheHit);
					instance
				}
				None => self
					.singletons
					.get_or_create(concrete.key(), || self.build(target, &concrete, session))?,
			},
			Lifetime::Transient => self.build(target, &concrete, session)?,
		};
		Ok((concrete, instance))
	}

	fn build(
		&self,
		target: TypeKey,
		concrete: &TypeDescriptor,
		session: &ResolutionSession,
	) -> DiResult<Instance> {
		record(target, ResolutionPhase::Building);
		let instance = self.factory.build(concrete, session, self)?;
		record(target, ResolutionPhase::Built);
		tracing::debug!(type_name = %concrete.full_name(), "instance built");
		Ok(instance)
	}
}

impl DependencyResolver for Container {
	fn resolve_dependency(
		&self,
		target: TypeKey,
		context: &ResolutionContext,
		session: &ResolutionSession,
	) -> DiResult<Handle> {
		let (concrete, instance) = self.resolve_instance(target, context, session)?;
		project(&concrete, instance, target)
	}
}

fn project(concrete: &TypeDescriptor, instance: Instance, target: TypeKey) -> DiResult<Handle> {
	concrete
		.project(instance, target)
		.ok_or_else(|| mismatch(concrete, target))
}

fn mismatch(concrete: &TypeDescriptor, target: TypeKey) -> DiError {
	DiError::TypeMismatch {
		requested: target.type_name().to_owned(),
		concrete: concrete.full_name(),
	}
}

impl Default for Container {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Container {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Container")
			.field("config", &self.config)
			.field("cached_singletons", &self.singletons.len())
			.finish_non_exhaustive()
	}
}

/// Builder for [`Container`].
#[derive(Debug)]
pub struct ContainerBuilder {
	registry: Arc<TypeRegistry>,
	config: ContainerConfig,
}

impl ContainerBuilder {
	/// Replaces the whole configuration.
	pub fn config(mut self, config: ContainerConfig) -> Self {
		self.config = config;
		self
	}

	pub fn entry_assembly(mut self, name: impl Into<String>) -> Self {
		self.config.entry_assembly = Some(name.into());
		self
	}

	pub fn namespace_tie_break(mut self, enabled: bool) -> Self {
		self.config.namespace_tie_break = enabled;
		self
	}

	pub fn build(self) -> Container {
		let finder = ImplementationFinder::new(Arc::clone(&self.registry), self.config.clone());
		let lifetimes = LifetimeResolver::new(Arc::clone(&self.registry), finder.clone());
		Container {
			registry: self.registry,
			config: self.config,
			finder,
			lifetimes,
			factory: InstanceFactory::new(),
			singletons: SingletonScope::new(),
		}
	}
}

/// Resolves a type on behalf of the calling module.
///
/// The current crate and module path become the requesting context, so
/// implementations declared close to the caller win.
///
/// # Examples
///
/// ```rust,ignore
/// let mailer = autowire_di::resolve!(container, dyn Mailer)?;
/// ```
#[macro_export]
macro_rules! resolve {
	($container:expr, $ty:ty) => {
		$container.resolve_with::<$ty>($crate::requesting_context!())
	};
}
