//! Lifetime inference
//!
//! A concrete type's lifetime is decided by the first rule that applies:
//!
//! 1. An explicit annotation on the type, or on its nearest annotated ancestor.
//! 2. Disposable types are transient.
//! 3. If any constructor dependency is transient, so is the type.
//! 4. Otherwise the type is a singleton.
//!
//! An explicitly annotated singleton must not depend on a transient
//! (a captive dependency). Inferred singletons cannot, because rule 3 already
//! turns them transient.

use crate::constructor::ConstructorSelector;
use crate::context::{ResolutionContext, ResolutionSession};
use crate::error::{DiError, DiResult};
use crate::finder::ImplementationFinder;
use crate::scope::LifetimeCache;
use autowire_types::{Lifetime, TypeDescriptor, TypeRegistry};
use std::sync::Arc;

pub struct LifetimeResolver {
	registry: Arc<TypeRegistry>,
	finder: ImplementationFinder,
	cache: LifetimeCache,
}

impl LifetimeResolver {
	pub fn new(registry: Arc<TypeRegistry>, finder: ImplementationFinder) -> Self {
		Self {
			registry,
			finder,
			cache: LifetimeCache::new(),
		}
	}

	/// Decides how long instances of `concrete` live.
	///
	/// The decision is cached and never changes for this resolver. Analysis
	/// walks the dependency graph on the session's lifetime-analysis stack and
	/// fails on the first cycle it meets.
	pub fn determine(
		&self,
		concrete: &TypeDescriptor,
		session: &ResolutionSession,
	) -> DiResult<Lifetime> {
		if let Some(lifetime) = self.cache.get(concrete.key()) {
			return Ok(lifetime);
		}

		let _guard = session
			.lifetime()
			.begin_resolution(concrete.key(), concrete.full_name())?;
		let lifetime = self.analyze(concrete, session)?;

		tracing::trace!(type_name = %concrete.full_name(), %lifetime, "lifetime decided");
		self.cache.insert(concrete.key(), lifetime);
		Ok(lifetime)
	}

	/// Cached decision, if analysis already ran for this type.
	pub fn cached(&self, concrete: &TypeDescriptor) -> Option<Lifetime> {
		self.cache.get(concrete.key())
	}

	fn analyze(&self, concrete: &TypeDescriptor, session: &ResolutionSession) -> DiResult<Lifetime> {
		match self.explicit_annotation(concrete) {
			Some(Lifetime::Singleton) => {
				for dependency in self.dependencies(concrete)? {
					if self.determine(&dependency, session)? == Lifetime::Transient {
						return Err(DiError::CaptiveDependency {
							singleton: concrete.full_name(),
							dependency: dependency.full_name(),
						});
					}
				}
				return Ok(Lifetime::Singleton);
			}
			Some(Lifetime::Transient) => return Ok(Lifetime::Transient),
			None => {}
		}

		if concrete.is_disposable() {
			return Ok(Lifetime::Transient);
		}

		for dependency in self.dependencies(concrete)? {
			if self.determine(&dependency, session)? == Lifetime::Transient {
				return Ok(Lifetime::Transient);
			}
		}
		Ok(Lifetime::Singleton)
	}

	/// Annotation on the type itself, else on the nearest annotated ancestor.
	fn explicit_annotation(&self, concrete: &TypeDescriptor) -> Option<Lifetime> {
		concrete.declared_lifetime().or_else(|| {
			let base = concrete.base()?;
			self.registry
				.lineage(base)
				.find_map(|ancestor| ancestor.declared_lifetime())
		})
	}

	/// Concrete types of the selected constructor's parameters, in order.
	///
	/// Each parameter is searched for with the type itself as requester, the
	/// same way construction will resolve it.
	fn dependencies(&self, concrete: &TypeDescriptor) -> DiResult<Vec<Arc<TypeDescriptor>>> {
		let constructor = ConstructorSelector::select(concrete)?;
		let context = ResolutionContext::Type(concrete.key());
		constructor
			.parameters()
			.iter()
			.map(|parameter| {
				if parameter.ty.is_primitive() {
					return Err(DiError::PrimitiveTypeRejected {
						type_name: parameter.ty.type_name().to_owned(),
						required_by: Some(concrete.full_name()),
					});
				}
				self.finder.find_concrete(parameter.ty, &context)
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::ContainerConfig;
	use crate::error::DiErrorKind;
	use autowire_types::{Arguments, BoxError, ConstructorSpec, TypeKey};
	use rstest::rstest;

	struct Clock;
	struct Request;
	struct Handler;
	struct Entity;
	struct Account;

	fn unit<T>(value: T) -> impl Fn(&mut Arguments) -> Result<T, BoxError> + Send + Sync + 'static
	where
		T: Clone + Send + Sync + 'static,
	{
		move |_| Ok(value.clone())
	}

	#[derive(Clone)]
	struct Token;

	fn resolver(registry: TypeRegistry) -> (Arc<TypeRegistry>, LifetimeResolver) {
		let registry = Arc::new(registry);
		let finder = ImplementationFinder::new(Arc::clone(&registry), ContainerConfig::default());
		(Arc::clone(&registry), LifetimeResolver::new(registry, finder))
	}

	fn determine(registry: &TypeRegistry, resolver: &LifetimeResolver, key: TypeKey) -> DiResult<Lifetime> {
		let descriptor = registry.get(key).unwrap();
		resolver.determine(descriptor, &ResolutionSession::new())
	}

	#[rstest]
	fn test_unannotated_leaf_is_singleton() {
		// Arrange
		let (registry, resolver) = resolver(
			TypeRegistry::builder()
				.assembly("app", |asm| {
					asm.concrete::<Token, _>(|ty| {
						ty.constructor(ConstructorSpec::public(unit(Token)));
					});
				})
				.build(),
		);

		// Act
		let lifetime = determine(&registry, &resolver, TypeKey::of::<Token>());

		// Assert
		assert_eq!(lifetime.unwrap(), Lifetime::Singleton);
	}

	#[rstest]
	fn test_disposable_is_transient() {
		// Arrange
		let (registry, resolver) = resolver(
			TypeRegistry::builder()
				.assembly("app", |asm| {
					asm.concrete::<Token, _>(|ty| {
						ty.disposable().constructor(ConstructorSpec::public(unit(Token)));
					});
				})
				.build(),
		);

		// Act
		let lifetime = determine(&registry, &resolver, TypeKey::of::<Token>());

		// Assert
		assert_eq!(lifetime.unwrap(), Lifetime::Transient);
	}

	#[rstest]
	fn test_annotation_beats_disposable() {
		// Arrange
		let (registry, resolver) = resolver(
			TypeRegistry::builder()
				.assembly("app", |asm| {
					asm.concrete::<Token, _>(|ty| {
						ty.disposable()
							.lifetime(Lifetime::Singleton)
							.constructor(ConstructorSpec::public(unit(Token)));
					});
				})
				.build(),
		);

		// Act
		let lifetime = determine(&registry, &resolver, TypeKey::of::<Token>());

		// Assert
		assert_eq!(lifetime.unwrap(), Lifetime::Singleton);
	}

	#[rstest]
	fn test_annotation_is_inherited_from_nearest_ancestor() {
		// Arrange
		let (registry, resolver) = resolver(
			TypeRegistry::builder()
				.assembly("app", |asm| {
					asm.abstract_type::<Entity, _>(|ty| {
						ty.lifetime(Lifetime::Singleton);
					})
					.abstract_type::<Account, _>(|ty| {
						ty.base::<Entity>().lifetime(Lifetime::Transient);
					})
					.concrete::<Token, _>(|ty| {
						ty.base::<Account>()
							.constructor(ConstructorSpec::public(unit(Token)));
					});
				})
				.build(),
		);

		// Act
		let lifetime = determine(&registry, &resolver, TypeKey::of::<Token>());

		// Assert
		assert_eq!(lifetime.unwrap(), Lifetime::Transient);
	}

	#[rstest]
	fn test_transient_dependency_cascades() {
		// Arrange
		let (registry, resolver) = resolver(
			TypeRegistry::builder()
				.assembly("app", |asm| {
					asm.concrete::<Request, _>(|ty| {
						ty.lifetime(Lifetime::Transient)
							.constructor(ConstructorSpec::public(|_| Ok(Request)));
					})
					.concrete::<Handler, _>(|ty| {
						ty.constructor(ConstructorSpec::public(|_| Ok(Handler)).param::<Request>());
					});
				})
				.build(),
		);

		// Act
		let lifetime = determine(&registry, &resolver, TypeKey::of::<Handler>());

		// Assert
		assert_eq!(lifetime.unwrap(), Lifetime::Transient);
		assert_eq!(resolver.cache.len(), 2);
	}

	#[rstest]
	fn test_annotated_singleton_with_transient_dependency_is_captive() {
		// Arrange
		let (registry, resolver) = resolver(
			TypeRegistry::builder()
				.assembly("app", |asm| {
					asm.in_namespace("app")
						.concrete::<Request, _>(|ty| {
							ty.lifetime(Lifetime::Transient)
								.constructor(ConstructorSpec::public(|_| Ok(Request)));
						})
						.concrete::<Handler, _>(|ty| {
							ty.lifetime(Lifetime::Singleton).constructor(
								ConstructorSpec::public(|_| Ok(Handler)).param::<Request>(),
							);
						});
				})
				.build(),
		);

		// Act
		let error = determine(&registry, &resolver, TypeKey::of::<Handler>()).unwrap_err();

		// Assert
		match error {
			DiError::CaptiveDependency {
				singleton,
				dependency,
			} => {
				assert_eq!(singleton, "app::Handler");
				assert_eq!(dependency, "app::Request");
			}
			other => panic!("Expected CaptiveDependency, got {other:?}"),
		}
		assert!(resolver.cache.get(TypeKey::of::<Handler>()).is_none());
	}

	#[rstest]
	fn test_cycle_in_analysis() {
		// Arrange
		let (registry, resolver) = resolver(
			TypeRegistry::builder()
				.assembly("app", |asm| {
					asm.concrete::<Clock, _>(|ty| {
						ty.constructor(ConstructorSpec::public(|_| Ok(Clock)).param::<Handler>());
					})
					.concrete::<Handler, _>(|ty| {
						ty.constructor(ConstructorSpec::public(|_| Ok(Handler)).param::<Clock>());
					});
				})
				.build(),
		);
		let session = ResolutionSession::new();

		// Act
		let error = resolver
			.determine(registry.get(TypeKey::of::<Clock>()).unwrap(), &session)
			.unwrap_err();

		// Assert
		assert_eq!(error.kind(), DiErrorKind::CircularDependency);
		assert!(session.lifetime().is_empty());
		assert!(error.to_string().contains("Clock -> Handler -> Clock"));
	}

	#[rstest]
	fn test_primitive_parameter_is_rejected() {
		// Arrange
		let (registry, resolver) = resolver(
			TypeRegistry::builder()
				.assembly("app", |asm| {
					asm.concrete::<Clock, _>(|ty| {
						ty.constructor(ConstructorSpec::public(|_| Ok(Clock)).param::<u64>());
					});
				})
				.build(),
		);

		// Act
		let error = determine(&registry, &resolver, TypeKey::of::<Clock>()).unwrap_err();

		// Assert
		assert_eq!(error.kind(), DiErrorKind::PrimitiveTypeRejected);
	}
}
