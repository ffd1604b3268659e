//! Instance construction

use crate::constructor::ConstructorSelector;
use crate::context::{ResolutionContext, ResolutionSession};
use crate::error::{DiError, DiResult};
use autowire_types::{Arguments, Handle, Instance, TypeDescriptor, TypeKey};

/// Resolves one constructor argument.
///
/// Implemented by the container, which re-enters its own resolution for every
/// parameter so arguments get the same lifetime handling as top-level calls.
pub trait DependencyResolver {
	/// An instance of `target`, already viewed as `target` (`Box<Arc<target>>`).
	fn resolve_dependency(
		&self,
		target: TypeKey,
		context: &ResolutionContext,
		session: &ResolutionSession,
	) -> DiResult<Handle>;
}

/// Builds instances through their selected constructor.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstanceFactory;

impl InstanceFactory {
	pub fn new() -> Self {
		Self
	}

	/// Builds a fresh instance of `concrete`.
	///
	/// Runs on the session's construction stack, which is separate from the
	/// lifetime-analysis stack. Every parameter type is checked before any of
	/// them is resolved.
	pub fn build(
		&self,
		concrete: &TypeDescriptor,
		session: &ResolutionSession,
		resolver: &dyn DependencyResolver,
	) -> DiResult<Instance> {
		let _guard = session
			.construction()
			.begin_resolution(concrete.key(), concrete.full_name())?;

		let constructor = ConstructorSelector::select(concrete)?;
		if let Some(primitive) = constructor
			.parameters()
			.iter()
			.find(|parameter| parameter.ty.is_primitive())
		{
			return Err(DiError::PrimitiveTypeRejected {
				type_name: primitive.ty.type_name().to_owned(),
				required_by: Some(concrete.full_name()),
			});
		}

		// Dependencies search relative to the type that declares them
		let context = ResolutionContext::Type(concrete.key());
		let mut arguments = Arguments::new();
		for parameter in constructor.parameters() {
			let argument = resolver.resolve_dependency(parameter.ty, &context, session)?;
			arguments.push(parameter.ty, argument);
		}

		tracing::trace!(
			type_name = %concrete.full_name(),
			constructor = constructor.declaration_index(),
			arity = constructor.arity(),
			"invoking constructor"
		);
		constructor
			.invoke(arguments)
			.map_err(|source| DiError::ConstructorInvocation {
				type_name: concrete.full_name(),
				source,
			})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::DiErrorKind;
	use autowire_types::{ConstructorSpec, TypeRegistry};
	use rstest::rstest;
	use std::cell::RefCell;
	use std::sync::Arc;

	struct Clock {
		tick: u64,
	}
	struct Scheduler {
		clock: Arc<Clock>,
	}
	struct Port;

	/// Hands out a fixed clock and records what was asked for.
	#[derive(Default)]
	struct Recorder {
		requests: RefCell<Vec<(TypeKey, ResolutionContext)>>,
	}

	impl DependencyResolver for Recorder {
		fn resolve_dependency(
			&self,
			target: TypeKey,
			context: &ResolutionContext,
			_session: &ResolutionSession,
		) -> DiResult<Handle> {
			self.requests.borrow_mut().push((target, context.clone()));
			Ok(Box::new(Arc::new(Clock { tick: 42 })))
		}
	}

	fn registry() -> TypeRegistry {
		TypeRegistry::builder()
			.assembly("app", |asm| {
				asm.concrete::<Scheduler, _>(|ty| {
					ty.constructor(
						ConstructorSpec::public(|args| Ok(Scheduler { clock: args.take()? }))
							.param::<Clock>(),
					);
				})
				.concrete::<Port, _>(|ty| {
					ty.constructor(
						ConstructorSpec::public(|_| Ok(Port))
							.param::<Clock>()
							.param::<u16>(),
					);
				})
				.concrete::<Clock, _>(|ty| {
					ty.constructor(ConstructorSpec::public(|_| Err("clock offline".into())));
				});
			})
			.build()
	}

	#[rstest]
	fn test_arguments_resolved_with_declaring_type_as_context() {
		// Arrange
		let registry = registry();
		let recorder = Recorder::default();
		let session = ResolutionSession::new();

		// Act
		let instance = InstanceFactory::new()
			.build(
				registry.get(TypeKey::of::<Scheduler>()).unwrap(),
				&session,
				&recorder,
			)
			.unwrap();

		// Assert
		let scheduler = instance.downcast::<Scheduler>().ok().unwrap();
		assert_eq!(scheduler.clock.tick, 42);
		assert_eq!(
			recorder.requests.borrow().as_slice(),
			[(TypeKey::of::<Clock>(), ResolutionContext::of::<Scheduler>())]
		);
		assert!(session.construction().is_empty());
	}

	#[rstest]
	fn test_primitive_checked_before_any_argument() {
		// Arrange
		let registry = registry();
		let recorder = Recorder::default();

		// Act
		let error = InstanceFactory::new()
			.build(
				registry.get(TypeKey::of::<Port>()).unwrap(),
				&ResolutionSession::new(),
				&recorder,
			)
			.unwrap_err();

		// Assert
		assert_eq!(error.kind(), DiErrorKind::PrimitiveTypeRejected);
		assert!(recorder.requests.borrow().is_empty());
	}

	#[rstest]
	fn test_constructor_error_is_wrapped() {
		// Arrange
		let registry = registry();

		// Act
		let error = InstanceFactory::new()
			.build(
				registry.get(TypeKey::of::<Clock>()).unwrap(),
				&ResolutionSession::new(),
				&Recorder::default(),
			)
			.unwrap_err();

		// Assert
		match error {
			DiError::ConstructorInvocation { type_name, source } => {
				assert_eq!(type_name, "Clock");
				assert_eq!(source.to_string(), "clock offline");
			}
			other => panic!("Expected ConstructorInvocation, got {other:?}"),
		}
	}
}
