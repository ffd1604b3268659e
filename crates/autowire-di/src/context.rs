//! Requesting context and per-call resolution state

use crate::cycle_detection::{ResolutionPass, ResolutionStack};
use autowire_types::{Namespace, TypeKey};
use std::fmt;

/// Who is asking for the current resolution.
///
/// Only used to bias implementation search toward the requester's own
/// assembly and namespace. Nested dependencies always search relative to the
/// concrete type whose constructor declared them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResolutionContext {
	/// Top-level call with no known origin.
	#[default]
	None,
	/// A registered type is asking.
	Type(TypeKey),
	/// Code at a source location is asking, usually captured with
	/// [`requesting_context!`](crate::requesting_context).
	Location {
		assembly: String,
		namespace: Namespace,
	},
}

impl ResolutionContext {
	pub fn none() -> Self {
		Self::None
	}

	pub fn of<R: ?Sized + 'static>() -> Self {
		Self::Type(TypeKey::of::<R>())
	}

	/// # Examples
	///
	/// ```
	/// use autowire_di::ResolutionContext;
	///
	/// let context = ResolutionContext::at("billing", "billing::invoices");
	/// assert!(!context.is_none());
	/// ```
	pub fn at(assembly: impl Into<String>, namespace: impl Into<Namespace>) -> Self {
		Self::Location {
			assembly: assembly.into(),
			namespace: namespace.into(),
		}
	}

	/// Context for code in `module_path`. The leading path segment names the
	/// crate, which is the assembly.
	pub fn in_module(module_path: &str) -> Self {
		let assembly = module_path.split("::").next().unwrap_or(module_path);
		Self::at(assembly, module_path)
	}

	pub fn is_none(&self) -> bool {
		matches!(self, Self::None)
	}
}

impl From<TypeKey> for ResolutionContext {
	fn from(key: TypeKey) -> Self {
		Self::Type(key)
	}
}

impl fmt::Display for ResolutionContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::None => f.write_str("<none>"),
			Self::Type(key) => write!(f, "{}", key.type_name()),
			Self::Location {
				assembly,
				namespace,
			} => write!(f, "{assembly}/{namespace}"),
		}
	}
}

/// Context of the code expanding the macro: the current crate as assembly and
/// the current module path as namespace.
///
/// # Examples
///
/// ```
/// use autowire_di::{ResolutionContext, requesting_context};
///
/// let context = requesting_context!();
/// assert!(matches!(context, ResolutionContext::Location { .. }));
/// ```
#[macro_export]
macro_rules! requesting_context {
	() => {
		$crate::ResolutionContext::in_module(module_path!())
	};
}

/// In-progress state of one top-level resolve call.
///
/// Holds the lifetime-analysis and construction stacks. A session is created
/// per call and passed down by reference, so it is never visible to another
/// thread or another call.
#[derive(Debug)]
pub struct ResolutionSession {
	lifetime: ResolutionStack,
	construction: ResolutionStack,
}

impl ResolutionSession {
	pub fn new() -> Self {
		Self {
			lifetime: ResolutionStack::new(ResolutionPass::LifetimeAnalysis),
			construction: ResolutionStack::new(ResolutionPass::Construction),
		}
	}

	pub fn lifetime(&self) -> &ResolutionStack {
		&self.lifetime
	}

	pub fn construction(&self) -> &ResolutionStack {
		&self.construction
	}
}

impl Default for ResolutionSession {
	fn default() -> Self {
		Self::new()
	}
}
