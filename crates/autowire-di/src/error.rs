//! Resolution errors

use crate::cycle_detection::CycleError;
use autowire_types::BoxError;
use std::fmt;

pub type DiResult<T> = Result<T, DiError>;

/// Why a resolution call failed.
///
/// Every error is fatal to the call that raised it and to nothing else: the
/// container stays usable afterwards.
#[derive(Debug, thiserror::Error)]
pub enum DiError {
	#[error(
		"No eligible constructor for {type_name}: a public constructor without by-reference parameters is required"
	)]
	NoEligibleConstructor { type_name: String },

	#[error("Primitive type {type_name} cannot be resolved{}", required_by_suffix(.required_by))]
	PrimitiveTypeRejected {
		type_name: String,
		/// Type whose constructor declared the primitive parameter
		required_by: Option<String>,
	},

	#[error(
		"No implementation found for {type_name}. Declare a concrete type implementing it in the requesting assembly, in one of the assemblies it references, or in any loaded assembly."
	)]
	NoImplementationFound { type_name: String },

	#[error(
		"Ambiguous implementation for {type_name}: {} are equally close to the requester",
		.candidates.join(", ")
	)]
	AmbiguousImplementation {
		type_name: String,
		candidates: Vec<String>,
	},

	#[error(transparent)]
	CircularDependency(#[from] CycleError),

	#[error(
		"Captive dependency: singleton {singleton} depends on transient {dependency}, which would outlive its intended lifetime"
	)]
	CaptiveDependency { singleton: String, dependency: String },

	#[error("Constructor of {type_name} failed: {source}")]
	ConstructorInvocation {
		type_name: String,
		#[source]
		source: BoxError,
	},

	#[error("Resolved {concrete} cannot be handed out as {requested}")]
	TypeMismatch { requested: String, concrete: String },
}

fn required_by_suffix(required_by: &Option<String>) -> String {
	match required_by {
		Some(owner) => format!(" (required by a constructor parameter of {owner})"),
		None => String::new(),
	}
}

/// Field-less discriminant of [`DiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiErrorKind {
	NoEligibleConstructor,
	PrimitiveTypeRejected,
	NoImplementationFound,
	AmbiguousImplementation,
	CircularDependency,
	CaptiveDependency,
	ConstructorInvocation,
	TypeMismatch,
}

impl DiError {
	pub fn kind(&self) -> DiErrorKind {
		match self {
			DiError::NoEligibleConstructor { .. } => DiErrorKind::NoEligibleConstructor,
			DiError::PrimitiveTypeRejected { .. } => DiErrorKind::PrimitiveTypeRejected,
			DiError::NoImplementationFound { .. } => DiErrorKind::NoImplementationFound,
			DiError::AmbiguousImplementation { .. } => DiErrorKind::AmbiguousImplementation,
			DiError::CircularDependency(_) => DiErrorKind::CircularDependency,
			DiError::CaptiveDependency { .. } => DiErrorKind::CaptiveDependency,
			DiError::ConstructorInvocation { .. } => DiErrorKind::ConstructorInvocation,
			DiError::TypeMismatch { .. } => DiErrorKind::TypeMismatch,
		}
	}
}

impl fmt::Display for DiErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			DiErrorKind::NoEligibleConstructor => "no_eligible_constructor",
			DiErrorKind::PrimitiveTypeRejected => "primitive_type_rejected",
			DiErrorKind::NoImplementationFound => "no_implementation_found",
			DiErrorKind::AmbiguousImplementation => "ambiguous_implementation",
			DiErrorKind::CircularDependency => "circular_dependency",
			DiErrorKind::CaptiveDependency => "captive_dependency",
			DiErrorKind::ConstructorInvocation => "constructor_invocation",
			DiErrorKind::TypeMismatch => "type_mismatch",
		};
		f.write_str(name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cycle_detection::ResolutionPass;
	use rstest::rstest;
	use std::error::Error as _;

	#[rstest]
	fn test_ambiguous_message_lists_candidates() {
		// Arrange
		let error = DiError::AmbiguousImplementation {
			type_name: "app::Store".into(),
			candidates: vec!["app::a::DiskStore".into(), "app::b::MemoryStore".into()],
		};

		// Act
		let message = error.to_string();

		// Assert
		assert!(message.contains("app::Store"));
		assert!(message.contains("app::a::DiskStore, app::b::MemoryStore"));
		assert_eq!(error.kind(), DiErrorKind::AmbiguousImplementation);
	}

	#[rstest]
	fn test_constructor_failure_keeps_source() {
		// Arrange
		let source: BoxError = "connection refused".into();
		let error = DiError::ConstructorInvocation {
			type_name: "app::Db".into(),
			source,
		};

		// Act
		let inner = error.source().map(|e| e.to_string());

		// Assert
		assert_eq!(inner.as_deref(), Some("connection refused"));
	}

	#[rstest]
	#[case(None, "Primitive type u32 cannot be resolved")]
	#[case(
		Some("app::Pool".to_string()),
		"Primitive type u32 cannot be resolved (required by a constructor parameter of app::Pool)"
	)]
	fn test_primitive_message(#[case] required_by: Option<String>, #[case] expected: &str) {
		let error = DiError::PrimitiveTypeRejected {
			type_name: "u32".into(),
			required_by,
		};
		assert_eq!(error.to_string(), expected);
	}

	#[rstest]
	fn test_cycle_converts() {
		// Arrange
		let cycle = CycleError {
			pass: ResolutionPass::Construction,
			type_name: "A".into(),
			path: vec!["A".into(), "A".into()],
		};

		// Act
		let error = DiError::from(cycle);

		// Assert
		assert_eq!(error.kind(), DiErrorKind::CircularDependency);
		assert!(error.to_string().contains("A -> A"));
	}
}
