//! Constructor selection

use crate::error::{DiError, DiResult};
use autowire_types::{ConstructorInfo, TypeDescriptor, Visibility};

/// Picks the constructor used to build a type.
pub struct ConstructorSelector;

impl ConstructorSelector {
	/// The public constructor with the most parameters.
	///
	/// Constructors taking any by-reference parameter are never considered.
	/// Ties go to the constructor declared first.
	pub fn select(descriptor: &TypeDescriptor) -> DiResult<&ConstructorInfo> {
		descriptor
			.constructors()
			.iter()
			.filter(|ctor| ctor.visibility() == Visibility::Public && !ctor.has_by_ref_parameter())
			// max_by_key keeps the last maximum, so compare on reversed declaration order
			.max_by_key(|ctor| (ctor.arity(), std::cmp::Reverse(ctor.declaration_index())))
			.ok_or_else(|| DiError::NoEligibleConstructor {
				type_name: descriptor.full_name(),
			})
	}
}
