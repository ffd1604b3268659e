//! Runtime type identity

use once_cell::sync::Lazy;
use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Runtime identity of a Rust type.
///
/// Works for sized types as well as trait objects, so `TypeKey::of::<dyn Logger>()`
/// is a valid key for an abstract target.
///
/// Equality and hashing only consider the `TypeId`; the name is carried for
/// error messages.
#[derive(Clone, Copy)]
pub struct TypeKey {
	id: TypeId,
	name: &'static str,
}

impl TypeKey {
	/// Returns the key of `T`.
	///
	/// # Examples
	///
	/// ```
	/// use autowire_types::TypeKey;
	///
	/// trait Logger {}
	///
	/// let concrete = TypeKey::of::<String>();
	/// let abstract_key = TypeKey::of::<dyn Logger>();
	/// assert_ne!(concrete, abstract_key);
	/// ```
	pub fn of<T: ?Sized + 'static>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: type_name::<T>(),
		}
	}

	pub fn id(&self) -> TypeId {
		self.id
	}

	/// Fully qualified Rust type name, as reported by `std::any::type_name`.
	pub fn type_name(&self) -> &'static str {
		self.name
	}

	/// Last path segment of the type name, without generic arguments or `dyn`.
	///
	/// # Examples
	///
	/// ```
	/// use autowire_types::TypeKey;
	///
	/// trait Clock {}
	/// assert_eq!(TypeKey::of::<Vec<u8>>().short_name(), "Vec");
	/// assert_eq!(TypeKey::of::<dyn Clock>().short_name(), "Clock");
	/// ```
	pub fn short_name(&self) -> &'static str {
		short_name(self.name)
	}

	/// Whether the key names a primitive or built-in value type.
	///
	/// Such types cannot be produced by the engine: there is no constructor to
	/// select and no way to choose a value.
	pub fn is_primitive(&self) -> bool {
		PRIMITIVES.contains(&self.id)
	}
}

impl PartialEq for TypeKey {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Debug for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("TypeKey").field(&self.name).finish()
	}
}

impl fmt::Display for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

pub(crate) fn short_name(full: &'static str) -> &'static str {
	let trimmed = full.strip_prefix("dyn ").unwrap_or(full);
	let without_generics = match trimmed.find('<') {
		Some(pos) => &trimmed[..pos],
		None => trimmed,
	};
	// `dyn Trait + Send + Sync`
	let without_bounds = match without_generics.find(" +") {
		Some(pos) => &without_generics[..pos],
		None => without_generics,
	};
	match without_bounds.rfind("::") {
		Some(pos) => &without_bounds[pos + 2..],
		None => without_bounds,
	}
}

static PRIMITIVES: Lazy<[TypeId; 20]> = Lazy::new(|| {
	[
		TypeId::of::<bool>(),
		TypeId::of::<char>(),
		TypeId::of::<i8>(),
		TypeId::of::<i16>(),
		TypeId::of::<i32>(),
		TypeId::of::<i64>(),
		TypeId::of::<i128>(),
		TypeId::of::<isize>(),
		TypeId::of::<u8>(),
		TypeId::of::<u16>(),
		TypeId::of::<u32>(),
		TypeId::of::<u64>(),
		TypeId::of::<u128>(),
		TypeId::of::<usize>(),
		TypeId::of::<f32>(),
		TypeId::of::<f64>(),
		TypeId::of::<()>(),
		TypeId::of::<str>(),
		TypeId::of::<&'static str>(),
		TypeId::of::<String>(),
	]
});

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	trait Repository {}
	struct OrderService;

	#[rstest]
	#[case(TypeKey::of::<u32>(), true)]
	#[case(TypeKey::of::<f64>(), true)]
	#[case(TypeKey::of::<String>(), true)]
	#[case(TypeKey::of::<str>(), true)]
	#[case(TypeKey::of::<OrderService>(), false)]
	#[case(TypeKey::of::<dyn Repository>(), false)]
	fn test_is_primitive(#[case] key: TypeKey, #[case] expected: bool) {
		// Act
		let primitive = key.is_primitive();

		// Assert
		assert_eq!(primitive, expected, "{key}");
	}

	#[rstest]
	#[case("app::orders::OrderService", "OrderService")]
	#[case("dyn app::Repository", "Repository")]
	#[case("dyn app::Repository + Send + Sync", "Repository")]
	#[case("alloc::vec::Vec<app::Order>", "Vec")]
	#[case("Plain", "Plain")]
	fn test_short_name(#[case] full: &'static str, #[case] expected: &str) {
		assert_eq!(short_name(full), expected);
	}

	#[rstest]
	fn test_equality_ignores_name() {
		// Arrange
		let a = TypeKey::of::<OrderService>();
		let b = TypeKey::of::<OrderService>();

		// Assert
		assert_eq!(a, b);
		assert_ne!(a, TypeKey::of::<dyn Repository>());
	}
}
