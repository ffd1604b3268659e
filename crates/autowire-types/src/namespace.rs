//! Namespace paths and proximity

use std::fmt;

/// A `::`-separated declaration path such as `billing::invoices::pdf`.
///
/// Namespaces follow Rust module paths, so `module_path!()` is a valid
/// namespace for anything declared in the current module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Namespace {
	segments: Vec<String>,
}

impl Namespace {
	/// Parses a path; empty segments are dropped, so `""` is the root namespace.
	///
	/// # Examples
	///
	/// ```
	/// use autowire_types::Namespace;
	///
	/// let ns = Namespace::new("billing::invoices");
	/// assert_eq!(ns.segments(), ["billing", "invoices"]);
	/// assert!(Namespace::new("").is_root());
	/// ```
	pub fn new(path: &str) -> Self {
		Self {
			segments: path
				.split("::")
				.map(str::trim)
				.filter(|segment| !segment.is_empty())
				.map(str::to_owned)
				.collect(),
		}
	}

	pub fn root() -> Self {
		Self::default()
	}

	pub fn segments(&self) -> &[String] {
		&self.segments
	}

	pub fn is_root(&self) -> bool {
		self.segments.is_empty()
	}

	pub fn depth(&self) -> usize {
		self.segments.len()
	}

	/// Number of leading segments shared with `other`.
	pub fn common_prefix_len(&self, other: &Namespace) -> usize {
		self.segments
			.iter()
			.zip(&other.segments)
			.take_while(|(a, b)| a == b)
			.count()
	}

	/// Proximity of two namespaces: the non-shared suffix of each path,
	/// summed across both.
	///
	/// Same namespace is 0, a parent or child is 1, a sibling is 2.
	///
	/// # Examples
	///
	/// ```
	/// use autowire_types::Namespace;
	///
	/// let here = Namespace::new("shop::orders");
	/// assert_eq!(here.distance(&Namespace::new("shop::orders")), 0);
	/// assert_eq!(here.distance(&Namespace::new("shop")), 1);
	/// assert_eq!(here.distance(&Namespace::new("shop::payments")), 2);
	/// ```
	pub fn distance(&self, other: &Namespace) -> usize {
		let shared = self.common_prefix_len(other);
		(self.depth() - shared) + (other.depth() - shared)
	}
}

impl fmt::Display for Namespace {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.segments.join("::"))
	}
}

impl From<&str> for Namespace {
	fn from(path: &str) -> Self {
		Self::new(path)
	}
}

impl From<String> for Namespace {
	fn from(path: String) -> Self {
		Self::new(&path)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;

	#[rstest]
	#[case("a::b", "a::b", 0)]
	#[case("a::b", "a", 1)]
	#[case("a", "a::b", 1)]
	#[case("a::b", "a::c", 2)]
	#[case("a::b::c", "a::d", 3)]
	#[case("a", "x", 2)]
	#[case("", "a::b", 2)]
	fn test_distance(#[case] from: &str, #[case] to: &str, #[case] expected: usize) {
		// Arrange
		let from = Namespace::new(from);
		let to = Namespace::new(to);

		// Act
		let distance = from.distance(&to);

		// Assert
		assert_eq!(distance, expected);
	}

	#[rstest]
	fn test_new_drops_empty_segments() {
		let ns = Namespace::new("::a::::b::");
		assert_eq!(ns.to_string(), "a::b");
	}

	fn namespace_strategy() -> impl Strategy<Value = Namespace> {
		prop::collection::vec("[a-c]", 0..5).prop_map(|segments| Namespace::new(&segments.join("::")))
	}

	proptest! {
		#[test]
		fn prop_distance_is_symmetric(a in namespace_strategy(), b in namespace_strategy()) {
			prop_assert_eq!(a.distance(&b), b.distance(&a));
		}

		#[test]
		fn prop_distance_zero_only_for_equal(a in namespace_strategy(), b in namespace_strategy()) {
			prop_assert_eq!(a.distance(&b) == 0, a == b);
		}

		#[test]
		fn prop_triangle_inequality(
			a in namespace_strategy(),
			b in namespace_strategy(),
			c in namespace_strategy(),
		) {
			prop_assert!(a.distance(&c) <= a.distance(&b) + b.distance(&c));
		}
	}
}
