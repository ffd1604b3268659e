//! Per-container caches: built singletons and lifetime decisions

use crate::error::DiResult;
use autowire_types::{Instance, Lifetime, TypeKey};
use dashmap::DashMap;
use parking_lot::ReentrantMutex;
use std::sync::Arc;

/// Built singleton instances, keyed by concrete type.
///
/// Reads never block. The first creation of any singleton goes through one
/// container-wide creation lock and re-checks the cache once the lock is held,
/// so each type is built at most once even when many threads race for it.
/// The lock is reentrant: building one singleton may build others on the
/// same thread.
pub struct SingletonScope {
	instances: DashMap<TypeKey, Instance>,
	creation: ReentrantMutex<()>,
}

impl SingletonScope {
	/// Creates an empty scope.
	///
	/// # Examples
	///
	/// ```
	/// use autowire_di::SingletonScope;
	///
	/// let scope = SingletonScope::new();
	/// assert!(scope.is_empty());
	/// ```
	pub fn new() -> Self {
		Self {
			instances: DashMap::new(),
			creation: ReentrantMutex::new(()),
		}
	}

	pub fn get(&self, key: TypeKey) -> Option<Instance> {
		self.instances
			.get(&key)
			.map(|entry| Arc::clone(entry.value()))
	}

	/// Returns the cached instance for `key`, building it with `create` if
	/// there is none yet.
	///
	/// A failed `create` leaves nothing behind; the next call tries again.
	///
	/// # Examples
	///
	/// ```
	/// use autowire_di::SingletonScope;
	/// use autowire_types::{Instance, TypeKey};
	/// use std::sync::Arc;
	///
	/// let scope = SingletonScope::new();
	/// let key = TypeKey::of::<u64>();
	///
	/// let first = scope.get_or_create(key, || Ok(Arc::new(1u64) as Instance)).unwrap();
	/// let second = scope.get_or_create(key, || Ok(Arc::new(2u64) as Instance)).unwrap();
	/// assert!(Arc::ptr_eq(&first, &second));
	/// ```
	pub fn get_or_create<F>(&self, key: TypeKey, create: F) -> DiResult<Instance>
	where
		F: FnOnce() -> DiResult<Instance>,
	{
		if let Some(instance) = self.get(key) {
			return Ok(instance);
		}

		let _creation = self.creation.lock();
		// Another thread may have finished while we waited
		if let Some(instance) = self.get(key) {
			return Ok(instance);
		}

		let instance = create()?;
		self.instances.insert(key, Arc::clone(&instance));
		Ok(instance)
	}

	pub fn contains(&self, key: TypeKey) -> bool {
		self.instances.contains_key(&key)
	}

	pub fn len(&self) -> usize {
		self.instances.len()
	}

	pub fn is_empty(&self) -> bool {
		self.instances.is_empty()
	}
}

impl Default for SingletonScope {
	fn default() -> Self {
		Self::new()
	}
}

/// Lifetime decisions, computed once per concrete type.
///
/// No lock beyond the map itself: two threads may both compute a decision
/// for the same type, and both arrive at the same answer.
#[derive(Default)]
pub struct LifetimeCache {
	decisions: DashMap<TypeKey, Lifetime>,
}

impl LifetimeCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: TypeKey) -> Option<Lifetime> {
		self.decisions.get(&key).map(|entry| *entry.value())
	}

	pub fn insert(&self, key: TypeKey, lifetime: Lifetime) {
		self.decisions.insert(key, lifetime);
	}

	pub fn len(&self) -> usize {
		self.decisions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.decisions.is_empty()
	}
}
