//! Closest-first implementation search
//!
//! An abstract target is satisfied by the concrete type "closest" to whoever
//! asked for it. Assemblies are searched in tiers and the first tier with any
//! candidate wins:
//!
//! 1. the requesting assembly
//! 2. the assemblies it references directly
//! 3. every loaded assembly not searched yet
//!
//! Inside the winning tier, candidates are ranked by namespace distance to the
//! requester. A unique closest candidate wins; anything else is ambiguous.

use crate::config::ContainerConfig;
use crate::context::ResolutionContext;
use crate::error::{DiError, DiResult};
use autowire_types::{Assembly, Namespace, TypeDescriptor, TypeKey, TypeRegistry};
use std::collections::HashSet;
use std::sync::Arc;

/// Where a search starts from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Origin {
	assembly: Option<String>,
	namespace: Option<Namespace>,
}

/// Maps abstract targets to concrete implementations.
///
/// Stateless apart from the registry it reads: the same target may resolve
/// differently for different requesters, so results are never cached.
#[derive(Debug, Clone)]
pub struct ImplementationFinder {
	registry: Arc<TypeRegistry>,
	config: ContainerConfig,
}

impl ImplementationFinder {
	pub fn new(registry: Arc<TypeRegistry>, config: ContainerConfig) -> Self {
		Self { registry, config }
	}

	/// The concrete type that satisfies `target` for `context`.
	///
	/// A registered concrete target is returned as is.
	pub fn find_concrete(
		&self,
		target: TypeKey,
		context: &ResolutionContext,
	) -> DiResult<Arc<TypeDescriptor>> {
		if let Some(descriptor) = self.registry.get(target).filter(|d| d.is_concrete()) {
			return Ok(Arc::clone(descriptor));
		}

		let origin = self.origin(context);
		let mut visited: HashSet<&str> = HashSet::new();

		// Tier 1: requesting assembly
		let requesting = origin
			.assembly
			.as_deref()
			.and_then(|name| self.load(name));
		if let Some(assembly) = requesting {
			visited.insert(assembly.name());
			let candidates = candidates_in([assembly], target);
			tracing::trace!(target_type = %target, tier = 1, assembly = %assembly.name(), found = candidates.len(), "searched requesting assembly");
			if !candidates.is_empty() {
				return self.pick(target, candidates, origin.namespace.as_ref());
			}

			// Tier 2: direct references
			let mut referenced = Vec::new();
			for name in assembly.references() {
				if visited.contains(name.as_str()) {
					continue;
				}
				if let Some(reference) = self.load(name) {
					visited.insert(reference.name());
					referenced.push(reference);
				}
			}
			let candidates = candidates_in(referenced, target);
			tracing::trace!(target_type = %target, tier = 2, found = candidates.len(), "searched referenced assemblies");
			if !candidates.is_empty() {
				return self.pick(target, candidates, origin.namespace.as_ref());
			}
		}

		// Tier 3: everything else that is loaded
		let remaining = self
			.registry
			.loaded_assemblies()
			.filter(|assembly| !visited.contains(assembly.name()));
		let candidates = candidates_in(remaining, target);
		tracing::trace!(target_type = %target, tier = 3, found = candidates.len(), "searched all loaded assemblies");
		if !candidates.is_empty() {
			return self.pick(target, candidates, origin.namespace.as_ref());
		}

		Err(DiError::NoImplementationFound {
			type_name: self.display_name(target),
		})
	}

	fn origin(&self, context: &ResolutionContext) -> Origin {
		match context {
			ResolutionContext::Type(key) => match self.registry.get(*key) {
				Some(requester) => Origin {
					assembly: Some(requester.assembly().to_owned()),
					namespace: Some(requester.namespace().clone()),
				},
				None => {
					tracing::debug!(requester = %key, "requesting type is not registered, searching without context");
					self.no_context_origin()
				}
			},
			ResolutionContext::Location {
				assembly,
				namespace,
			} => Origin {
				assembly: Some(assembly.clone()),
				namespace: Some(namespace.clone()),
			},
			ResolutionContext::None => self.no_context_origin(),
		}
	}

	fn no_context_origin(&self) -> Origin {
		Origin {
			assembly: self.config.entry_assembly.clone(),
			namespace: None,
		}
	}

	fn load(&self, name: &str) -> Option<&Assembly> {
		match self.registry.load_assembly(name) {
			Ok(assembly) => Some(assembly),
			Err(error) => {
				tracing::debug!(%error, "skipping assembly that failed to load");
				None
			}
		}
	}

	/// Chooses among the candidates of one tier.
	fn pick(
		&self,
		target: TypeKey,
		candidates: Vec<Arc<TypeDescriptor>>,
		namespace: Option<&Namespace>,
	) -> DiResult<Arc<TypeDescriptor>> {
		let tied = match namespace {
			Some(requester) if self.config.namespace_tie_break => {
				let closest = candidates
					.iter()
					.map(|candidate| requester.distance(candidate.namespace()))
					.min()
					.unwrap_or(0);
				candidates
					.into_iter()
					.filter(|candidate| requester.distance(candidate.namespace()) == closest)
					.collect::<Vec<_>>()
			}
			_ => candidates,
		};

		match <[_; 1]>::try_from(tied) {
			Ok([winner]) => {
				tracing::debug!(target_type = %target, implementation = %winner.full_name(), "implementation found");
				Ok(winner)
			}
			Err(tied) => {
				let mut names: Vec<String> = tied.iter().map(|c| c.full_name()).collect();
				names.sort();
				Err(DiError::AmbiguousImplementation {
					type_name: self.display_name(target),
					candidates: names,
				})
			}
		}
	}

	fn display_name(&self, key: TypeKey) -> String {
		self.registry
			.get(key)
			.map(|descriptor| descriptor.full_name())
			.unwrap_or_else(|| key.type_name().to_owned())
	}
}

fn candidates_in<'a>(
	assemblies: impl IntoIterator<Item = &'a Assembly>,
	target: TypeKey,
) -> Vec<Arc<TypeDescriptor>> {
	assemblies
		.into_iter()
		.flat_map(|assembly| assembly.loadable_types())
		.filter(|ty| ty.is_concrete() && ty.key() != target && ty.is_assignable_to(target))
		.cloned()
		.collect()
}
