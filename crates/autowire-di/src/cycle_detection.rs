//! Per-resolution circular dependency detection
//!
//! Each top-level resolve call owns a [`ResolutionSession`](crate::ResolutionSession)
//! holding two independent [`ResolutionStack`]s, one for lifetime analysis and
//! one for construction. The session is threaded through every recursive call,
//! so in-progress state is never shared between threads or between calls.
//!
//! ## Features
//!
//! - **O(1) Circular Detection**: Fast lookup using `HashSet<TypeKey>`
//! - **Ordered Path**: The full in-progress chain is reported on a cycle
//! - **RAII**: Automatic cleanup via [`ResolutionGuard`], on success and on failure

use autowire_types::TypeKey;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;

/// Which traversal detected a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPass {
	LifetimeAnalysis,
	Construction,
}

impl fmt::Display for ResolutionPass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ResolutionPass::LifetimeAnalysis => f.write_str("lifetime analysis"),
			ResolutionPass::Construction => f.write_str("construction"),
		}
	}
}

#[derive(Default)]
struct StackState {
	/// Set of types currently being resolved (O(1) circular detection)
	resolution_set: HashSet<TypeKey>,
	/// Resolution path (for displaying circular paths)
	resolution_path: Vec<(TypeKey, String)>,
}

/// Types currently in progress for one pass of one resolution call.
pub struct ResolutionStack {
	pass: ResolutionPass,
	state: RefCell<StackState>,
}

impl ResolutionStack {
	pub fn new(pass: ResolutionPass) -> Self {
		Self {
			pass,
			state: RefCell::new(StackState::default()),
		}
	}

	pub fn pass(&self) -> ResolutionPass {
		self.pass
	}

	/// Record the start of resolution
	///
	/// Fails with [`CycleError`] if `type_key` is already in progress. The
	/// returned guard removes the entry when dropped.
	pub fn begin_resolution(
		&self,
		type_key: TypeKey,
		type_name: impl Into<String>,
	) -> Result<ResolutionGuard<'_>, CycleError> {
		let type_name = type_name.into();
		let mut state = self.state.borrow_mut();
		if state.resolution_set.contains(&type_key) {
			let mut path: Vec<String> = state
				.resolution_path
				.iter()
				.map(|(_, name)| name.clone())
				.collect();
			path.push(type_name.clone());
			return Err(CycleError {
				pass: self.pass,
				type_name,
				path,
			});
		}
		state.resolution_set.insert(type_key);
		state.resolution_path.push((type_key, type_name));
		Ok(ResolutionGuard {
			stack: self,
			type_key,
		})
	}

	pub fn contains(&self, type_key: TypeKey) -> bool {
		self.state.borrow().resolution_set.contains(&type_key)
	}

	pub fn depth(&self) -> usize {
		self.state.borrow().resolution_path.len()
	}

	pub fn is_empty(&self) -> bool {
		self.depth() == 0
	}

	/// Names of the in-progress types, outermost first.
	pub fn path(&self) -> Vec<String> {
		self.state
			.borrow()
			.resolution_path
			.iter()
			.map(|(_, name)| name.clone())
			.collect()
	}
}

/// RAII guard: Automatic cleanup on Drop
///
/// When resolution is complete, the type is removed from the stack.
#[derive(Debug)]
pub struct ResolutionGuard<'a> {
	stack: &'a ResolutionStack,
	type_key: TypeKey,
}

impl Drop for ResolutionGuard<'_> {
	fn drop(&mut self) {
		let mut state = self.stack.state.borrow_mut();
		state.resolution_set.remove(&self.type_key);
		if let Some(pos) = state
			.resolution_path
			.iter()
			.rposition(|(key, _)| *key == self.type_key)
		{
			state.resolution_path.remove(pos);
		}
	}
}

impl fmt::Debug for ResolutionStack {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ResolutionStack")
			.field("pass", &self.pass)
			.field("path", &self.path())
			.finish()
	}
}

/// Circular dependency error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
	"Circular dependency detected during {pass}: {type_name}\n  Path: {chain}\nThis forms a cycle that cannot be resolved.",
	chain = .path.join(" -> ")
)]
pub struct CycleError {
	/// Pass that detected the cycle
	pub pass: ResolutionPass,
	/// Type that closed the cycle
	pub type_name: String,
	/// Every in-progress type in order, followed by the type that closed the cycle
	pub path: Vec<String>,
}

impl CycleError {
	/// The cycle itself: from the first occurrence of the repeated type to the end.
	pub fn cycle(&self) -> &[String] {
		let start = self
			.path
			.iter()
			.position(|name| *name == self.type_name)
			.unwrap_or(0);
		&self.path[start..]
	}
}
