//! Resolved constructor arguments

use crate::descriptor::Handle;
use crate::key::TypeKey;
use std::collections::VecDeque;
use std::sync::Arc;

/// Errors raised while a constructor body reads its arguments.
#[derive(Debug, thiserror::Error)]
pub enum ArgumentError {
	#[error("Constructor asked for argument #{position} but only {available} were declared")]
	Exhausted { position: usize, available: usize },

	#[error("Argument #{position} was declared as {declared} but read as {requested}")]
	Mismatch {
		position: usize,
		declared: &'static str,
		requested: &'static str,
	},
}

/// Arguments resolved for one constructor call, consumed in declaration order.
///
/// # Examples
///
/// ```
/// use autowire_types::{Arguments, TypeKey};
/// use std::sync::Arc;
///
/// let mut args = Arguments::new();
/// args.push(TypeKey::of::<Vec<u8>>(), Box::new(Arc::new(vec![1u8, 2])));
///
/// let bytes: Arc<Vec<u8>> = args.take().unwrap();
/// assert_eq!(bytes.len(), 2);
/// ```
#[derive(Default)]
pub struct Arguments {
	values: VecDeque<(TypeKey, Handle)>,
	taken: usize,
	declared: usize,
}

impl Arguments {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends an argument; `handle` must hold an `Arc` of the declared type.
	pub fn push(&mut self, declared: TypeKey, handle: Handle) {
		self.values.push_back((declared, handle));
		self.declared += 1;
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Takes the next argument as `Arc<P>`.
	pub fn take<P>(&mut self) -> Result<Arc<P>, ArgumentError>
	where
		P: ?Sized + Send + Sync + 'static,
	{
		let position = self.taken;
		let (declared, handle) = self.values.pop_front().ok_or(ArgumentError::Exhausted {
			position,
			available: self.declared,
		})?;
		self.taken += 1;
		handle
			.downcast::<Arc<P>>()
			.map(|boxed| *boxed)
			.map_err(|_| ArgumentError::Mismatch {
				position,
				declared: declared.type_name(),
				requested: std::any::type_name::<P>(),
			})
	}
}
