//! Type-erased conversion functions.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::error::ConvertError;
use crate::types::{Ancestor, CastPath, project_along};

type ConvertFn = dyn Fn(&dyn Any) -> Result<Box<dyn Any + Send>, ConvertError> + Send + Sync;

struct Inner {
	label: Arc<str>,
	func: Box<ConvertFn>,
}

/// A conversion function from one type to another.
///
/// Cloning is cheap. Two converters compare equal when they wrap the same
/// function, even if one of them was reached through an ancestor and
/// carries a projection path.
#[derive(Clone)]
pub struct Converter {
	inner: Arc<Inner>,
	upcast_capable: bool,
	path: CastPath,
}

impl Converter {
	/// Wraps a typed, fallible conversion.
	pub fn new<S, D>(
		label: impl Into<Arc<str>>,
		f: impl Fn(&S) -> Result<D, ConvertError> + Send + Sync + 'static,
	) -> Self
	where
		S: Any,
		D: Any + Send,
	{
		Self::from_dyn(label, move |value: &dyn Any| {
			let source = value
				.downcast_ref::<S>()
				.ok_or(ConvertError::SourceMismatch {
					expected: type_name::<S>(),
				})?;
			f(source).map(|out| Box::new(out) as Box<dyn Any + Send>)
		})
	}

	/// Wraps a typed conversion that cannot fail.
	pub fn infallible<S, D>(
		label: impl Into<Arc<str>>,
		f: impl Fn(&S) -> D + Send + Sync + 'static,
	) -> Self
	where
		S: Any,
		D: Any + Send,
	{
		Self::new(label, move |source: &S| Ok(f(source)))
	}

	/// Wraps an already type-erased conversion.
	pub fn from_dyn(
		label: impl Into<Arc<str>>,
		f: impl Fn(&dyn Any) -> Result<Box<dyn Any + Send>, ConvertError> + Send + Sync + 'static,
	) -> Self {
		Self {
			inner: Arc::new(Inner {
				label: label.into(),
				func: Box::new(f),
			}),
			upcast_capable: false,
			path: CastPath::new(),
		}
	}

	/// Marks the converter as able to serve requests for descendants of its
	/// registered destination.
	///
	/// Such converters pick the concrete output type at run time (a factory
	/// registered for `Polygon` that yields `Square` values, say). Callers
	/// still get [`ConvertError::TargetMismatch`] if the produced value is not
	/// the requested type.
	pub fn upcast_capable(mut self) -> Self {
		self.upcast_capable = true;
		self
	}

	pub fn is_upcast_capable(&self) -> bool {
		self.upcast_capable
	}

	pub fn label(&self) -> &str {
		&self.inner.label
	}

	/// Returns the casts applied to the input before the wrapped function.
	pub fn path(&self) -> &CastPath {
		&self.path
	}

	/// Returns a converter that accepts values of a descendant type, viewing
	/// them as `ancestor` first.
	pub fn via(&self, ancestor: &Ancestor) -> Self {
		let mut path = ancestor.path.clone();
		path.extend(self.path.iter().copied());
		Self {
			inner: Arc::clone(&self.inner),
			upcast_capable: self.upcast_capable,
			path,
		}
	}

	/// Applies the converter to a type-erased value.
	pub fn apply(&self, value: &dyn Any) -> Result<Box<dyn Any + Send>, ConvertError> {
		project_along(&self.path, value, |projected| (self.inner.func)(projected))?
	}

	/// Applies the converter and downcasts the result.
	pub fn apply_as<D: Any>(&self, value: &dyn Any) -> Result<D, ConvertError> {
		self.apply(value)?
			.downcast::<D>()
			.map(|out| *out)
			.map_err(|_| ConvertError::TargetMismatch {
				expected: type_name::<D>(),
			})
	}
}

impl PartialEq for Converter {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl Eq for Converter {}

impl fmt::Debug for Converter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Converter")
			.field("label", &self.label())
			.field("upcast_capable", &self.upcast_capable)
			.field("path", &self.path)
			.finish()
	}
}
