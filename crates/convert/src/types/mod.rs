//! Runtime type descriptors.
//!
//! # Role
//!
//! A [`TypeInfo`] is the identity of a type as seen by the registry: a
//! [`TypeId`] key, a display name, visibility/kind flags and the declared
//! hierarchy (one optional superclass edge plus capability edges).
//!
//! # Invariants
//!
//! - Descriptors are `'static` and never reclaimed; the registry assumes a
//!   closed type universe.
//! - Equality and hashing use the [`TypeId`] only.
//! - Hierarchy edges point at their target lazily (`fn() -> &'static TypeInfo`)
//!   so mutually referencing descriptors can be declared without
//!   initialization cycles.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use bitflags::bitflags;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

mod hierarchy;
mod primitives;

pub use hierarchy::{Ancestor, CastPath, HierarchyWalker, Step, walk};
pub(crate) use hierarchy::project_along;
pub use primitives::Textual;

bitflags! {
	/// Visibility and kind of a described type.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct TypeFlags: u8 {
		/// Visible to registrars outside the declaring module.
		const PUBLIC = 1 << 0;
		/// Cannot be produced directly; only reachable as an ancestor.
		const ABSTRACT = 1 << 1;
		/// A capability view (trait-like ancestor) rather than a class.
		const CAPABILITY = 1 << 2;
		/// Has no stable name.
		const ANONYMOUS = 1 << 3;
		/// Metadata marker, never a value carrier.
		const ANNOTATION = 1 << 4;
	}
}

/// A value viewed as one of its ancestors.
pub enum Projected<'a> {
	/// The ancestor lives inside the value (embedded base struct).
	Borrowed(&'a dyn Any),
	/// The ancestor view had to be built (capability views).
	Owned(Box<dyn Any + Send>),
}

impl Projected<'_> {
	pub fn as_any(&self) -> &dyn Any {
		match self {
			Self::Borrowed(value) => *value,
			Self::Owned(value) => &**value,
		}
	}
}

impl fmt::Debug for Projected<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Borrowed(_) => f.write_str("Projected::Borrowed(..)"),
			Self::Owned(_) => f.write_str("Projected::Owned(..)"),
		}
	}
}

/// Views a value of a child type as its parent.
///
/// Returns `None` when the value is not of the child type.
pub type Cast = for<'a> fn(&'a dyn Any) -> Option<Projected<'a>>;

/// A declared hierarchy edge.
#[derive(Clone, Copy)]
pub(crate) struct Edge {
	pub(crate) target: fn() -> &'static TypeInfo,
	pub(crate) cast: Cast,
}

/// Types that can take part in registry conversions.
pub trait Reflect: Any + Send + Sync {
	/// Returns the descriptor for this type.
	fn type_info() -> &'static TypeInfo;
}

/// Descriptor of a type known to the registry.
pub struct TypeInfo {
	id: TypeId,
	name: &'static str,
	flags: TypeFlags,
	superclass: Option<Edge>,
	capabilities: Vec<Edge>,
}

static INTERNED: LazyLock<RwLock<FxHashMap<TypeId, &'static TypeInfo>>> =
	LazyLock::new(Default::default);

impl TypeInfo {
	/// Starts a descriptor for `T`. Types are public and concrete by default.
	pub fn builder<T: Any>(name: &'static str) -> TypeInfoBuilder {
		TypeInfoBuilder {
			info: TypeInfo {
				id: TypeId::of::<T>(),
				name,
				flags: TypeFlags::PUBLIC,
				superclass: None,
				capabilities: Vec::new(),
			},
		}
	}

	/// Returns the descriptor of a reflected type.
	#[inline]
	pub fn of<T: Reflect>() -> &'static TypeInfo {
		T::type_info()
	}

	/// Returns the cached descriptor for `T`, building it on first use.
	///
	/// Generic types cannot own a `static` per instantiation, so their
	/// [`Reflect`] impls go through this process-wide table instead.
	pub fn intern<T: Any>(build: impl FnOnce() -> TypeInfo) -> &'static TypeInfo {
		let id = TypeId::of::<T>();
		if let Some(info) = INTERNED.read().get(&id) {
			return *info;
		}

		// Build outside the lock: descriptors may touch other interned types.
		let info = build();
		debug_assert_eq!(info.id, id, "interned descriptor built for another type");
		let mut table = INTERNED.write();
		*table.entry(id).or_insert_with(|| Box::leak(Box::new(info)))
	}

	#[inline]
	pub fn id(&self) -> TypeId {
		self.id
	}

	#[inline]
	pub fn name(&self) -> &'static str {
		self.name
	}

	#[inline]
	pub fn flags(&self) -> TypeFlags {
		self.flags
	}

	pub fn is_public(&self) -> bool {
		self.flags.contains(TypeFlags::PUBLIC)
	}

	pub fn is_abstract(&self) -> bool {
		self.flags.contains(TypeFlags::ABSTRACT)
	}

	pub fn is_capability(&self) -> bool {
		self.flags.contains(TypeFlags::CAPABILITY)
	}

	/// Returns why this type may not appear in a registration, if anything.
	///
	/// Abstract types and capabilities are allowed as sources: fuzzy
	/// resolution depends on converters keyed by them.
	pub fn unregistrable_reason(&self, role: crate::error::Role) -> Option<&'static str> {
		if !self.is_public() {
			return Some("type is not public");
		}
		if self.flags.contains(TypeFlags::ANONYMOUS) {
			return Some("type is anonymous");
		}
		if self.flags.contains(TypeFlags::ANNOTATION) {
			return Some("type is an annotation");
		}
		if role == crate::error::Role::Destination {
			if self.is_capability() {
				return Some("capabilities cannot be instantiated");
			}
			if self.is_abstract() {
				return Some("abstract types cannot be instantiated");
			}
		}
		None
	}

	/// Returns true if the type may be used as a registration source.
	pub fn is_registrable(&self) -> bool {
		self.unregistrable_reason(crate::error::Role::Source).is_none()
	}

	/// Returns true if the type may be used as a registration destination.
	pub fn is_instantiable(&self) -> bool {
		self.unregistrable_reason(crate::error::Role::Destination)
			.is_none()
	}

	/// Returns the declared superclass, if any.
	pub fn superclass(&self) -> Option<&'static TypeInfo> {
		self.superclass.map(|edge| (edge.target)())
	}

	/// Returns the directly implemented capabilities in declaration order.
	pub fn capabilities(&self) -> impl Iterator<Item = &'static TypeInfo> + '_ {
		self.capabilities.iter().map(|edge| (edge.target)())
	}

	pub(crate) fn superclass_edge(&self) -> Option<&Edge> {
		self.superclass.as_ref()
	}

	pub(crate) fn capability_edges(&self) -> &[Edge] {
		&self.capabilities
	}

	/// Returns the ancestor chain, self first.
	///
	/// Walks on every call; [`HierarchyWalker`] caches the same result.
	pub fn ancestors(&'static self) -> Vec<Ancestor> {
		walk(self)
	}

	/// Returns true if `other` is this type or one of its ancestors.
	pub fn is_a(&self, other: &TypeInfo) -> bool {
		let mut pending: Vec<&TypeInfo> = vec![self];
		let mut seen = rustc_hash::FxHashSet::default();
		while let Some(info) = pending.pop() {
			if info.id == other.id {
				return true;
			}
			if !seen.insert(info.id) {
				continue;
			}
			pending.extend(info.superclass_edge().map(|edge| (edge.target)()));
			pending.extend(info.capability_edges().iter().map(|edge| (edge.target)()));
		}
		false
	}
}

impl PartialEq for TypeInfo {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Debug for TypeInfo {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeInfo")
			.field("name", &self.name)
			.field("flags", &self.flags)
			.field("superclass", &self.superclass().map(TypeInfo::name))
			.field(
				"capabilities",
				&self.capabilities().map(TypeInfo::name).collect::<Vec<_>>(),
			)
			.finish()
	}
}

impl fmt::Display for TypeInfo {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

/// Builder returned by [`TypeInfo::builder`].
pub struct TypeInfoBuilder {
	info: TypeInfo,
}

impl TypeInfoBuilder {
	/// Declares the superclass. A later call replaces the earlier one.
	pub fn extends<P: Reflect>(mut self, cast: Cast) -> Self {
		self.info.superclass = Some(Edge {
			target: P::type_info,
			cast,
		});
		self
	}

	/// Declares an implemented capability. Order of calls is enumeration order.
	pub fn implements<C: Reflect>(mut self, cast: Cast) -> Self {
		self.info.capabilities.push(Edge {
			target: C::type_info,
			cast,
		});
		self
	}

	pub fn abstract_type(mut self) -> Self {
		self.info.flags.insert(TypeFlags::ABSTRACT);
		self
	}

	pub fn capability(mut self) -> Self {
		self.info.flags.insert(TypeFlags::CAPABILITY);
		self
	}

	pub fn private(mut self) -> Self {
		self.info.flags.remove(TypeFlags::PUBLIC);
		self
	}

	pub fn anonymous(mut self) -> Self {
		self.info.flags.insert(TypeFlags::ANONYMOUS);
		self
	}

	pub fn annotation(mut self) -> Self {
		self.info.flags.insert(TypeFlags::ANNOTATION);
		self
	}

	pub fn build(self) -> TypeInfo {
		self.info
	}
}

/// Implements [`Reflect`] for a non-generic type.
///
/// ```ignore
/// impl_reflect!(IntWrapper);
/// impl_reflect!(PositiveInt, |b| b.extends::<IntWrapper>(|v| {
/// 	v.downcast_ref::<PositiveInt>().map(|p| Projected::Borrowed(&p.base))
/// }));
/// ```
#[macro_export]
macro_rules! impl_reflect {
	($ty:ty) => {
		$crate::impl_reflect!($ty, |builder| builder);
	};
	($ty:ty, |$builder:ident| $body:expr) => {
		impl $crate::Reflect for $ty {
			fn type_info() -> &'static $crate::TypeInfo {
				static INFO: ::std::sync::LazyLock<$crate::TypeInfo> =
					::std::sync::LazyLock::new(|| {
						let $builder = $crate::TypeInfo::builder::<$ty>(stringify!($ty));
						$body.build()
					});
				&INFO
			}
		}
	};
}
