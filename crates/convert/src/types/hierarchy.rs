//! Ancestor enumeration.
//!
//! The order is: the type itself, its superclass chain (nearest first),
//! then capabilities. Capabilities are collected per class of the chain in
//! declaration order, each followed depth-first by the capabilities it
//! builds on. A type reached twice keeps its first position.
//!
//! Fuzzy resolution returns the first match in this order, so it is part of
//! the registry's observable behavior.

use std::any::{Any, TypeId};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use super::{Cast, Edge, Projected, TypeInfo};
use crate::error::ConvertError;

/// One cast of a projection path, with the type it lands on.
#[derive(Clone, Copy)]
pub struct Step {
	pub to: &'static TypeInfo,
	pub cast: Cast,
}

impl std::fmt::Debug for Step {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "-> {}", self.to.name())
	}
}

/// Casts leading from a type to one of its ancestors.
pub type CastPath = SmallVec<[Step; 4]>;

/// An ancestor of a walked type, with the casts that reach it.
#[derive(Debug, Clone)]
pub struct Ancestor {
	pub info: &'static TypeInfo,
	pub path: CastPath,
}

impl Ancestor {
	fn root(info: &'static TypeInfo) -> Self {
		Self {
			info,
			path: CastPath::new(),
		}
	}

	fn child(&self, edge: &Edge) -> Self {
		let to = (edge.target)();
		let mut path = self.path.clone();
		path.push(Step {
			to,
			cast: edge.cast,
		});
		Self { info: to, path }
	}

	/// Number of edges between the walked type and this ancestor.
	pub fn depth(&self) -> usize {
		self.path.len()
	}

	/// Views `value` (an instance of the walked type) as this ancestor and
	/// hands the view to `f`.
	pub fn project<R>(
		&self,
		value: &dyn Any,
		f: impl FnOnce(&dyn Any) -> R,
	) -> Result<R, ConvertError> {
		project_along(&self.path, value, f)
	}
}

/// Applies `path` to `value` and calls `f` on the result.
///
/// Owned intermediate views only live for the duration of the call, which
/// is why this takes a continuation instead of returning the view.
pub(crate) fn project_along<R>(
	path: &[Step],
	value: &dyn Any,
	f: impl FnOnce(&dyn Any) -> R,
) -> Result<R, ConvertError> {
	let Some((step, rest)) = path.split_first() else {
		return Ok(f(value));
	};
	match (step.cast)(value) {
		Some(Projected::Borrowed(next)) => project_along(rest, next, f),
		Some(Projected::Owned(next)) => project_along(rest, &*next, f),
		None => Err(ConvertError::Projection {
			through: step.to.name(),
		}),
	}
}

/// Enumerates the ancestors of `info` without caching.
pub fn walk(info: &'static TypeInfo) -> Vec<Ancestor> {
	let mut seen = FxHashSet::default();
	let mut out = Vec::new();

	let mut current = Ancestor::root(info);
	loop {
		if !seen.insert(current.info.id()) {
			tracing::warn!(ty = info.name(), at = current.info.name(), "superclass cycle");
			break;
		}
		out.push(current.clone());
		let Some(edge) = current.info.superclass_edge() else {
			break;
		};
		current = current.child(edge);
	}

	let chain_len = out.len();
	for i in 0..chain_len {
		let class = out[i].clone();
		for edge in class.info.capability_edges() {
			visit_capability(&class, edge, &mut seen, &mut out);
		}
	}
	out
}

fn visit_capability(
	from: &Ancestor,
	edge: &Edge,
	seen: &mut FxHashSet<TypeId>,
	out: &mut Vec<Ancestor>,
) {
	let node = from.child(edge);
	if !seen.insert(node.info.id()) {
		return;
	}
	out.push(node.clone());
	for next in node.info.superclass_edge().into_iter().chain(node.info.capability_edges()) {
		visit_capability(&node, next, seen, out);
	}
}

/// Caches ancestor chains per type.
///
/// The walk runs outside the lock; concurrent first lookups may both walk,
/// but only the first result is published.
#[derive(Default)]
pub struct HierarchyWalker {
	cache: RwLock<FxHashMap<TypeId, Arc<[Ancestor]>>>,
}

impl HierarchyWalker {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the ancestor chain of `info`, self first.
	pub fn ancestors(&self, info: &'static TypeInfo) -> Arc<[Ancestor]> {
		if let Some(chain) = self.cache.read().get(&info.id()) {
			return Arc::clone(chain);
		}

		let chain: Arc<[Ancestor]> = walk(info).into();
		let mut cache = self.cache.write();
		Arc::clone(cache.entry(info.id()).or_insert(chain))
	}

	/// Number of types with a cached chain.
	pub fn cached(&self) -> usize {
		self.cache.read().len()
	}

	pub fn clear(&self) {
		self.cache.write().clear();
	}
}
