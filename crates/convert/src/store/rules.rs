//! Predicate-guarded converters.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::converter::Converter;
use crate::types::TypeInfo;

/// Priority bucket of a rule. Buckets are consulted in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleCategory {
	/// Lossy conversions between related types.
	Narrowing,
	/// Lossless conversions between related types.
	Widening,
	/// Conversions between container shapes.
	Collection,
	/// Catch-all rules consulted last.
	Fallback,
}

impl RuleCategory {
	pub const ALL: [Self; 4] = [
		Self::Narrowing,
		Self::Widening,
		Self::Collection,
		Self::Fallback,
	];

	const fn index(self) -> usize {
		self as usize
	}
}

impl fmt::Display for RuleCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Narrowing => write!(f, "narrowing"),
			Self::Widening => write!(f, "widening"),
			Self::Collection => write!(f, "collection"),
			Self::Fallback => write!(f, "fallback"),
		}
	}
}

type Predicate = dyn Fn(&'static TypeInfo, &'static TypeInfo) -> bool + Send + Sync;
type Factory = dyn Fn(&'static TypeInfo, &'static TypeInfo) -> Converter + Send + Sync;

#[derive(Clone)]
enum Action {
	Fixed(Converter),
	/// Builds a converter for the matched pair, for rules whose conversion
	/// depends on the concrete source or destination.
	PerPair(Arc<Factory>),
}

/// A converter for every `(source, destination)` pair its predicate accepts.
#[derive(Clone)]
pub struct Rule {
	name: &'static str,
	category: RuleCategory,
	predicate: Arc<Predicate>,
	action: Action,
}

impl Rule {
	pub fn new(
		name: &'static str,
		category: RuleCategory,
		predicate: impl Fn(&'static TypeInfo, &'static TypeInfo) -> bool + Send + Sync + 'static,
		converter: Converter,
	) -> Self {
		Self {
			name,
			category,
			predicate: Arc::new(predicate),
			action: Action::Fixed(converter),
		}
	}

	/// Creates a rule that builds its converter from the matched pair.
	pub fn per_pair(
		name: &'static str,
		category: RuleCategory,
		predicate: impl Fn(&'static TypeInfo, &'static TypeInfo) -> bool + Send + Sync + 'static,
		factory: impl Fn(&'static TypeInfo, &'static TypeInfo) -> Converter + Send + Sync + 'static,
	) -> Self {
		Self {
			name,
			category,
			predicate: Arc::new(predicate),
			action: Action::PerPair(Arc::new(factory)),
		}
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn category(&self) -> RuleCategory {
		self.category
	}

	pub fn matches(&self, source: &'static TypeInfo, destination: &'static TypeInfo) -> bool {
		(self.predicate)(source, destination)
	}

	fn converter_for(
		&self,
		source: &'static TypeInfo,
		destination: &'static TypeInfo,
	) -> Converter {
		match &self.action {
			Action::Fixed(converter) => converter.clone(),
			Action::PerPair(factory) => factory(source, destination),
		}
	}
}

impl fmt::Debug for Rule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Rule")
			.field("name", &self.name)
			.field("category", &self.category)
			.finish_non_exhaustive()
	}
}

/// Rules bucketed by category, each bucket in registration order.
#[derive(Default)]
pub struct RuleStore {
	buckets: RwLock<[Vec<Rule>; RuleCategory::ALL.len()]>,
}

impl RuleStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&self, rule: Rule) {
		self.buckets.write()[rule.category.index()].push(rule);
	}

	/// Returns the converter of the first rule accepting the pair.
	///
	/// Linear in the number of rules; rule sets are expected to stay small.
	pub fn find(&self, source: &'static TypeInfo, destination: &'static TypeInfo) -> Option<Converter> {
		self.find_rule(source, destination)
			.map(|rule| rule.converter_for(source, destination))
	}

	/// Returns the first rule accepting the pair.
	///
	/// Predicates run on a copy of the rule list, outside the lock, so they
	/// may call back into the store.
	pub fn find_rule(&self, source: &'static TypeInfo, destination: &'static TypeInfo) -> Option<Rule> {
		self.snapshot()
			.into_iter()
			.find(|rule| rule.matches(source, destination))
	}

	/// Every rule in consultation order.
	fn snapshot(&self) -> Vec<Rule> {
		let buckets = self.buckets.read();
		RuleCategory::ALL
			.iter()
			.flat_map(|category| buckets[category.index()].iter().cloned())
			.collect()
	}

	pub fn len(&self) -> usize {
		self.buckets.read().iter().map(Vec::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Number of rules in one bucket.
	pub fn bucket_len(&self, category: RuleCategory) -> usize {
		self.buckets.read()[category.index()].len()
	}

	pub fn clear(&self) {
		self.buckets.write().iter_mut().for_each(Vec::clear);
	}
}
