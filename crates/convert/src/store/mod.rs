//! Converter storage.
//!
//! # Role
//!
//! [`ConverterStore`] maps `source -> destination -> converter`. Each
//! source owns an inner table behind its own lock so registrations for
//! different sources do not contend.
//!
//! # Invariants
//!
//! - Entries are append-only; a slot, once filled, keeps its converter
//!   until [`ConverterStore::clear`].
//! - Inner tables are created lazily with a read probe followed by a
//!   write-locked re-check, and are published empty before any entry is
//!   inserted under the inner write lock.
//! - Lock order is outer, then inner. Lookups release the outer lock before
//!   taking the inner one.

use std::any::TypeId;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockWriteGuard};
use rustc_hash::FxHashMap;

use crate::converter::Converter;
use crate::error::RegistrationError;
use crate::types::{Ancestor, TypeInfo};

mod rules;

pub use rules::{Rule, RuleCategory, RuleStore};

/// A stored converter and how it got into its slot.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
	pub(crate) destination: &'static TypeInfo,
	pub(crate) converter: Converter,
	/// Set when the slot was filled by expanding a registration for a
	/// descendant of `destination`.
	pub(crate) inherited_from: Option<&'static TypeInfo>,
}

type Targets = FxHashMap<TypeId, Slot>;

struct SourceTable {
	source: &'static TypeInfo,
	targets: Arc<RwLock<Targets>>,
}

impl SourceTable {
	fn new(source: &'static TypeInfo) -> Self {
		Self {
			source,
			targets: Arc::default(),
		}
	}
}

/// Outcome of a successful [`ConverterStore::insert`].
#[derive(Debug, Default, Clone)]
pub(crate) struct Installed {
	/// Ancestor slots newly filled with the converter.
	pub(crate) inherited: Vec<&'static TypeInfo>,
	/// Ancestor slots left alone because they already held a converter.
	pub(crate) occupied: Vec<Slot>,
}

/// Two-level exact converter table.
#[derive(Default)]
pub struct ConverterStore {
	by_source: RwLock<FxHashMap<TypeId, SourceTable>>,
}

impl ConverterStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts `converter` for `(source, destination)` and every ancestor
	/// slot of `destination` that is still free.
	///
	/// `destination_chain` is the ancestor chain of `destination`, self
	/// first. Validation of the pair itself happens in the registry.
	pub(crate) fn insert(
		&self,
		source: &'static TypeInfo,
		destination: &'static TypeInfo,
		converter: &Converter,
		destination_chain: &[Ancestor],
	) -> Result<Installed, RegistrationError> {
		let probe = self.by_source.read();
		let existing = probe.get(&source.id()).map(|t| Arc::clone(&t.targets));
		// Keep the outer lock shared for the whole insertion so `clear` cannot
		// orphan the inner table we are writing to.
		let (_outer, targets) = match existing {
			Some(targets) => (probe, targets),
			None => {
				drop(probe);
				let mut outer = self.by_source.write();
				let targets = Arc::clone(
					&outer
						.entry(source.id())
						.or_insert_with(|| SourceTable::new(source))
						.targets,
				);
				(RwLockWriteGuard::downgrade(outer), targets)
			}
		};

		let mut targets = targets.write();
		if let Some(slot) = targets.get(&destination.id()) {
			return Err(RegistrationError::Duplicate {
				source_ty: source.name(),
				destination: destination.name(),
				existing: slot.converter.label().to_owned(),
				inherited_from: slot.inherited_from.map(TypeInfo::name),
			});
		}
		targets.insert(
			destination.id(),
			Slot {
				destination,
				converter: converter.clone(),
				inherited_from: None,
			},
		);

		let mut installed = Installed::default();
		for ancestor in destination_chain.iter().skip(1) {
			// An ancestor equal to the source would be an identity slot.
			if ancestor.info == source {
				continue;
			}
			match targets.entry(ancestor.info.id()) {
				Entry::Vacant(slot) => {
					slot.insert(Slot {
						destination: ancestor.info,
						converter: converter.clone(),
						inherited_from: Some(destination),
					});
					installed.inherited.push(ancestor.info);
				}
				Entry::Occupied(slot) => installed.occupied.push(slot.get().clone()),
			}
		}
		Ok(installed)
	}

	/// Returns the converter stored for exactly `(source, destination)`.
	pub fn get(&self, source: &TypeInfo, destination: &TypeInfo) -> Option<Converter> {
		let targets = {
			let by_source = self.by_source.read();
			Arc::clone(&by_source.get(&source.id())?.targets)
		};
		let targets = targets.read();
		targets
			.get(&destination.id())
			.map(|slot| slot.converter.clone())
	}

	/// Returns every stored slot as `(source, slot)`.
	///
	/// Every inner read guard is taken before anything is copied, so the
	/// result is one point in time. Writers lock a single inner table at a
	/// time, which keeps this free of lock-order cycles.
	pub(crate) fn snapshot(&self) -> Vec<(&'static TypeInfo, Slot)> {
		let by_source = self.by_source.read();
		let guards: Vec<_> = by_source
			.values()
			.map(|table| (table.source, table.targets.read()))
			.collect();
		guards
			.iter()
			.flat_map(|(source, targets)| targets.values().map(move |slot| (*source, slot.clone())))
			.collect()
	}

	/// Number of stored slots, including ones filled by ancestor expansion.
	pub fn len(&self) -> usize {
		self.by_source
			.read()
			.values()
			.map(|table| table.targets.read().len())
			.sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Number of source types with an inner table.
	pub fn source_count(&self) -> usize {
		self.by_source.read().len()
	}

	pub fn clear(&self) {
		self.by_source.write().clear();
	}
}
