//! The converter registry.
//!
//! # Role
//!
//! [`ConverterRegistry`] owns the exact store, the rule store and the
//! hierarchy cache, validates registrations and resolves lookups. It is
//! the only entry point application code needs.
//!
//! # Invariants
//!
//! - The exact store, the rule store and the hierarchy cache each sit behind
//!   their own lock; exact-store writers never block rule readers.
//! - Lookups never fail: "no converter" is `None`. Only [`ConverterRegistry::convert`]
//!   turns absence into [`ConvertError::Unsupported`].

use std::any::Any;

use tracing::{debug, error, info, trace, warn};

use crate::bootstrap::RegistryBuilder;
use crate::config::RegistryConfig;
use crate::converter::Converter;
use crate::error::{ConvertError, RegistrationError, Role};
use crate::store::{ConverterStore, Rule, RuleStore};
use crate::types::{HierarchyWalker, Reflect, TypeInfo};

mod resolve;

/// Resolution tier that produced a converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
	Exact,
	Rule,
	Fuzzy,
}

/// A resolved converter and the tier that found it.
#[derive(Debug, Clone)]
pub struct Resolution {
	pub converter: Converter,
	pub tier: Tier,
}

/// An ancestor slot a registration could not fill.
#[derive(Debug, Clone)]
pub struct ShadowedSlot {
	pub destination: &'static TypeInfo,
	/// Converter that already held the slot and keeps it.
	pub kept: Converter,
	/// Set when the kept converter was itself installed by expansion.
	pub kept_inherited_from: Option<&'static TypeInfo>,
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct Registered {
	pub source: &'static TypeInfo,
	pub destination: &'static TypeInfo,
	/// Ancestor slots of the destination filled by this registration.
	pub inherited: Vec<&'static TypeInfo>,
	/// Ancestor slots left to an earlier registration, each one logged as a
	/// warning unless [`RegistryConfig::warn_expansion_overlap`] is off.
	pub shadowed: Vec<ShadowedSlot>,
}

/// A stored converter, as reported by [`ConverterRegistry::for_each_converter`].
#[derive(Debug, Clone)]
pub struct ConverterEntry {
	pub source: &'static TypeInfo,
	pub destination: &'static TypeInfo,
	pub converter: Converter,
	/// The destination the converter was registered for, when this entry
	/// was installed by ancestor expansion.
	pub inherited_from: Option<&'static TypeInfo>,
}

/// Thread-safe conversion registry.
#[derive(Default)]
pub struct ConverterRegistry {
	config: RegistryConfig,
	exact: ConverterStore,
	rules: RuleStore,
	walker: HierarchyWalker,
}

impl ConverterRegistry {
	/// Creates an empty registry with the default configuration.
	///
	/// No registrars run; use [`ConverterRegistry::builder`] to bootstrap.
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_config(config: RegistryConfig) -> Self {
		Self {
			config,
			..Self::default()
		}
	}

	pub fn builder() -> RegistryBuilder {
		RegistryBuilder::new()
	}

	pub fn config(&self) -> &RegistryConfig {
		&self.config
	}

	pub fn walker(&self) -> &HierarchyWalker {
		&self.walker
	}

	/// Registers `converter` for `S -> D`.
	pub fn register<S: Reflect, D: Reflect>(
		&self,
		converter: Converter,
	) -> Result<Registered, RegistrationError> {
		self.register_types(S::type_info(), D::type_info(), converter)
	}

	/// Registers `converter` for `source -> destination`.
	///
	/// The converter is also installed for `source` against every ancestor of
	/// `destination` whose slot is still free. Occupied ancestor slots keep
	/// their converter and are reported in [`Registered::shadowed`].
	///
	/// # Errors
	///
	/// Rejects equal types, types failing the registrability check for their
	/// role, and pairs that already have a converter.
	pub fn register_types(
		&self,
		source: &'static TypeInfo,
		destination: &'static TypeInfo,
		converter: Converter,
	) -> Result<Registered, RegistrationError> {
		let result = validate(source, destination).and_then(|()| {
			let chain = self.walker.ancestors(destination);
			self.exact.insert(source, destination, &converter, &chain)
		});

		let installed = match result {
			Ok(installed) => installed,
			Err(e) => {
				error!(
					source = source.name(),
					destination = destination.name(),
					converter = converter.label(),
					error = %e,
					"converter registration rejected",
				);
				return Err(e);
			}
		};

		debug!(
			source = source.name(),
			destination = destination.name(),
			converter = converter.label(),
			inherited = installed.inherited.len(),
			"converter registered",
		);

		let shadowed = installed
			.occupied
			.into_iter()
			.map(|slot| {
				match slot.inherited_from {
					None => warn!(
						source = source.name(),
						destination = destination.name(),
						slot = slot.destination.name(),
						kept = slot.converter.label(),
						"ancestor slot has an explicit converter; keeping it",
					),
					Some(from) if self.config.warn_expansion_overlap => warn!(
						source = source.name(),
						destination = destination.name(),
						slot = slot.destination.name(),
						kept_from = from.name(),
						"ancestor slot already expanded; keeping it",
					),
					Some(from) => debug!(
						source = source.name(),
						destination = destination.name(),
						slot = slot.destination.name(),
						kept_from = from.name(),
						"ancestor slot already expanded; keeping it",
					),
				}
				ShadowedSlot {
					destination: slot.destination,
					kept: slot.converter,
					kept_inherited_from: slot.inherited_from,
				}
			})
			.collect();

		Ok(Registered {
			source,
			destination,
			inherited: installed.inherited,
			shadowed,
		})
	}

	/// Registers one converter for several sources.
	///
	/// Stops at the first rejected source; earlier sources stay registered.
	pub fn register_many(
		&self,
		sources: &[&'static TypeInfo],
		destination: &'static TypeInfo,
		converter: Converter,
	) -> Result<Vec<Registered>, RegistrationError> {
		sources
			.iter()
			.map(|source| self.register_types(source, destination, converter.clone()))
			.collect()
	}

	pub fn register_rule(&self, rule: Rule) {
		debug!(rule = rule.name(), category = %rule.category(), "rule registered");
		self.rules.insert(rule);
	}

	/// Returns the converter stored for exactly `(source, destination)`.
	pub fn get_exact(&self, source: &'static TypeInfo, destination: &'static TypeInfo) -> Option<Converter> {
		self.exact.get(source, destination)
	}

	/// Returns the converter of the first rule accepting the pair.
	pub fn get_rule_based(&self, source: &'static TypeInfo, destination: &'static TypeInfo) -> Option<Converter> {
		self.rules.find(source, destination)
	}

	/// Tries the exact store, the rules, then fuzzy resolution.
	pub fn resolve(&self, source: &'static TypeInfo, destination: &'static TypeInfo) -> Option<Resolution> {
		if source == destination {
			return None;
		}
		if let Some(converter) = self.get_exact(source, destination) {
			return Some(Resolution {
				converter,
				tier: Tier::Exact,
			});
		}
		if let Some(converter) = self.get_rule_based(source, destination) {
			return Some(Resolution {
				converter,
				tier: Tier::Rule,
			});
		}
		self.get_fuzzy(source, destination).map(|converter| Resolution {
			converter,
			tier: Tier::Fuzzy,
		})
	}

	/// Converts `value` into a `D`.
	///
	/// A converter reached through an expanded ancestor slot still produces
	/// the destination it was registered for. Asking for the ancestor type
	/// itself then fails with [`ConvertError::TargetMismatch`]; use
	/// [`ConverterRegistry::convert_dyn`] to receive the value as produced.
	pub fn convert<S: Reflect, D: Reflect>(&self, value: &S) -> Result<D, ConvertError> {
		let destination = D::type_info();
		self.convert_dyn(value, S::type_info(), destination)?
			.downcast::<D>()
			.map(|out| *out)
			.map_err(|_| ConvertError::TargetMismatch {
				expected: destination.name(),
			})
	}

	/// Converts a type-erased `value` of type `source` into `destination`.
	pub fn convert_dyn(
		&self,
		value: &dyn Any,
		source: &'static TypeInfo,
		destination: &'static TypeInfo,
	) -> Result<Box<dyn Any + Send>, ConvertError> {
		let Some(resolution) = self.resolve(source, destination) else {
			return Err(ConvertError::Unsupported {
				from: source.name(),
				to: destination.name(),
			});
		};
		trace!(
			source = source.name(),
			destination = destination.name(),
			tier = ?resolution.tier,
			converter = resolution.converter.label(),
			"converting",
		);
		resolution.converter.apply(value)
	}

	/// Calls `f` for every stored converter, including entries installed by
	/// ancestor expansion.
	///
	/// Iterates a point-in-time copy; `f` may call back into the registry.
	pub fn for_each_converter(&self, mut f: impl FnMut(&ConverterEntry)) {
		for (source, slot) in self.exact.snapshot() {
			f(&ConverterEntry {
				source,
				destination: slot.destination,
				converter: slot.converter,
				inherited_from: slot.inherited_from,
			});
		}
	}

	/// Number of stored `(source, destination)` entries.
	pub fn converter_count(&self) -> usize {
		self.exact.len()
	}

	pub fn rule_count(&self) -> usize {
		self.rules.len()
	}

	/// Number of source types with at least one stored converter.
	pub fn source_count(&self) -> usize {
		self.exact.source_count()
	}

	/// Drops every converter, rule and cached hierarchy.
	pub fn clear(&self) {
		self.exact.clear();
		self.rules.clear();
		self.walker.clear();
	}

	/// Ends the registry's lifetime.
	pub fn shutdown(self) {
		info!(
			converters = self.converter_count(),
			rules = self.rule_count(),
			"converter registry shut down",
		);
	}
}

fn validate(source: &'static TypeInfo, destination: &'static TypeInfo) -> Result<(), RegistrationError> {
	if source == destination {
		return Err(RegistrationError::SameType { ty: source.name() });
	}
	for (ty, role) in [(source, Role::Source), (destination, Role::Destination)] {
		if let Some(reason) = ty.unregistrable_reason(role) {
			return Err(RegistrationError::NotRegistrable {
				ty: ty.name(),
				role,
				reason,
			});
		}
	}
	Ok(())
}
