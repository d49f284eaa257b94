//! Runtime type-conversion registry.
//!
//! Converts a value of one type into another without hard-coding per-pair
//! logic at the call site. Three resolution tiers are consulted in order:
//!
//! 1. Exact converters registered for a `(source, destination)` pair. A
//!    registration is also installed against every ancestor of the
//!    destination that has no converter yet.
//! 2. Rules: predicate-guarded converters for open-ended families of pairs,
//!    bucketed by [`RuleCategory`].
//! 3. Fuzzy resolution: walks the ancestor chain of the source (and, for
//!    up-cast capable converters, of the destination).
//!
//! Types take part by implementing [`Reflect`], usually through
//! [`impl_reflect!`]. Hierarchy edges carry a cast that views a value of
//! the child type as its parent, so converters found through an ancestor
//! still accept the original value.
//!
//! A registry is constructed explicitly with [`RegistryBuilder`], which runs
//! every [`Registrar`] exactly once before handing the registry out.

pub mod bootstrap;
pub mod config;
pub mod converter;
pub mod error;
pub mod registry;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use bootstrap::{BootstrapReport, Registrar, RegistrarFailure, RegistryBuilder};
pub use config::RegistryConfig;
pub use converter::Converter;
pub use error::{ConfigError, ConvertError, RegistrationError, Role};
pub use registry::{ConverterEntry, ConverterRegistry, Registered, Resolution, ShadowedSlot, Tier};
pub use store::{ConverterStore, Rule, RuleCategory, RuleStore};
pub use types::{
	Ancestor, Cast, CastPath, HierarchyWalker, Projected, Reflect, Step, Textual, TypeFlags,
	TypeInfo, TypeInfoBuilder,
};
