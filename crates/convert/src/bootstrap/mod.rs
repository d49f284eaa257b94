//! Registry construction and registrar discovery.
//!
//! # Role
//!
//! A [`Registrar`] is a named function that installs converters and rules.
//! Crates submit registrars with `inventory::submit!`; [`RegistryBuilder`]
//! collects them, runs each exactly once and only then hands the registry
//! out. Lookups therefore never race with discovery.
//!
//! # Invariants
//!
//! - Explicit registrars run first, in insertion order, then discovered ones
//!   sorted by `(priority, name)`.
//! - A registrar name seen twice runs once; the first occurrence wins.
//! - A registrar that errors or panics is recorded in the report. Converters
//!   it installed before failing stay installed.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use rustc_hash::FxHashSet;
use tracing::{debug, error, info};

use crate::config::RegistryConfig;
use crate::error::RegistrationError;
use crate::registry::ConverterRegistry;


/// Installs a group of converters.
#[derive(Debug, Clone, Copy)]
pub struct Registrar {
	/// Unique name, also used by [`RegistryConfig::disabled_registrars`].
	pub name: &'static str,
	/// Lower runs first among discovered registrars.
	pub priority: i16,
	pub install: fn(&ConverterRegistry) -> Result<(), RegistrationError>,
}

inventory::collect!(Registrar);

impl Registrar {
	pub const fn new(
		name: &'static str,
		install: fn(&ConverterRegistry) -> Result<(), RegistrationError>,
	) -> Self {
		Self {
			name,
			priority: 0,
			install,
		}
	}

	pub const fn with_priority(mut self, priority: i16) -> Self {
		self.priority = priority;
		self
	}

	/// Returns every submitted registrar in run order.
	pub fn discovered() -> Vec<Registrar> {
		let mut registrars: Vec<Registrar> = inventory::iter::<Registrar>.into_iter().copied().collect();
		registrars.sort_by(|a, b| {
			a.priority
				.cmp(&b.priority)
				.then_with(|| a.name.cmp(b.name))
		});
		registrars
	}
}

/// A registrar that did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrarFailure {
	pub name: &'static str,
	pub reason: String,
}

/// What happened during [`RegistryBuilder::build`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
	/// Registrars that completed, in run order.
	pub ran: Vec<&'static str>,
	/// Registrars disabled by configuration.
	pub skipped: Vec<&'static str>,
	pub failed: Vec<RegistrarFailure>,
}

impl BootstrapReport {
	pub fn is_clean(&self) -> bool {
		self.failed.is_empty()
	}
}

/// Builds a [`ConverterRegistry`] and runs its registrars.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
	config: RegistryConfig,
	registrars: Vec<Registrar>,
}

impl RegistryBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn config(mut self, config: RegistryConfig) -> Self {
		self.config = config;
		self
	}

	/// Adds a registrar that runs before any discovered one.
	pub fn registrar(mut self, registrar: Registrar) -> Self {
		self.registrars.push(registrar);
		self
	}

	/// Runs every registrar and returns the populated registry.
	pub fn build(self) -> (ConverterRegistry, BootstrapReport) {
		let Self { config, registrars } = self;
		let discovered = if config.discover_registrars {
			Registrar::discovered()
		} else {
			Vec::new()
		};

		let registry = ConverterRegistry::with_config(config);
		let mut report = BootstrapReport::default();
		let mut seen = FxHashSet::default();

		for registrar in registrars.into_iter().chain(discovered) {
			if !seen.insert(registrar.name) {
				debug!(registrar = registrar.name, "registrar already ran");
				continue;
			}
			if registry.config().is_disabled(registrar.name) {
				debug!(registrar = registrar.name, "registrar disabled");
				report.skipped.push(registrar.name);
				continue;
			}
			match run(&registry, &registrar) {
				Ok(()) => {
					debug!(registrar = registrar.name, "registrar ran");
					report.ran.push(registrar.name);
				}
				Err(reason) => {
					error!(registrar = registrar.name, %reason, "registrar failed");
					report.failed.push(RegistrarFailure {
						name: registrar.name,
						reason,
					});
				}
			}
		}

		info!(
			ran = report.ran.len(),
			skipped = report.skipped.len(),
			failed = report.failed.len(),
			converters = registry.converter_count(),
			rules = registry.rule_count(),
			"converter registry ready",
		);
		(registry, report)
	}
}

fn run(registry: &ConverterRegistry, registrar: &Registrar) -> Result<(), String> {
	match panic::catch_unwind(AssertUnwindSafe(|| (registrar.install)(registry))) {
		Ok(Ok(())) => Ok(()),
		Ok(Err(e)) => Err(e.to_string()),
		Err(payload) => Err(format!("panicked: {}", panic_message(&*payload))),
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
	if let Some(msg) = payload.downcast_ref::<&'static str>() {
		msg
	} else if let Some(msg) = payload.downcast_ref::<String>() {
		msg
	} else {
		"non-string panic payload"
	}
}
