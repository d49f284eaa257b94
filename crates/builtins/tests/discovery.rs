//! Bootstrapping a registry from the submitted built-in registrars.

use std::sync::LazyLock;

use morph_builtins::{NUMERIC, TEXT, TEXTUAL};
use morph_convert::{ConvertError, ConverterRegistry, RegistryBuilder, RegistryConfig, Tier};
use proptest::prelude::*;

fn bootstrapped() -> ConverterRegistry {
	let _ = tracing_subscriber::fmt::try_init();
	let (registry, report) = RegistryBuilder::new().build();
	assert!(report.is_clean(), "{:?}", report.failed);
	registry
}

#[test]
fn builtins_are_discovered_in_priority_order() {
	let _ = tracing_subscriber::fmt::try_init();
	let (registry, report) = RegistryBuilder::new().build();

	assert_eq!(report.ran, [NUMERIC, TEXT, TEXTUAL]);
	assert!(report.skipped.is_empty());
	assert!(report.failed.is_empty());
	assert_eq!(registry.rule_count(), 1);
	registry.shutdown();
}

#[test]
fn explicit_bootstrap_matches_discovery() {
	let discovered = bootstrapped();

	let mut builder = RegistryBuilder::new().config(RegistryConfig {
		discover_registrars: false,
		..RegistryConfig::default()
	});
	for registrar in morph_builtins::registrars() {
		builder = builder.registrar(registrar);
	}
	let (explicit, report) = builder.build();

	assert_eq!(report.ran, [NUMERIC, TEXT, TEXTUAL]);
	assert_eq!(explicit.converter_count(), discovered.converter_count());
	assert_eq!(explicit.rule_count(), discovered.rule_count());
}

#[test]
fn disabled_builtins_are_skipped() {
	let (registry, report) = RegistryBuilder::new()
		.config(RegistryConfig {
			disabled_registrars: vec![TEXT.into()],
			..RegistryConfig::default()
		})
		.build();

	assert_eq!(report.skipped, [TEXT]);
	assert_eq!(
		registry.convert::<String, i32>(&"7".into()).unwrap_err(),
		ConvertError::Unsupported {
			from: "String",
			to: "i32"
		}
	);
	// Formatting still works through the textual fallback rule.
	let resolution = registry
		.resolve(
			<i32 as morph_convert::Reflect>::type_info(),
			<String as morph_convert::Reflect>::type_info(),
		)
		.unwrap();
	assert_eq!(resolution.tier, Tier::Rule);
	assert_eq!(registry.convert::<i32, String>(&7).unwrap(), "7");
}

#[test]
fn conversions_chain_through_the_facade() {
	let registry = bootstrapped();
	let parsed: u16 = registry.convert(&String::from("4096")).unwrap();
	let widened: f64 = registry.convert(&parsed).unwrap();
	let text: String = registry.convert(&widened).unwrap();
	assert_eq!(text, "4096");
}

static SHARED: LazyLock<ConverterRegistry> = LazyLock::new(bootstrapped);

proptest! {
	#[test]
	fn prop_i64_to_i32_matches_try_from(value in any::<i64>()) {
		let converted = SHARED.convert::<i64, i32>(&value).ok();
		prop_assert_eq!(converted, i32::try_from(value).ok());
	}

	#[test]
	fn prop_integers_survive_a_text_round_trip(value in any::<i32>()) {
		let text: String = SHARED.convert(&value).unwrap();
		let back: i32 = SHARED.convert(&text).unwrap();
		prop_assert_eq!(back, value);
	}
}
