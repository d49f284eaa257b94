//! Fallback rendering of [`Textual`] values.

use morph_convert::{Converter, ConverterRegistry, Reflect, RegistrationError, Rule, RuleCategory, Textual, TypeInfo};

/// Name of the fallback rule.
pub const RULE: &str = "textual->string";

fn renders_as_text(source: &'static TypeInfo, destination: &'static TypeInfo) -> bool {
	destination == String::type_info() && source != destination && source.is_a(Textual::type_info())
}

/// Installs a fallback rule converting any type with the [`Textual`]
/// capability to `String`.
///
/// The rule builds one converter per source, projecting the value onto its
/// `Textual` view first. Exact converters and earlier rule buckets still win.
pub fn install(registry: &ConverterRegistry) -> Result<(), RegistrationError> {
	let render = Converter::infallible("textual->string", |t: &Textual| t.0.clone());
	registry.register_rule(Rule::per_pair(
		RULE,
		RuleCategory::Fallback,
		renders_as_text,
		move |source, _| {
			let textual = Textual::type_info();
			match source.ancestors().iter().find(|a| a.info == textual) {
				Some(ancestor) => render.via(ancestor),
				None => render.clone(),
			}
		},
	));
	Ok(())
}
