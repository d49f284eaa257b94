//! Parsing and formatting between `String` and primitives.

use std::fmt::Display;
use std::str::FromStr;

use morph_convert::{ConvertError, Converter, ConverterRegistry, Reflect, RegistrationError};

fn parse<D>(registry: &ConverterRegistry) -> Result<(), RegistrationError>
where
	D: Reflect + FromStr,
	D::Err: Display,
{
	let to = D::type_info().name();
	registry.register::<String, D>(Converter::new(format!("String->{to}"), move |s: &String| {
		s.parse::<D>().map_err(|e| ConvertError::Parse {
			input: s.clone(),
			to,
			reason: e.to_string(),
		})
	}))?;
	Ok(())
}

fn display<S: Reflect + Display>(registry: &ConverterRegistry) -> Result<(), RegistrationError> {
	let from = S::type_info().name();
	registry.register::<S, String>(Converter::infallible(format!("{from}->String"), |v: &S| {
		v.to_string()
	}))?;
	Ok(())
}

macro_rules! both_ways {
	($registry:ident; $($ty:ty),* $(,)?) => {
		$(
			parse::<$ty>($registry)?;
			display::<$ty>($registry)?;
		)*
	};
}

/// Registers `String` parsing into, and formatting from, every primitive
/// number plus `bool` and `char`.
///
/// Parsing follows [`str::parse`]: no trimming, no locale handling.
pub fn install(registry: &ConverterRegistry) -> Result<(), RegistrationError> {
	both_ways!(registry; i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, bool, char);
	Ok(())
}
