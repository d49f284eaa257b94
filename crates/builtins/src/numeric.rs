//! Conversions between primitive numbers.
//!
//! Integer targets are range checked; a value that does not fit is
//! [`ConvertError::OutOfRange`]. Floats are truncated toward zero before the
//! check, and non-finite floats never convert to integers. Integer to float
//! conversions round to the nearest representable value.

use std::fmt::Display;

use morph_convert::{ConvertError, Converter, ConverterRegistry, Reflect, RegistrationError};

#[cfg(test)]
mod tests;

/// Primitive integers. Every one of them fits in an `i128`.
trait Int: Reflect + Copy + Display + Into<i128> + TryFrom<i128> {}

impl Int for i8 {}
impl Int for i16 {}
impl Int for i32 {}
impl Int for i64 {}
impl Int for u8 {}
impl Int for u16 {}
impl Int for u32 {}
impl Int for u64 {}

trait Float: Reflect + Copy + Display {
	fn from_i128(value: i128) -> Self;
	fn to_f64(self) -> f64;
}

impl Float for f32 {
	fn from_i128(value: i128) -> Self {
		value as f32
	}

	fn to_f64(self) -> f64 {
		f64::from(self)
	}
}

impl Float for f64 {
	fn from_i128(value: i128) -> Self {
		value as f64
	}

	fn to_f64(self) -> f64 {
		self
	}
}

fn label<S: Reflect, D: Reflect>() -> String {
	format!("{}->{}", S::type_info(), D::type_info())
}

fn out_of_range<D: Reflect>(value: impl Display) -> ConvertError {
	ConvertError::OutOfRange {
		value: value.to_string(),
		to: D::type_info().name(),
	}
}

fn int_to_int<S: Int, D: Int>(registry: &ConverterRegistry) -> Result<(), RegistrationError> {
	if S::type_info() == D::type_info() {
		return Ok(());
	}
	registry.register::<S, D>(Converter::new(label::<S, D>(), |v: &S| {
		let wide: i128 = (*v).into();
		D::try_from(wide).map_err(|_| out_of_range::<D>(v))
	}))?;
	Ok(())
}

fn int_to_float<S: Int, D: Float>(registry: &ConverterRegistry) -> Result<(), RegistrationError> {
	registry.register::<S, D>(Converter::infallible(label::<S, D>(), |v: &S| {
		D::from_i128((*v).into())
	}))?;
	Ok(())
}

fn float_to_int<S: Float, D: Int>(registry: &ConverterRegistry) -> Result<(), RegistrationError> {
	registry.register::<S, D>(Converter::new(label::<S, D>(), |v: &S| {
		let truncated = v.to_f64().trunc();
		if !truncated.is_finite() {
			return Err(out_of_range::<D>(v));
		}
		// `as` saturates at the i128 bounds, which no target type reaches.
		D::try_from(truncated as i128).map_err(|_| out_of_range::<D>(v))
	}))?;
	Ok(())
}

macro_rules! each_pair {
	($registry:ident, $install:ident; [$($source:ty),*] => $targets:tt) => {
		$( each_pair!(@source $registry, $install; $source => $targets); )*
	};
	(@source $registry:ident, $install:ident; $source:ty => [$($target:ty),*]) => {
		$( $install::<$source, $target>($registry)?; )*
	};
}

/// Registers every pair among the primitive integer and float types.
pub fn install(registry: &ConverterRegistry) -> Result<(), RegistrationError> {
	each_pair!(registry, int_to_int;
		[i8, i16, i32, i64, u8, u16, u32, u64] => [i8, i16, i32, i64, u8, u16, u32, u64]);
	each_pair!(registry, int_to_float; [i8, i16, i32, i64, u8, u16, u32, u64] => [f32, f64]);
	each_pair!(registry, float_to_int; [f32, f64] => [i8, i16, i32, i64, u8, u16, u32, u64]);

	registry.register::<f32, f64>(Converter::infallible(label::<f32, f64>(), |v: &f32| f64::from(*v)))?;
	registry.register::<f64, f32>(Converter::new(label::<f64, f32>(), |v: &f64| {
		let narrowed = *v as f32;
		if v.is_finite() && narrowed.is_infinite() {
			return Err(out_of_range::<f32>(v));
		}
		Ok(narrowed)
	}))?;

	tracing::debug!(converters = registry.converter_count(), "numeric converters installed");
	Ok(())
}
