//! Descriptors for standard library types.

use super::Projected;

/// Capability view of any value with a canonical text form.
///
/// Types that implement it can be rendered by rules that only know about
/// text, without a converter per type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Textual(pub String);

crate::impl_reflect!(Textual, |builder| builder.capability());

macro_rules! reflect_textual {
	($($ty:ty),* $(,)?) => {
		$(
			crate::impl_reflect!($ty, |builder| builder.implements::<Textual>(|value| {
				value
					.downcast_ref::<$ty>()
					.map(|v| Projected::Owned(Box::new(Textual(v.to_string()))))
			}));
		)*
	};
}

reflect_textual!(
	i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, String,
);
