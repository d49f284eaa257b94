//! Built-in converters for standard library types.
//!
//! Each group is a [`Registrar`] submitted through `inventory`, so a
//! [`RegistryBuilder`](morph_convert::RegistryBuilder) with discovery enabled
//! picks them up as soon as this crate is linked:
//!
//! ```ignore
//! use morph_builtins as _;
//!
//! let (registry, report) = morph_convert::RegistryBuilder::new().build();
//! let n: i32 = registry.convert(&String::from("42"))?;
//! ```
//!
//! With discovery disabled, pass [`registrars`] to the builder explicitly.

use morph_convert::Registrar;

pub mod numeric;
pub mod text;
pub mod textual;

pub const NUMERIC: &str = "builtin.numeric";
pub const TEXT: &str = "builtin.text";
pub const TEXTUAL: &str = "builtin.textual";

inventory::submit!(Registrar::new(NUMERIC, numeric::install));
inventory::submit!(Registrar::new(TEXT, text::install));
inventory::submit!(Registrar::new(TEXTUAL, textual::install).with_priority(10));

/// Every built-in registrar, in discovery order.
pub fn registrars() -> [Registrar; 3] {
	[
		Registrar::new(NUMERIC, numeric::install),
		Registrar::new(TEXT, text::install),
		Registrar::new(TEXTUAL, textual::install).with_priority(10),
	]
}
