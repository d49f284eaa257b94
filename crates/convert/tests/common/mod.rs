//! Common types for registry integration tests.

#![allow(dead_code)]

use std::any::type_name;

use morph_convert::{Converter, Projected, Reflect, TypeInfo, impl_reflect};

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt::try_init();
}

/// Hierarchy-free types, one per `N`.
pub struct Node<const N: usize>;

impl<const N: usize> Reflect for Node<N> {
	fn type_info() -> &'static TypeInfo {
		TypeInfo::intern::<Self>(|| TypeInfo::builder::<Self>(type_name::<Self>()).build())
	}
}

macro_rules! node_table {
	($($n:literal)*) => {
		pub fn nodes() -> Vec<&'static TypeInfo> {
			vec![$(Node::<$n>::type_info()),*]
		}
	};
}

node_table!(0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15);

/// A converter that returns its label, for telling stored converters apart.
pub fn tagged(label: impl Into<String>) -> Converter {
	let label = label.into();
	let tag = label.clone();
	Converter::from_dyn(label, move |_| Ok(Box::new(tag.clone())))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Celsius(pub i32);
impl_reflect!(Celsius);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
	pub value: Celsius,
}
impl_reflect!(Reading, |b| b.extends::<Celsius>(|v| {
	v.downcast_ref::<Reading>()
		.map(|r| Projected::Borrowed(&r.value))
}));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibratedReading {
	pub reading: Reading,
}
impl_reflect!(CalibratedReading, |b| b.extends::<Reading>(|v| {
	v.downcast_ref::<CalibratedReading>()
		.map(|c| Projected::Borrowed(&c.reading))
}));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label(pub String);
impl_reflect!(Label);
