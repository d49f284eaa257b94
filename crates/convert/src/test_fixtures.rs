//! Reflected types shared by unit tests.
//!
//! Hierarchies:
//!
//! - `PositiveIntWrapper -> IntWrapper`, `IntWrapper: Numeric`
//! - `Square -> Polygon -> Shape(abstract)`, `Square: Measurable`,
//!   `Polygon: Drawable`, `Drawable: Visible`
//! - `Circle -> Shape`, `Circle: Drawable + Visible`
//! - `IntList: ListLike`, `SortedIntList: ListLike`, `IntSet: SetLike`

#![allow(dead_code)]

use std::any::type_name;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};

use crate::{Projected, Reflect, Textual, TypeInfo, impl_reflect};

#[derive(Debug, Clone, PartialEq)]
pub struct Numeric(pub f64);
impl_reflect!(Numeric, |b| b.capability());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntWrapper(pub i64);
impl_reflect!(IntWrapper, |b| b.implements::<Numeric>(|v| {
	v.downcast_ref::<IntWrapper>()
		.map(|w| Projected::Owned(Box::new(Numeric(w.0 as f64))))
}));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositiveIntWrapper {
	pub base: IntWrapper,
}

impl PositiveIntWrapper {
	pub fn new(value: i64) -> Option<Self> {
		(value > 0).then_some(Self {
			base: IntWrapper(value),
		})
	}
}

impl_reflect!(PositiveIntWrapper, |b| b.extends::<IntWrapper>(|v| {
	v.downcast_ref::<PositiveIntWrapper>()
		.map(|p| Projected::Borrowed(&p.base))
}));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text(pub String);
impl_reflect!(Text, |b| b.implements::<Textual>(|v| {
	v.downcast_ref::<Text>()
		.map(|t| Projected::Owned(Box::new(Textual(t.0.clone()))))
}));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visible;
impl_reflect!(Visible, |b| b.capability());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drawable(pub &'static str);
impl_reflect!(Drawable, |b| b.capability().implements::<Visible>(|v| {
	v.downcast_ref::<Drawable>()
		.map(|_| Projected::Owned(Box::new(Visible)))
}));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurable(pub u32);
impl_reflect!(Measurable, |b| b.capability());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
	pub sides: u32,
}
impl_reflect!(Shape, |b| b.abstract_type());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
	pub shape: Shape,
}
impl_reflect!(Polygon, |b| b
	.extends::<Shape>(|v| {
		v.downcast_ref::<Polygon>()
			.map(|p| Projected::Borrowed(&p.shape))
	})
	.implements::<Drawable>(|v| {
		v.downcast_ref::<Polygon>()
			.map(|_| Projected::Owned(Box::new(Drawable("polygon"))))
	}));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Square {
	pub polygon: Polygon,
	pub side: u32,
}

impl Square {
	pub fn new(side: u32) -> Self {
		Self {
			polygon: Polygon {
				shape: Shape { sides: 4 },
			},
			side,
		}
	}
}

impl_reflect!(Square, |b| b
	.extends::<Polygon>(|v| {
		v.downcast_ref::<Square>()
			.map(|s| Projected::Borrowed(&s.polygon))
	})
	.implements::<Measurable>(|v| {
		v.downcast_ref::<Square>()
			.map(|s| Projected::Owned(Box::new(Measurable(s.side * s.side))))
	}));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circle {
	pub shape: Shape,
}
impl_reflect!(Circle, |b| b
	.extends::<Shape>(|v| {
		v.downcast_ref::<Circle>()
			.map(|c| Projected::Borrowed(&c.shape))
	})
	.implements::<Drawable>(|v| {
		v.downcast_ref::<Circle>()
			.map(|_| Projected::Owned(Box::new(Drawable("circle"))))
	})
	.implements::<Visible>(|v| {
		v.downcast_ref::<Circle>()
			.map(|_| Projected::Owned(Box::new(Visible)))
	}));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLike;
impl_reflect!(ListLike, |b| b.capability());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetLike;
impl_reflect!(SetLike, |b| b.capability());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntList(pub Vec<i64>);
impl_reflect!(IntList, |b| b.implements::<ListLike>(|v| {
	v.downcast_ref::<IntList>()
		.map(|_| Projected::Owned(Box::new(ListLike)))
}));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedIntList(pub Vec<i64>);
impl_reflect!(SortedIntList, |b| b.implements::<ListLike>(|v| {
	v.downcast_ref::<SortedIntList>()
		.map(|_| Projected::Owned(Box::new(ListLike)))
}));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntSet(pub BTreeSet<i64>);
impl_reflect!(IntSet, |b| b.implements::<SetLike>(|v| {
	v.downcast_ref::<IntSet>()
		.map(|_| Projected::Owned(Box::new(SetLike)))
}));

pub struct Hidden;
impl_reflect!(Hidden, |b| b.private());

pub struct Anonymous;
impl_reflect!(Anonymous, |b| b.anonymous());

pub struct Marker;
impl_reflect!(Marker, |b| b.annotation());

/// Distinct leaf types without ancestors, for bulk registration.
pub struct Slot<const N: usize>;

impl<const N: usize> Reflect for Slot<N> {
	fn type_info() -> &'static TypeInfo {
		TypeInfo::intern::<Self>(|| TypeInfo::builder::<Self>(type_name::<Self>()).build())
	}
}

pub fn slots() -> [&'static TypeInfo; 8] {
	[
		Slot::<0>::type_info(),
		Slot::<1>::type_info(),
		Slot::<2>::type_info(),
		Slot::<3>::type_info(),
		Slot::<4>::type_info(),
		Slot::<5>::type_info(),
		Slot::<6>::type_info(),
		Slot::<7>::type_info(),
	]
}

/// Events recorded by [`capture`].
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<(Level, String)>>>);

impl Captured {
	/// Messages logged at `level`, in emission order.
	pub fn messages(&self, level: Level) -> Vec<String> {
		self.0
			.lock()
			.iter()
			.filter(|(l, _)| *l == level)
			.map(|(_, message)| message.clone())
			.collect()
	}

	pub fn count(&self, level: Level, message: &str) -> usize {
		self.messages(level)
			.iter()
			.filter(|m| *m == message)
			.count()
	}
}

struct Recorder(Captured);

struct MessageVisitor(String);

impl Visit for MessageVisitor {
	fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
		if field.name() == "message" {
			self.0 = format!("{value:?}");
		}
	}
}

impl<S: Subscriber> tracing_subscriber::Layer<S> for Recorder {
	fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
		let mut visitor = MessageVisitor(String::new());
		event.record(&mut visitor);
		self.0.0.lock().push((*event.metadata().level(), visitor.0));
	}
}

/// Runs `f` with a thread-local subscriber that records every event.
pub fn capture<R>(f: impl FnOnce() -> R) -> (R, Captured) {
	let captured = Captured::default();
	let subscriber = tracing_subscriber::registry().with(Recorder(captured.clone()));
	let out = tracing::subscriber::with_default(subscriber, f);
	(out, captured)
}
