use super::*;

fn registry() -> ConverterRegistry {
	let registry = ConverterRegistry::new();
	install(&registry).unwrap();
	registry
}

#[test]
fn every_pair_is_registered() {
	let registry = registry();
	let mut explicit = 0;
	registry.for_each_converter(|entry| {
		if entry.inherited_from.is_none() {
			explicit += 1;
		}
	});
	// 10 types, every ordered pair of distinct types.
	assert_eq!(explicit, 10 * 9);
}

#[test]
fn integer_narrowing_is_checked() {
	let registry = registry();
	assert_eq!(registry.convert::<i32, u8>(&255).unwrap(), 255);
	assert_eq!(
		registry.convert::<i32, u8>(&256).unwrap_err(),
		ConvertError::OutOfRange {
			value: "256".into(),
			to: "u8"
		}
	);
	assert!(registry.convert::<i8, u64>(&-1).is_err());
	assert_eq!(registry.convert::<u64, i64>(&(i64::MAX as u64)).unwrap(), i64::MAX);
	assert!(registry.convert::<u64, i64>(&u64::MAX).is_err());
}

#[test]
fn integer_widening_is_exact() {
	let registry = registry();
	assert_eq!(registry.convert::<i8, i64>(&i8::MIN).unwrap(), -128);
	assert_eq!(registry.convert::<u32, u64>(&u32::MAX).unwrap(), u64::from(u32::MAX));
	assert_eq!(registry.convert::<u16, f32>(&65_535).unwrap(), 65_535.0);
}

#[test]
fn floats_truncate_toward_zero() {
	let registry = registry();
	assert_eq!(registry.convert::<f64, i32>(&3.9).unwrap(), 3);
	assert_eq!(registry.convert::<f64, i32>(&-3.9).unwrap(), -3);
	assert_eq!(registry.convert::<f32, u8>(&255.5).unwrap(), 255);
	assert_eq!(registry.convert::<f64, u8>(&-0.5).unwrap(), 0);
}

#[test]
fn floats_out_of_integer_range_are_rejected() {
	let registry = registry();
	for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 2f64.powi(63), -1.0] {
		let err = registry.convert::<f64, u32>(&value).unwrap_err();
		assert!(matches!(err, ConvertError::OutOfRange { to: "u32", .. }), "{value}");
	}
	assert!(registry.convert::<f64, i64>(&2f64.powi(63)).is_err());
	assert_eq!(registry.convert::<f64, i64>(&-(2f64.powi(63))).unwrap(), i64::MIN);
}

#[test]
fn double_to_single_precision_overflow_is_rejected() {
	let registry = registry();
	assert_eq!(registry.convert::<f64, f32>(&1.5).unwrap(), 1.5);
	assert!(registry.convert::<f64, f32>(&1e40).is_err());
	assert!(registry.convert::<f64, f32>(&f64::INFINITY).unwrap().is_infinite());
	assert_eq!(registry.convert::<f32, f64>(&0.25).unwrap(), 0.25);
}
