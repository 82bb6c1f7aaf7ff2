use ethnum::I256;

use crate::Error;
use crate::numeric::{ExactDecimal, exact_to_i256, i256_to_exact};
use crate::spec::ColumnSpec;
use crate::transform::DecimalTransform;

fn dec(s: &str) -> ExactDecimal {
    s.parse().unwrap()
}

fn transform(precision: u32, scale: u32) -> DecimalTransform {
    DecimalTransform::new(&ColumnSpec::new(precision, scale).unwrap())
}

#[test]
fn scale_zero_decode_is_the_raw_integer() {
    let t = transform(18, 0);
    assert_eq!(
        t.descale(123_456_789_012_345_678_i64).unwrap(),
        dec("123456789012345678")
    );
    // i64::MAX has 19 digits, one more than the column's precision; the
    // fast path stays exact because no division happens.
    assert_eq!(t.descale(i64::MAX).unwrap(), dec("9223372036854775807"));
    assert_eq!(t.descale(i64::MIN).unwrap(), dec("-9223372036854775808"));
}

#[test]
fn descale_divides_by_the_scale_power() {
    let t = transform(9, 2);
    assert_eq!(t.descale(1_234_567_i32).unwrap(), dec("12345.67"));
    assert_eq!(t.descale(-1_234_567_i32).unwrap(), dec("-12345.67"));
    assert_eq!(t.descale(0_i32).unwrap(), dec("0"));
}

#[test]
fn working_precision_covers_every_width() {
    for (precision, budget) in [(9u32, 9usize), (18, 18), (38, 38), (76, 76)] {
        let t = transform(precision, 1);
        assert!(
            t.working_precision() >= budget,
            "precision {precision}: working {} < budget {budget}",
            t.working_precision()
        );
    }
}

#[test]
fn max_magnitude_decode_keeps_every_digit() {
    // a 76-digit coefficient through the 256-bit path
    let t = transform(76, 10);
    let coefficient = "9".repeat(76);
    let raw = exact_to_i256(&dec(&coefficient)).unwrap();
    let expected = format!("{}.{}", "9".repeat(66), "9".repeat(10));
    assert_eq!(t.descale(raw).unwrap(), dec(&expected));
}

#[test]
fn truncation_is_toward_zero() {
    let t = transform(9, 2);
    assert_eq!(t.scale_to_raw::<i32>(dec("1.239")).unwrap(), 123);
    assert_eq!(t.scale_to_raw::<i32>(dec("-1.239")).unwrap(), -123);
    assert_eq!(t.scale_to_raw::<i32>(dec("0.999")).unwrap(), 99);
    assert_eq!(t.scale_to_raw::<i32>(dec("-0.999")).unwrap(), -99);
}

#[test]
fn values_with_short_fractions_scale_up() {
    // scaling leaves these with a positive exponent (3E+2, 10005E+1); the
    // narrowing must still produce plain integers
    let t = transform(9, 2);
    assert_eq!(t.scale_to_raw::<i32>(dec("3")).unwrap(), 300);
    assert_eq!(t.scale_to_raw::<i32>(dec("1000.5")).unwrap(), 100_050);
    assert_eq!(t.scale_to_raw::<i32>(dec("2E+3")).unwrap(), 200_000);
    assert_eq!(t.scale_to_raw::<i32>(dec("-4.5")).unwrap(), -450);
}

#[test]
fn scale_zero_write_truncates_without_scaling() {
    let t = transform(9, 0);
    assert_eq!(t.scale_to_raw::<i32>(dec("12.7")).unwrap(), 12);
    assert_eq!(t.scale_to_raw::<i32>(dec("-12.7")).unwrap(), -12);
    assert_eq!(t.scale_to_raw::<i32>(dec("12")).unwrap(), 12);
}

#[test]
fn overflowing_raw_write_is_rejected() {
    let t = transform(9, 2);
    // inside the signed range before scaling, outside it after
    let err = t.scale_to_raw::<i32>(dec("2147483647")).unwrap_err();
    assert!(matches!(err, Error::ConversionFailure(_)));
}

#[test]
fn out_of_budget_raw_decode_is_rejected() {
    // ten significant digits cannot survive a nine-digit working precision;
    // losing one silently would be worse than failing.
    let t = transform(9, 2);
    let err = t.descale(i32::MAX).unwrap_err();
    assert!(matches!(err, Error::ConversionFailure(_)));
}

#[test]
fn i256_decimal_conversion_round_trips() {
    for s in [
        "0",
        "1",
        "-1",
        "340282366920938463463374607431768211456",
        "-340282366920938463463374607431768211457",
        "57896044618658097711785492504343953926634992332820282019728792003956564819967",
        "-57896044618658097711785492504343953926634992332820282019728792003956564819968",
    ] {
        let d = dec(s);
        let raw = exact_to_i256(&d).unwrap();
        assert_eq!(i256_to_exact(raw), d, "value {s}");
    }
    assert_eq!(exact_to_i256(&dec("1")).unwrap(), I256::new(1));
    assert_eq!(exact_to_i256(&dec("-1")).unwrap(), I256::new(-1));
}

#[test]
fn i256_out_of_range_decimal_is_rejected() {
    // 2^255, one past I256::MAX
    let err = exact_to_i256(&dec(
        "57896044618658097711785492504343953926634992332820282019728792003956564819968",
    ))
    .unwrap_err();
    assert!(matches!(err, Error::ConversionFailure(_)));
}
