use crate::Error;
use crate::column::{ColumnOptions, DecimalColumn};
use crate::numeric::{ExactDecimal, Value};

fn dec(s: &str) -> ExactDecimal {
    s.parse().unwrap()
}

fn checked_col(decl: &str) -> DecimalColumn {
    let mut options = ColumnOptions::default();
    options.set_types_check(true);
    DecimalColumn::from_type_decl(decl, options).unwrap()
}

#[test]
fn value_at_the_signed_bound_is_accepted() {
    let column = checked_col("Decimal(9,0)");
    let mut out = Vec::new();
    column
        .write(&[Value::Exact(dec("2147483647"))], &mut out)
        .unwrap();
    assert_eq!(out, i32::MAX.to_le_bytes().to_vec());

    let mut input = out.as_slice();
    assert_eq!(column.read(1, &mut input).unwrap(), vec![dec("2147483647")]);
}

#[test]
fn value_past_the_signed_bound_is_rejected() {
    // 2^31 at a 32-bit column: rejected before any byte is emitted
    let column = checked_col("Decimal(5,2)");
    let mut out = Vec::new();
    let err = column
        .write(&[Value::Exact(dec("2147483648"))], &mut out)
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_)));
    assert!(out.is_empty());
}

#[test]
fn rejection_aborts_the_whole_batch() {
    let column = checked_col("Decimal(9,0)");
    let mut out = Vec::new();
    let err = column
        .write(
            &[
                Value::I64(1),
                Value::Exact(dec("-2147483648")),
                Value::I64(2),
            ],
            &mut out,
        )
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_)));
    assert!(out.is_empty());
}

#[test]
fn boundary_for_every_width() {
    let cases = [
        ("Decimal(9,0)", "2147483647", "2147483648"),
        ("Decimal(18,0)", "9223372036854775807", "9223372036854775808"),
        (
            "Decimal(38,0)",
            "170141183460469231731687303715884105727",
            "170141183460469231731687303715884105728",
        ),
        (
            "Decimal(76,0)",
            "57896044618658097711785492504343953926634992332820282019728792003956564819967",
            "57896044618658097711785492504343953926634992332820282019728792003956564819968",
        ),
    ];
    for (decl, accepted, rejected) in cases {
        let column = checked_col(decl);

        let mut out = Vec::new();
        column.write(&[Value::Exact(dec(accepted))], &mut out).unwrap();
        let mut input = out.as_slice();
        assert_eq!(
            column.read(1, &mut input).unwrap(),
            vec![dec(accepted)],
            "decl {decl}"
        );

        let mut out = Vec::new();
        let err = column
            .write(&[Value::Exact(dec(rejected))], &mut out)
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)), "decl {decl}");
        assert!(out.is_empty());
    }
}

#[test]
fn the_bound_is_pre_scale_and_intentionally_loose() {
    // 2^31 - 1 passes the pre-scale check at scale 2, then overflows after
    // multiplication by 100: the failure is a conversion error, not a
    // validator rejection.
    let column = checked_col("Decimal(5,2)");
    let mut out = Vec::new();
    let err = column
        .write(&[Value::Exact(dec("2147483647"))], &mut out)
        .unwrap_err();
    assert!(matches!(err, Error::ConversionFailure(_)));
    assert!(out.is_empty());
}

#[test]
fn null_rows_bypass_validation() {
    let column = checked_col("Decimal(5,2)");
    let mut out = Vec::new();
    let nulls = column
        .write_nullable(&[Value::Null, Value::F64(1.23)], &mut out)
        .unwrap();
    assert!(nulls.is_null(0).unwrap());
    assert_eq!(out.len(), 8);
}

#[test]
fn unchecked_column_skips_the_range_check() {
    // without types_check the same out-of-bound value fails later, at
    // integral narrowing
    let column = DecimalColumn::from_type_decl("Decimal(9,0)", ColumnOptions::default()).unwrap();
    let mut out = Vec::new();
    let err = column
        .write(&[Value::Exact(dec("2147483648"))], &mut out)
        .unwrap_err();
    assert!(matches!(err, Error::ConversionFailure(_)));
}
