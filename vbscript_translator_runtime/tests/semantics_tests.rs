//! Runtime semantics exercised through the `RuntimeProvider` surface, the way
//! translated code reaches them.

use pretty_assertions::assert_eq;
use vbscript_translator_runtime::prelude::*;

fn provider() -> RuntimeProvider {
    RuntimeProvider::new()
}

// ==================== Comparisons ====================

#[test]
fn test_eq_table() {
    let p = provider();
    assert_eq!(p.eq(&Value::Empty, &Value::Integer(0)).unwrap(), Value::Bool(true));
    assert_eq!(p.eq(&Value::Empty, &Value::from("")).unwrap(), Value::Bool(true));
    assert_eq!(p.eq(&Value::Null, &Value::Integer(0)).unwrap(), Value::Null);
    assert_eq!(p.eq(&Value::Bool(true), &Value::Integer(-1)).unwrap(), Value::Bool(true));
    assert_eq!(p.eq(&Value::Bool(true), &Value::Integer(1)).unwrap(), Value::Bool(false));
}

#[test]
fn test_hard_literal_comparison_forces_numeric_coercion() {
    let p = provider();
    // `"aa" > 0` compiles to `_rt.gt(&_rt.num(&vbs::Value::from("aa"))?, &vbs::Value::Integer(0))?`
    let err = p.num(&Value::from("aa")).unwrap_err();
    assert_eq!(err.number(), 13);

    let five = p.num(&Value::from("5")).unwrap();
    assert_eq!(p.gt(&five, &Value::Integer(0)).unwrap(), Value::Bool(true));

    // `0 > "aa"`
    let err = p
        .num(&Value::from("aa"))
        .and_then(|right| p.gt(&Value::Integer(0), &right))
        .unwrap_err();
    assert_eq!(err.number(), 13);
}

#[test]
fn test_uncoerced_string_number_comparison_is_false() {
    let p = provider();
    assert_eq!(p.gt(&Value::from("aa"), &Value::Integer(0)).unwrap(), Value::Bool(false));
}

// ==================== Arrays ====================

#[test]
fn test_array_index_writes_use_bankers_rounding() {
    let p = provider();
    let array = p.new_array(&[&Value::Integer(5)]).unwrap();

    p.set(
        Value::from("two"),
        &Value::Nothing,
        &array,
        None,
        &mut p.args().val(&Value::Double(2.5)),
    )
    .unwrap();
    p.set(
        Value::from("four"),
        &Value::Nothing,
        &array,
        None,
        &mut p.args().val(&Value::Double(3.5)),
    )
    .unwrap();

    let read = |index: i16| {
        p.call(
            &Value::Nothing,
            &array,
            &[],
            &mut p.args().val(&Value::Integer(index)),
        )
        .unwrap()
    };
    assert_eq!(read(2), Value::from("two"));
    assert_eq!(read(3), Value::Empty);
    assert_eq!(read(4), Value::from("four"));
}

#[test]
fn test_resize_preserve_keeps_elements() {
    let p = provider();
    let array = p.new_array(&[&Value::Integer(1)]).unwrap();
    p.set(
        Value::Long(10),
        &Value::Nothing,
        &array,
        None,
        &mut p.args().val(&Value::Integer(1)),
    )
    .unwrap();
    p.resize_array(&array, &[&Value::Integer(3)], true).unwrap();
    assert_eq!(p.ubound(&array, None).unwrap(), Value::Long(3));
    assert_eq!(p.lbound(&array, None).unwrap(), Value::Long(0));
    let element = p
        .call(&Value::Nothing, &array, &[], &mut p.args().val(&Value::Integer(1)))
        .unwrap();
    assert_eq!(element, Value::Long(10));
}

#[test]
fn test_bounds_of_each_dimension() {
    let p = provider();
    // Dim grid(2, 5)
    let grid = p.new_array(&[&Value::Integer(2), &Value::Integer(5)]).unwrap();
    assert_eq!(p.ubound(&grid, None).unwrap(), Value::Long(2));
    assert_eq!(p.ubound(&grid, Some(&Value::Integer(2))).unwrap(), Value::Long(5));
    assert_eq!(p.lbound(&grid, Some(&Value::Integer(2))).unwrap(), Value::Long(0));
    assert_eq!(p.ubound(&grid, Some(&Value::Integer(3))).unwrap_err().number(), 9);
}

#[test]
fn test_array_assignment_copies() {
    let p = provider();
    let element = |array: &Value| {
        p.call(&Value::Nothing, array, &[], &mut p.args().val(&Value::Integer(0)))
            .unwrap()
    };
    let a = p.new_array(&[&Value::Integer(1)]).unwrap();

    // b = a : b(0) = 9
    let b = p.val(&a).unwrap();
    p.set(Value::Integer(9), &Value::Nothing, &b, None, &mut p.args().val(&Value::Integer(0)))
        .unwrap();
    assert_eq!(element(&a), Value::Empty);
    assert_eq!(element(&b), Value::Integer(9));

    // a callee writing to a ByVal array parameter leaves the caller's alone
    let mut args = p.args().val(&a);
    let passed = args.evaluate(&Value::Nothing).unwrap();
    p.set(Value::Integer(5), &Value::Nothing, &passed[0], None, &mut p.args().val(&Value::Integer(0)))
        .unwrap();
    args.write_back(passed).unwrap();
    assert_eq!(element(&a), Value::Empty);
}

// ==================== Error trapping ====================

#[test]
fn test_error_trapping_round_trip() {
    let p = provider();
    let token = p.get_error_trapping_token();
    p.start_error_trapping(token).unwrap();
    p.handle_error(token, || {
        p.raise_error(VbsError::DivisionByZero)?;
        Ok(())
    })
    .unwrap();
    assert_eq!(p.val(&p.err()).unwrap(), Value::Long(11));

    p.stop_error_trapping(token).unwrap();
    assert_eq!(p.val(&p.err()).unwrap(), Value::Long(0));
    p.release_error_trapping_token(token);
}

#[test]
fn test_untrapped_error_propagates() {
    let p = provider();
    let token = p.get_error_trapping_token();
    let err = p
        .handle_error(token, || {
            p.div(&Value::Integer(1), &Value::Integer(0))?;
            Ok(())
        })
        .unwrap_err();
    assert_eq!(err.number(), 11);
}

#[test]
fn test_err_raise_is_trapped_with_custom_details() {
    let p = provider();
    let token = p.get_error_trapping_token();
    p.start_error_trapping(token).unwrap();
    p.handle_error(token, || {
        p.call(
            &Value::Nothing,
            &p.err(),
            &["Raise"],
            &mut p
                .args()
                .val(&Value::Long(1001))
                .val(&Value::from("Widget"))
                .val(&Value::from("Broken widget")),
        )?;
        Ok(())
    })
    .unwrap();

    let err = p.err();
    let read = |member: &str| {
        p.call(&Value::Nothing, &err, &[member], &mut p.args())
            .unwrap()
    };
    assert_eq!(read("Number"), Value::Long(1001));
    assert_eq!(read("Source"), Value::from("Widget"));
    assert_eq!(read("Description"), Value::from("Broken widget"));
}

// ==================== Operators ====================

#[test]
fn test_concat_joins_all_operands() {
    let p = provider();
    let result = p
        .concat(&[
            &Value::from("a"),
            &Value::Integer(1),
            &Value::Null,
            &Value::Bool(true),
        ])
        .unwrap();
    assert_eq!(result, Value::from("a1True"));
}

#[test]
fn test_integer_overflow_widens() {
    let p = provider();
    let sum = p.add(&Value::Integer(i16::MAX), &Value::Integer(1)).unwrap();
    assert_eq!(sum, Value::Long(32768));
}

#[test]
fn test_logical_width_promotion() {
    let p = provider();
    assert_eq!(
        p.and(&Value::Bool(true), &Value::Bool(false)).unwrap(),
        Value::Bool(false)
    );
    assert_eq!(p.or(&Value::Byte(1), &Value::Byte(2)).unwrap(), Value::Byte(3));
    assert_eq!(p.and(&Value::Null, &Value::Bool(false)).unwrap(), Value::Bool(false));
    assert_eq!(p.not(&Value::Null).unwrap(), Value::Null);
}
