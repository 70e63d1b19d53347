//! Value coercions
//!
//! `val`, `obj`, `num`, `str`, `date`, `bool` and `truthy` are what translated
//! code calls to force an expression into the shape its context requires.
//! Object references are resolved through their parameterless default member
//! before any value conversion.

use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::cache;
use crate::error::{RuntimeResult, VbsError};
use crate::object::{InvokeKind, VbsObject, DISPID_VALUE};
use crate::value::Value;

/// Default members returning further objects are followed at most this deep
const MAX_DEFAULT_MEMBER_DEPTH: usize = 16;

/// Seconds per day
const SECONDS_PER_DAY: f64 = 86_400.0;

// ========== Shape coercions ==========

/// Force a value: object references are replaced by their default member value
///
/// Arrays come back as a copy; `b = a` must not let `b(0) = 1` change `a`.
pub fn val(value: &Value) -> RuntimeResult<Value> {
    resolve(value).map(|resolved| resolved.copied())
}

/// `val` without copying arrays, for callers that only read the result
pub(crate) fn resolve(value: &Value) -> RuntimeResult<Value> {
    let mut current = value.clone();
    for _ in 0..MAX_DEFAULT_MEMBER_DEPTH {
        current = match &current {
            Value::Object(object) => default_value(object)?,
            Value::Nothing => {
                return Err(VbsError::object_variable_not_set(
                    "Nothing has no default value",
                ))
            }
            _ => return Ok(current),
        };
    }
    Err(VbsError::type_mismatch(
        "default member chain does not produce a value",
    ))
}

/// Force an object reference
pub fn obj(value: &Value) -> RuntimeResult<Value> {
    match value {
        Value::Object(_) | Value::Nothing => Ok(value.clone()),
        other => Err(VbsError::object_required(format!(
            "'{}' is not an object",
            other.type_name()
        ))),
    }
}

/// Force a numeric value; strings must parse as numbers. Null passes through.
pub fn num(value: &Value) -> RuntimeResult<Value> {
    match resolve(value)? {
        Value::Empty => Ok(Value::Integer(0)),
        Value::Str(s) => parse_number(&s)
            .map(Value::Double)
            .ok_or_else(|| VbsError::type_mismatch(format!("'{}'", s))),
        Value::Date(serial) => Ok(Value::Double(serial)),
        Value::Array(_) => Err(VbsError::type_mismatch("array used as a number")),
        other => Ok(other),
    }
}

/// Force a string value. Null passes through.
pub fn str(value: &Value) -> RuntimeResult<Value> {
    match resolve(value)? {
        Value::Null => Ok(Value::Null),
        Value::Str(s) => Ok(Value::Str(s)),
        other => scalar_to_string(&other)
            .map(Value::Str)
            .ok_or_else(|| VbsError::type_mismatch(format!("'{}' as a string", other.type_name()))),
    }
}

/// Force a date value. Null passes through.
pub fn date(value: &Value) -> RuntimeResult<Value> {
    match resolve(value)? {
        Value::Null => Ok(Value::Null),
        Value::Date(d) => Ok(Value::Date(d)),
        Value::Str(s) => parse_date(&s)
            .or_else(|| parse_number(&s))
            .map(Value::Date)
            .ok_or_else(|| VbsError::type_mismatch(format!("'{}' as a date", s))),
        other => Ok(Value::Date(to_f64(&other)?)),
    }
}

/// Strict boolean conversion (`CBool`): Null is an error
pub fn bool(value: &Value) -> RuntimeResult<bool> {
    match resolve(value)? {
        Value::Null => Err(VbsError::invalid_use_of_null("Null as a boolean")),
        Value::Bool(b) => Ok(b),
        Value::Str(s) => {
            let trimmed = s.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(true)
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(false)
            } else {
                parse_number(trimmed)
                    .map(|n| n != 0.0)
                    .ok_or_else(|| VbsError::type_mismatch(format!("'{}' as a boolean", s)))
            }
        }
        Value::Array(_) => Err(VbsError::type_mismatch("array used as a boolean")),
        other => Ok(to_f64(&other)? != 0.0),
    }
}

/// Condition evaluation (`If x Then`): Null counts as false
pub fn truthy(value: &Value) -> RuntimeResult<bool> {
    match resolve(value)? {
        Value::Null => Ok(false),
        other => bool(&other),
    }
}

/// Value of an object's parameterless default member
pub fn default_value(object: &Rc<dyn VbsObject>) -> RuntimeResult<Value> {
    if let Some(dispatch) = object.as_dispatch() {
        let type_info_name = dispatch.type_info_name();
        let has_default =
            cache::dispatch_has_default_member(type_info_name, || dispatch.has_default_member());
        if !has_default {
            return Err(VbsError::member_not_supported(format!(
                "{} has no default member",
                type_info_name
            )));
        }
        return dispatch.invoke(DISPID_VALUE, InvokeKind::Get, &mut []);
    }
    match cache::default_member(object.type_name(), object.members()) {
        Some(index) => object.get_member(index, &mut []),
        None => Err(VbsError::member_not_supported(format!(
            "{} has no default member",
            object.type_name()
        ))),
    }
}

// ========== Scalar conversions ==========

/// Convert a value to f64 (`CDbl`)
pub fn to_f64(value: &Value) -> RuntimeResult<f64> {
    match value {
        Value::Empty => Ok(0.0),
        Value::Null => Err(VbsError::invalid_use_of_null("Null as a number")),
        Value::Bool(b) => Ok(if *b { -1.0 } else { 0.0 }),
        Value::Byte(v) => Ok(f64::from(*v)),
        Value::Integer(v) => Ok(f64::from(*v)),
        Value::Long(v) => Ok(f64::from(*v)),
        Value::Single(v) => Ok(f64::from(*v)),
        Value::Double(v) | Value::Date(v) => Ok(*v),
        Value::Currency(d) => {
            use rust_decimal::prelude::ToPrimitive;
            d.to_f64()
                .ok_or_else(|| VbsError::overflow(format!("{} as a Double", d)))
        }
        Value::Str(s) => {
            parse_number(s).ok_or_else(|| VbsError::type_mismatch(format!("'{}'", s)))
        }
        Value::Array(_) => Err(VbsError::type_mismatch("array used as a number")),
        Value::Object(_) | Value::Nothing => to_f64(&resolve(value)?),
    }
}

/// Convert a value to i32 with banker's rounding (`CLng`)
pub fn to_long(value: &Value) -> RuntimeResult<i32> {
    match value {
        Value::Byte(v) => Ok(i32::from(*v)),
        Value::Integer(v) => Ok(i32::from(*v)),
        Value::Long(v) => Ok(*v),
        other => {
            let rounded = to_f64(other)?.round_ties_even();
            if rounded < f64::from(i32::MIN) || rounded > f64::from(i32::MAX) || rounded.is_nan() {
                Err(VbsError::overflow(format!("{} as a Long", rounded)))
            } else {
                Ok(rounded as i32)
            }
        }
    }
}

/// Convert a value to i16 with banker's rounding (`CInt`)
pub fn to_integer(value: &Value) -> RuntimeResult<i16> {
    let long = to_long(value)?;
    i16::try_from(long).map_err(|_| VbsError::overflow(format!("{} as an Integer", long)))
}

/// Convert a value to a string (`CStr`)
pub fn to_string(value: &Value) -> RuntimeResult<String> {
    match str(value)? {
        Value::Str(s) => Ok(s),
        _ => Err(VbsError::invalid_use_of_null("Null as a string")),
    }
}

/// Format a scalar the way VBScript's string conversion does
///
/// Returns `None` for Null, arrays and object references.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    let s = match value {
        Value::Empty => String::new(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Byte(v) => v.to_string(),
        Value::Integer(v) => v.to_string(),
        Value::Long(v) => v.to_string(),
        Value::Single(v) => format_double(f64::from(*v), v.to_string()),
        Value::Double(v) => format_double(*v, v.to_string()),
        Value::Currency(d) => d.normalize().to_string(),
        Value::Date(d) => format_date(*d),
        Value::Str(s) => s.clone(),
        Value::Null | Value::Array(_) | Value::Object(_) | Value::Nothing => return None,
    };
    Some(s)
}

fn format_double(v: f64, shortest: String) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let magnitude = v.abs();
    if v.fract() == 0.0 && magnitude < 1e15 {
        return format!("{}", v as i64);
    }
    if magnitude >= 1e15 || magnitude < 1e-4 {
        let exponent_form = format!("{:E}", v);
        return match exponent_form.split_once('E') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}E+{}", mantissa, exponent)
            }
            _ => exponent_form,
        };
    }
    shortest
}

/// Parse a VBScript numeric string (decimal, `&H` hex or `&O` octal)
pub fn parse_number(text: &str) -> Option<f64> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(digits) = s.strip_prefix("&H").or_else(|| s.strip_prefix("&h")) {
        return parse_radix(digits, 16);
    }
    if let Some(digits) = s.strip_prefix("&O").or_else(|| s.strip_prefix("&o")) {
        return parse_radix(digits, 8);
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    s.parse::<f64>().ok()
}

fn parse_radix(digits: &str, radix: u32) -> Option<f64> {
    let raw = u32::from_str_radix(digits, radix).ok()?;
    // hex literals are signed: &HFFFF is -1
    let signed = if raw <= 0xFFFF {
        f64::from(raw as u16 as i16)
    } else {
        f64::from(raw as i32)
    };
    Some(signed)
}

// ========== Dates ==========

fn ole_epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)
}

/// Convert an OLE automation date to a calendar date-time
pub fn ole_to_datetime(ole: f64) -> Option<NaiveDateTime> {
    if !ole.is_finite() {
        return None;
    }
    let days = ole.trunc();
    let seconds = ((ole - days).abs() * SECONDS_PER_DAY).round();
    ole_epoch()?
        .checked_add_signed(chrono::Duration::try_days(days as i64)?)?
        .checked_add_signed(chrono::Duration::try_seconds(seconds as i64)?)
}

/// Convert a calendar date-time to an OLE automation date
pub fn datetime_to_ole(datetime: NaiveDateTime) -> Option<f64> {
    let epoch = ole_epoch()?;
    let days = (datetime.date() - epoch.date()).num_days() as f64;
    let time = f64::from(datetime.time().num_seconds_from_midnight()) / SECONDS_PER_DAY;
    Some(if days < 0.0 { days - time } else { days + time })
}

/// Parse a date or time string
pub fn parse_date(text: &str) -> Option<f64> {
    const DATE_TIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %I:%M:%S %p",
        "%m/%d/%Y %H:%M",
    ];
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d %B %Y", "%B %d, %Y"];
    const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

    let s = text.trim();
    if let Some(datetime) = DATE_TIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return datetime_to_ole(datetime);
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
    {
        return datetime_to_ole(date.and_hms_opt(0, 0, 0)?);
    }
    TIME_FORMATS
        .iter()
        .find_map(|f| NaiveTime::parse_from_str(s, f).ok())
        .map(|time| f64::from(time.num_seconds_from_midnight()) / SECONDS_PER_DAY)
}

/// Format an OLE date the way VBScript's en-US string conversion does
pub fn format_date(ole: f64) -> String {
    let Some(datetime) = ole_to_datetime(ole) else {
        return ole.to_string();
    };
    let has_date = ole.trunc() != 0.0;
    let has_time = ole.fract() != 0.0;
    match (has_date, has_time) {
        (true, false) => datetime.format("%-m/%-d/%Y").to_string(),
        (false, true) => datetime.format("%-I:%M:%S %p").to_string(),
        (false, false) => "12:00:00 AM".to_string(),
        (true, true) => datetime.format("%-m/%-d/%Y %-I:%M:%S %p").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::MemberDescriptor;

    #[derive(Debug)]
    struct Named(&'static str);

    const NAMED_MEMBERS: &[MemberDescriptor] =
        &[MemberDescriptor::property_get("Name", 0).default_member()];

    impl VbsObject for Named {
        fn type_name(&self) -> &str {
            "ConvertTestNamed"
        }

        fn members(&self) -> &[MemberDescriptor] {
            NAMED_MEMBERS
        }

        fn get_member(&self, _index: usize, _args: &mut [Value]) -> RuntimeResult<Value> {
            Ok(Value::from(self.0))
        }
    }

    #[derive(Debug)]
    struct NoDefault;

    impl VbsObject for NoDefault {
        fn type_name(&self) -> &str {
            "ConvertTestNoDefault"
        }
    }

    #[test]
    fn test_val_resolves_default_member() {
        let value = Value::object(Named("abc"));
        assert_eq!(val(&value).unwrap(), Value::from("abc"));
    }

    #[test]
    fn test_val_errors() {
        assert_eq!(val(&Value::Nothing).unwrap_err().number(), 91);
        assert_eq!(val(&Value::object(NoDefault)).unwrap_err().number(), 438);
    }

    #[test]
    fn test_obj_requires_reference() {
        assert!(obj(&Value::Nothing).is_ok());
        assert_eq!(obj(&Value::Integer(1)).unwrap_err().number(), 424);
    }

    #[test]
    fn test_num() {
        assert_eq!(num(&Value::from("5")).unwrap(), Value::Double(5.0));
        assert_eq!(num(&Value::from(" 2.5 ")).unwrap(), Value::Double(2.5));
        assert_eq!(num(&Value::from("aa")).unwrap_err().number(), 13);
        assert_eq!(num(&Value::Null).unwrap(), Value::Null);
        assert_eq!(num(&Value::Empty).unwrap(), Value::Integer(0));
        assert_eq!(num(&Value::Date(45000.5)).unwrap(), Value::Double(45000.5));
    }

    #[test]
    fn test_bool_and_truthy() {
        assert!(bool(&Value::from("True")).unwrap());
        assert!(!bool(&Value::Integer(0)).unwrap());
        assert!(bool(&Value::from("-1")).unwrap());
        assert_eq!(bool(&Value::Null).unwrap_err().number(), 94);
        assert_eq!(bool(&Value::from("yes")).unwrap_err().number(), 13);
        assert!(!truthy(&Value::Null).unwrap());
    }

    #[test]
    fn test_to_long_rounds_half_to_even() {
        assert_eq!(to_long(&Value::Double(2.5)).unwrap(), 2);
        assert_eq!(to_long(&Value::Double(3.5)).unwrap(), 4);
        assert_eq!(to_long(&Value::from("-1.5")).unwrap(), -2);
        assert_eq!(to_long(&Value::Double(1e12)).unwrap_err().number(), 6);
        assert_eq!(to_integer(&Value::Long(40000)).unwrap_err().number(), 6);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("12"), Some(12.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("&HFF"), Some(255.0));
        assert_eq!(parse_number("&HFFFF"), Some(-1.0));
        assert_eq!(parse_number("&O17"), Some(15.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("aa"), None);
    }

    #[test]
    fn test_scalar_to_string() {
        assert_eq!(scalar_to_string(&Value::Double(2.5)).unwrap(), "2.5");
        assert_eq!(scalar_to_string(&Value::Double(-3.0)).unwrap(), "-3");
        assert_eq!(scalar_to_string(&Value::Double(1e20)).unwrap(), "1E+20");
        assert_eq!(scalar_to_string(&Value::Bool(false)).unwrap(), "False");
        assert!(scalar_to_string(&Value::Null).is_none());
    }

    #[test]
    fn test_ole_dates() {
        let ole = parse_date("2020-01-02").unwrap();
        assert_eq!(ole, 43832.0);
        assert_eq!(format_date(ole), "1/2/2020");
        assert_eq!(format_date(0.5), "12:00:00 PM");

        let noon = parse_date("2020-01-02 12:00:00").unwrap();
        assert_eq!(noon, 43832.5);
        assert_eq!(format_date(noon), "1/2/2020 12:00:00 PM");

        let before_epoch = NaiveDate::from_ymd_opt(1899, 12, 29)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        assert_eq!(datetime_to_ole(before_epoch), Some(-1.25));
        assert_eq!(ole_to_datetime(-1.25), Some(before_epoch));
    }

    #[test]
    fn test_date_coercion() {
        assert_eq!(date(&Value::Long(2)).unwrap(), Value::Date(2.0));
        assert_eq!(date(&Value::from("nope")).unwrap_err().number(), 13);
    }
}
