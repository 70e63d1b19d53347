//! Built-in functions
//!
//! Every function takes its arguments as plain by-value references, so
//! translated code may call it directly when the argument count fits the
//! `INTRINSICS` entry. Otherwise the call goes through the `BuiltInFunctions`
//! object and the arity check happens at run time.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::arithmetic;
use crate::array::{self, VbsArray};
use crate::convert;
use crate::error::{RuntimeResult, VbsError};
use crate::object::{MemberDescriptor, VbsObject};
use crate::value::Value;

/// Signature shared by all built-in functions
pub type IntrinsicFn = fn(&[&Value]) -> RuntimeResult<Value>;

/// One built-in function
#[derive(Debug, Clone, Copy)]
pub struct Intrinsic {
    /// VBScript name; the Rust function is its lowercase form
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    pub function: IntrinsicFn,
}

impl Intrinsic {
    const fn new(name: &'static str, min_args: usize, max_args: usize, function: IntrinsicFn) -> Self {
        Self {
            name,
            min_args,
            max_args,
            function,
        }
    }

    pub fn accepts(&self, arity: usize) -> bool {
        self.min_args <= arity && arity <= self.max_args
    }
}

/// Built-in function table
pub static INTRINSICS: &[Intrinsic] = &[
    // strings
    Intrinsic::new("LEN", 1, 1, len),
    Intrinsic::new("UCASE", 1, 1, ucase),
    Intrinsic::new("LCASE", 1, 1, lcase),
    Intrinsic::new("LEFT", 2, 2, left),
    Intrinsic::new("RIGHT", 2, 2, right),
    Intrinsic::new("MID", 2, 3, mid),
    Intrinsic::new("TRIM", 1, 1, trim),
    Intrinsic::new("LTRIM", 1, 1, ltrim),
    Intrinsic::new("RTRIM", 1, 1, rtrim),
    Intrinsic::new("SPACE", 1, 1, space),
    Intrinsic::new("STRREVERSE", 1, 1, strreverse),
    Intrinsic::new("INSTR", 2, 3, instr),
    Intrinsic::new("REPLACE", 3, 3, replace),
    Intrinsic::new("SPLIT", 1, 2, split),
    Intrinsic::new("JOIN", 1, 2, join),
    Intrinsic::new("CHR", 1, 1, chr),
    Intrinsic::new("ASC", 1, 1, asc),
    Intrinsic::new("HEX", 1, 1, hex),
    Intrinsic::new("OCT", 1, 1, oct),
    // conversions
    Intrinsic::new("CSTR", 1, 1, cstr),
    Intrinsic::new("CINT", 1, 1, cint),
    Intrinsic::new("CLNG", 1, 1, clng),
    Intrinsic::new("CDBL", 1, 1, cdbl),
    Intrinsic::new("CBOOL", 1, 1, cbool),
    Intrinsic::new("CDATE", 1, 1, cdate),
    Intrinsic::new("CCUR", 1, 1, ccur),
    // inspection
    Intrinsic::new("ISNULL", 1, 1, isnull),
    Intrinsic::new("ISEMPTY", 1, 1, isempty),
    Intrinsic::new("ISOBJECT", 1, 1, isobject),
    Intrinsic::new("ISARRAY", 1, 1, isarray),
    Intrinsic::new("ISNUMERIC", 1, 1, isnumeric),
    Intrinsic::new("ISDATE", 1, 1, isdate),
    Intrinsic::new("TYPENAME", 1, 1, typename),
    Intrinsic::new("VARTYPE", 1, 1, vartype),
    // math
    Intrinsic::new("ABS", 1, 1, abs),
    Intrinsic::new("INT", 1, 1, int),
    Intrinsic::new("FIX", 1, 1, fix),
    Intrinsic::new("ROUND", 1, 2, round),
    Intrinsic::new("SGN", 1, 1, sgn),
    Intrinsic::new("SQR", 1, 1, sqr),
    // arrays
    Intrinsic::new("ARRAY", 0, usize::MAX, array),
    Intrinsic::new("UBOUND", 1, 2, ubound),
    Intrinsic::new("LBOUND", 1, 2, lbound),
    // dates
    Intrinsic::new("YEAR", 1, 1, year),
    Intrinsic::new("MONTH", 1, 1, month),
    Intrinsic::new("DAY", 1, 1, day),
    Intrinsic::new("DATESERIAL", 3, 3, dateserial),
];

/// Find a built-in function by (case-insensitive) name
pub fn lookup(name: &str) -> Option<&'static Intrinsic> {
    INTRINSICS.iter().find(|i| i.name.eq_ignore_ascii_case(name))
}

// ========== Argument helpers ==========

fn arg<'a>(args: &[&'a Value], index: usize) -> RuntimeResult<&'a Value> {
    args.get(index)
        .copied()
        .ok_or_else(|| VbsError::wrong_number_of_arguments(format!("argument {}", index + 1)))
}

/// String argument; `None` for Null
fn text(args: &[&Value], index: usize) -> RuntimeResult<Option<String>> {
    match convert::str(arg(args, index)?)? {
        Value::Str(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// Non-negative count argument
fn count(args: &[&Value], index: usize) -> RuntimeResult<usize> {
    let n = convert::to_long(&convert::resolve(arg(args, index)?)?)?;
    usize::try_from(n).map_err(|_| VbsError::invalid_procedure_call(format!("count {}", n)))
}

fn string_or_null(s: Option<String>) -> Value {
    s.map_or(Value::Null, Value::Str)
}

// ========== Strings ==========

pub fn len(args: &[&Value]) -> RuntimeResult<Value> {
    Ok(match text(args, 0)? {
        Some(s) => Value::Long(s.chars().count() as i32),
        None => Value::Null,
    })
}

pub fn ucase(args: &[&Value]) -> RuntimeResult<Value> {
    Ok(string_or_null(text(args, 0)?.map(|s| s.to_uppercase())))
}

pub fn lcase(args: &[&Value]) -> RuntimeResult<Value> {
    Ok(string_or_null(text(args, 0)?.map(|s| s.to_lowercase())))
}

pub fn left(args: &[&Value]) -> RuntimeResult<Value> {
    let n = count(args, 1)?;
    Ok(string_or_null(text(args, 0)?.map(|s| s.chars().take(n).collect())))
}

pub fn right(args: &[&Value]) -> RuntimeResult<Value> {
    let n = count(args, 1)?;
    Ok(string_or_null(text(args, 0)?.map(|s| {
        let skip = s.chars().count().saturating_sub(n);
        s.chars().skip(skip).collect()
    })))
}

pub fn mid(args: &[&Value]) -> RuntimeResult<Value> {
    let start = count(args, 1)?;
    if start == 0 {
        return Err(VbsError::invalid_procedure_call("Mid start must be at least 1"));
    }
    let length = match args.get(2) {
        Some(_) => Some(count(args, 2)?),
        None => None,
    };
    Ok(string_or_null(text(args, 0)?.map(|s| {
        let rest = s.chars().skip(start - 1);
        match length {
            Some(n) => rest.take(n).collect(),
            None => rest.collect(),
        }
    })))
}

pub fn trim(args: &[&Value]) -> RuntimeResult<Value> {
    Ok(string_or_null(text(args, 0)?.map(|s| s.trim_matches(' ').to_string())))
}

pub fn ltrim(args: &[&Value]) -> RuntimeResult<Value> {
    Ok(string_or_null(text(args, 0)?.map(|s| s.trim_start_matches(' ').to_string())))
}

pub fn rtrim(args: &[&Value]) -> RuntimeResult<Value> {
    Ok(string_or_null(text(args, 0)?.map(|s| s.trim_end_matches(' ').to_string())))
}

pub fn space(args: &[&Value]) -> RuntimeResult<Value> {
    Ok(Value::Str(" ".repeat(count(args, 0)?)))
}

pub fn strreverse(args: &[&Value]) -> RuntimeResult<Value> {
    Ok(string_or_null(text(args, 0)?.map(|s| s.chars().rev().collect())))
}

/// `InStr([start, ]haystack, needle)`: 1-based position, 0 when absent
pub fn instr(args: &[&Value]) -> RuntimeResult<Value> {
    let (start, offset) = if args.len() == 3 {
        (count(args, 0)?, 1)
    } else {
        (1, 0)
    };
    if start == 0 {
        return Err(VbsError::invalid_procedure_call("InStr start must be at least 1"));
    }
    let (Some(haystack), Some(needle)) = (text(args, offset)?, text(args, offset + 1)?) else {
        return Ok(Value::Null);
    };
    let chars: Vec<char> = haystack.chars().collect();
    let needle: Vec<char> = needle.chars().collect();
    if start > chars.len() + 1 {
        return Ok(Value::Long(0));
    }
    if needle.is_empty() {
        return Ok(Value::Long(start as i32));
    }
    let position = chars[start - 1..]
        .windows(needle.len())
        .position(|window| window == needle.as_slice())
        .map_or(0, |p| p + start);
    Ok(Value::Long(position as i32))
}

pub fn replace(args: &[&Value]) -> RuntimeResult<Value> {
    let (Some(s), Some(find), Some(with)) = (text(args, 0)?, text(args, 1)?, text(args, 2)?) else {
        return Err(VbsError::invalid_use_of_null("Replace argument"));
    };
    if find.is_empty() {
        return Ok(Value::Str(s));
    }
    Ok(Value::Str(s.replace(&find, &with)))
}

pub fn split(args: &[&Value]) -> RuntimeResult<Value> {
    let Some(s) = text(args, 0)? else {
        return Err(VbsError::invalid_use_of_null("Split argument"));
    };
    let delimiter = match args.get(1) {
        Some(_) => text(args, 1)?.unwrap_or_default(),
        None => " ".to_string(),
    };
    let parts: Vec<Value> = if s.is_empty() {
        Vec::new()
    } else if delimiter.is_empty() {
        vec![Value::Str(s)]
    } else {
        s.split(delimiter.as_str()).map(Value::from).collect()
    };
    Ok(Value::array(VbsArray::from_values(parts)))
}

pub fn join(args: &[&Value]) -> RuntimeResult<Value> {
    let Value::Array(items) = convert::resolve(arg(args, 0)?)? else {
        return Err(VbsError::type_mismatch("Join needs an array"));
    };
    let delimiter = match args.get(1) {
        Some(_) => text(args, 1)?.unwrap_or_default(),
        None => " ".to_string(),
    };
    let parts = items
        .borrow()
        .elements()
        .iter()
        .map(|v| match v {
            Value::Null => Ok(String::new()),
            other => convert::to_string(other),
        })
        .collect::<RuntimeResult<Vec<_>>>()?;
    Ok(Value::Str(parts.join(&delimiter)))
}

pub fn chr(args: &[&Value]) -> RuntimeResult<Value> {
    let code = convert::to_long(&convert::resolve(arg(args, 0)?)?)?;
    u8::try_from(code)
        .map(|b| Value::Str(char::from(b).to_string()))
        .map_err(|_| VbsError::invalid_procedure_call(format!("Chr({})", code)))
}

pub fn asc(args: &[&Value]) -> RuntimeResult<Value> {
    let Some(s) = text(args, 0)? else {
        return Err(VbsError::invalid_use_of_null("Asc argument"));
    };
    let first = s
        .chars()
        .next()
        .ok_or_else(|| VbsError::invalid_procedure_call("Asc of an empty string"))?;
    let code = u32::from(first);
    Ok(match i16::try_from(code) {
        Ok(v) => Value::Integer(v),
        Err(_) => Value::Long(code as i32),
    })
}

fn radix_digits(args: &[&Value], format: fn(u32) -> String) -> RuntimeResult<Value> {
    let value = convert::resolve(arg(args, 0)?)?;
    if value.is_null() {
        return Ok(Value::Null);
    }
    let n = convert::to_long(&value)?;
    // negative Integers print as 16-bit two's complement
    let bits = match i16::try_from(n) {
        Ok(small) if small < 0 => u32::from(small as u16),
        _ => n as u32,
    };
    Ok(Value::Str(format(bits)))
}

pub fn hex(args: &[&Value]) -> RuntimeResult<Value> {
    radix_digits(args, |bits| format!("{:X}", bits))
}

pub fn oct(args: &[&Value]) -> RuntimeResult<Value> {
    radix_digits(args, |bits| format!("{:o}", bits))
}

// ========== Conversions ==========

pub fn cstr(args: &[&Value]) -> RuntimeResult<Value> {
    Ok(Value::Str(convert::to_string(arg(args, 0)?)?))
}

pub fn cint(args: &[&Value]) -> RuntimeResult<Value> {
    Ok(Value::Integer(convert::to_integer(&convert::resolve(arg(args, 0)?)?)?))
}

pub fn clng(args: &[&Value]) -> RuntimeResult<Value> {
    Ok(Value::Long(convert::to_long(&convert::resolve(arg(args, 0)?)?)?))
}

pub fn cdbl(args: &[&Value]) -> RuntimeResult<Value> {
    Ok(Value::Double(convert::to_f64(arg(args, 0)?)?))
}

pub fn cbool(args: &[&Value]) -> RuntimeResult<Value> {
    Ok(Value::Bool(convert::bool(arg(args, 0)?)?))
}

pub fn cdate(args: &[&Value]) -> RuntimeResult<Value> {
    match convert::date(arg(args, 0)?)? {
        Value::Null => Err(VbsError::invalid_use_of_null("CDate argument")),
        date => Ok(date),
    }
}

pub fn ccur(args: &[&Value]) -> RuntimeResult<Value> {
    let value = convert::resolve(arg(args, 0)?)?;
    if let Value::Currency(d) = value {
        return Ok(Value::Currency(d));
    }
    let n = convert::to_f64(&value)?;
    Decimal::from_f64(n)
        .map(|d| Value::Currency(d.round_dp(4)))
        .ok_or_else(|| VbsError::overflow(format!("{} as Currency", n)))
}

// ========== Inspection ==========

pub fn isnull(args: &[&Value]) -> RuntimeResult<Value> {
    Ok(Value::Bool(arg(args, 0)?.is_null()))
}

pub fn isempty(args: &[&Value]) -> RuntimeResult<Value> {
    Ok(Value::Bool(arg(args, 0)?.is_empty()))
}

pub fn isobject(args: &[&Value]) -> RuntimeResult<Value> {
    Ok(Value::Bool(arg(args, 0)?.is_object()))
}

pub fn isarray(args: &[&Value]) -> RuntimeResult<Value> {
    Ok(Value::Bool(arg(args, 0)?.is_array()))
}

pub fn isnumeric(args: &[&Value]) -> RuntimeResult<Value> {
    let numeric = match convert::resolve(arg(args, 0)?)? {
        Value::Empty | Value::Bool(_) => true,
        Value::Str(s) => convert::parse_number(&s).is_some(),
        other => other.is_numeric(),
    };
    Ok(Value::Bool(numeric))
}

pub fn isdate(args: &[&Value]) -> RuntimeResult<Value> {
    let is_date = match convert::resolve(arg(args, 0)?)? {
        Value::Date(_) => true,
        Value::Str(s) => convert::parse_date(&s).is_some(),
        _ => false,
    };
    Ok(Value::Bool(is_date))
}

pub fn typename(args: &[&Value]) -> RuntimeResult<Value> {
    Ok(Value::from(arg(args, 0)?.type_name()))
}

pub fn vartype(args: &[&Value]) -> RuntimeResult<Value> {
    Ok(Value::Integer(arg(args, 0)?.var_type() as i16))
}

// ========== Math ==========

fn rounded(
    args: &[&Value],
    op: fn(f64) -> f64,
    decimal_op: fn(&Decimal) -> Decimal,
) -> RuntimeResult<Value> {
    Ok(match convert::resolve(arg(args, 0)?)? {
        Value::Null => Value::Null,
        Value::Empty => Value::Integer(0),
        whole @ (Value::Byte(_) | Value::Integer(_) | Value::Long(_)) => whole,
        Value::Bool(b) => Value::Integer(if b { -1 } else { 0 }),
        Value::Single(v) => Value::Single(op(f64::from(v)) as f32),
        Value::Currency(d) => Value::Currency(decimal_op(&d)),
        Value::Date(d) => Value::Date(op(d)),
        other => Value::Double(op(convert::to_f64(&other)?)),
    })
}

pub fn int(args: &[&Value]) -> RuntimeResult<Value> {
    rounded(args, f64::floor, Decimal::floor)
}

pub fn fix(args: &[&Value]) -> RuntimeResult<Value> {
    rounded(args, f64::trunc, Decimal::trunc)
}

pub fn abs(args: &[&Value]) -> RuntimeResult<Value> {
    let value = convert::resolve(arg(args, 0)?)?;
    match &value {
        Value::Null => Ok(Value::Null),
        Value::Empty => Ok(Value::Integer(0)),
        Value::Str(s) => {
            let n = convert::parse_number(s).ok_or_else(|| VbsError::type_mismatch(format!("'{}'", s)))?;
            Ok(Value::Double(n.abs()))
        }
        other if convert::to_f64(other)? < 0.0 => arithmetic::neg(other),
        other => Ok(other.clone()),
    }
}

/// `Round(n[, digits])`, half to even
pub fn round(args: &[&Value]) -> RuntimeResult<Value> {
    let value = convert::resolve(arg(args, 0)?)?;
    let digits = match args.get(1) {
        Some(_) => i32::try_from(count(args, 1)?)
            .map_err(|_| VbsError::invalid_procedure_call("Round digits"))?,
        None => 0,
    };
    match value {
        Value::Null => Ok(Value::Null),
        Value::Empty => Ok(Value::Integer(0)),
        whole @ (Value::Byte(_) | Value::Integer(_) | Value::Long(_)) => Ok(whole),
        Value::Currency(d) => Ok(Value::Currency(
            d.round_dp_with_strategy(digits as u32, rust_decimal::RoundingStrategy::MidpointNearestEven),
        )),
        other => {
            let scale = 10f64.powi(digits);
            Ok(Value::Double((convert::to_f64(&other)? * scale).round_ties_even() / scale))
        }
    }
}

pub fn sgn(args: &[&Value]) -> RuntimeResult<Value> {
    let value = convert::resolve(arg(args, 0)?)?;
    if value.is_null() {
        return Err(VbsError::invalid_use_of_null("Sgn argument"));
    }
    let n = convert::to_f64(&value)?;
    let sign = if n > 0.0 {
        1
    } else if n < 0.0 {
        -1
    } else {
        0
    };
    Ok(Value::Integer(sign))
}

pub fn sqr(args: &[&Value]) -> RuntimeResult<Value> {
    let n = convert::to_f64(arg(args, 0)?)?;
    if n < 0.0 {
        return Err(VbsError::invalid_procedure_call(format!("Sqr({})", n)));
    }
    Ok(Value::Double(n.sqrt()))
}

// ========== Arrays ==========

pub fn array(args: &[&Value]) -> RuntimeResult<Value> {
    Ok(Value::array(VbsArray::from_values(
        args.iter().map(|&v| v.clone()).collect(),
    )))
}

pub fn ubound(args: &[&Value]) -> RuntimeResult<Value> {
    array::ubound(arg(args, 0)?, args.get(1).copied())
}

pub fn lbound(args: &[&Value]) -> RuntimeResult<Value> {
    array::lbound(arg(args, 0)?, args.get(1).copied())
}

// ========== Dates ==========

fn date_part(args: &[&Value], part: fn(&chrono::NaiveDateTime) -> u32) -> RuntimeResult<Value> {
    match convert::date(arg(args, 0)?)? {
        Value::Date(ole) => {
            let datetime = convert::ole_to_datetime(ole)
                .ok_or_else(|| VbsError::overflow("date out of range"))?;
            Ok(Value::Integer(part(&datetime) as i16))
        }
        _ => Ok(Value::Null),
    }
}

pub fn year(args: &[&Value]) -> RuntimeResult<Value> {
    date_part(args, |d| d.year() as u32)
}

pub fn month(args: &[&Value]) -> RuntimeResult<Value> {
    date_part(args, |d| d.month())
}

pub fn day(args: &[&Value]) -> RuntimeResult<Value> {
    date_part(args, |d| d.day())
}

/// `DateSerial(year, month, day)`; out-of-range months and days roll over
pub fn dateserial(args: &[&Value]) -> RuntimeResult<Value> {
    let part = |index: usize| -> RuntimeResult<i32> {
        convert::to_long(&convert::resolve(arg(args, index)?)?)
    };
    let (year, month, day) = (part(0)?, part(1)?, part(2)?);
    let month_index = month - 1;
    let first = NaiveDate::from_ymd_opt(
        year + month_index.div_euclid(12),
        (month_index.rem_euclid(12) + 1) as u32,
        1,
    )
    .ok_or_else(|| VbsError::invalid_procedure_call("DateSerial year"))?;
    let date = chrono::Duration::try_days(i64::from(day) - 1)
        .and_then(|offset| first.checked_add_signed(offset))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(convert::datetime_to_ole)
        .ok_or_else(|| VbsError::invalid_procedure_call("DateSerial day"))?;
    Ok(Value::Date(date))
}

// ========== Dispatchable built-in object ==========

static BUILT_IN_MEMBERS: Lazy<Vec<MemberDescriptor>> = Lazy::new(|| {
    INTRINSICS
        .iter()
        .map(|i| MemberDescriptor::method(i.name, i.min_args, i.max_args))
        .collect()
});

/// Object through which built-in functions are called late-bound
#[derive(Debug, Default)]
pub struct BuiltInFunctions;

impl VbsObject for BuiltInFunctions {
    fn type_name(&self) -> &str {
        "BuiltInFunctions"
    }

    fn members(&self) -> &[MemberDescriptor] {
        &BUILT_IN_MEMBERS
    }

    fn get_member(&self, index: usize, args: &mut [Value]) -> RuntimeResult<Value> {
        let intrinsic = INTRINSICS
            .get(index)
            .ok_or_else(|| VbsError::member_not_supported(format!("built-in #{}", index)))?;
        let refs: Vec<&Value> = args.iter().collect();
        (intrinsic.function)(&refs)
    }
}
