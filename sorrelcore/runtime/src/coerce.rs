//! Coercions: reduce any value or object handle to a required shape.

use sorrel_common::consts;
use sorrel_common::{Result, ScriptError};

use crate::date;
use crate::engine::Engine;
use crate::value::{Currency, Value};

/// Numeric subtypes ordered by widening rank. `Date` sits on top: mixing a
/// date into arithmetic keeps the result a date, and anything outside the
/// representable serial range overflows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum NumDomain {
    Int16,
    Int32,
    Currency,
    Double,
    Date,
}

impl Engine {
    /// Reduce `v` to a scalar. Object handles unwind through their default
    /// members (bounded by the configured resolution depth); everything
    /// else, including Empty and Null, passes through unchanged.
    pub fn val(&self, v: Value) -> Result<Value> {
        match v {
            Value::Object(ref obj) => self.default_value_of(obj),
            Value::Nothing => Err(ScriptError::object_not_set()),
            other => Ok(other),
        }
    }

    /// Coerce to a numeric case: the widest natural domain among `v` and
    /// every witness in `extras`. `Empty` counts as a 16-bit zero; `Null`
    /// is rejected (use `nullable_num` for Null-tolerant contexts).
    pub fn num(&self, v: Value, extras: &[Value]) -> Result<Value> {
        let v = self.val(v)?;
        let (x, mut domain) = self.numeric_of(&v)?;
        for w in extras {
            let (_, d) = self.numeric_of(w)?;
            domain = domain.max(d);
        }
        Ok(match domain {
            NumDomain::Int16 => Value::Int(x as i16),
            NumDomain::Int32 => Value::Long(x as i32),
            NumDomain::Currency => match v {
                Value::Currency(_) => v,
                _ => Value::Currency(Currency::from_f64(x)?),
            },
            NumDomain::Double => Value::Num(x),
            NumDomain::Date => Value::Date(date::date_from_serial(x)?),
        })
    }

    pub fn nullable_num(&self, v: Value, extras: &[Value]) -> Result<Value> {
        let v = self.val(v)?;
        if v.is_null() {
            return Ok(Value::Null);
        }
        self.num(v, extras)
    }

    pub fn str(&self, v: Value) -> Result<String> {
        let v = self.val(v)?;
        self.stringify(v)
    }

    pub fn nullable_str(&self, v: Value) -> Result<Value> {
        let v = self.val(v)?;
        if v.is_null() {
            return Ok(Value::Null);
        }
        Ok(Value::Str(self.stringify(v)?))
    }

    pub fn date(&self, v: Value) -> Result<Value> {
        let v = self.val(v)?;
        match v {
            Value::Date(_) => Ok(v),
            Value::Empty => Ok(Value::Date(0.0)),
            Value::Str(s) => {
                let year = (self.year_provider)();
                Ok(Value::Date(date::parse_date_literal(&s, self.locale(), year)?))
            }
            Value::Int(_) | Value::Long(_) | Value::Num(_) | Value::Currency(_) => {
                let (x, _) = self.numeric_of(&v)?;
                Ok(Value::Date(date::date_from_serial(x)?))
            }
            _ => Err(ScriptError::type_mismatch()),
        }
    }

    pub fn nullable_date(&self, v: Value) -> Result<Value> {
        let v = self.val(v)?;
        if v.is_null() {
            return Ok(Value::Null);
        }
        self.date(v)
    }

    /// Truth test: VAL, then NUM, then nonzero. Null is false.
    pub fn bool(&self, v: Value) -> Result<bool> {
        let v = self.val(v)?;
        if v.is_null() {
            return Ok(false);
        }
        let (x, _) = self.numeric_of(&v)?;
        Ok(x != 0.0)
    }

    /// The inverse of VAL: admits only object handles (including Nothing),
    /// guarding Set-assignment statements.
    pub fn obj(&self, v: Value) -> Result<Value> {
        match v {
            Value::Object(_) | Value::Nothing => Ok(v),
            _ => Err(ScriptError::object_required()),
        }
    }

    /// Pure classification; false only for live object handles.
    pub fn is_value_type(&self, v: &Value) -> bool {
        !matches!(v, Value::Object(_))
    }

    /// For-Each source: array elements or the object's enumerator.
    pub fn enumerable(&self, v: Value) -> Result<Vec<Value>> {
        match v {
            Value::Array(arr) => Ok(arr.elements()),
            Value::Object(obj) => obj.borrow().enumerate(),
            Value::Nothing => Err(ScriptError::object_not_set()),
            _ => Err(ScriptError::object_required()),
        }
    }

    pub(crate) fn stringify(&self, v: Value) -> Result<String> {
        match v {
            Value::Empty => Ok(String::new()),
            Value::Int(i) => Ok(i.to_string()),
            Value::Long(i) => Ok(i.to_string()),
            Value::Num(n) => Ok(format_double(n)),
            Value::Currency(c) => Ok(c.to_string()),
            Value::Date(d) => Ok(date::format_serial(d, self.locale())),
            Value::Str(s) => Ok(s),
            Value::Nothing => Err(ScriptError::object_not_set()),
            _ => Err(ScriptError::type_mismatch()),
        }
    }

    /// Numeric magnitude plus natural domain. Strings parse into the Double
    /// domain, like the interpreter's CDbl.
    pub(crate) fn numeric_of(&self, v: &Value) -> Result<(f64, NumDomain)> {
        match v {
            Value::Empty => Ok((0.0, NumDomain::Int16)),
            Value::Int(i) => Ok((*i as f64, NumDomain::Int16)),
            Value::Long(i) => Ok((*i as f64, NumDomain::Int32)),
            Value::Num(n) => Ok((*n, NumDomain::Double)),
            Value::Currency(c) => Ok((c.to_f64(), NumDomain::Currency)),
            Value::Date(d) => Ok((*d, NumDomain::Date)),
            Value::Str(s) => Ok((parse_number(s)?, NumDomain::Double)),
            Value::Object(_) => {
                let inner = self.val(v.clone())?;
                self.numeric_of(&inner)
            }
            Value::Nothing => Err(ScriptError::object_not_set()),
            _ => Err(ScriptError::type_mismatch()),
        }
    }
}

/// VarType classification. Arrays report as variant arrays.
pub fn var_type(v: &Value) -> i32 {
    match v {
        Value::Empty => consts::VB_EMPTY,
        Value::Null => consts::VB_NULL,
        Value::Int(_) => consts::VB_INTEGER,
        Value::Long(_) => consts::VB_LONG,
        Value::Num(_) => consts::VB_DOUBLE,
        Value::Currency(_) => consts::VB_CURRENCY,
        Value::Date(_) => consts::VB_DATE,
        Value::Str(_) => consts::VB_STRING,
        Value::Array(_) => consts::VB_ARRAY + consts::VB_VARIANT,
        Value::Object(_) | Value::Nothing => consts::VB_OBJECT,
    }
}

pub fn type_name(v: &Value) -> String {
    match v {
        Value::Empty => "Empty".to_string(),
        Value::Null => "Null".to_string(),
        Value::Nothing => "Nothing".to_string(),
        Value::Int(_) => "Integer".to_string(),
        Value::Long(_) => "Long".to_string(),
        Value::Num(_) => "Double".to_string(),
        Value::Currency(_) => "Currency".to_string(),
        Value::Date(_) => "Date".to_string(),
        Value::Str(_) => "String".to_string(),
        Value::Array(_) => "Variant()".to_string(),
        Value::Object(o) => o.borrow().type_name().to_string(),
    }
}

/// Loose numeric text: decimal or scientific, plus the interpreter's `&H`
/// and `&O` radix prefixes.
pub(crate) fn parse_number(s: &str) -> Result<f64> {
    let t = s.trim();
    if t.is_empty() {
        return Err(ScriptError::type_mismatch());
    }
    let lower = t.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("&h") {
        return i64::from_str_radix(hex, 16)
            .map(|n| n as f64)
            .map_err(|_| ScriptError::type_mismatch());
    }
    if let Some(oct) = lower.strip_prefix("&o") {
        return i64::from_str_radix(oct, 8)
            .map(|n| n as f64)
            .map_err(|_| ScriptError::type_mismatch());
    }
    match t.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(ScriptError::type_mismatch()),
    }
}

/// Banker's rounding to a Long, the conversion behind integer division,
/// modulo, logical operators and array subscripts.
pub(crate) fn to_long(v: f64) -> Result<i32> {
    if !v.is_finite() {
        return Err(ScriptError::overflow());
    }
    let r = v.round_ties_even();
    if r < i32::MIN as f64 || r > i32::MAX as f64 {
        return Err(ScriptError::overflow());
    }
    Ok(r as i32)
}

/// CStr rendering for doubles: integral values print without a point,
/// extremes switch to scientific notation with a signed two-digit exponent.
pub(crate) fn format_double(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let abs = v.abs();
    if v == v.trunc() && abs < 1e15 {
        return format!("{}", v as i64);
    }
    if abs >= 1e15 || abs < 1e-4 {
        let s = format!("{:E}", v);
        if let Some((mant, exp)) = s.split_once('E') {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(rest) => ("-", rest),
                None => ("+", exp),
            };
            return format!("{}E{}{:0>2}", mant, sign, digits);
        }
        return s;
    }
    format!("{}", v)
}
