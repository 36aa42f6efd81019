//! Arithmetic, comparison and logical operators with the source language's
//! coercion rules: Null propagates, Empty acts as zero (or the empty
//! string), integer overflow promotes Integer → Long → Double, currency
//! arithmetic is checked, and mixing in a date keeps the result a date.

use std::rc::Rc;

use sorrel_common::{Result, ScriptError};

use crate::coerce::{self, NumDomain};
use crate::date;
use crate::engine::Engine;
use crate::value::{Currency, Value};

#[derive(Clone, Copy)]
enum BinOp {
    Add,
    Sub,
    Mul,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cmp {
    Null,
    Less,
    Equal,
    Greater,
}

impl Engine {
    pub fn add(&self, a: Value, b: Value) -> Result<Value> {
        let a = self.val(a)?;
        let b = self.val(b)?;
        if a.is_null() || b.is_null() {
            return Ok(Value::Null);
        }
        match (&a, &b) {
            (Value::Str(x), Value::Str(y)) => Ok(Value::Str(format!("{}{}", x, y))),
            (Value::Str(s), Value::Empty) | (Value::Empty, Value::Str(s)) => {
                Ok(Value::Str(s.clone()))
            }
            _ => self.arith(&a, &b, BinOp::Add),
        }
    }

    pub fn sub(&self, a: Value, b: Value) -> Result<Value> {
        let a = self.val(a)?;
        let b = self.val(b)?;
        if a.is_null() || b.is_null() {
            return Ok(Value::Null);
        }
        self.arith(&a, &b, BinOp::Sub)
    }

    pub fn mul(&self, a: Value, b: Value) -> Result<Value> {
        let a = self.val(a)?;
        let b = self.val(b)?;
        if a.is_null() || b.is_null() {
            return Ok(Value::Null);
        }
        self.arith(&a, &b, BinOp::Mul)
    }

    /// Floating division; the result never keeps an integer subtype.
    pub fn div(&self, a: Value, b: Value) -> Result<Value> {
        let a = self.val(a)?;
        let b = self.val(b)?;
        if a.is_null() || b.is_null() {
            return Ok(Value::Null);
        }
        let (xa, _) = self.numeric_of(&a)?;
        let (xb, _) = self.numeric_of(&b)?;
        if xb == 0.0 {
            return Err(ScriptError::division_by_zero());
        }
        finite(xa / xb)
    }

    /// Integer division: both operands banker's-rounded to Long first.
    pub fn idiv(&self, a: Value, b: Value) -> Result<Value> {
        let a = self.val(a)?;
        let b = self.val(b)?;
        if a.is_null() || b.is_null() {
            return Ok(Value::Null);
        }
        let (la, da) = self.long_operand(&a)?;
        let (lb, db) = self.long_operand(&b)?;
        if lb == 0 {
            return Err(ScriptError::division_by_zero());
        }
        let r = la.checked_div(lb).ok_or_else(ScriptError::overflow)?;
        Ok(narrow_int(r as i64, da.max(db)))
    }

    pub fn modulo(&self, a: Value, b: Value) -> Result<Value> {
        let a = self.val(a)?;
        let b = self.val(b)?;
        if a.is_null() || b.is_null() {
            return Ok(Value::Null);
        }
        let (la, da) = self.long_operand(&a)?;
        let (lb, db) = self.long_operand(&b)?;
        if lb == 0 {
            return Err(ScriptError::division_by_zero());
        }
        let r = la.checked_rem(lb).ok_or_else(ScriptError::overflow)?;
        Ok(narrow_int(r as i64, da.max(db)))
    }

    pub fn pow(&self, a: Value, b: Value) -> Result<Value> {
        let a = self.val(a)?;
        let b = self.val(b)?;
        if a.is_null() || b.is_null() {
            return Ok(Value::Null);
        }
        let (xa, _) = self.numeric_of(&a)?;
        let (xb, _) = self.numeric_of(&b)?;
        if xa == 0.0 && xb < 0.0 {
            return Err(ScriptError::division_by_zero());
        }
        let r = xa.powf(xb);
        if r.is_nan() {
            return Err(ScriptError::invalid_call());
        }
        finite(r)
    }

    pub fn neg(&self, a: Value) -> Result<Value> {
        let a = self.val(a)?;
        if a.is_null() {
            return Ok(Value::Null);
        }
        let (x, d) = self.numeric_of(&a)?;
        match d {
            NumDomain::Int16 | NumDomain::Int32 => Ok(narrow_int(-(x as i64), d)),
            NumDomain::Currency => Ok(Value::Currency(currency_operand(&a, x)?.checked_neg()?)),
            NumDomain::Double => finite(-x),
            NumDomain::Date => Ok(Value::Date(date::date_from_serial(-x)?)),
        }
    }

    /// The `&` operator. Null is tolerated on either side and contributes
    /// nothing; two Nulls stay Null.
    pub fn concat(&self, a: Value, b: Value) -> Result<Value> {
        let a = self.nullable_str(a)?;
        let b = self.nullable_str(b)?;
        if a.is_null() && b.is_null() {
            return Ok(Value::Null);
        }
        let mut out = String::new();
        if let Value::Str(s) = &a {
            out.push_str(s);
        }
        if let Value::Str(s) = &b {
            out.push_str(s);
        }
        Ok(Value::Str(out))
    }

    // --- logical operators (bitwise over Longs, Null tri-state) ---

    pub fn and(&self, a: Value, b: Value) -> Result<Value> {
        let (la, sa) = self.logical_operand(a)?;
        let (lb, sb) = self.logical_operand(b)?;
        match (la, lb) {
            (Some(x), Some(y)) => Ok(narrow_logical(x & y, sa && sb)),
            (None, Some(y)) | (Some(y), None) => {
                if y == 0 {
                    Ok(Value::FALSE)
                } else {
                    Ok(Value::Null)
                }
            }
            (None, None) => Ok(Value::Null),
        }
    }

    pub fn or(&self, a: Value, b: Value) -> Result<Value> {
        let (la, sa) = self.logical_operand(a)?;
        let (lb, sb) = self.logical_operand(b)?;
        match (la, lb) {
            (Some(x), Some(y)) => Ok(narrow_logical(x | y, sa && sb)),
            (None, Some(y)) | (Some(y), None) => {
                if y == -1 {
                    Ok(Value::TRUE)
                } else {
                    Ok(Value::Null)
                }
            }
            (None, None) => Ok(Value::Null),
        }
    }

    pub fn xor(&self, a: Value, b: Value) -> Result<Value> {
        let (la, sa) = self.logical_operand(a)?;
        let (lb, sb) = self.logical_operand(b)?;
        match (la, lb) {
            (Some(x), Some(y)) => Ok(narrow_logical(x ^ y, sa && sb)),
            _ => Ok(Value::Null),
        }
    }

    pub fn eqv(&self, a: Value, b: Value) -> Result<Value> {
        let (la, sa) = self.logical_operand(a)?;
        let (lb, sb) = self.logical_operand(b)?;
        match (la, lb) {
            (Some(x), Some(y)) => Ok(narrow_logical(!(x ^ y), sa && sb)),
            _ => Ok(Value::Null),
        }
    }

    pub fn imp(&self, a: Value, b: Value) -> Result<Value> {
        let (la, sa) = self.logical_operand(a)?;
        let (lb, sb) = self.logical_operand(b)?;
        match (la, lb) {
            (Some(x), Some(y)) => Ok(narrow_logical(!x | y, sa && sb)),
            (None, Some(y)) => {
                if y == -1 {
                    Ok(Value::TRUE)
                } else {
                    Ok(Value::Null)
                }
            }
            (Some(x), None) => {
                if x == 0 {
                    Ok(Value::TRUE)
                } else {
                    Ok(Value::Null)
                }
            }
            (None, None) => Ok(Value::Null),
        }
    }

    pub fn not(&self, a: Value) -> Result<Value> {
        let (la, sa) = self.logical_operand(a)?;
        match la {
            Some(x) => Ok(narrow_logical(!x, sa)),
            None => Ok(Value::Null),
        }
    }

    // --- comparisons ---

    pub fn eq(&self, a: Value, b: Value) -> Result<Value> {
        Ok(match self.compare(a, b)? {
            Cmp::Null => Value::Null,
            Cmp::Equal => Value::TRUE,
            _ => Value::FALSE,
        })
    }

    pub fn ne(&self, a: Value, b: Value) -> Result<Value> {
        Ok(match self.compare(a, b)? {
            Cmp::Null => Value::Null,
            Cmp::Equal => Value::FALSE,
            _ => Value::TRUE,
        })
    }

    pub fn lt(&self, a: Value, b: Value) -> Result<Value> {
        Ok(match self.compare(a, b)? {
            Cmp::Null => Value::Null,
            Cmp::Less => Value::TRUE,
            _ => Value::FALSE,
        })
    }

    pub fn le(&self, a: Value, b: Value) -> Result<Value> {
        Ok(match self.compare(a, b)? {
            Cmp::Null => Value::Null,
            Cmp::Less | Cmp::Equal => Value::TRUE,
            _ => Value::FALSE,
        })
    }

    pub fn gt(&self, a: Value, b: Value) -> Result<Value> {
        Ok(match self.compare(a, b)? {
            Cmp::Null => Value::Null,
            Cmp::Greater => Value::TRUE,
            _ => Value::FALSE,
        })
    }

    pub fn ge(&self, a: Value, b: Value) -> Result<Value> {
        Ok(match self.compare(a, b)? {
            Cmp::Null => Value::Null,
            Cmp::Greater | Cmp::Equal => Value::TRUE,
            _ => Value::FALSE,
        })
    }

    // Strict variants for contexts that cannot represent Null.

    pub fn eq_strict(&self, a: Value, b: Value) -> Result<bool> {
        match self.compare(a, b)? {
            Cmp::Null => Err(ScriptError::type_mismatch()),
            c => Ok(c == Cmp::Equal),
        }
    }

    pub fn ne_strict(&self, a: Value, b: Value) -> Result<bool> {
        self.eq_strict(a, b).map(|r| !r)
    }

    pub fn lt_strict(&self, a: Value, b: Value) -> Result<bool> {
        match self.compare(a, b)? {
            Cmp::Null => Err(ScriptError::type_mismatch()),
            c => Ok(c == Cmp::Less),
        }
    }

    pub fn le_strict(&self, a: Value, b: Value) -> Result<bool> {
        match self.compare(a, b)? {
            Cmp::Null => Err(ScriptError::type_mismatch()),
            c => Ok(c != Cmp::Greater),
        }
    }

    pub fn gt_strict(&self, a: Value, b: Value) -> Result<bool> {
        match self.compare(a, b)? {
            Cmp::Null => Err(ScriptError::type_mismatch()),
            c => Ok(c == Cmp::Greater),
        }
    }

    pub fn ge_strict(&self, a: Value, b: Value) -> Result<bool> {
        match self.compare(a, b)? {
            Cmp::Null => Err(ScriptError::type_mismatch()),
            c => Ok(c != Cmp::Less),
        }
    }

    /// The Is operator: reference identity, Nothing-aware.
    pub fn obj_is(&self, a: Value, b: Value) -> Result<Value> {
        match (a, b) {
            (Value::Nothing, Value::Nothing) => Ok(Value::TRUE),
            (Value::Nothing, Value::Object(_)) | (Value::Object(_), Value::Nothing) => {
                Ok(Value::FALSE)
            }
            (Value::Object(x), Value::Object(y)) => Ok(Value::from_bool(Rc::ptr_eq(&x, &y))),
            _ => Err(ScriptError::object_required()),
        }
    }

    // --- helpers ---

    fn arith(&self, a: &Value, b: &Value, op: BinOp) -> Result<Value> {
        let (xa, da) = self.numeric_of(a)?;
        let (xb, db) = self.numeric_of(b)?;
        match da.max(db) {
            domain @ (NumDomain::Int16 | NumDomain::Int32) => {
                let (ia, ib) = (xa as i64, xb as i64);
                let r = match op {
                    BinOp::Add => ia + ib,
                    BinOp::Sub => ia - ib,
                    BinOp::Mul => ia * ib,
                };
                Ok(narrow_int(r, domain))
            }
            NumDomain::Currency => {
                let ca = currency_operand(a, xa)?;
                let cb = currency_operand(b, xb)?;
                let r = match op {
                    BinOp::Add => ca.checked_add(cb)?,
                    BinOp::Sub => ca.checked_sub(cb)?,
                    BinOp::Mul => ca.checked_mul(cb)?,
                };
                Ok(Value::Currency(r))
            }
            NumDomain::Double => finite(match op {
                BinOp::Add => xa + xb,
                BinOp::Sub => xa - xb,
                BinOp::Mul => xa * xb,
            }),
            NumDomain::Date => {
                let r = match op {
                    BinOp::Add => xa + xb,
                    BinOp::Sub => xa - xb,
                    BinOp::Mul => xa * xb,
                };
                Ok(Value::Date(date::date_from_serial(r)?))
            }
        }
    }

    fn long_operand(&self, v: &Value) -> Result<(i32, NumDomain)> {
        let (x, d) = self.numeric_of(v)?;
        Ok((coerce::to_long(x)?, d))
    }

    fn logical_operand(&self, v: Value) -> Result<(Option<i32>, bool)> {
        let v = self.val(v)?;
        if v.is_null() {
            return Ok((None, false));
        }
        let (x, d) = self.numeric_of(&v)?;
        Ok((Some(coerce::to_long(x)?), d <= NumDomain::Int16))
    }

    fn compare(&self, a: Value, b: Value) -> Result<Cmp> {
        let a = self.val(a)?;
        let b = self.val(b)?;
        if a.is_null() || b.is_null() {
            return Ok(Cmp::Null);
        }
        match (&a, &b) {
            (Value::Str(x), Value::Str(y)) => return Ok(ord_cmp(x.as_str(), y.as_str())),
            (Value::Empty, Value::Empty) => return Ok(Cmp::Equal),
            (Value::Empty, Value::Str(y)) => return Ok(ord_cmp("", y.as_str())),
            (Value::Str(x), Value::Empty) => return Ok(ord_cmp(x.as_str(), "")),
            _ => {}
        }
        let na = self.scalar_num(&a)?;
        let nb = self.scalar_num(&b)?;
        match (na, nb) {
            (Some(x), Some(y)) => num_cmp(x, y),
            (Some(x), None) => match b {
                Value::Empty => num_cmp(x, 0.0),
                // A numeric expression always compares less than a string.
                Value::Str(_) => Ok(Cmp::Less),
                _ => Err(ScriptError::type_mismatch()),
            },
            (None, Some(y)) => match a {
                Value::Empty => num_cmp(0.0, y),
                Value::Str(_) => Ok(Cmp::Greater),
                _ => Err(ScriptError::type_mismatch()),
            },
            (None, None) => Err(ScriptError::type_mismatch()),
        }
    }

    fn scalar_num(&self, v: &Value) -> Result<Option<f64>> {
        Ok(match v {
            Value::Int(_) | Value::Long(_) | Value::Num(_) | Value::Currency(_) | Value::Date(_) => {
                Some(self.numeric_of(v)?.0)
            }
            _ => None,
        })
    }
}

fn ord_cmp(x: &str, y: &str) -> Cmp {
    match x.cmp(y) {
        std::cmp::Ordering::Less => Cmp::Less,
        std::cmp::Ordering::Equal => Cmp::Equal,
        std::cmp::Ordering::Greater => Cmp::Greater,
    }
}

fn num_cmp(x: f64, y: f64) -> Result<Cmp> {
    match x.partial_cmp(&y) {
        Some(std::cmp::Ordering::Less) => Ok(Cmp::Less),
        Some(std::cmp::Ordering::Equal) => Ok(Cmp::Equal),
        Some(std::cmp::Ordering::Greater) => Ok(Cmp::Greater),
        None => Err(ScriptError::type_mismatch()),
    }
}

/// Integer results keep the narrowest subtype that fits, promoting
/// Integer → Long → Double on overflow.
fn narrow_int(r: i64, natural: NumDomain) -> Value {
    if natural <= NumDomain::Int16 && r >= i16::MIN as i64 && r <= i16::MAX as i64 {
        Value::Int(r as i16)
    } else if r >= i32::MIN as i64 && r <= i32::MAX as i64 {
        Value::Long(r as i32)
    } else {
        Value::Num(r as f64)
    }
}

fn narrow_logical(r: i32, small: bool) -> Value {
    if small && r >= i16::MIN as i32 && r <= i16::MAX as i32 {
        Value::Int(r as i16)
    } else {
        Value::Long(r)
    }
}

fn currency_operand(v: &Value, x: f64) -> Result<Currency> {
    match v {
        Value::Currency(c) => Ok(*c),
        _ => Currency::from_f64(x),
    }
}

fn finite(r: f64) -> Result<Value> {
    if r.is_finite() {
        Ok(Value::Num(r))
    } else {
        Err(ScriptError::overflow())
    }
}
