//! Argument slots: ByVal snapshots vs ByRef storage bindings.
//!
//! The emitter decides which flavor each argument gets (bare variable names
//! bind ByRef, everything else — literals, sub-expressions, call results,
//! and the explicit-parentheses idiom — snapshots ByVal); this module only
//! honors the decision and keeps the aliasing airtight.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use sorrel_common::{Result, ScriptError};

use crate::coerce;
use crate::value::{ArrayObj, Value};

pub struct RefSlot {
    get: Box<dyn Fn() -> Result<Value>>,
    set: Box<dyn Fn(Value) -> Result<()>>,
}

impl RefSlot {
    pub fn new(
        get: impl Fn() -> Result<Value> + 'static,
        set: impl Fn(Value) -> Result<()> + 'static,
    ) -> RefSlot {
        RefSlot { get: Box::new(get), set: Box::new(set) }
    }

    pub fn read(&self) -> Result<Value> {
        (self.get)()
    }

    pub fn write(&self, v: Value) -> Result<()> {
        (self.set)(v)
    }
}

pub enum ArgSlot {
    ByVal(Value),
    ByRef(RefSlot),
}

impl fmt::Debug for ArgSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgSlot::ByVal(v) => write!(f, "ByVal({:?})", v),
            ArgSlot::ByRef(_) => write!(f, "ByRef(..)"),
        }
    }
}

impl ArgSlot {
    pub fn by_val(v: Value) -> ArgSlot {
        ArgSlot::ByVal(v)
    }

    /// Bind to a declared variable's storage cell.
    pub fn by_ref_cell(cell: &Rc<RefCell<Value>>) -> ArgSlot {
        let getter = cell.clone();
        let setter = cell.clone();
        ArgSlot::ByRef(RefSlot::new(
            move || Ok(getter.borrow().clone()),
            move |v| {
                *setter.borrow_mut() = v;
                Ok(())
            },
        ))
    }

    /// Bind to an array element. The subscripts are flattened to a single
    /// element offset here, exactly once; read and write-back both reuse the
    /// cached offset, so they hit the same element even when the subscript
    /// expression was not idempotent.
    pub fn by_ref_element(arr: &Rc<ArrayObj>, indices: &[Value]) -> Result<ArgSlot> {
        let idx = element_indices(indices)?;
        let flat = arr.flat_index(&idx)?;
        let getter = arr.clone();
        let setter = arr.clone();
        Ok(ArgSlot::ByRef(RefSlot::new(
            move || getter.get_flat(flat),
            move |v| setter.set_flat(flat, v),
        )))
    }

    pub fn by_ref(
        get: impl Fn() -> Result<Value> + 'static,
        set: impl Fn(Value) -> Result<()> + 'static,
    ) -> ArgSlot {
        ArgSlot::ByRef(RefSlot::new(get, set))
    }

    pub fn is_by_ref(&self) -> bool {
        matches!(self, ArgSlot::ByRef(_))
    }

    pub fn read(&self) -> Result<Value> {
        match self {
            ArgSlot::ByVal(v) => Ok(v.clone()),
            ArgSlot::ByRef(slot) => slot.read(),
        }
    }
}

/// Coerce subscript values to Longs (banker's rounding, like the
/// interpreter's subscript conversion).
pub(crate) fn element_indices(indices: &[Value]) -> Result<Vec<i32>> {
    indices.iter().map(index_of).collect()
}

fn index_of(v: &Value) -> Result<i32> {
    match v {
        Value::Empty => Ok(0),
        Value::Int(i) => Ok(*i as i32),
        Value::Long(i) => Ok(*i),
        Value::Num(n) => coerce::to_long(*n),
        Value::Currency(c) => coerce::to_long(c.to_f64()),
        Value::Str(s) => coerce::to_long(coerce::parse_number(s)?),
        _ => Err(ScriptError::type_mismatch()),
    }
}

/// Materialize the value vector handed to an invocation.
pub fn snapshot(slots: &[ArgSlot]) -> Result<Vec<Value>> {
    slots.iter().map(ArgSlot::read).collect()
}

/// Push post-call values back through the ByRef bindings only.
pub fn write_back(slots: &[ArgSlot], values: &[Value]) -> Result<()> {
    for (slot, v) in slots.iter().zip(values) {
        if let ArgSlot::ByRef(binding) = slot {
            binding.write(v.clone())?;
        }
    }
    Ok(())
}
