//! Scripting.Dictionary: keyed collection with `Item` as its default
//! member, the workhorse of translated classic-ASP code.

use sorrel_common::consts::{RUNTIME_SOURCE, VB_BINARY_COMPARE, VB_TEXT_COMPARE};
use sorrel_common::{Result, ScriptError};
use sorrel_runtime::{object_ref, ArrayObj, MemberKind, ScriptObject, Value};

pub fn register(reg: &mut crate::Registry) {
    reg.register(
        "Scripting.Dictionary",
        crate::TypeInfo {
            factory: |args| {
                if !args.is_empty() {
                    return Err(ScriptError::invalid_call());
                }
                Ok(object_ref(Dictionary::new()))
            },
        },
    );
}

const ERR_KEY_EXISTS: i32 = 457;
const ERR_ELEMENT_NOT_FOUND: i32 = 32811;

pub struct Dictionary {
    entries: Vec<(Value, Value)>,
    compare_mode: i32,
}

impl Dictionary {
    pub fn new() -> Dictionary {
        Dictionary { entries: Vec::new(), compare_mode: VB_BINARY_COMPARE }
    }

    fn position(&self, key: &Value) -> Option<usize> {
        self.entries.iter().position(|(k, _)| self.key_matches(k, key))
    }

    fn key_matches(&self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Str(x), Value::Str(y)) => {
                if self.compare_mode == VB_TEXT_COMPARE {
                    x.eq_ignore_ascii_case(y)
                } else {
                    x == y
                }
            }
            (Value::Empty, Value::Empty) | (Value::Null, Value::Null) => true,
            _ => match (scalar_num(a), scalar_num(b)) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }

    /// Reading a missing key adds it with an Empty item, as the original
    /// collection does.
    fn item(&mut self, key: &Value) -> Value {
        match self.position(key) {
            Some(i) => self.entries[i].1.clone(),
            None => {
                self.entries.push((key.clone(), Value::Empty));
                Value::Empty
            }
        }
    }

    fn put_item(&mut self, key: &Value, value: Value) {
        match self.position(key) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((key.clone(), value)),
        }
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

fn scalar_num(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(*i as f64),
        Value::Long(i) => Some(*i as f64),
        Value::Num(n) => Some(*n),
        Value::Currency(c) => Some(c.to_f64()),
        Value::Date(d) => Some(*d),
        _ => None,
    }
}

fn element_not_found() -> ScriptError {
    ScriptError::custom(ERR_ELEMENT_NOT_FOUND, RUNTIME_SOURCE, "Element not found")
}

impl ScriptObject for Dictionary {
    fn type_name(&self) -> &str {
        "Dictionary"
    }

    fn member_kind(&self, name: &str) -> Option<MemberKind> {
        match name {
            "COUNT" | "COMPAREMODE" => Some(MemberKind::Property),
            "ITEM" | "KEY" | "ADD" | "EXISTS" | "REMOVE" | "REMOVEALL" | "KEYS" | "ITEMS" => {
                Some(MemberKind::Method)
            }
            _ => None,
        }
    }

    fn get_member(&self, name: &str) -> Result<Value> {
        match name {
            "COUNT" => Ok(Value::Long(self.entries.len() as i32)),
            "COMPAREMODE" => Ok(Value::Long(self.compare_mode)),
            other => Err(ScriptError::member_not_found("Dictionary", other)),
        }
    }

    fn set_member(&mut self, name: &str, args: &[Value], value: Value) -> Result<()> {
        match name {
            "ITEM" => {
                let key = args.first().ok_or_else(ScriptError::invalid_call)?;
                self.put_item(key, value);
                Ok(())
            }
            "KEY" => {
                let old = args.first().ok_or_else(ScriptError::invalid_call)?;
                let i = self.position(old).ok_or_else(element_not_found)?;
                self.entries[i].0 = value;
                Ok(())
            }
            "COMPAREMODE" => {
                if !args.is_empty() {
                    return Err(ScriptError::cannot_assign());
                }
                // Switching comparison rules under live entries is refused.
                if !self.entries.is_empty() {
                    return Err(ScriptError::invalid_call());
                }
                self.compare_mode = match value {
                    Value::Int(i) => i as i32,
                    Value::Long(i) => i,
                    _ => return Err(ScriptError::type_mismatch()),
                };
                Ok(())
            }
            other => Err(ScriptError::member_not_found("Dictionary", other)),
        }
    }

    fn invoke_member(&mut self, name: &str, args: &mut [Value]) -> Result<Value> {
        match name {
            "ITEM" => match args {
                [key] => Ok(self.item(&key.clone())),
                _ => Err(ScriptError::invalid_call()),
            },
            "ADD" => match args {
                [key, item] => {
                    if self.position(key).is_some() {
                        return Err(ScriptError::custom(
                            ERR_KEY_EXISTS,
                            RUNTIME_SOURCE,
                            "This key is already associated with an element of this collection",
                        ));
                    }
                    let (key, item) = (key.clone(), item.clone());
                    self.entries.push((key, item));
                    Ok(Value::Empty)
                }
                _ => Err(ScriptError::invalid_call()),
            },
            "EXISTS" => match args {
                [key] => Ok(Value::from_bool(self.position(key).is_some())),
                _ => Err(ScriptError::invalid_call()),
            },
            "REMOVE" => match args {
                [key] => {
                    let i = self.position(key).ok_or_else(element_not_found)?;
                    self.entries.remove(i);
                    Ok(Value::Empty)
                }
                _ => Err(ScriptError::invalid_call()),
            },
            "REMOVEALL" => {
                self.entries.clear();
                Ok(Value::Empty)
            }
            "KEYS" => Ok(Value::Array(ArrayObj::from_values(
                self.entries.iter().map(|(k, _)| k.clone()).collect(),
            ))),
            "ITEMS" => Ok(Value::Array(ArrayObj::from_values(
                self.entries.iter().map(|(_, v)| v.clone()).collect(),
            ))),
            other => Err(ScriptError::member_not_found("Dictionary", other)),
        }
    }

    fn default_member(&self) -> Option<&str> {
        Some("Item")
    }

    fn enumerate(&self) -> Result<Vec<Value>> {
        Ok(self.entries.iter().map(|(k, _)| k.clone()).collect())
    }
}
