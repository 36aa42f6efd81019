#![allow(dead_code)]

use std::rc::Rc;
use std::sync::Arc;

use sorrel_runtime::{
    object_ref, ArrayObj, Engine, EngineConfig, MemberCache, MemberKind, ObjectRef, Result,
    ScriptError, ScriptObject, Value,
};

/// Fresh engine with a private member cache so tests stay independent.
/// `RUST_LOG=sorrel_runtime=trace` surfaces dispatch and trap traces.
pub fn engine() -> Engine {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    Engine::new(Arc::new(MemberCache::new()), EngineConfig::default())
}

pub fn int16(v: &Value) -> i16 {
    match v {
        Value::Int(i) => *i,
        other => panic!("expected Int, got {:?}", other),
    }
}

pub fn long(v: &Value) -> i32 {
    match v {
        Value::Long(i) => *i,
        other => panic!("expected Long, got {:?}", other),
    }
}

pub fn num(v: &Value) -> f64 {
    match v {
        Value::Num(n) => *n,
        other => panic!("expected Num, got {:?}", other),
    }
}

pub fn date_serial(v: &Value) -> f64 {
    match v {
        Value::Date(d) => *d,
        other => panic!("expected Date, got {:?}", other),
    }
}

pub fn string(v: &Value) -> String {
    match v {
        Value::Str(s) => s.clone(),
        other => panic!("expected Str, got {:?}", other),
    }
}

/// A scalar hiding behind a default member.
pub struct Boxed {
    pub inner: Value,
}

pub fn boxed(inner: Value) -> ObjectRef {
    object_ref(Boxed { inner })
}

impl ScriptObject for Boxed {
    fn type_name(&self) -> &str {
        "Boxed"
    }

    fn member_kind(&self, name: &str) -> Option<MemberKind> {
        match name {
            "VALUE" => Some(MemberKind::Property),
            _ => None,
        }
    }

    fn get_member(&self, name: &str) -> Result<Value> {
        match name {
            "VALUE" => Ok(self.inner.clone()),
            other => Err(ScriptError::member_not_found("Boxed", other)),
        }
    }

    fn set_member(&mut self, name: &str, _args: &[Value], value: Value) -> Result<()> {
        match name {
            "VALUE" => {
                self.inner = value;
                Ok(())
            }
            other => Err(ScriptError::member_not_found("Boxed", other)),
        }
    }

    fn invoke_member(&mut self, name: &str, _args: &mut [Value]) -> Result<Value> {
        self.get_member(name)
    }

    fn default_member(&self) -> Option<&str> {
        Some("Value")
    }
}

/// Has a regular member but no default.
pub struct NoDefault;

impl ScriptObject for NoDefault {
    fn type_name(&self) -> &str {
        "NoDefault"
    }

    fn member_kind(&self, name: &str) -> Option<MemberKind> {
        match name {
            "NAME" => Some(MemberKind::Property),
            _ => None,
        }
    }

    fn get_member(&self, name: &str) -> Result<Value> {
        match name {
            "NAME" => Ok(Value::Str("plain".to_string())),
            other => Err(ScriptError::member_not_found("NoDefault", other)),
        }
    }

    fn set_member(&mut self, name: &str, _args: &[Value], _value: Value) -> Result<()> {
        Err(ScriptError::member_not_found("NoDefault", name))
    }

    fn invoke_member(&mut self, name: &str, _args: &mut [Value]) -> Result<Value> {
        self.get_member(name)
    }
}

/// Default member that always fails with a distinctive error.
pub struct FailingDefault;

impl ScriptObject for FailingDefault {
    fn type_name(&self) -> &str {
        "FailingDefault"
    }

    fn member_kind(&self, name: &str) -> Option<MemberKind> {
        match name {
            "VALUE" => Some(MemberKind::Property),
            _ => None,
        }
    }

    fn get_member(&self, name: &str) -> Result<Value> {
        match name {
            "VALUE" => Err(ScriptError::custom(17, "test", "deliberate failure")),
            other => Err(ScriptError::member_not_found("FailingDefault", other)),
        }
    }

    fn set_member(&mut self, name: &str, _args: &[Value], _value: Value) -> Result<()> {
        Err(ScriptError::member_not_found("FailingDefault", name))
    }

    fn invoke_member(&mut self, name: &str, _args: &mut [Value]) -> Result<Value> {
        self.get_member(name)
    }

    fn default_member(&self) -> Option<&str> {
        Some("Value")
    }
}

/// Default member that yields another object forever; VAL must give up at
/// the configured depth.
pub struct SelfRef;

impl ScriptObject for SelfRef {
    fn type_name(&self) -> &str {
        "SelfRef"
    }

    fn member_kind(&self, name: &str) -> Option<MemberKind> {
        match name {
            "SELF" => Some(MemberKind::Property),
            _ => None,
        }
    }

    fn get_member(&self, name: &str) -> Result<Value> {
        match name {
            "SELF" => Ok(Value::Object(object_ref(SelfRef))),
            other => Err(ScriptError::member_not_found("SelfRef", other)),
        }
    }

    fn set_member(&mut self, name: &str, _args: &[Value], _value: Value) -> Result<()> {
        Err(ScriptError::member_not_found("SelfRef", name))
    }

    fn invoke_member(&mut self, name: &str, _args: &mut [Value]) -> Result<Value> {
        self.get_member(name)
    }

    fn default_member(&self) -> Option<&str> {
        Some("Self")
    }
}

/// Doubles its first argument in place; the ByRef write-back probe.
pub struct Doubler;

impl ScriptObject for Doubler {
    fn type_name(&self) -> &str {
        "Doubler"
    }

    fn member_kind(&self, name: &str) -> Option<MemberKind> {
        match name {
            "BUMP" => Some(MemberKind::Method),
            _ => None,
        }
    }

    fn get_member(&self, name: &str) -> Result<Value> {
        Err(ScriptError::member_not_found("Doubler", name))
    }

    fn set_member(&mut self, name: &str, _args: &[Value], _value: Value) -> Result<()> {
        Err(ScriptError::member_not_found("Doubler", name))
    }

    fn invoke_member(&mut self, name: &str, args: &mut [Value]) -> Result<Value> {
        match name {
            "BUMP" => {
                let old = match args.first() {
                    Some(Value::Int(i)) => *i as i32,
                    Some(Value::Long(i)) => *i,
                    _ => return Err(ScriptError::type_mismatch()),
                };
                args[0] = Value::Long(old * 2);
                Ok(Value::Empty)
            }
            other => Err(ScriptError::member_not_found("Doubler", other)),
        }
    }
}

/// Property-bearing object with an array-valued property.
pub struct Gauge {
    pub level: Value,
    pub data: Rc<ArrayObj>,
}

pub fn gauge(level: Value) -> ObjectRef {
    object_ref(Gauge { level, data: ArrayObj::new(vec![4]) })
}

impl ScriptObject for Gauge {
    fn type_name(&self) -> &str {
        "Gauge"
    }

    fn member_kind(&self, name: &str) -> Option<MemberKind> {
        match name {
            "LEVEL" | "DATA" => Some(MemberKind::Property),
            "RESET" => Some(MemberKind::Method),
            _ => None,
        }
    }

    fn get_member(&self, name: &str) -> Result<Value> {
        match name {
            "LEVEL" => Ok(self.level.clone()),
            "DATA" => Ok(Value::Array(self.data.clone())),
            other => Err(ScriptError::member_not_found("Gauge", other)),
        }
    }

    fn set_member(&mut self, name: &str, args: &[Value], value: Value) -> Result<()> {
        match name {
            "LEVEL" if args.is_empty() => {
                self.level = value;
                Ok(())
            }
            other => Err(ScriptError::member_not_found("Gauge", other)),
        }
    }

    fn invoke_member(&mut self, name: &str, _args: &mut [Value]) -> Result<Value> {
        match name {
            "RESET" => {
                self.level = Value::Int(0);
                Ok(Value::Empty)
            }
            other => self.get_member(other),
        }
    }
}
