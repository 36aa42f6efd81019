//! ProgID-keyed registry behind the translated `CreateObject` calls.

use std::collections::HashMap;

use sorrel_common::{Result, ScriptError};
use sorrel_runtime::{ObjectRef, Value};

pub struct TypeInfo {
    pub factory: fn(args: &[Value]) -> Result<ObjectRef>,
}

#[derive(Default)]
pub struct Registry {
    types: HashMap<String, TypeInfo>,
}

impl Registry {
    pub fn new() -> Self {
        Self { types: HashMap::new() }
    }

    pub fn register(&mut self, prog_id: &str, info: TypeInfo) {
        self.types.insert(prog_id.to_ascii_uppercase(), info);
    }

    pub fn has_type(&self, prog_id: &str) -> bool {
        self.types.contains_key(&prog_id.to_ascii_uppercase())
    }

    pub fn create(&self, prog_id: &str, args: &[Value]) -> Result<ObjectRef> {
        let info = self
            .types
            .get(&prog_id.to_ascii_uppercase())
            .ok_or_else(|| ScriptError::cannot_create(prog_id))?;
        (info.factory)(args)
    }
}

pub fn register_objects(reg: &mut Registry) {
    dictionary::register(reg);
}

pub mod dictionary;
