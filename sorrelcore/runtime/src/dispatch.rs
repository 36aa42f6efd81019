//! CALL/SET: resolve a target plus a member-name chain plus bound arguments
//! into a value or a mutation, falling through default members as needed.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::{debug, trace};

use sorrel_common::{Result, ScriptError};

use crate::args::{self, ArgSlot};
use crate::engine::Engine;
use crate::object::{DefaultMemberResolution, MemberKind, ObjectRef};
use crate::value::Value;

/// Memoized member resolutions keyed by (type name, uppercased member).
/// Shared across requests; append-only, so entries are never invalidated
/// mid-request. Only positive resolutions are stored — objects may grow
/// members, but a resolved member never changes kind.
pub struct MemberCache {
    map: RwLock<HashMap<(String, String), MemberKind>>,
}

impl MemberCache {
    pub fn new() -> MemberCache {
        MemberCache { map: RwLock::new(HashMap::new()) }
    }

    pub fn lookup(&self, type_name: &str, member: &str) -> Option<MemberKind> {
        self.map.read().get(&(type_name.to_string(), member.to_string())).copied()
    }

    pub fn insert(&self, type_name: &str, member: &str, kind: MemberKind) {
        self.map.write().insert((type_name.to_string(), member.to_string()), kind);
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemberCache {
    fn default() -> Self {
        Self::new()
    }
}

static SHARED_CACHE: Lazy<Arc<MemberCache>> = Lazy::new(|| Arc::new(MemberCache::new()));

/// The process-wide cache instance used by `Engine::with_defaults`.
pub fn shared_member_cache() -> Arc<MemberCache> {
    SHARED_CACHE.clone()
}

impl Engine {
    /// Resolve a member chain and apply the bound arguments to the last hop.
    ///
    /// With no members the arguments apply to the target itself: array
    /// subscripts, an object's default member (an empty, bracket-present
    /// call still dispatches), or a plain scalar pass-through. ByRef slots
    /// observe callee mutations as the call returns.
    pub fn call(&self, target: Value, members: &[&str], slots: &[ArgSlot]) -> Result<Value> {
        debug!(members = ?members, argc = slots.len(), "call");
        if members.is_empty() {
            let mut argv = args::snapshot(slots)?;
            let out = self.apply_args(target, &mut argv)?;
            args::write_back(slots, &argv)?;
            return Ok(out);
        }
        let mut cur = target;
        for name in &members[..members.len() - 1] {
            cur = self.member_value(cur, name)?;
        }
        let last = members[members.len() - 1];
        let host = self.member_host(cur, last)?;
        let mut argv = args::snapshot(slots)?;
        let out = self.access_member(&host, last, &mut argv)?;
        args::write_back(slots, &argv)?;
        Ok(out)
    }

    /// Assign `value` through the last hop. The caller evaluates `value`
    /// before target resolution (right-to-left order, which matters when
    /// evaluating it can raise under resume-next).
    pub fn set(&self, value: Value, target: Value, member: Option<&str>, slots: &[ArgSlot]) -> Result<()> {
        debug!(member = ?member, argc = slots.len(), "set");
        let argv = args::snapshot(slots)?;
        match member {
            Some(name) => {
                let host = self.member_host(target, name)?;
                self.set_on_object(&host, name, &argv, value)
            }
            None => match target {
                Value::Array(arr) => {
                    let idx = args::element_indices(&argv)?;
                    arr.set(&idx, value)
                }
                Value::Object(obj) => {
                    let name = self.require_default(&obj)?;
                    self.set_on_object(&obj, &name, &argv, value)
                }
                Value::Nothing => Err(ScriptError::object_not_set()),
                _ => Err(ScriptError::cannot_assign()),
            },
        }
    }

    /// One attempt at reading a value's default member.
    pub fn resolve_default(&self, v: &Value) -> DefaultMemberResolution {
        let obj = match v {
            Value::Object(o) => o,
            _ => return DefaultMemberResolution::NotApplicable,
        };
        let name = match obj.borrow().default_member().map(|s| s.to_ascii_uppercase()) {
            Some(n) => n,
            None => return DefaultMemberResolution::NoDefaultMember,
        };
        match self.access_member(obj, &name, &mut []) {
            Ok(v) => DefaultMemberResolution::Retrieved(v),
            Err(e) => DefaultMemberResolution::EvaluationFailed(e),
        }
    }

    /// VAL's object branch: unwind default members until a scalar appears,
    /// bounded by the configured resolution depth.
    pub(crate) fn default_value_of(&self, obj: &ObjectRef) -> Result<Value> {
        let mut cur = Value::Object(obj.clone());
        for _ in 0..self.config.resolution_depth {
            match self.resolve_default(&cur) {
                DefaultMemberResolution::NotApplicable => return Ok(cur),
                DefaultMemberResolution::NoDefaultMember => return Err(ScriptError::object_required()),
                DefaultMemberResolution::Retrieved(v) => cur = v,
                DefaultMemberResolution::EvaluationFailed(e) => return Err(e),
            }
        }
        Err(ScriptError::type_mismatch())
    }

    pub(crate) fn member_kind_of(&self, obj: &ObjectRef, upper: &str) -> Option<MemberKind> {
        let type_name = obj.borrow().type_name().to_string();
        if let Some(kind) = self.cache.lookup(&type_name, upper) {
            trace!(type_name = %type_name, member = %upper, "member cache hit");
            return Some(kind);
        }
        let kind = obj.borrow().member_kind(upper);
        if let Some(k) = kind {
            self.cache.insert(&type_name, upper, k);
        }
        kind
    }

    /// Read or invoke a member on a resolved host object.
    pub(crate) fn access_member(&self, obj: &ObjectRef, name: &str, argv: &mut [Value]) -> Result<Value> {
        let upper = name.to_ascii_uppercase();
        match self.member_kind_of(obj, &upper) {
            Some(MemberKind::Property) => {
                let base = obj.borrow().get_member(&upper)?;
                if argv.is_empty() {
                    Ok(base)
                } else {
                    self.apply_args(base, argv)
                }
            }
            Some(MemberKind::Method) => obj.borrow_mut().invoke_member(&upper, argv),
            None => {
                let type_name = obj.borrow().type_name().to_string();
                Err(ScriptError::member_not_found(&type_name, name))
            }
        }
    }

    /// Apply a bracket-present argument list to a bare value.
    fn apply_args(&self, target: Value, argv: &mut [Value]) -> Result<Value> {
        match target {
            Value::Array(arr) => {
                if argv.is_empty() {
                    return Err(ScriptError::subscript_out_of_range());
                }
                let idx = args::element_indices(argv)?;
                arr.get(&idx)
            }
            Value::Object(obj) => {
                let name = self.require_default(&obj)?;
                self.access_member(&obj, &name, argv)
            }
            Value::Nothing => Err(ScriptError::object_not_set()),
            scalar => {
                if argv.is_empty() {
                    Ok(scalar)
                } else {
                    Err(ScriptError::type_mismatch())
                }
            }
        }
    }

    /// Read one intermediate hop of a member chain.
    fn member_value(&self, cur: Value, name: &str) -> Result<Value> {
        let host = self.member_host(cur, name)?;
        self.access_member(&host, name, &mut [])
    }

    /// Walk default members until an object exposing `name` appears.
    fn member_host(&self, cur: Value, name: &str) -> Result<ObjectRef> {
        let upper = name.to_ascii_uppercase();
        let mut cur = cur;
        for _ in 0..self.config.resolution_depth {
            match cur {
                Value::Object(obj) => {
                    if self.member_kind_of(&obj, &upper).is_some() {
                        return Ok(obj);
                    }
                    match self.resolve_default(&Value::Object(obj.clone())) {
                        DefaultMemberResolution::Retrieved(v) => cur = v,
                        DefaultMemberResolution::EvaluationFailed(e) => return Err(e),
                        _ => {
                            let type_name = obj.borrow().type_name().to_string();
                            return Err(ScriptError::member_not_found(&type_name, name));
                        }
                    }
                }
                Value::Nothing => return Err(ScriptError::object_not_set()),
                _ => return Err(ScriptError::object_required()),
            }
        }
        Err(ScriptError::type_mismatch())
    }

    fn require_default(&self, obj: &ObjectRef) -> Result<String> {
        let b = obj.borrow();
        match b.default_member() {
            Some(name) => Ok(name.to_ascii_uppercase()),
            None => Err(ScriptError::member_not_found(b.type_name(), "<default>")),
        }
    }

    fn set_on_object(&self, obj: &ObjectRef, name: &str, argv: &[Value], value: Value) -> Result<()> {
        let upper = name.to_ascii_uppercase();
        match self.member_kind_of(obj, &upper) {
            Some(MemberKind::Property) if !argv.is_empty() => {
                // A property holding an array assigns through the element.
                let base = obj.borrow().get_member(&upper)?;
                if let Value::Array(arr) = base {
                    let idx = args::element_indices(argv)?;
                    return arr.set(&idx, value);
                }
                obj.borrow_mut().set_member(&upper, argv, value)
            }
            Some(_) => obj.borrow_mut().set_member(&upper, argv, value),
            None => {
                let type_name = obj.borrow().type_name().to_string();
                Err(ScriptError::member_not_found(&type_name, name))
            }
        }
    }
}
