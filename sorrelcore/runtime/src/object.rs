//! The capability protocol every host object speaks.
//!
//! The engine never reflects over concrete types; everything it can do with
//! an object — read a member, assign one, invoke one, enumerate — goes
//! through this trait. Member names are matched case-insensitively; the
//! engine always passes them pre-uppercased.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use sorrel_common::{Result, ScriptError};

use crate::value::Value;

pub type ObjectRef = Rc<RefCell<dyn ScriptObject>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Property,
    Method,
}

pub trait ScriptObject {
    fn type_name(&self) -> &str;

    /// Probe for a member without touching it. `name` is uppercased.
    fn member_kind(&self, name: &str) -> Option<MemberKind>;

    fn get_member(&self, name: &str) -> Result<Value>;

    /// Assignment. `args` is empty for a plain property put and carries the
    /// parameter list for a parameterized put (`obj.Item(key) = v`).
    fn set_member(&mut self, name: &str, args: &[Value], value: Value) -> Result<()>;

    /// Invocation. The callee may mutate `args` in place; the dispatch layer
    /// pushes mutated slots back through ByRef bindings after the call.
    fn invoke_member(&mut self, name: &str, args: &mut [Value]) -> Result<Value>;

    /// The member this object falls back to when it is used as a value or
    /// called without a member name.
    fn default_member(&self) -> Option<&str> {
        None
    }

    /// For-Each support. Objects without an enumerator refuse, like the
    /// source interpreter does.
    fn enumerate(&self) -> Result<Vec<Value>> {
        Err(ScriptError::member_not_found(self.type_name(), "_NewEnum"))
    }
}

impl fmt::Debug for dyn ScriptObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} object>", self.type_name())
    }
}

pub fn object_ref<T: ScriptObject + 'static>(obj: T) -> ObjectRef {
    Rc::new(RefCell::new(obj))
}

/// Outcome of treating a value as its default member.
#[derive(Debug)]
pub enum DefaultMemberResolution {
    /// The value was not an object handle in the first place.
    NotApplicable,
    NoDefaultMember,
    Retrieved(Value),
    EvaluationFailed(ScriptError),
}
