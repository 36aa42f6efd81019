//! Resume-next error trapping, reproduced without leaning on unwinding.
//!
//! A trap token is allocated per structurally-nested scope that may contain
//! a resume-next marker. `handle_error` wraps each trappable statement; when
//! the token is enabled a failure is captured into the engine's ErrorState
//! and execution continues at the next statement, otherwise the token is
//! released and the failure propagates, terminating the scope.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace};

use sorrel_common::{Result, ScriptError};

use crate::coerce;
use crate::engine::Engine;
use crate::object::{MemberKind, ObjectRef, ScriptObject};
use crate::value::Value;

/// The current error, shared with the Err intrinsic. `number == 0` means
/// no error; all four fields are independently meaningful.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ErrorState {
    pub number: i32,
    pub source: String,
    pub description: String,
    pub cause: Option<String>,
}

impl ErrorState {
    pub fn is_clear(&self) -> bool {
        self.number == 0
    }

    pub fn capture(err: &ScriptError) -> ErrorState {
        ErrorState {
            number: err.number,
            source: err.source.clone(),
            description: err.description.clone(),
            cause: err.cause.clone(),
        }
    }

    pub fn clear(&mut self) {
        *self = ErrorState::default();
    }
}

/// Opaque per-scope trapping handle. Allocated at scope entry, toggled any
/// number of times, released on every exit path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErrorTrapToken {
    pub(crate) id: usize,
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct TrapSlot {
    enabled: bool,
    released: bool,
}

impl Engine {
    pub fn get_error_trapping_token(&self) -> ErrorTrapToken {
        let mut traps = self.traps.borrow_mut();
        traps.push(TrapSlot::default());
        let id = traps.len() - 1;
        trace!(id, "trap token allocated");
        ErrorTrapToken { id }
    }

    /// Idempotent; releasing one token never affects ancestors.
    pub fn release_error_trapping_token(&self, token: ErrorTrapToken) {
        if let Some(slot) = self.traps.borrow_mut().get_mut(token.id) {
            slot.enabled = false;
            slot.released = true;
            trace!(id = token.id, "trap token released");
        }
    }

    pub fn start_error_trapping(&self, token: ErrorTrapToken) {
        self.set_trap(token, true);
    }

    /// On Error Resume Next also clears the current error.
    pub fn start_error_trapping_with_clear(&self, token: ErrorTrapToken) {
        self.set_trap(token, true);
        self.clear_any_error();
    }

    pub fn stop_error_trapping(&self, token: ErrorTrapToken) {
        self.set_trap(token, false);
    }

    /// On Error Goto 0 also clears the current error.
    pub fn stop_error_trapping_with_clear(&self, token: ErrorTrapToken) {
        self.set_trap(token, false);
        self.clear_any_error();
    }

    fn set_trap(&self, token: ErrorTrapToken, enabled: bool) {
        if let Some(slot) = self.traps.borrow_mut().get_mut(token.id) {
            if !slot.released {
                slot.enabled = enabled;
                trace!(id = token.id, enabled, "trap state changed");
            }
        }
    }

    fn trap_enabled(&self, token: ErrorTrapToken) -> bool {
        self.traps
            .borrow()
            .get(token.id)
            .map_or(false, |slot| slot.enabled && !slot.released)
    }

    /// Run one trappable statement. Enabled trapping captures a failure into
    /// ErrorState and yields `None`; disabled trapping releases the token
    /// and lets the failure propagate.
    pub fn handle_error<T>(
        &self,
        token: ErrorTrapToken,
        action: impl FnOnce() -> Result<T>,
    ) -> Result<Option<T>> {
        match action() {
            Ok(v) => Ok(Some(v)),
            Err(e) if self.trap_enabled(token) => {
                debug!(number = e.number, "error trapped, resuming");
                *self.error.borrow_mut() = ErrorState::capture(&e);
                Ok(None)
            }
            Err(e) => {
                self.release_error_trapping_token(token);
                Err(e)
            }
        }
    }

    /// Error-aware condition. A failing evaluator under enabled trapping
    /// records the error and counts as satisfied — the interpreter treats a
    /// failed condition under resume-next as true, not false.
    pub fn if_cond(
        &self,
        evaluator: impl FnOnce() -> Result<bool>,
        token: ErrorTrapToken,
    ) -> Result<bool> {
        match evaluator() {
            Ok(b) => Ok(b),
            Err(e) if self.trap_enabled(token) => {
                debug!(number = e.number, "condition failed under trapping, treated as true");
                *self.error.borrow_mut() = ErrorState::capture(&e);
                Ok(true)
            }
            Err(e) => {
                self.release_error_trapping_token(token);
                Err(e)
            }
        }
    }

    /// Err.Raise. Number 0 is not raisable.
    pub fn raise_error(
        &self,
        number: i32,
        source: Option<&str>,
        description: Option<&str>,
    ) -> Result<()> {
        if number == 0 {
            return Err(ScriptError::invalid_call());
        }
        let mut err = ScriptError::from_number(number);
        if let Some(s) = source {
            err.source = s.to_string();
        }
        if let Some(d) = description {
            if !d.is_empty() {
                err.description = d.to_string();
            }
        }
        debug!(number, "raise");
        Err(err)
    }

    /// Record a failure into ErrorState without raising.
    pub fn set_error(&self, err: &ScriptError) {
        *self.error.borrow_mut() = ErrorState::capture(err);
    }

    pub fn clear_any_error(&self) {
        self.error.borrow_mut().clear();
    }

    pub fn error_state(&self) -> ErrorState {
        self.error.borrow().clone()
    }

    /// The cheap default-member-style read.
    pub fn err_number(&self) -> i32 {
        self.error.borrow().number
    }

    /// The Err intrinsic: a script object sharing this engine's ErrorState,
    /// default member Number (so `If Err <> 0` reads through VAL).
    pub fn err_object(&self) -> ObjectRef {
        Rc::new(RefCell::new(ErrObject { state: self.error.clone() }))
    }
}

struct ErrObject {
    state: Rc<RefCell<ErrorState>>,
}

impl ErrObject {
    fn raise_from_args(&self, args: &[Value]) -> ScriptError {
        let number = match args.first() {
            Some(Value::Int(i)) => *i as i32,
            Some(Value::Long(i)) => *i,
            Some(Value::Num(n)) => coerce::to_long(*n).unwrap_or(0),
            _ => 0,
        };
        if number == 0 {
            return ScriptError::invalid_call();
        }
        let mut err = ScriptError::from_number(number);
        if let Some(Value::Str(s)) = args.get(1) {
            err.source = s.clone();
        }
        if let Some(Value::Str(d)) = args.get(2) {
            err.description = d.clone();
        }
        err
    }
}

impl ScriptObject for ErrObject {
    fn type_name(&self) -> &str {
        "ErrObject"
    }

    fn member_kind(&self, name: &str) -> Option<MemberKind> {
        match name {
            "NUMBER" | "SOURCE" | "DESCRIPTION" => Some(MemberKind::Property),
            "RAISE" | "CLEAR" => Some(MemberKind::Method),
            _ => None,
        }
    }

    fn get_member(&self, name: &str) -> Result<Value> {
        let state = self.state.borrow();
        match name {
            "NUMBER" => Ok(Value::Long(state.number)),
            "SOURCE" => Ok(Value::Str(state.source.clone())),
            "DESCRIPTION" => Ok(Value::Str(state.description.clone())),
            other => Err(ScriptError::member_not_found("ErrObject", other)),
        }
    }

    fn set_member(&mut self, name: &str, args: &[Value], value: Value) -> Result<()> {
        if !args.is_empty() {
            return Err(ScriptError::cannot_assign());
        }
        let mut state = self.state.borrow_mut();
        match name {
            "NUMBER" => {
                state.number = match value {
                    Value::Int(i) => i as i32,
                    Value::Long(i) => i,
                    Value::Num(n) => coerce::to_long(n)?,
                    _ => return Err(ScriptError::type_mismatch()),
                };
                Ok(())
            }
            "SOURCE" => {
                state.source = match value {
                    Value::Str(s) => s,
                    other => other.to_string(),
                };
                Ok(())
            }
            "DESCRIPTION" => {
                state.description = match value {
                    Value::Str(s) => s,
                    other => other.to_string(),
                };
                Ok(())
            }
            other => Err(ScriptError::member_not_found("ErrObject", other)),
        }
    }

    fn invoke_member(&mut self, name: &str, args: &mut [Value]) -> Result<Value> {
        match name {
            "NUMBER" if args.is_empty() => self.get_member("NUMBER"),
            "CLEAR" => {
                self.state.borrow_mut().clear();
                Ok(Value::Empty)
            }
            "RAISE" => Err(self.raise_from_args(args)),
            other => Err(ScriptError::member_not_found("ErrObject", other)),
        }
    }

    fn default_member(&self) -> Option<&str> {
        Some("Number")
    }
}
