//! Error type and fixed constants shared by every Sorrel crate.
//!
//! Translated scripts test error numbers, so `ScriptError` carries the
//! VBScript error number, source label and description rather than a bare
//! message string.

pub mod consts;

use consts::*;

#[derive(Debug, Clone)]
pub struct ScriptError {
    pub number: i32,
    pub source: String,
    pub description: String,
    pub cause: Option<String>,
}

impl ScriptError {
    pub fn new(number: i32, source: impl Into<String>, description: impl Into<String>) -> Self {
        ScriptError { number, source: source.into(), description: description.into(), cause: None }
    }

    /// Standard runtime error for a known number; unknown numbers get the
    /// generic description (Err.Raise allows any number).
    pub fn from_number(number: i32) -> Self {
        ScriptError::new(number, RUNTIME_SOURCE, standard_description(number))
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn custom(number: i32, source: impl Into<String>, description: impl Into<String>) -> Self {
        ScriptError::new(number, source, description)
    }

    pub fn invalid_call() -> Self { Self::from_number(ERR_INVALID_CALL) }
    pub fn overflow() -> Self { Self::from_number(ERR_OVERFLOW) }
    pub fn subscript_out_of_range() -> Self { Self::from_number(ERR_SUBSCRIPT_OUT_OF_RANGE) }
    pub fn division_by_zero() -> Self { Self::from_number(ERR_DIVISION_BY_ZERO) }
    pub fn type_mismatch() -> Self { Self::from_number(ERR_TYPE_MISMATCH) }
    pub fn object_not_set() -> Self { Self::from_number(ERR_OBJECT_NOT_SET) }
    pub fn object_required() -> Self { Self::from_number(ERR_OBJECT_REQUIRED) }
    pub fn cannot_assign() -> Self { Self::from_number(ERR_CANNOT_ASSIGN) }
    pub fn cannot_create(prog_id: &str) -> Self {
        Self::from_number(ERR_CANNOT_CREATE).with_cause(prog_id.to_string())
    }

    pub fn member_not_found(type_name: &str, member: &str) -> Self {
        Self::from_number(ERR_NO_SUCH_MEMBER)
            .with_cause(format!("{}.{}", type_name, member))
    }
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.source, self.number, self.description)
    }
}

impl std::error::Error for ScriptError {}

pub type Result<T> = std::result::Result<T, ScriptError>;

pub fn standard_description(number: i32) -> &'static str {
    match number {
        ERR_INVALID_CALL => "Invalid procedure call or argument",
        ERR_OVERFLOW => "Overflow",
        ERR_OUT_OF_MEMORY => "Out of memory",
        ERR_SUBSCRIPT_OUT_OF_RANGE => "Subscript out of range",
        ERR_DIVISION_BY_ZERO => "Division by zero",
        ERR_TYPE_MISMATCH => "Type mismatch",
        ERR_OBJECT_NOT_SET => "Object variable not set",
        ERR_OBJECT_REQUIRED => "Object required",
        ERR_CANNOT_CREATE => "ActiveX component can't create object",
        ERR_NO_SUCH_MEMBER => "Object doesn't support this property or method",
        ERR_CANNOT_ASSIGN => "Illegal assignment",
        _ => "Unknown runtime error",
    }
}
