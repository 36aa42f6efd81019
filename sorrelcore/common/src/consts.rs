//! The constant table shared between emitted code and the runtime.
//!
//! These literal values are part of the wire contract: emitted code compares
//! against them directly, so they must match the source interpreter exactly.

// Booleans are integers in the value model.
pub const TRUE_INT: i16 = -1;
pub const FALSE_INT: i16 = 0;

// VarType codes.
pub const VB_EMPTY: i32 = 0;
pub const VB_NULL: i32 = 1;
pub const VB_INTEGER: i32 = 2;
pub const VB_LONG: i32 = 3;
pub const VB_SINGLE: i32 = 4;
pub const VB_DOUBLE: i32 = 5;
pub const VB_CURRENCY: i32 = 6;
pub const VB_DATE: i32 = 7;
pub const VB_STRING: i32 = 8;
pub const VB_OBJECT: i32 = 9;
pub const VB_ERROR: i32 = 10;
pub const VB_BOOLEAN: i32 = 11;
pub const VB_VARIANT: i32 = 12;
pub const VB_DATA_OBJECT: i32 = 13;
pub const VB_DECIMAL: i32 = 14;
pub const VB_BYTE: i32 = 17;
pub const VB_ARRAY: i32 = 8192;

// String comparison modes.
pub const VB_BINARY_COMPARE: i32 = 0;
pub const VB_TEXT_COMPARE: i32 = 1;
pub const VB_DATABASE_COMPARE: i32 = 2;

// Date display formats.
pub const VB_GENERAL_DATE: i32 = 0;
pub const VB_LONG_DATE: i32 = 1;
pub const VB_SHORT_DATE: i32 = 2;
pub const VB_LONG_TIME: i32 = 3;
pub const VB_SHORT_TIME: i32 = 4;

// First-day-of-week.
pub const VB_USE_SYSTEM_DAY_OF_WEEK: i32 = 0;
pub const VB_SUNDAY: i32 = 1;
pub const VB_MONDAY: i32 = 2;
pub const VB_TUESDAY: i32 = 3;
pub const VB_WEDNESDAY: i32 = 4;
pub const VB_THURSDAY: i32 = 5;
pub const VB_FRIDAY: i32 = 6;
pub const VB_SATURDAY: i32 = 7;

// First-week-of-year.
pub const VB_USE_SYSTEM: i32 = 0;
pub const VB_FIRST_JAN1: i32 = 1;
pub const VB_FIRST_FOUR_DAYS: i32 = 2;
pub const VB_FIRST_FULL_WEEK: i32 = 3;

/// Serial day of the earliest representable date, 100-01-01.
pub const MIN_DATE_SERIAL: f64 = -657_434.0;
/// Serial day of the latest representable date, 9999-12-31.
pub const MAX_DATE_SERIAL: f64 = 2_958_465.0;

/// Currency bounds (fixed-point, four decimal places).
pub const CURRENCY_MIN: f64 = -922_337_203_685_477.5808;
pub const CURRENCY_MAX: f64 = 922_337_203_685_477.5807;

// Runtime error numbers.
pub const ERR_INVALID_CALL: i32 = 5;
pub const ERR_OVERFLOW: i32 = 6;
pub const ERR_OUT_OF_MEMORY: i32 = 7;
pub const ERR_SUBSCRIPT_OUT_OF_RANGE: i32 = 9;
pub const ERR_DIVISION_BY_ZERO: i32 = 11;
pub const ERR_TYPE_MISMATCH: i32 = 13;
pub const ERR_OBJECT_NOT_SET: i32 = 91;
pub const ERR_OBJECT_REQUIRED: i32 = 424;
pub const ERR_CANNOT_CREATE: i32 = 429;
pub const ERR_NO_SUCH_MEMBER: i32 = 438;
pub const ERR_CANNOT_ASSIGN: i32 = 501;

/// Source label carried by every runtime-raised error.
pub const RUNTIME_SOURCE: &str = "Microsoft VBScript runtime error";
