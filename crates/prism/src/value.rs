//! The tagged script-domain value and the host-side type descriptors.
//!
//! Script values are a closed set: boolean, number (always f64 — the script
//! domain has no integer type), string, array, object, null and undefined.
//! Objects are carried as opaque JSON; they only regain native shape on
//! whichever side consumes them. A `ScriptValue` is scoped to the call or
//! evaluation that produced it and must not be retained past it.

use std::fmt;

/// A value as seen by the script engine.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<ScriptValue>),
    /// Composite value, carried across the boundary as JSON.
    Object(serde_json::Value),
    Null,
    Undefined,
}

impl ScriptValue {
    /// Short kind name, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ScriptValue::Bool(_) => "boolean",
            ScriptValue::Number(_) => "number",
            ScriptValue::String(_) => "string",
            ScriptValue::Array(_) => "array",
            ScriptValue::Object(_) => "object",
            ScriptValue::Null => "null",
            ScriptValue::Undefined => "undefined",
        }
    }

    /// True for the two "missing" kinds that demarshal to a zero value.
    pub fn is_missing(&self) -> bool {
        matches!(self, ScriptValue::Null | ScriptValue::Undefined)
    }
}

impl From<bool> for ScriptValue {
    fn from(v: bool) -> Self {
        ScriptValue::Bool(v)
    }
}

impl From<f64> for ScriptValue {
    fn from(v: f64) -> Self {
        ScriptValue::Number(v)
    }
}

impl From<&str> for ScriptValue {
    fn from(v: &str) -> Self {
        ScriptValue::String(v.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(v: String) -> Self {
        ScriptValue::String(v)
    }
}

/// Host-side description of an expected value shape.
///
/// Built once per binding from the callable's parameter types and immutable
/// afterwards; dispatch never inspects types at call time.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Bool,
    Number,
    String,
    Sequence(Box<TypeDescriptor>),
    /// Any host type that round-trips through JSON.
    Structured,
    /// Caller does not care; the raw tagged value is handed over.
    Untyped,
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Bool => write!(f, "boolean"),
            TypeDescriptor::Number => write!(f, "number"),
            TypeDescriptor::String => write!(f, "string"),
            TypeDescriptor::Sequence(elem) => write!(f, "sequence of {}", elem),
            TypeDescriptor::Structured => write!(f, "structured object"),
            TypeDescriptor::Untyped => write!(f, "untyped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names() {
        assert_eq!(ScriptValue::Bool(true).kind(), "boolean");
        assert_eq!(ScriptValue::Number(1.0).kind(), "number");
        assert_eq!(ScriptValue::Array(vec![]).kind(), "array");
        assert_eq!(ScriptValue::Undefined.kind(), "undefined");
    }

    #[test]
    fn missing_kinds() {
        assert!(ScriptValue::Null.is_missing());
        assert!(ScriptValue::Undefined.is_missing());
        assert!(!ScriptValue::Number(0.0).is_missing());
    }

    #[test]
    fn descriptor_display() {
        let d = TypeDescriptor::Sequence(Box::new(TypeDescriptor::Number));
        assert_eq!(d.to_string(), "sequence of number");
    }
}
