//! Script-to-host conversion.
//!
//! Each supported host kind carries its own conversion rule via
//! [`FromScriptValue`]; there is no run-time type inspection. The rules:
//! primitives convert only from the matching script kind, arrays convert
//! element-wise into sequences, objects decode through JSON into structured
//! types, and the two "missing" kinds (null/undefined) always succeed by
//! producing the target's zero value.

use crate::error::BridgeError;
use crate::value::{ScriptValue, TypeDescriptor};

/// A host type a script value can be demarshaled into.
pub trait FromScriptValue: Sized {
    /// The shape this type expects, recorded in the binding at register time.
    fn descriptor() -> TypeDescriptor;

    /// Convert a script value into this type, or fail with a per-call error.
    fn from_script(value: ScriptValue) -> Result<Self, BridgeError>;
}

fn mismatch<T>(expected: TypeDescriptor, value: &ScriptValue) -> Result<T, BridgeError> {
    Err(BridgeError::TypeMismatch {
        expected,
        found: value.kind(),
    })
}

impl FromScriptValue for bool {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Bool
    }

    fn from_script(value: ScriptValue) -> Result<Self, BridgeError> {
        match value {
            ScriptValue::Bool(b) => Ok(b),
            v if v.is_missing() => Ok(false),
            other => mismatch(TypeDescriptor::Bool, &other),
        }
    }
}

impl FromScriptValue for f64 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Number
    }

    fn from_script(value: ScriptValue) -> Result<Self, BridgeError> {
        match value {
            ScriptValue::Number(n) => Ok(n),
            v if v.is_missing() => Ok(0.0),
            other => mismatch(TypeDescriptor::Number, &other),
        }
    }
}

impl FromScriptValue for String {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::String
    }

    fn from_script(value: ScriptValue) -> Result<Self, BridgeError> {
        match value {
            ScriptValue::String(s) => Ok(s),
            v if v.is_missing() => Ok(String::new()),
            other => mismatch(TypeDescriptor::String, &other),
        }
    }
}

impl<T: FromScriptValue> FromScriptValue for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Sequence(Box::new(T::descriptor()))
    }

    fn from_script(value: ScriptValue) -> Result<Self, BridgeError> {
        match value {
            ScriptValue::Array(items) => {
                items.into_iter().map(T::from_script).collect()
            }
            v if v.is_missing() => Ok(Vec::new()),
            other => mismatch(Self::descriptor(), &other),
        }
    }
}

/// Untyped path: the caller does not care about the shape and receives the
/// raw tagged value unchanged.
impl FromScriptValue for ScriptValue {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Untyped
    }

    fn from_script(value: ScriptValue) -> Result<Self, BridgeError> {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_convert_directly() {
        assert!(bool::from_script(ScriptValue::Bool(true)).unwrap());
        assert_eq!(f64::from_script(ScriptValue::Number(4.5)).unwrap(), 4.5);
        assert_eq!(
            String::from_script(ScriptValue::String("hi".into())).unwrap(),
            "hi"
        );
    }

    #[test]
    fn kind_mismatch_fails() {
        let err = String::from_script(ScriptValue::Number(1.0)).unwrap_err();
        assert!(matches!(err, BridgeError::TypeMismatch { .. }));
        assert_eq!(
            err.to_string(),
            "type mismatch: expected string, got number"
        );
    }

    #[test]
    fn missing_defaults_to_zero_value() {
        assert!(!bool::from_script(ScriptValue::Null).unwrap());
        assert_eq!(f64::from_script(ScriptValue::Undefined).unwrap(), 0.0);
        assert_eq!(String::from_script(ScriptValue::Null).unwrap(), "");
        assert!(Vec::<f64>::from_script(ScriptValue::Undefined)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn arrays_demarshal_recursively() {
        let value = ScriptValue::Array(vec![
            ScriptValue::Array(vec![ScriptValue::Number(1.0)]),
            ScriptValue::Array(vec![ScriptValue::Number(2.0), ScriptValue::Number(3.0)]),
        ]);
        let nested: Vec<Vec<f64>> = Vec::from_script(value).unwrap();
        assert_eq!(nested, vec![vec![1.0], vec![2.0, 3.0]]);
    }

    #[test]
    fn array_into_non_sequence_fails() {
        let err = f64::from_script(ScriptValue::Array(vec![])).unwrap_err();
        assert!(matches!(err, BridgeError::TypeMismatch { .. }));
    }

    #[test]
    fn element_mismatch_propagates() {
        let value = ScriptValue::Array(vec![
            ScriptValue::Number(1.0),
            ScriptValue::String("not a number".into()),
        ]);
        assert!(Vec::<f64>::from_script(value).is_err());
    }

    #[test]
    fn untyped_is_identity() {
        let value = ScriptValue::Object(serde_json::json!({"k": 1}));
        assert_eq!(ScriptValue::from_script(value.clone()).unwrap(), value);
    }
}
