//! Host-to-script conversion.
//!
//! [`IntoScriptValue`] covers the supported host kinds: primitives map
//! directly, options marshal their payload (absent maps to null), sequences
//! marshal element-wise in order, and structured types are JSON-encoded and
//! crossed as real objects. Kinds without an impl have no marshaling rule.
//!
//! [`ScriptReturn`] is the return-position view of the same rules plus the
//! return-arity count the registry enforces: `()` answers null, a single
//! value marshals, tuples count as multiple return values and are rejected
//! at bind time.

use crate::demarshal::FromScriptValue;
use crate::error::BridgeError;
use crate::value::ScriptValue;

/// A host value that can be handed to the script engine.
pub trait IntoScriptValue {
    fn into_script(self) -> Result<ScriptValue, BridgeError>;
}

impl IntoScriptValue for bool {
    fn into_script(self) -> Result<ScriptValue, BridgeError> {
        Ok(ScriptValue::Bool(self))
    }
}

impl IntoScriptValue for f64 {
    fn into_script(self) -> Result<ScriptValue, BridgeError> {
        Ok(ScriptValue::Number(self))
    }
}

impl IntoScriptValue for String {
    fn into_script(self) -> Result<ScriptValue, BridgeError> {
        Ok(ScriptValue::String(self))
    }
}

impl IntoScriptValue for &str {
    fn into_script(self) -> Result<ScriptValue, BridgeError> {
        Ok(ScriptValue::String(self.to_string()))
    }
}

/// Options marshal their pointed-to value; an absent value maps to null.
impl<T: IntoScriptValue> IntoScriptValue for Option<T> {
    fn into_script(self) -> Result<ScriptValue, BridgeError> {
        match self {
            Some(inner) => inner.into_script(),
            None => Ok(ScriptValue::Null),
        }
    }
}

impl<T: IntoScriptValue> IntoScriptValue for Vec<T> {
    fn into_script(self) -> Result<ScriptValue, BridgeError> {
        let items = self
            .into_iter()
            .map(IntoScriptValue::into_script)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ScriptValue::Array(items))
    }
}

impl IntoScriptValue for ScriptValue {
    fn into_script(self) -> Result<ScriptValue, BridgeError> {
        Ok(self)
    }
}

/// The return side of a bound callable.
///
/// `COUNT` is checked once at register time; a callable declaring more than
/// one return value is a configuration error, not a call-time condition.
pub trait ScriptReturn {
    /// How many values this return position declares.
    const COUNT: usize;

    fn into_return(self) -> Result<ScriptValue, BridgeError>;
}

/// No declared return; the call answers null.
impl ScriptReturn for () {
    const COUNT: usize = 0;

    fn into_return(self) -> Result<ScriptValue, BridgeError> {
        Ok(ScriptValue::Null)
    }
}

macro_rules! impl_single_return {
    ($($ty:ty),+ $(,)?) => {$(
        impl ScriptReturn for $ty {
            const COUNT: usize = 1;

            fn into_return(self) -> Result<ScriptValue, BridgeError> {
                self.into_script()
            }
        }
    )+};
}

impl_single_return!(bool, f64, String, &str, ScriptValue);

impl<T: IntoScriptValue> ScriptReturn for Vec<T> {
    const COUNT: usize = 1;

    fn into_return(self) -> Result<ScriptValue, BridgeError> {
        self.into_script()
    }
}

impl<T: IntoScriptValue> ScriptReturn for Option<T> {
    const COUNT: usize = 1;

    fn into_return(self) -> Result<ScriptValue, BridgeError> {
        self.into_script()
    }
}

macro_rules! impl_multi_return {
    ($count:expr, $($ty:ident),+) => {
        impl<$($ty: IntoScriptValue),+> ScriptReturn for ($($ty,)+) {
            const COUNT: usize = $count;

            fn into_return(self) -> Result<ScriptValue, BridgeError> {
                // The registry refuses these bindings; reaching this means
                // the binding bypassed registration.
                Err(BridgeError::UnsupportedKind("multiple return values"))
            }
        }
    };
}

impl_multi_return!(2, R0, R1);
impl_multi_return!(3, R0, R1, R2);
impl_multi_return!(4, R0, R1, R2, R3);

/// Opt a serde round-trippable host type into the bridge as a structured
/// value. Generates the marshal, demarshal, and return-position impls; the
/// type needs `Serialize`, `Deserialize` and `Default` (null/undefined
/// demarshal to the default value, like every other target kind).
///
/// ```ignore
/// #[derive(Serialize, Deserialize, Default)]
/// struct Point { x: f64, y: f64 }
/// prism::structured!(Point);
/// ```
#[macro_export]
macro_rules! structured {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::IntoScriptValue for $ty {
            fn into_script(self) -> Result<$crate::ScriptValue, $crate::BridgeError> {
                match $crate::serde_json::to_value(&self) {
                    Ok(json) => Ok($crate::ScriptValue::Object(json)),
                    Err(e) => {
                        // Encode failures degrade to null instead of
                        // aborting the call.
                        $crate::log::error!(
                            "failed to encode structured value of type {}: {}",
                            core::any::type_name::<$ty>(),
                            e
                        );
                        Ok($crate::ScriptValue::Null)
                    }
                }
            }
        }

        impl $crate::FromScriptValue for $ty {
            fn descriptor() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::Structured
            }

            fn from_script(value: $crate::ScriptValue) -> Result<Self, $crate::BridgeError> {
                match value {
                    $crate::ScriptValue::Object(json) => {
                        $crate::serde_json::from_value(json)
                            .map_err($crate::BridgeError::StructuredDecode)
                    }
                    v if v.is_missing() => Ok(<$ty as Default>::default()),
                    other => Err($crate::BridgeError::TypeMismatch {
                        expected: $crate::TypeDescriptor::Structured,
                        found: other.kind(),
                    }),
                }
            }
        }

        impl $crate::ScriptReturn for $ty {
            const COUNT: usize = 1;

            fn into_return(self) -> Result<$crate::ScriptValue, $crate::BridgeError> {
                $crate::IntoScriptValue::into_script(self)
            }
        }
    )+};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TypeDescriptor;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    struct Widget {
        label: String,
        size: f64,
        visible: bool,
    }

    crate::structured!(Widget);

    #[test]
    fn primitives_marshal_directly() {
        assert_eq!(true.into_script().unwrap(), ScriptValue::Bool(true));
        assert_eq!(2.5.into_script().unwrap(), ScriptValue::Number(2.5));
        assert_eq!(
            "hey".into_script().unwrap(),
            ScriptValue::String("hey".into())
        );
    }

    #[test]
    fn option_maps_absent_to_null() {
        assert_eq!(Some(1.0).into_script().unwrap(), ScriptValue::Number(1.0));
        assert_eq!(None::<f64>.into_script().unwrap(), ScriptValue::Null);
    }

    #[test]
    fn sequences_preserve_order() {
        let value = vec!["a".to_string(), "b".to_string()].into_script().unwrap();
        assert_eq!(
            value,
            ScriptValue::Array(vec![
                ScriptValue::String("a".into()),
                ScriptValue::String("b".into()),
            ])
        );
    }

    #[test]
    fn structured_round_trips() {
        let widget = Widget {
            label: "ok".into(),
            size: 4.0,
            visible: true,
        };
        let value = widget.clone().into_script().unwrap();
        assert!(matches!(value, ScriptValue::Object(_)));

        let back = Widget::from_script(value).unwrap();
        assert_eq!(back, widget);
    }

    #[test]
    fn structured_descriptor_and_defaulting() {
        assert_eq!(Widget::descriptor(), TypeDescriptor::Structured);
        assert_eq!(Widget::from_script(ScriptValue::Null).unwrap(), Widget::default());
    }

    #[test]
    fn structured_decode_failure_is_reported() {
        let json = serde_json::json!({"label": 3, "size": "wat", "visible": 1});
        let err = Widget::from_script(ScriptValue::Object(json)).unwrap_err();
        assert!(matches!(err, BridgeError::StructuredDecode(_)));
    }

    #[test]
    fn no_return_answers_null() {
        assert_eq!(<() as ScriptReturn>::COUNT, 0);
        assert_eq!(().into_return().unwrap(), ScriptValue::Null);
    }

    #[test]
    fn tuple_returns_count_as_multiple() {
        assert_eq!(<(f64, f64) as ScriptReturn>::COUNT, 2);
        assert!(matches!(
            (1.0, 2.0).into_return().unwrap_err(),
            BridgeError::UnsupportedKind(_)
        ));
    }
}
