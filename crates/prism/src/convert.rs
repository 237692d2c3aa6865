//! Conversion between V8 values and the tagged [`ScriptValue`] model.
//!
//! Primitives map directly. Arrays convert element-wise in both directions.
//! Everything else object-shaped crosses the boundary as JSON: incoming
//! objects are stringified and reparsed into `serde_json::Value`, outgoing
//! objects are serialized and handed to the engine's JSON parser so script
//! sees a real object, never a JSON string.

use deno_core::v8;

use crate::value::ScriptValue;

/// Read a V8 value into the tagged model.
pub fn from_v8(scope: &mut v8::HandleScope<'_>, value: v8::Local<v8::Value>) -> ScriptValue {
    if value.is_undefined() {
        return ScriptValue::Undefined;
    }

    if value.is_null() {
        return ScriptValue::Null;
    }

    if value.is_boolean() {
        return ScriptValue::Bool(value.is_true());
    }

    if value.is_number() {
        return ScriptValue::Number(value.number_value(scope).unwrap_or(f64::NAN));
    }

    if value.is_string() {
        return ScriptValue::String(value.to_rust_string_lossy(scope));
    }

    if value.is_array() {
        let array = v8::Local::<v8::Array>::try_from(value).expect("checked is_array");
        let length = array.length();
        let mut items = Vec::with_capacity(length as usize);
        for i in 0..length {
            let element = array
                .get_index(scope, i)
                .unwrap_or_else(|| v8::undefined(scope).into());
            items.push(from_v8(scope, element));
        }
        return ScriptValue::Array(items);
    }

    // Objects (and anything else, e.g. functions) go through JSON. Values
    // JSON cannot express come back as null.
    match v8::json::stringify(scope, value) {
        Some(text) => {
            let text = text.to_rust_string_lossy(scope);
            match serde_json::from_str(&text) {
                Ok(json) => ScriptValue::Object(json),
                Err(e) => {
                    log::debug!("object did not survive the JSON round trip: {}", e);
                    ScriptValue::Null
                }
            }
        }
        None => ScriptValue::Null,
    }
}

/// Materialize a tagged value inside the engine.
pub fn to_v8<'s>(
    scope: &mut v8::HandleScope<'s>,
    value: &ScriptValue,
) -> v8::Local<'s, v8::Value> {
    match value {
        ScriptValue::Bool(b) => v8::Boolean::new(scope, *b).into(),
        ScriptValue::Number(n) => v8::Number::new(scope, *n).into(),
        ScriptValue::String(s) => match v8::String::new(scope, s) {
            Some(v8_str) => v8_str.into(),
            None => v8::String::empty(scope).into(),
        },
        ScriptValue::Array(items) => {
            let array = v8::Array::new(scope, items.len() as i32);
            for (i, item) in items.iter().enumerate() {
                let element = to_v8(scope, item);
                array.set_index(scope, i as u32, element);
            }
            array.into()
        }
        ScriptValue::Object(json) => json_to_v8(scope, json),
        ScriptValue::Null => v8::null(scope).into(),
        ScriptValue::Undefined => v8::undefined(scope).into(),
    }
}

/// Hand a JSON blob to the engine's own parser so it becomes a native
/// object. An unparseable blob degrades to null with a logged error rather
/// than failing the call.
fn json_to_v8<'s>(
    scope: &mut v8::HandleScope<'s>,
    json: &serde_json::Value,
) -> v8::Local<'s, v8::Value> {
    let text = match serde_json::to_string(json) {
        Ok(t) => t,
        Err(e) => {
            log::error!("failed to serialize structured value: {}", e);
            return v8::null(scope).into();
        }
    };

    let v8_text = match v8::String::new(scope, &text) {
        Some(s) => s,
        None => {
            log::error!("structured value too large for the engine");
            return v8::null(scope).into();
        }
    };

    match v8::json::parse(scope, v8_text) {
        Some(parsed) => parsed,
        None => {
            log::error!("engine rejected structured JSON payload");
            v8::null(scope).into()
        }
    }
}
