//! The script-to-host call path.
//!
//! Every bound name is exposed to script as a function whose V8 data slot
//! carries a single integer dispatch id. One trampoline serves all bindings:
//! it recovers the id, resolves the live binding from a thread-local table,
//! converts the positional arguments, and runs the type-erased handler.
//!
//! The table is keyed by id rather than by pointer so the engine never holds
//! a reinterpreted host pointer; a stale id (its binding was replaced or its
//! session dropped) simply resolves to nothing.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use deno_core::v8;

use crate::convert;
use crate::error::BridgeError;
use crate::registry::Binding;
use crate::value::ScriptValue;

thread_local! {
    /// Live bindings reachable from script, keyed by dispatch id.
    static DISPATCH_TABLE: RefCell<HashMap<u64, Rc<Binding>>> = RefCell::new(HashMap::new());
    /// Next dispatch id (0 is never issued).
    static NEXT_DISPATCH_ID: Cell<u64> = const { Cell::new(1) };
}

/// Install a binding and return the id to plant in the function's data slot.
pub(crate) fn install(binding: Rc<Binding>) -> u64 {
    let id = NEXT_DISPATCH_ID.with(|next| {
        let current = next.get();
        next.set(current + 1);
        current
    });
    DISPATCH_TABLE.with(|table| {
        table.borrow_mut().insert(id, binding);
    });
    id
}

/// Drop a binding from the table. Script globals still pointing at the id
/// hit the not-found path from then on.
pub(crate) fn uninstall(id: u64) -> bool {
    DISPATCH_TABLE.with(|table| table.borrow_mut().remove(&id).is_some())
}

/// Resolve and run a binding outside of any engine state.
pub(crate) fn dispatch(id: u64, args: Vec<ScriptValue>) -> Result<ScriptValue, BridgeError> {
    let binding = DISPATCH_TABLE
        .with(|table| table.borrow().get(&id).cloned())
        .ok_or_else(|| BridgeError::NameNotFound(format!("dispatch id {id}")))?;
    binding.invoke(args)
}

/// The single entry point the engine calls for every bound function.
pub(crate) fn trampoline(
    scope: &mut v8::HandleScope,
    args: v8::FunctionCallbackArguments,
    mut retval: v8::ReturnValue,
) {
    let id = args
        .data()
        .number_value(scope)
        .map(|n| n as u64)
        .unwrap_or(0);

    let arg_count = args.length();
    let mut script_args = Vec::with_capacity(arg_count as usize);
    for i in 0..arg_count {
        script_args.push(convert::from_v8(scope, args.get(i)));
    }

    match dispatch(id, script_args) {
        Ok(result) => {
            let v8_result = convert::to_v8(scope, &result);
            retval.set(v8_result);
        }
        Err(BridgeError::NameNotFound(name)) => {
            // A call to a name with no live binding answers null rather than
            // raising into script.
            log::debug!("script called unbound function ({name})");
            retval.set(v8::null(scope).into());
        }
        Err(e) => {
            // Per-call failures surface as a script-visible exception; the
            // session stays healthy.
            log::error!("dispatch failed: {e}");
            let message = v8::String::new(scope, &e.to_string())
                .unwrap_or_else(|| v8::String::empty(scope));
            let exception = v8::Exception::type_error(scope, message);
            scope.throw_exception(exception);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    #[test]
    fn install_and_dispatch() {
        let mut registry = Registry::new();
        let binding = registry.register("double", |x: f64| x * 2.0).unwrap();

        let id = install(binding);
        let result = dispatch(id, vec![ScriptValue::Number(21.0)]).unwrap();
        assert_eq!(result, ScriptValue::Number(42.0));
        assert!(uninstall(id));
    }

    #[test]
    fn stale_id_is_name_not_found() {
        let mut registry = Registry::new();
        let binding = registry.register("gone", || {}).unwrap();

        let id = install(binding);
        assert!(uninstall(id));

        let err = dispatch(id, vec![]).unwrap_err();
        assert!(matches!(err, BridgeError::NameNotFound(_)));
    }

    #[test]
    fn ids_are_unique() {
        let mut registry = Registry::new();
        let binding = registry.register("same", || {}).unwrap();

        let a = install(binding.clone());
        let b = install(binding);
        assert_ne!(a, b);
        uninstall(a);
        uninstall(b);
    }
}
