//! The per-session binding registry.
//!
//! A binding pairs an exposed name with a type-erased handler plus the
//! signature derived from the callable at register time. Registration is a
//! setup-phase operation: it must complete before the session runs script,
//! on the thread driving the engine. Rebinding a name silently replaces the
//! previous binding (last write wins).

use std::collections::HashMap;
use std::rc::Rc;

use crate::demarshal::FromScriptValue;
use crate::error::BridgeError;
use crate::marshal::ScriptReturn;
use crate::value::{ScriptValue, TypeDescriptor};

/// Type-erased call path: positional script arguments in, marshaled result
/// out. Demarshaling, invocation and return marshaling all happen inside.
pub type HostHandler = Box<dyn Fn(Vec<ScriptValue>) -> Result<ScriptValue, BridgeError>>;

/// A registered host callable and its signature.
pub struct Binding {
    name: String,
    param_types: Vec<TypeDescriptor>,
    has_return: bool,
    handler: HostHandler,
}

impl Binding {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter shapes, positionally, fixed at bind time.
    pub fn param_types(&self) -> &[TypeDescriptor] {
        &self.param_types
    }

    pub fn has_return(&self) -> bool {
        self.has_return
    }

    /// Run the bound callable against already-converted script arguments.
    pub fn invoke(&self, args: Vec<ScriptValue>) -> Result<ScriptValue, BridgeError> {
        (self.handler)(args)
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("param_types", &self.param_types)
            .field("has_return", &self.has_return)
            .finish()
    }
}

/// Anything bindable under a name: plain functions and closures of arity
/// 0..=8 whose parameters demarshal and whose return position is a
/// [`ScriptReturn`]. The `Args` parameter only disambiguates the impls.
pub trait HostFunction<Args> {
    fn param_types() -> Vec<TypeDescriptor>;
    fn return_count() -> usize;
    fn into_handler(self) -> HostHandler;
}

macro_rules! impl_host_function {
    ($($arg:ident),*) => {
        #[allow(non_snake_case, unused_variables, unused_mut)]
        impl<F, R, $($arg),*> HostFunction<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> R + 'static,
            R: ScriptReturn,
            $($arg: FromScriptValue + 'static,)*
        {
            fn param_types() -> Vec<TypeDescriptor> {
                vec![$($arg::descriptor()),*]
            }

            fn return_count() -> usize {
                R::COUNT
            }

            fn into_handler(self) -> HostHandler {
                Box::new(move |args: Vec<ScriptValue>| {
                    let mut args = args.into_iter();
                    // Missing trailing arguments are padded with undefined
                    // and zero-default through demarshal; extras are dropped.
                    $(
                        let $arg = $arg::from_script(
                            args.next().unwrap_or(ScriptValue::Undefined),
                        )?;
                    )*
                    (self)($($arg),*).into_return()
                })
            }
        }
    };
}

impl_host_function!();
impl_host_function!(A0);
impl_host_function!(A0, A1);
impl_host_function!(A0, A1, A2);
impl_host_function!(A0, A1, A2, A3);
impl_host_function!(A0, A1, A2, A3, A4);
impl_host_function!(A0, A1, A2, A3, A4, A5);
impl_host_function!(A0, A1, A2, A3, A4, A5, A6);
impl_host_function!(A0, A1, A2, A3, A4, A5, A6, A7);

/// Name-to-binding map owned by a session. Written during setup, read-only
/// once script is running.
#[derive(Default)]
pub struct Registry {
    entries: HashMap<String, Rc<Binding>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a binding from `function` and store it under `name`, replacing
    /// any previous binding with that name.
    ///
    /// Declaring more than one return value is a configuration error and
    /// fails immediately, before any script call can reach the callable.
    pub fn register<Args, F>(
        &mut self,
        name: impl Into<String>,
        function: F,
    ) -> Result<Rc<Binding>, BridgeError>
    where
        F: HostFunction<Args>,
    {
        let name = name.into();
        let count = F::return_count();
        if count > 1 {
            return Err(BridgeError::BindingArity { name, count });
        }

        let binding = Rc::new(Binding {
            name: name.clone(),
            param_types: F::param_types(),
            has_return: count == 1,
            handler: function.into_handler(),
        });
        self.entries.insert(name, binding.clone());
        Ok(binding)
    }

    pub fn lookup(&self, name: &str) -> Option<Rc<Binding>> {
        self.entries.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn register_records_signature() {
        let mut registry = Registry::new();
        let binding = registry
            .register("join", |parts: Vec<String>, sep: String| parts.join(&sep))
            .unwrap();

        assert_eq!(
            binding.param_types(),
            &[
                TypeDescriptor::Sequence(Box::new(TypeDescriptor::String)),
                TypeDescriptor::String,
            ]
        );
        assert!(binding.has_return());
    }

    #[test]
    fn no_return_binding() {
        let mut registry = Registry::new();
        let binding = registry.register("ping", || {}).unwrap();
        assert!(!binding.has_return());
        assert_eq!(binding.invoke(vec![]).unwrap(), ScriptValue::Null);
    }

    #[test]
    fn invoke_demarshals_positionally() {
        let mut registry = Registry::new();
        let binding = registry
            .register("add", |a: f64, b: f64| a + b)
            .unwrap();

        let result = binding
            .invoke(vec![ScriptValue::Number(2.0), ScriptValue::Number(3.0)])
            .unwrap();
        assert_eq!(result, ScriptValue::Number(5.0));
    }

    #[test]
    fn missing_trailing_args_default() {
        let mut registry = Registry::new();
        let binding = registry
            .register("pair", |a: String, b: String| format!("{a}|{b}"))
            .unwrap();

        let result = binding
            .invoke(vec![ScriptValue::String("only".into())])
            .unwrap();
        assert_eq!(result, ScriptValue::String("only|".into()));
    }

    #[test]
    fn excess_args_are_dropped() {
        let mut registry = Registry::new();
        let binding = registry.register("one", |a: f64| a).unwrap();

        let result = binding
            .invoke(vec![ScriptValue::Number(7.0), ScriptValue::Number(9.0)])
            .unwrap();
        assert_eq!(result, ScriptValue::Number(7.0));
    }

    #[test]
    fn argument_mismatch_fails_the_call() {
        let mut registry = Registry::new();
        let binding = registry.register("shout", |s: String| s).unwrap();

        let err = binding.invoke(vec![ScriptValue::Bool(true)]).unwrap_err();
        assert!(matches!(err, BridgeError::TypeMismatch { .. }));
    }

    #[test]
    fn two_return_values_fail_at_register_time() {
        let mut registry = Registry::new();
        let err = registry
            .register("dual", || (1.0, 2.0))
            .unwrap_err();
        match err {
            BridgeError::BindingArity { name, count } => {
                assert_eq!(name, "dual");
                assert_eq!(count, 2);
            }
            other => panic!("expected BindingArity, got {other:?}"),
        }
        assert!(registry.lookup("dual").is_none());
    }

    #[test]
    fn rebinding_replaces() {
        let calls = Rc::new(RefCell::new(Vec::new()));

        let mut registry = Registry::new();
        let first_calls = calls.clone();
        registry
            .register("n", move |x: f64| {
                first_calls.borrow_mut().push(("first", x));
                x
            })
            .unwrap();

        let second_calls = calls.clone();
        registry
            .register("n", move |x: f64| {
                second_calls.borrow_mut().push(("second", x));
                x * 2.0
            })
            .unwrap();

        assert_eq!(registry.len(), 1);
        let binding = registry.lookup("n").unwrap();
        let result = binding.invoke(vec![ScriptValue::Number(5.0)]).unwrap();
        assert_eq!(result, ScriptValue::Number(10.0));
        assert_eq!(calls.borrow().as_slice(), &[("second", 5.0)]);
    }

    #[test]
    fn lookup_unknown_is_none() {
        let registry = Registry::new();
        assert!(registry.lookup("ghost").is_none());
    }
}
