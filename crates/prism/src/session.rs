//! A session: one script engine context, one registry, one surface.
//!
//! The registry's lifetime is bounded by the session's. Binding is a
//! setup-phase operation on the thread that owns the session; once script is
//! running the registry is read-only. The engine is single threaded, so a
//! bound callable never races other script activity, but it gets no
//! protection against other host threads touching shared state.

use std::collections::HashMap;
use std::sync::Arc;

use deno_core::v8;
use deno_core::{JsRuntime, RuntimeOptions};
use prism_serve::ContentSource;

use crate::config::Config;
use crate::convert;
use crate::demarshal::FromScriptValue;
use crate::dispatch;
use crate::error::BridgeError;
use crate::registry::{HostFunction, Registry};
use crate::surface::{HeadlessSurface, Surface};
use crate::value::ScriptValue;

/// A renderer surface plus its embedded script context and binding registry.
pub struct Session {
    runtime: JsRuntime,
    registry: Registry,
    /// Exposed name to live dispatch id.
    exposed: HashMap<String, u64>,
    config: Config,
    surface: Box<dyn Surface>,
    base_url: Option<String>,
}

impl Session {
    /// Create a session with a headless surface (no renderer attached).
    pub fn new(config: Config) -> Self {
        let surface = Box::new(HeadlessSurface::from_config(&config));
        Self::with_surface(config, surface)
    }

    /// Create a session wired to a native renderer surface.
    pub fn with_surface(config: Config, surface: Box<dyn Surface>) -> Self {
        let runtime = JsRuntime::new(RuntimeOptions::default());
        Self {
            runtime,
            registry: Registry::new(),
            exposed: HashMap::new(),
            config,
            surface,
            base_url: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Base URL of the content server, once [`start`](Self::start) has run.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Register `function` under `name` and expose it as a callable on the
    /// script global object.
    ///
    /// Rebinding a name replaces both the registry entry and the global;
    /// script that captured the old function gets the unbound-call behavior
    /// (null) from then on. Callables declaring more than one return value
    /// are refused here with [`BridgeError::BindingArity`].
    pub fn bind<Args, F>(&mut self, name: &str, function: F) -> Result<(), BridgeError>
    where
        F: HostFunction<Args>,
    {
        let binding = self.registry.register(name, function)?;
        let id = dispatch::install(binding);
        if let Some(stale) = self.exposed.insert(name.to_string(), id) {
            dispatch::uninstall(stale);
        }
        self.expose_global(name, id)
    }

    /// Plant a trampoline function on the global object. Its data slot
    /// carries only the dispatch id.
    fn expose_global(&mut self, name: &str, id: u64) -> Result<(), BridgeError> {
        let scope = &mut self.runtime.handle_scope();
        let context = scope.get_current_context();
        let global = context.global(scope);

        let key = v8::String::new(scope, name)
            .ok_or_else(|| BridgeError::Engine(format!("cannot intern name `{name}`")))?;
        let data = v8::Number::new(scope, id as f64);
        let function = v8::Function::builder(dispatch::trampoline)
            .data(data.into())
            .build(scope)
            .ok_or_else(|| {
                BridgeError::Engine(format!("cannot create trampoline for `{name}`"))
            })?;

        global.set(scope, key.into(), function.into());
        Ok(())
    }

    /// Evaluate script and demarshal the result into `T`.
    ///
    /// Execution failures (parse errors, thrown exceptions — including a
    /// `TypeError` raised by a failing bound call inside the script) come
    /// back as [`BridgeError::ScriptExecution`], distinct from demarshal
    /// failures on the result.
    pub fn eval<T: FromScriptValue>(&mut self, script: &str) -> Result<T, BridgeError> {
        let value = self.eval_value(script)?;
        T::from_script(value)
    }

    /// Evaluate script and return the raw tagged result (the untyped path).
    pub fn eval_value(&mut self, script: &str) -> Result<ScriptValue, BridgeError> {
        let result = self
            .runtime
            .execute_script("prism_eval", script.to_string())
            .map_err(|e| BridgeError::ScriptExecution(e.to_string()))?;

        let scope = &mut self.runtime.handle_scope();
        let local = v8::Local::new(scope, result);
        Ok(convert::from_v8(scope, local))
    }

    /// Launch the content server for `source` and hand the base URL to the
    /// surface as the initial document. Returns the URL.
    pub fn start(&mut self, source: Arc<dyn ContentSource>) -> Result<String, BridgeError> {
        let url = prism_serve::serve(source)?;
        self.surface.load_url(&url);
        self.base_url = Some(url.clone());
        Ok(url)
    }

    /// Forward a native resize to the drawable surface. Zero-height events
    /// (minimization) are dropped.
    pub fn resize(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.surface.resize(width, height);
        }
    }

    /// Move the surface to the given coordinates.
    pub fn move_to(&mut self, x: i32, y: i32) {
        self.surface.move_to(x, y);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        for id in self.exposed.values() {
            dispatch::uninstall(*id);
        }
    }
}
