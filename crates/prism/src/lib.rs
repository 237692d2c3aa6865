//! Bidirectional call bridge between Rust and an embedded V8 context.
//!
//! A [`Session`] owns one script engine context and one binding registry.
//! Host functions registered with [`Session::bind`] become callables on the
//! script global object, with automatic conversion of arguments and the
//! (single) return value; [`Session::eval`] runs script and demarshals the
//! result into a typed host value.
//!
//! Supported kinds on the host side: `bool`, `f64` (script numbers are
//! always doubles), `String`, `Vec<T>`, `Option<T>` (marshal only), and any
//! serde round-trippable type opted in with [`structured!`]. Composite
//! values cross the boundary as JSON but arrive in script as real objects.
//!
//! ```no_run
//! use prism::{Config, Session};
//!
//! let mut session = Session::new(Config::new("demo", 800, 600));
//! session.bind("add", |a: f64, b: f64| a + b)?;
//! let sum: f64 = session.eval("add(2, 40)")?;
//! assert_eq!(sum, 42.0);
//! # Ok::<(), prism::BridgeError>(())
//! ```
//!
//! Binding is a setup-phase operation: register everything before the
//! session starts running script, on the thread that owns the session.

mod config;
mod convert;
mod demarshal;
mod dispatch;
mod error;
mod marshal;
mod registry;
mod session;
mod surface;
mod value;

pub use config::{
    Config, HINT_BORDERLESS, HINT_MAXIMIZABLE, HINT_RESIZABLE, HINT_TILTED,
};
pub use demarshal::FromScriptValue;
pub use error::BridgeError;
pub use marshal::{IntoScriptValue, ScriptReturn};
pub use registry::{Binding, HostFunction, HostHandler, Registry};
pub use session::Session;
pub use surface::{HeadlessSurface, Surface};
pub use value::{ScriptValue, TypeDescriptor};

// Re-export the content-source collaborator so embedders need one import.
pub use prism_serve::{Content, ContentSource, ServeError, StaticSite};

// Used by the `structured!` macro expansion.
#[doc(hidden)]
pub use log;
#[doc(hidden)]
pub use serde_json;
