//! Error taxonomy for the bridge.
//!
//! Configuration-time errors (`BindingArity`) indicate a host programming
//! mistake and abort the registering call. Per-call errors are surfaced to
//! whichever side can act on them: dispatch failures become a script-visible
//! exception, eval failures come back as an `Err` to the host. Nothing here
//! is retried and no failure tears down the session.

use thiserror::Error;

use crate::value::TypeDescriptor;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// A callable bound under a name may declare at most one return value.
    #[error("binding `{name}` declares {count} return values, at most one is supported")]
    BindingArity { name: String, count: usize },

    /// A script value's kind does not match the declared target kind.
    #[error("type mismatch: expected {expected}, got {found}")]
    TypeMismatch {
        expected: TypeDescriptor,
        found: &'static str,
    },

    /// The host value's kind has no marshaling rule.
    #[error("no conversion rule for {0}")]
    UnsupportedKind(&'static str),

    /// JSON decode of a script object into a structured host type failed.
    #[error("structured decode failed: {0}")]
    StructuredDecode(#[from] serde_json::Error),

    /// The evaluated script failed to parse or threw.
    #[error("script execution failed: {0}")]
    ScriptExecution(String),

    /// A call reached the dispatcher for a name with no live binding.
    #[error("no binding registered under `{0}`")]
    NameNotFound(String),

    /// The engine refused an allocation or context operation.
    #[error("script engine error: {0}")]
    Engine(String),

    /// Standing up the content server failed.
    #[error("content server failed: {0}")]
    ContentServer(#[from] prism_serve::ServeError),
}
