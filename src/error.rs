//! Errors at the boundary of the core. Per `spec.md` §7 the algorithms
//! themselves never raise — a bulk operation's partial failures show up as
//! empty entries in its returned vector, and an unsatisfiable request (no
//! PDS, negative `extraStates`, ...) returns an empty sequence/set. This enum
//! only covers the handful of genuinely structural failures: malformed
//! `.fsm` files, DOT rendering, and CLI-level validation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsmError {
    #[error("failed to read FSM file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed FSM file {path}: {reason}")]
    InvalidFormat { path: String, reason: String },

    #[error("rendering failed: {0}")]
    Rendering(String),

    #[error("unknown testing method {0:?}")]
    UnknownMethod(String),

    #[error("this operation is not implemented: {0}")]
    NotImplemented(&'static str),
}

pub type Result<T> = std::result::Result<T, FsmError>;
