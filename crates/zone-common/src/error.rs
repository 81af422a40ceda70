// error.rs — error taxonomy for fallible, non-hot-path operations.
// Converted from: myq2-common/src/files.rs, myq2-common/src/cvar.rs
// (both return Result/Option-shaped outcomes for fallible loads rather
// than panicking), generalized against the taxonomy in spec.md §7.
//
// Hot-path per-packet rejections (Protocol/malicious, State sync) are
// NOT represented here: they are logged and dropped in place, never
// propagated as an error (spec.md §7: "nothing in the hot path panics").
// This type is for module load / configuration / resource failures that
// a caller must be able to observe and act on.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneError {
    /// spec.md §7 "Configuration" — missing required identifier, invalid
    /// redirect value, etc. Action: fail module load.
    Configuration(String),
    /// spec.md §7 "Resource" — obscene-file locked/missing after retries.
    Resource(String),
    /// A protocol violation surfaced through a fallible API (e.g. a
    /// malformed redirect target string parsed outside the hot path).
    Protocol(String),
}

impl fmt::Display for ZoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneError::Configuration(m) => write!(f, "configuration error: {m}"),
            ZoneError::Resource(m) => write!(f, "resource error: {m}"),
            ZoneError::Protocol(m) => write!(f, "protocol error: {m}"),
        }
    }
}

impl std::error::Error for ZoneError {}

pub type ZoneResult<T> = Result<T, ZoneError>;
