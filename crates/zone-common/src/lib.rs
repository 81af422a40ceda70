#![allow(clippy::too_many_arguments)]

//! zone-common — leveled logging, error taxonomy, config lookup, RNG seam,
//! a growable wire buffer and a small file-loading helper.
//!
//! Converted from the ambient-infrastructure modules of `myq2-common`
//! (`common.rs`, `cvar.rs`, `files.rs`, `crc.rs`) and generalized for the
//! zone-engine workspace.

pub mod config;
pub mod crc32;
pub mod error;
pub mod files;
pub mod log;
pub mod msgbuf;
pub mod rng;
pub mod tokenize;
