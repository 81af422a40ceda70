#![allow(clippy::too_many_arguments)]

//! zone-proto — wire packet layouts for the client↔server protocol
//! described in spec.md §6: C2S/S2C packet structs, bit-exact field
//! layouts, and the position/weapon checksum. Converted in spirit from
//! `myq2-common::q_shared`/`qfiles` (canonical `#[repr(C)]` wire structs)
//! and `myq2-common::common` (the msg_write_*/msg_read_* encode/decode
//! helpers), re-targeted at this protocol's actual field layout.

pub mod c2s;
pub mod checksum;
pub mod s2c;
pub mod types;

pub use types::*;
